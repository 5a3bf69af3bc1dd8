use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sharp_core::{
    Credentials, Deployer, Generator, Phase, SharpConfig, StyleMode, TracingObserver, Workflow,
    COMMIT_MESSAGE,
};
use sharp_studio::{StudioServer, StudioState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the two-pane studio in the browser
    Serve {
        /// Address to bind (defaults to SHARP_HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to SHARP_PORT or 8501)
        #[arg(short, long)]
        port: Option<u16>,

        /// Repository pre-filled in the form (owner/name)
        #[arg(short, long)]
        repo: Option<String>,
    },

    /// Generate one document and write it out
    Generate {
        /// Design system: neon-cyberpunk, minimal-saas, luxury-dark or brutalist
        #[arg(short, long, default_value = "neon-cyberpunk", value_parser = parse_style)]
        style: StyleMode,

        /// Client requirements
        #[arg(long, conflicts_with = "prompt_file", required_unless_present = "prompt_file")]
        prompt: Option<String>,

        /// Read the client requirements from a file
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        /// Output file path (prints to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Push an HTML file to public/index.html of a repository
    Deploy {
        /// Target repository (owner/name)
        #[arg(short, long)]
        repo: String,

        /// HTML file to deploy
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List the available design systems
    Styles,
}

fn parse_style(s: &str) -> std::result::Result<StyleMode, String> {
    s.parse().map_err(|e: sharp_core::ValidationError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = SharpConfig::from_env();

    match cli.command {
        Commands::Styles => {
            for style in StyleMode::ALL {
                println!("{:<16} {}", style.slug(), style.label());
            }
        }
        Commands::Serve { host, port, repo } => {
            let credentials = load_credentials()?;
            let mut config = config;
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            if let Some(repo) = repo {
                config = config.with_default_repo(repo);
            }
            serve(config, credentials).await?;
        }
        Commands::Generate {
            style,
            prompt,
            prompt_file,
            output,
        } => {
            let credentials = load_credentials()?;
            let requirement = match (prompt, prompt_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {:?}", path))?,
                (None, None) => bail!("Provide --prompt or --prompt-file"),
            };
            generate(&config, &credentials, style, &requirement, output).await?;
        }
        Commands::Deploy { repo, file } => {
            let credentials = load_credentials()?;
            let document = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {:?}", file))?;

            let deployer = Deployer::new(sharp_github::github(&config, &credentials)?);
            info!("Deploying {:?} to {}", file, repo);
            match deployer.deploy(&document, &repo, COMMIT_MESSAGE).await {
                Ok(success) => println!("{}. Live on {}.", success.message(), repo),
                Err(e) => bail!("Deploy failed: {}", e),
            }
        }
    }

    Ok(())
}

/// Both secrets must be present before any client is built.
fn load_credentials() -> Result<Credentials> {
    Credentials::from_env().context("Cannot start without credentials")
}

async fn serve(config: SharpConfig, credentials: Credentials) -> Result<()> {
    let generator = Generator::new(sharp_ai::anthropic(&config, &credentials)?);
    let deployer = Deployer::new(sharp_github::github(&config, &credentials)?);
    let state = Arc::new(StudioState::new(generator, deployer, &config.default_repo));

    StudioServer::new(state)
        .start(&config.host, config.port)
        .await
        .context("Studio server failed")
}

async fn generate(
    config: &SharpConfig,
    credentials: &Credentials,
    style: StyleMode,
    requirement: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let generator = Generator::new(sharp_ai::anthropic(config, credentials)?);
    let mut workflow = Workflow::new().with_observer(TracingObserver);

    let state = workflow.generate(&generator, requirement, style).await?;
    let document = state
        .document
        .as_ref()
        .context("Generation produced no document")?;

    if state.phase == Phase::GenerationFailed {
        bail!("{}", document.content);
    }

    if let Some(out_path) = output {
        tokio::fs::write(&out_path, &document.content)
            .await
            .context("Failed to write output file")?;
        info!("Success! Output written to {:?}", out_path);
    } else {
        println!("{}", document.content);
    }
    Ok(())
}
