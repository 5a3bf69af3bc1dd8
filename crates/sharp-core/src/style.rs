//! Design system presets.

use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aesthetic preset folded into the generation instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleMode {
    /// Neon accents on black, the house style.
    #[default]
    NeonCyberpunk,
    MinimalSaas,
    LuxuryDark,
    Brutalist,
}

impl StyleMode {
    /// All presets in display order.
    pub const ALL: [StyleMode; 4] = [
        StyleMode::NeonCyberpunk,
        StyleMode::MinimalSaas,
        StyleMode::LuxuryDark,
        StyleMode::Brutalist,
    ];

    /// Human-readable label, as shown in the selector and in the prompt.
    pub fn label(&self) -> &'static str {
        match self {
            StyleMode::NeonCyberpunk => "Neon Cyberpunk",
            StyleMode::MinimalSaas => "Minimal SaaS",
            StyleMode::LuxuryDark => "Luxury Dark",
            StyleMode::Brutalist => "Brutalist",
        }
    }

    /// Stable identifier used on the wire and on the command line.
    pub fn slug(&self) -> &'static str {
        match self {
            StyleMode::NeonCyberpunk => "neon-cyberpunk",
            StyleMode::MinimalSaas => "minimal-saas",
            StyleMode::LuxuryDark => "luxury-dark",
            StyleMode::Brutalist => "brutalist",
        }
    }
}

impl fmt::Display for StyleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StyleMode {
    type Err = ValidationError;

    /// Accepts either the slug or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StyleMode::ALL
            .into_iter()
            .find(|mode| mode.slug() == wanted || mode.label().to_lowercase() == wanted)
            .ok_or_else(|| ValidationError::UnknownStyle(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_and_slug() {
        assert_eq!("Minimal SaaS".parse::<StyleMode>().unwrap(), StyleMode::MinimalSaas);
        assert_eq!("luxury-dark".parse::<StyleMode>().unwrap(), StyleMode::LuxuryDark);
        assert_eq!(" BRUTALIST ".parse::<StyleMode>().unwrap(), StyleMode::Brutalist);
    }

    #[test]
    fn test_unknown_style() {
        let err = "vaporwave".parse::<StyleMode>().unwrap_err();
        assert_eq!(err, ValidationError::UnknownStyle("vaporwave".into()));
    }

    #[test]
    fn test_serde_uses_slug() {
        let json = serde_json::to_string(&StyleMode::NeonCyberpunk).unwrap();
        assert_eq!(json, "\"neon-cyberpunk\"");
    }
}
