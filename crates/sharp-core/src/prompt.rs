//! Prompt composition.
//!
//! Turns a [`GenerationRequest`] into the instruction sent to the model: a
//! fixed role framing, the selected style preset and fixed structural
//! requirements in the system part, the requirement text verbatim in the
//! user part.

use crate::GenerationRequest;
use serde::Serialize;

const ROLE: &str = "You are a Senior Frontend Architect.";
const TASK: &str = "TASK: Generate a single-file 'index.html' ready for production: one production-ready, self-contained markup document.";
const REQUIREMENTS: &str = "REQUIREMENTS: HTML5, embedded CSS/JS, Responsive, High-End Aesthetic.";
const OUTPUT: &str = "OUTPUT: Raw code only.";

/// Instruction payload for the generative service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Role framing, style and fixed requirements.
    pub system: String,
    /// The user's requirement text, untouched.
    pub user: String,
}

/// Compose the instruction for a request.
pub fn compose(request: &GenerationRequest) -> Instruction {
    let system = format!(
        "{}\nSTYLE MODE: {}\n{}\n{}\n{}",
        ROLE,
        request.style_mode().label(),
        TASK,
        REQUIREMENTS,
        OUTPUT
    );

    Instruction {
        system,
        user: request.requirement_text().to_string(),
    }
}
