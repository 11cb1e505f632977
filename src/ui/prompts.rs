//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Prompt for confirmation (yes/no) on stdin.
///
/// Returns `Ok(true)` if the user confirms, `Ok(false)` if they decline.
/// An empty answer takes `default`.
/// Returns `Err(PromptError::NotInteractive)` if not in interactive mode.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }

    let stdin = io::stdin();
    let mut stderr = io::stderr();
    confirm_with(message, default, &mut stdin.lock(), &mut stderr)
}

fn confirm_with(
    message: &str,
    default: bool,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<bool, PromptError> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        write!(out, "{} {} ", message, hint).map_err(|e| PromptError::IoError(e.to_string()))?;
        out.flush()
            .map_err(|e| PromptError::IoError(e.to_string()))?;

        let mut answer = String::new();
        let read = input
            .read_line(&mut answer)
            .map_err(|e| PromptError::IoError(e.to_string()))?;
        if read == 0 {
            return Err(PromptError::Cancelled);
        }

        match answer.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {}
        }
    }
}
