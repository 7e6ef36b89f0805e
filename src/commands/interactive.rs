//! Interactive user prompting components
//!
//! This module provides reusable components for user interaction,
//! separating CLI prompting logic from business logic.

use std::io::{self, Write};

use crate::error::{AdminError, Result};
use crate::list::{BulkAction, ConfirmGate};
use crate::utils::is_stdin_tty;

/// Prompt user for yes/no confirmation
///
/// # Arguments
/// * `prompt` - The prompt message to display (without [y/N] suffix)
///
/// # Returns
/// * `true` if user confirms with 'y' or 'Y'
/// * `false` otherwise
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{}? [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

/// Whether a typed answer means yes.
pub fn is_yes(input: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("yes")
}

/// Prompt user for text input
///
/// # Arguments
/// * `prompt` - The prompt message
/// * `default` - Optional default value if user just presses Enter
pub fn prompt_text(prompt: &str, default: Option<&str>) -> Result<String> {
    if let Some(d) = default {
        print!("{} [{}]: ", prompt, d);
    } else {
        print!("{}: ", prompt);
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let input = input.trim();

    if input.is_empty()
        && let Some(d) = default
    {
        return Ok(d.to_string());
    }

    Ok(input.to_string())
}

/// Confirmation gate that asks on the terminal.
///
/// Without a terminal there is nobody to ask, so destructive actions are
/// refused unless `--yes` was given.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl ConfirmGate for TerminalConfirm {
    fn confirm(&self, action: BulkAction, count: usize) -> Result<bool> {
        if !is_stdin_tty() {
            return Err(AdminError::Cancelled(format!(
                "{action} needs confirmation; pass --yes when stdin is not a terminal"
            )));
        }
        let noun = if count == 1 { "record" } else { "records" };
        confirm(&format!("{action} {count} {noun}"))
    }
}
