pub mod validation;

use std::fs;
use std::io::IsTerminal;
use std::path::Path;

use crate::config::admin_root;
use crate::error::{AdminError, Result};

pub use validation::{parse_field_args, validate_create, validate_login, validate_update};

/// Ensure the parent directory of a path exists, creating it if necessary.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            AdminError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create directory at {}: {}",
                    format_relative_path(parent),
                    e
                ),
            ))
        })?;
    }
    Ok(())
}

/// Format a path for display relative to the admin root directory, so
/// messages do not expose home directory paths.
pub fn format_relative_path(path: &Path) -> String {
    match admin_root() {
        Ok(root) => path
            .strip_prefix(&root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string()),
        Err(_) => path.display().to_string(),
    }
}

/// Whether stdin is an interactive terminal.
pub fn is_stdin_tty() -> bool {
    std::io::stdin().is_terminal()
}

/// Today's date in the system time zone.
pub fn today() -> jiff::civil::Date {
    jiff::Zoned::now().date()
}

/// Truncate a string to a maximum length, handling multi-byte characters properly.
/// Appends "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
