//! Idempotent file operations built on fleet execution

mod line_in_file;
mod send;

pub use line_in_file::{LineInFileConfig, line_in_file};
pub use send::{SendConfig, send};

/// Quote `s` for safe inclusion in a POSIX shell command
pub(crate) fn shell_quote(s: &str) -> String {
    if !s.is_empty()
        && !s.contains(|c: char| c.is_whitespace() || "\"'\\$`!*?<>|&;()[]{}~#".contains(c))
    {
        return s.to_string();
    }
    // Use single quotes and escape any single quotes in the string
    format!("'{}'", s.replace('\'', "'\"'\"'"))
}
