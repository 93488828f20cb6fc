//! Error types.
//!
//! Producer errors never reach the rendered line. The collector turns them
//! into an empty segment and keeps the summary for diagnostics.

use thiserror::Error;

/// Why a producer yielded no segment.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("no command configured for exec producer")]
    MissingCommand,
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("i/o error talking to producer: {0}")]
    Io(#[from] std::io::Error),
    #[error("exited with status {}", code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Exit { code: Option<i32> },
    #[error("timeout")]
    Timeout,
    #[error("producer panicked")]
    Panicked,
}

/// Maximum length of an error summary kept in diagnostics.
pub const MAX_ERROR_SUMMARY: usize = 200;

impl ProducerError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProducerError::Timeout)
    }

    /// Diagnostic summary: `"timeout"` or the message capped at
    /// [`MAX_ERROR_SUMMARY`] characters plus `...`.
    pub fn summary(&self) -> String {
        if self.is_timeout() {
            return "timeout".to_string();
        }
        let msg = self.to_string();
        if msg.chars().count() > MAX_ERROR_SUMMARY {
            let cut: String = msg.chars().take(MAX_ERROR_SUMMARY).collect();
            format!("{cut}...")
        } else {
            msg
        }
    }
}
