//! Engine error types

use thiserror::Error;

/// Error type raised by caller-supplied hooks.
///
/// Hooks may fail with any error; the engine wraps it in
/// [`SplitError::Hook`] and aborts the call without a partial result.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the splitting engine.
#[derive(Error, Debug)]
pub enum SplitError {
    /// Configuration rejected during option resolution
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Strict mode: a bracket opener has no matching closer
    #[error("unclosed bracket `{open}` at byte {offset}")]
    UnterminatedBracket {
        /// The opening bracket character
        open: char,
        /// Byte offset of the opener in the input
        offset: usize,
    },

    /// Strict mode: a quote opener has no matching closer
    #[error("unclosed quote `{open}` at byte {offset}")]
    UnterminatedQuote {
        /// The opening quote character
        open: char,
        /// Byte offset of the opener in the input
        offset: usize,
    },

    /// A caller-supplied hook failed
    #[error("hook error: {0}")]
    Hook(#[source] HookError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, SplitError>;
