//! Nesting-aware string splitting
//!
//! Splits a string on separator literals in a single forward pass while
//! suppressing splits inside bracket pairs, quoted spans, and escaped
//! characters. A caller-supplied hook can rewrite tokens, suppress
//! individual splits, or consume extra input per token.
//!
//! ```
//! use seams_core::{split, split_with, Options};
//!
//! assert_eq!(split("a.b.c").unwrap(), ["a", "b", "c"]);
//! assert_eq!(split(r"a.b\.c").unwrap(), ["a", "b.c"]);
//!
//! let options = Options::new().brackets(true);
//! assert_eq!(split_with("a.{b.c}.d", &options).unwrap(), ["a", "{b.c}", "d"]);
//! ```

#![warn(missing_docs)]

pub mod error;
mod hook;
mod options;
mod scanner;
mod token;

pub use error::{HookError, Result, SplitError};
pub use hook::{EscapePredicate, KeepPredicate, Scan, SplitPredicate, TokenHook};
pub use options::{Options, DEFAULT_BRACKETS, DEFAULT_QUOTES};
pub use token::{Token, TokenKind};

/// A configured splitter.
///
/// Construction validates the options once; each call then resolves them
/// into a fresh read-only record, so no state is shared between calls.
#[derive(Debug)]
pub struct Splitter {
    options: Options,
}

impl Splitter {
    /// Create a splitter, validating the configuration.
    pub fn new(options: Options) -> Result<Self> {
        options.resolve()?;
        Ok(Self { options })
    }

    /// The configuration this splitter was built with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Split `input` into segments.
    pub fn split(&self, input: &str) -> Result<Vec<String>> {
        let resolved = self.options.resolve()?;
        scanner::split_scan(input, &resolved, None)
    }

    /// Split `input`, invoking `hook` once per produced token.
    pub fn split_with_hook(&self, input: &str, hook: &mut dyn TokenHook) -> Result<Vec<String>> {
        let resolved = self.options.resolve()?;
        scanner::split_scan(input, &resolved, Some(hook))
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self {
            options: Options::default(),
        }
    }
}

/// Split with default options: `"."` separator, quote handling on, bracket
/// handling off. Empty input yields a single empty segment.
pub fn split(input: &str) -> Result<Vec<String>> {
    split_with(input, &Options::default())
}

/// Split on a single separator literal with otherwise default options.
pub fn split_on(input: &str, separator: &str) -> Result<Vec<String>> {
    split_with(input, &Options::new().separator(separator))
}

/// Split with explicit options.
pub fn split_with(input: &str, options: &Options) -> Result<Vec<String>> {
    let resolved = options.resolve()?;
    scanner::split_scan(input, &resolved, None)
}

/// Split with explicit options and a per-token hook.
pub fn split_with_hook(
    input: &str,
    options: &Options,
    hook: &mut dyn TokenHook,
) -> Result<Vec<String>> {
    let resolved = options.resolve()?;
    scanner::split_scan(input, &resolved, Some(hook))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_one_empty_segment() {
        assert_eq!(split("").unwrap(), [""]);
    }

    #[test]
    fn test_splitter_validates_options_up_front() {
        assert!(Splitter::new(Options::new().separator("")).is_err());
        assert!(Splitter::new(Options::default()).is_ok());
    }

    #[test]
    fn test_splitter_calls_are_independent() {
        let splitter = Splitter::new(Options::new().separator(",")).unwrap();
        assert_eq!(splitter.split("a,b").unwrap(), ["a", "b"]);
        assert_eq!(splitter.split("x,y,z").unwrap(), ["x", "y", "z"]);
    }
}
