//! Option normalization
//!
//! User configuration is collected with builder methods on [`Options`] and
//! normalized once per call into a read-only [`Resolved`] record consumed by
//! the scan loop.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::debug;

use crate::error::{Result, SplitError};
use crate::hook::{EscapePredicate, KeepPredicate, Scan, SplitPredicate};
use crate::token::Token;

/// The escape marker. An escaped character never opens, closes, or splits.
pub(crate) const ESCAPE: char = '\\';

/// Bracket pairs enabled by [`Options::brackets`].
pub const DEFAULT_BRACKETS: [(char, char); 4] = [('<', '>'), ('(', ')'), ('[', ']'), ('{', '}')];

/// Quote pairs enabled by default: straight double, single, backtick, and
/// smart (curly) double quotes.
pub const DEFAULT_QUOTES: [(char, char); 4] =
    [('"', '"'), ('\'', '\''), ('`', '`'), ('\u{201C}', '\u{201D}')];

/// Quote style of an opening delimiter, used to resolve retention flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuoteStyle {
    Double,
    Single,
    Backtick,
    Smart,
    Other,
}

impl QuoteStyle {
    pub(crate) fn of(open: char) -> Self {
        match open {
            '"' => QuoteStyle::Double,
            '\'' => QuoteStyle::Single,
            '`' => QuoteStyle::Backtick,
            '\u{201C}' | '\u{201D}' => QuoteStyle::Smart,
            _ => QuoteStyle::Other,
        }
    }
}

/// Which quote styles keep their delimiters in the output.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QuoteRetention {
    pub all: bool,
    pub double: bool,
    pub single: bool,
    pub backtick: bool,
    pub smart: bool,
}

/// Whether escape backslashes survive into the output.
pub(crate) enum EscapeRetention {
    Keep(bool),
    When(Box<EscapePredicate>),
}

impl Default for EscapeRetention {
    fn default() -> Self {
        EscapeRetention::Keep(false)
    }
}

impl fmt::Debug for EscapeRetention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EscapeRetention::Keep(keep) => write!(f, "Keep({keep})"),
            EscapeRetention::When(_) => write!(f, "When(<predicate>)"),
        }
    }
}

/// Configuration for a split call.
///
/// All knobs are optional; `Options::default()` splits on `"."` with quote
/// handling enabled, bracket handling disabled, delimiters stripped, and
/// permissive degradation of unterminated structures.
pub struct Options {
    separators: Vec<String>,
    brackets: Vec<(char, char)>,
    quotes: Vec<(char, char)>,
    retention: QuoteRetention,
    keep_escaping: EscapeRetention,
    strict: bool,
    split: Option<Box<SplitPredicate>>,
    keep: Option<Box<KeepPredicate>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            separators: vec![".".to_string()],
            brackets: Vec::new(),
            quotes: DEFAULT_QUOTES.to_vec(),
            retention: QuoteRetention::default(),
            keep_escaping: EscapeRetention::default(),
            strict: false,
            split: None,
            keep: None,
        }
    }
}

impl Options {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split on a single separator literal.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separators = vec![separator.into()];
        self
    }

    /// Split on several separator literals, tried at each position in the
    /// order given. The first literal matching the input prefix wins; there
    /// is no implicit longest-match re-ordering.
    pub fn separators<I, S>(mut self, separators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.separators = separators.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable bracket handling with the built-in pair set.
    pub fn brackets(mut self, enabled: bool) -> Self {
        self.brackets = if enabled {
            DEFAULT_BRACKETS.to_vec()
        } else {
            Vec::new()
        };
        self
    }

    /// Enable bracket handling with an explicit set of pairs.
    pub fn bracket_pairs(mut self, pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        self.brackets = pairs.into_iter().collect();
        self
    }

    /// Enable or disable quote handling with the built-in quote set.
    pub fn quotes(mut self, enabled: bool) -> Self {
        self.quotes = if enabled {
            DEFAULT_QUOTES.to_vec()
        } else {
            Vec::new()
        };
        self
    }

    /// Quote on the given characters, each self-closing (open == close).
    pub fn quote_chars(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.quotes = chars.into_iter().map(|ch| (ch, ch)).collect();
        self
    }

    /// Quote on explicit (open, close) pairs; asymmetric pairs are allowed.
    pub fn quote_pairs(mut self, pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        self.quotes = pairs.into_iter().collect();
        self
    }

    /// Keep quote delimiters of every style in the output.
    pub fn keep_quotes(mut self, keep: bool) -> Self {
        self.retention.all = keep;
        self
    }

    /// Keep `"` delimiters in the output.
    pub fn keep_double_quotes(mut self, keep: bool) -> Self {
        self.retention.double = keep;
        self
    }

    /// Keep `'` delimiters in the output.
    pub fn keep_single_quotes(mut self, keep: bool) -> Self {
        self.retention.single = keep;
        self
    }

    /// Keep backtick delimiters in the output.
    pub fn keep_backticks(mut self, keep: bool) -> Self {
        self.retention.backtick = keep;
        self
    }

    /// Keep smart-quote delimiters in the output.
    pub fn keep_smart_quotes(mut self, keep: bool) -> Self {
        self.retention.smart = keep;
        self
    }

    /// Keep escape backslashes in the output.
    pub fn keep_escaping(mut self, keep: bool) -> Self {
        self.keep_escaping = EscapeRetention::Keep(keep);
        self
    }

    /// Decide escape retention per occurrence, from the scan position.
    pub fn keep_escaping_when(
        mut self,
        predicate: impl Fn(&Scan<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.keep_escaping = EscapeRetention::When(Box::new(predicate));
        self
    }

    /// Fail on unterminated brackets and quotes instead of degrading them to
    /// literal text.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Options-level split decision for separator tokens. Returning `false`
    /// suppresses the split while still consuming the separator's characters.
    pub fn split_when(
        mut self,
        predicate: impl Fn(&Token, &Scan<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.split = Some(Box::new(predicate));
        self
    }

    /// Per-character retention decision, the narrow read-only hook form.
    pub fn keep_when(
        mut self,
        predicate: impl Fn(char, &Scan<'_>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.keep = Some(Box::new(predicate));
        self
    }

    /// Normalize into the canonical per-call record.
    pub(crate) fn resolve(&self) -> Result<Resolved<'_>> {
        if self.separators.is_empty() {
            return Err(SplitError::InvalidOptions(
                "at least one separator literal is required".to_string(),
            ));
        }
        if self.separators.iter().any(|sep| sep.is_empty()) {
            return Err(SplitError::InvalidOptions(
                "separator literals must not be empty".to_string(),
            ));
        }

        let mut brackets = HashMap::new();
        let mut bracket_closers = HashSet::new();
        for &(open, close) in &self.brackets {
            brackets.insert(open, close);
            bracket_closers.insert(close);
        }

        debug!(
            separators = ?self.separators,
            brackets = self.brackets.len(),
            quotes = self.quotes.len(),
            strict = self.strict,
            "resolved split options"
        );

        Ok(Resolved {
            separators: &self.separators,
            sep_heads: self
                .separators
                .iter()
                .filter_map(|sep| sep.chars().next())
                .collect(),
            brackets,
            bracket_closers,
            quotes: self.quotes.iter().copied().collect(),
            retention: self.retention,
            keep_escaping: &self.keep_escaping,
            strict: self.strict,
            split: self.split.as_deref(),
            keep: self.keep.as_deref(),
        })
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("separators", &self.separators)
            .field("brackets", &self.brackets)
            .field("quotes", &self.quotes)
            .field("retention", &self.retention)
            .field("keep_escaping", &self.keep_escaping)
            .field("strict", &self.strict)
            .field("split", &self.split.as_ref().map(|_| "<predicate>"))
            .field("keep", &self.keep.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

/// Immutable per-call configuration in canonical form.
pub(crate) struct Resolved<'o> {
    pub separators: &'o [String],
    /// First characters of every separator literal; text runs stop here
    pub sep_heads: HashSet<char>,
    pub brackets: HashMap<char, char>,
    pub bracket_closers: HashSet<char>,
    pub quotes: HashMap<char, char>,
    pub retention: QuoteRetention,
    pub keep_escaping: &'o EscapeRetention,
    pub strict: bool,
    pub split: Option<&'o SplitPredicate>,
    pub keep: Option<&'o KeepPredicate>,
}

impl Resolved<'_> {
    /// Retention decision for a quote style, from the flag set.
    pub fn keep_quote(&self, style: QuoteStyle) -> bool {
        if self.retention.all {
            return true;
        }
        match style {
            QuoteStyle::Double => self.retention.double,
            QuoteStyle::Single => self.retention.single,
            QuoteStyle::Backtick => self.retention.backtick,
            QuoteStyle::Smart => self.retention.smart,
            QuoteStyle::Other => false,
        }
    }

    /// True for characters that terminate a text run.
    pub fn is_text_stop(&self, ch: char) -> bool {
        ch == ESCAPE
            || self.sep_heads.contains(&ch)
            || self.brackets.contains_key(&ch)
            || self.bracket_closers.contains(&ch)
            || self.quotes.contains_key(&ch)
    }
}
