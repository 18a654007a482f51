//! Scan tokens
//!
//! One [`Token`] is produced per scan step and handed to the hook (if any)
//! before it is committed to the output.

/// Kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of ordinary characters
    Text,
    /// A backslash plus the character it escapes, consumed atomically
    Escape,
    /// A matched separator literal
    Separator,
    /// A complete quoted span, delimiters included in the raw text
    Quote,
    /// The opener of a bracket structure with a confirmed closer ahead
    BracketOpen,
    /// The closer of the innermost open bracket structure
    BracketClose,
}

/// One classified unit produced per scan step.
#[derive(Debug, Clone)]
pub struct Token {
    kind: TokenKind,
    raw: String,
    value: String,
    start: usize,
    escaped: bool,
    split: Option<bool>,
}

impl Token {
    pub(crate) fn new(
        kind: TokenKind,
        raw: impl Into<String>,
        value: impl Into<String>,
        start: usize,
    ) -> Self {
        Self {
            kind,
            raw: raw.into(),
            value: value.into(),
            start,
            escaped: false,
            split: None,
        }
    }

    pub(crate) fn escaped(raw: impl Into<String>, value: impl Into<String>, start: usize) -> Self {
        let mut token = Self::new(TokenKind::Escape, raw, value, start);
        token.escaped = true;
        token
    }

    /// The token's kind.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The raw span matched in the input, before any rewriting.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The effective value that will be committed to the output.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Byte offset of the token's first character.
    pub fn start(&self) -> usize {
        self.start
    }

    /// True when the token was introduced by an escape marker.
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// True for separator tokens.
    pub fn is_separator(&self) -> bool {
        self.kind == TokenKind::Separator
    }

    /// Replace the effective value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Mutable access to the effective value, for incremental rewriting.
    pub fn value_mut(&mut self) -> &mut String {
        &mut self.value
    }

    /// Override the split decision. Only read on separator tokens.
    pub fn set_split(&mut self, split: bool) {
        self.split = Some(split);
    }

    /// Suppress the split this separator would otherwise produce. The
    /// separator's characters are still consumed and appended literally.
    pub fn prevent_split(&mut self) {
        self.split = Some(false);
    }

    pub(crate) fn split_override(&self) -> Option<bool> {
        self.split
    }
}
