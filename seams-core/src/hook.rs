//! Hook protocol: per-token callbacks and scan lookaround
//!
//! A [`TokenHook`] is invoked once per produced token before the token is
//! committed. It receives the token (mutable) and a [`Scan`] handle over the
//! input. The handle is a narrow cursor-control capability, not the engine
//! state: hooks can look around and consume further input, nothing else.

use crate::error::HookError;
use crate::token::Token;

/// Read-write cursor handle passed to hooks and predicates.
///
/// Lookaround is read-only; the only mutation a hook can perform is
/// [`Scan::consume`], which advances the position scanning resumes from.
#[derive(Debug)]
pub struct Scan<'s> {
    input: &'s str,
    token_start: usize,
    cursor: usize,
    consumed: usize,
    prev: Option<&'s str>,
}

impl<'s> Scan<'s> {
    pub(crate) fn new(
        input: &'s str,
        token_start: usize,
        cursor: usize,
        prev: Option<&'s str>,
    ) -> Self {
        Self {
            input,
            token_start,
            cursor,
            consumed: 0,
            prev,
        }
    }

    /// The full input string.
    pub fn input(&self) -> &'s str {
        self.input
    }

    /// Byte offset of the current token's first character.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Byte offset scanning will resume from.
    pub fn pos(&self) -> usize {
        self.cursor + self.consumed
    }

    /// The input remaining after the current token and any consumed span.
    pub fn rest(&self) -> &'s str {
        &self.input[self.pos()..]
    }

    /// The next raw character, if any.
    pub fn next_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// The previous committed token's effective value.
    pub fn prev(&self) -> Option<&str> {
        self.prev
    }

    /// True when the current token starts at the beginning of the input.
    pub fn bos(&self) -> bool {
        self.token_start == 0
    }

    /// True when no input remains past the current position.
    pub fn eos(&self) -> bool {
        self.pos() >= self.input.len()
    }

    /// Consume up to `n` characters beyond the current token, so the scan
    /// loop resumes past them. Returns the number of characters consumed.
    pub fn consume(&mut self, n: usize) -> usize {
        let mut taken = 0;
        for _ in 0..n {
            match self.next_char() {
                Some(ch) => {
                    self.consumed += ch.len_utf8();
                    taken += 1;
                }
                None => break,
            }
        }
        taken
    }
}

/// Per-token callback capable of rewriting values, suppressing splits, and
/// consuming extra input.
///
/// Errors propagate to the caller as [`crate::SplitError::Hook`] and abort
/// the whole call.
pub trait TokenHook {
    /// Called once for every produced token, before it is committed.
    fn on_token(&mut self, token: &mut Token, scan: &mut Scan<'_>) -> Result<(), HookError>;
}

impl<F> TokenHook for F
where
    F: FnMut(&mut Token, &mut Scan<'_>) -> Result<(), HookError>,
{
    fn on_token(&mut self, token: &mut Token, scan: &mut Scan<'_>) -> Result<(), HookError> {
        self(token, scan)
    }
}

/// Options-level split decision, consulted for unsuppressed separator tokens
/// at top nesting level. Returning `false` keeps the separator literal.
pub type SplitPredicate = dyn Fn(&Token, &Scan<'_>) -> bool + Send + Sync;

/// Per-character retention decision, the narrow read-only hook form. Invoked
/// for text, escape, quote, and bracket delimiter characters; returning
/// `false` drops the character from the output.
pub type KeepPredicate = dyn Fn(char, &Scan<'_>) -> bool + Send + Sync;

/// Escape retention decision over the current scan position.
pub type EscapePredicate = dyn Fn(&Scan<'_>) -> bool + Send + Sync;
