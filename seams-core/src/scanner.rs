//! The forward scan loop: classifier, frame stack, and unwind
//!
//! A single pass over the input classifies one token per step, in priority
//! order: escape, bracket open/close, quote span, separator, text run. A
//! stack of frames tracks currently-open brackets; separators matched inside
//! a frame are buried (they delimit buffered pieces instead of splitting),
//! and closing a frame re-joins its pieces with the separators that were
//! recorded between them.

use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::error::{Result, SplitError};
use crate::hook::{Scan, TokenHook};
use crate::options::{EscapeRetention, QuoteStyle, Resolved, ESCAPE};
use crate::token::{Token, TokenKind};

/// One currently-open bracket structure.
struct Frame {
    open: char,
    close: char,
    open_offset: usize,
    /// Opener text as committed; hooks may have rewritten it
    open_value: String,
    /// First buffered piece
    head: String,
    /// Further pieces, each preceded by the separator literal that was
    /// buried to create the boundary
    rest: Vec<(String, String)>,
}

impl Frame {
    fn new(open: char, close: char, open_offset: usize, open_value: String) -> Self {
        Self {
            open,
            close,
            open_offset,
            open_value,
            head: String::new(),
            rest: Vec::new(),
        }
    }

    fn push_str(&mut self, s: &str) {
        match self.rest.last_mut() {
            Some((_, piece)) => piece.push_str(s),
            None => self.head.push_str(s),
        }
    }

    fn push_boundary(&mut self, separator: String) {
        self.rest.push((separator, String::new()));
    }

    /// Re-join the buffered pieces with their recorded separators. The
    /// frame's own boundaries never split; buried separators stay literal.
    fn unwind(self, keep_open: bool, keep_close: bool, close_value: &str) -> String {
        let mut out = String::new();
        if keep_open {
            out.push_str(&self.open_value);
        }
        out.push_str(&self.head);
        for (separator, piece) in &self.rest {
            out.push_str(separator);
            out.push_str(piece);
        }
        if keep_close {
            out.push_str(close_value);
        }
        out
    }

    fn into_parts(self) -> (String, String, Vec<(String, String)>) {
        (self.open_value, self.head, self.rest)
    }
}

pub(crate) fn split_scan(
    input: &str,
    opts: &Resolved<'_>,
    hook: Option<&mut dyn TokenHook>,
) -> Result<Vec<String>> {
    let mut hook = hook;
    let mut scanner = Scanner {
        input,
        opts,
        pos: 0,
        prev: None,
        stash: vec![String::new()],
        frames: SmallVec::new(),
    };
    scanner.run(&mut hook)
}

struct Scanner<'a> {
    input: &'a str,
    opts: &'a Resolved<'a>,
    pos: usize,
    prev: Option<String>,
    stash: Vec<String>,
    frames: SmallVec<[Frame; 4]>,
}

impl Scanner<'_> {
    fn run(&mut self, hook: &mut Option<&mut dyn TokenHook>) -> Result<Vec<String>> {
        while self.pos < self.input.len() {
            let start = self.pos;
            let Some(ch) = self.input[start..].chars().next() else {
                break;
            };
            let token = self.classify(start, ch)?;
            self.commit(token, hook)?;
        }
        self.finalize()
    }

    /// Decide the next token's kind, in priority order.
    fn classify(&self, start: usize, ch: char) -> Result<Token> {
        if ch == ESCAPE {
            if let Some(token) = self.lex_escape(start) {
                return Ok(token);
            }
            // trailing backslash with nothing to escape
            return Ok(Token::new(TokenKind::Text, ESCAPE, ESCAPE, start));
        }

        if !self.opts.brackets.is_empty() {
            if let Some(frame) = self.frames.last() {
                if ch == frame.close {
                    return Ok(Token::new(TokenKind::BracketClose, ch, ch, start));
                }
            }
            if let Some(&close) = self.opts.brackets.get(&ch) {
                if self.balanced_close_ahead(start, ch, close) {
                    return Ok(Token::new(TokenKind::BracketOpen, ch, ch, start));
                }
                if self.opts.strict {
                    return Err(SplitError::UnterminatedBracket {
                        open: ch,
                        offset: start,
                    });
                }
                trace!(offset = start, opener = %ch, "no balanced closer ahead, opener degrades to text");
            }
        }

        if let Some(&close) = self.opts.quotes.get(&ch) {
            if let Some(token) = self.lex_quote(start, ch, close)? {
                return Ok(token);
            }
        }

        if let Some(separator) = self.match_separator(start) {
            return Ok(Token::new(TokenKind::Separator, separator, separator, start));
        }

        Ok(self.lex_text(start, ch))
    }

    /// Escape token: the backslash and the next character, consumed
    /// atomically. Returns None for a trailing backslash.
    fn lex_escape(&self, start: usize) -> Option<Token> {
        let mut chars = self.input[start..].chars();
        let esc = chars.next()?;
        let next = chars.next()?;
        let raw: String = [esc, next].iter().collect();
        let value = if next == ESCAPE || self.keep_escape_at(start) {
            raw.clone()
        } else {
            next.to_string()
        };
        Some(Token::escaped(raw, value, start))
    }

    fn keep_escape_at(&self, start: usize) -> bool {
        let flagged = match self.opts.keep_escaping {
            EscapeRetention::Keep(keep) => *keep,
            EscapeRetention::When(predicate) => predicate(&self.scan_at(start, start)),
        };
        if flagged {
            return true;
        }
        match self.opts.keep {
            Some(keep) => keep(ESCAPE, &self.scan_at(start, start + ESCAPE.len_utf8())),
            None => false,
        }
    }

    /// Quote span: everything through the matching unescaped closer, as one
    /// token. Returns None when no closer exists and degradation applies.
    fn lex_quote(&self, start: usize, open: char, close: char) -> Result<Option<Token>> {
        let body_start = start + open.len_utf8();
        let Some(close_at) = find_unescaped(self.input, body_start, close) else {
            if self.opts.strict {
                return Err(SplitError::UnterminatedQuote {
                    open,
                    offset: start,
                });
            }
            trace!(offset = start, quote = %open, "no closing quote ahead, treating as text");
            return Ok(None);
        };
        let end = close_at + close.len_utf8();
        let raw = &self.input[start..end];
        let value = if !self.frames.is_empty() {
            // bracket interiors keep quoted spans verbatim
            raw
        } else if self.keep_quote_at(open, start) {
            raw
        } else {
            &self.input[body_start..close_at]
        };
        Ok(Some(Token::new(TokenKind::Quote, raw, value, start)))
    }

    fn keep_quote_at(&self, open: char, start: usize) -> bool {
        match self.opts.keep {
            Some(keep) => keep(open, &self.scan_at(start, start + open.len_utf8())),
            None => self.opts.keep_quote(QuoteStyle::of(open)),
        }
    }

    fn match_separator(&self, start: usize) -> Option<&str> {
        self.opts
            .separators
            .iter()
            .find(|sep| self.input[start..].starts_with(sep.as_str()))
            .map(String::as_str)
    }

    /// Maximal run of ordinary characters; a special character that failed
    /// its special role becomes a single-char token.
    fn lex_text(&self, start: usize, first: char) -> Token {
        if self.opts.is_text_stop(first) {
            return Token::new(TokenKind::Text, first, first, start);
        }
        let rest = &self.input[start..];
        let end = rest
            .char_indices()
            .find(|&(_, ch)| self.opts.is_text_stop(ch))
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let run = &rest[..end];
        Token::new(TokenKind::Text, run, run, start)
    }

    /// Nesting-aware lookahead: could a balanced closer for this opener
    /// exist ahead? Escapes skip pairwise, configured quote spans are
    /// opaque, nested openers push additional expected closers, and closers
    /// that do not match the innermost expectation are literal.
    fn balanced_close_ahead(&self, start: usize, open: char, close: char) -> bool {
        let mut expected: SmallVec<[char; 4]> = smallvec![close];
        let mut idx = start + open.len_utf8();
        while idx < self.input.len() {
            let Some(ch) = self.input[idx..].chars().next() else {
                break;
            };
            idx += ch.len_utf8();
            if ch == ESCAPE {
                if let Some(next) = self.input[idx..].chars().next() {
                    idx += next.len_utf8();
                }
                continue;
            }
            if let Some(&quote_close) = self.opts.quotes.get(&ch) {
                if let Some(close_at) = find_unescaped(self.input, idx, quote_close) {
                    idx = close_at + quote_close.len_utf8();
                }
                continue;
            }
            if expected.last() == Some(&ch) {
                expected.pop();
                if expected.is_empty() {
                    return true;
                }
                continue;
            }
            if let Some(&nested) = self.opts.brackets.get(&ch) {
                expected.push(nested);
            }
        }
        false
    }

    fn commit(&mut self, mut token: Token, hook: &mut Option<&mut dyn TokenHook>) -> Result<()> {
        self.pos = token.start() + token.raw().len();
        if let Some(hook) = hook.as_mut() {
            let mut scan = Scan::new(self.input, token.start(), self.pos, self.prev.as_deref());
            hook.on_token(&mut token, &mut scan)
                .map_err(SplitError::Hook)?;
            self.pos = scan.pos();
        }
        match token.kind() {
            TokenKind::Separator => self.commit_separator(&token),
            TokenKind::BracketOpen => self.commit_bracket_open(&token),
            TokenKind::BracketClose => self.commit_bracket_close(&token),
            TokenKind::Text => self.commit_text(&token),
            TokenKind::Escape | TokenKind::Quote => self.push_to_segment(token.value()),
        }
        self.prev = Some(token.value().to_string());
        Ok(())
    }

    fn commit_separator(&mut self, token: &Token) {
        if let Some(frame) = self.frames.last_mut() {
            // buried: a piece boundary, not a split point
            frame.push_boundary(token.value().to_string());
            return;
        }
        let suppressed = match token.split_override() {
            Some(split) => !split,
            None => match self.opts.split {
                Some(predicate) => {
                    let scan = self.scan_at(token.start(), self.pos);
                    !predicate(token, &scan)
                }
                None => false,
            },
        };
        if suppressed {
            let value = token.value().to_string();
            self.push_to_segment(&value);
        } else {
            self.stash.push(String::new());
        }
    }

    fn commit_bracket_open(&mut self, token: &Token) {
        let Some(open) = token.raw().chars().next() else {
            return;
        };
        let Some(&close) = self.opts.brackets.get(&open) else {
            return;
        };
        trace!(
            offset = token.start(),
            opener = %open,
            depth = self.frames.len() + 1,
            "open bracket frame"
        );
        self.frames.push(Frame::new(
            open,
            close,
            token.start(),
            token.value().to_string(),
        ));
    }

    fn commit_bracket_close(&mut self, token: &Token) {
        let Some(frame) = self.frames.pop() else {
            self.push_to_segment(token.value());
            return;
        };
        trace!(
            offset = token.start(),
            closer = %frame.close,
            depth = self.frames.len(),
            "close bracket frame"
        );
        let keep_open = self.keep_delimiter(frame.open, frame.open_offset);
        let keep_close = self.keep_delimiter(frame.close, token.start());
        let merged = frame.unwind(keep_open, keep_close, token.value());
        self.push_to_segment(&merged);
    }

    fn commit_text(&mut self, token: &Token) {
        if let Some(keep) = self.opts.keep {
            let kept: String = {
                let scan = self.scan_at(token.start(), self.pos);
                token.value().chars().filter(|&ch| keep(ch, &scan)).collect()
            };
            self.push_to_segment(&kept);
            return;
        }
        self.push_to_segment(token.value());
    }

    fn keep_delimiter(&self, ch: char, at: usize) -> bool {
        match self.opts.keep {
            Some(keep) => keep(ch, &self.scan_at(at, self.pos)),
            None => true,
        }
    }

    /// Append to the innermost frame's current piece, or to the current
    /// stash segment at top level.
    fn push_to_segment(&mut self, s: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.push_str(s);
        } else if let Some(segment) = self.stash.last_mut() {
            segment.push_str(s);
        }
    }

    fn scan_at(&self, token_start: usize, cursor: usize) -> Scan<'_> {
        Scan::new(self.input, token_start, cursor, self.prev.as_deref())
    }

    /// End of input. Frames can only remain open when a hook consumed the
    /// closer the lookahead predicted; strict mode reports the outermost
    /// opener, permissive mode re-splits the buffered pieces into segments.
    fn finalize(&mut self) -> Result<Vec<String>> {
        if self.opts.strict {
            if let Some(frame) = self.frames.first() {
                return Err(SplitError::UnterminatedBracket {
                    open: frame.open,
                    offset: frame.open_offset,
                });
            }
        }
        let frames = std::mem::take(&mut self.frames);
        for frame in frames {
            trace!(
                offset = frame.open_offset,
                opener = %frame.open,
                "unterminated frame re-split into segments"
            );
            let (open_value, head, rest) = frame.into_parts();
            if let Some(segment) = self.stash.last_mut() {
                segment.push_str(&open_value);
                segment.push_str(&head);
            }
            for (_, piece) in rest {
                self.stash.push(piece);
            }
        }
        Ok(std::mem::take(&mut self.stash))
    }
}

/// First occurrence of `close` at or after `from` that is not escaped. An
/// escaped escape marker does not hide a following closer.
fn find_unescaped(input: &str, from: usize, close: char) -> Option<usize> {
    let mut idx = from;
    while idx < input.len() {
        let ch = input[idx..].chars().next()?;
        if ch == ESCAPE {
            idx += ESCAPE.len_utf8();
            if let Some(next) = input[idx..].chars().next() {
                idx += next.len_utf8();
            }
            continue;
        }
        if ch == close {
            return Some(idx);
        }
        idx += ch.len_utf8();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    fn run(input: &str, options: &Options) -> Vec<String> {
        let resolved = options.resolve().unwrap();
        split_scan(input, &resolved, None).unwrap()
    }

    #[test]
    fn test_find_unescaped_skips_escaped_closer() {
        assert_eq!(find_unescaped("ab\\\"cd\"", 0, '"'), Some(6));
        assert_eq!(find_unescaped("ab\\\"cd", 0, '"'), None);
        // an escaped escape does not hide the closer
        assert_eq!(find_unescaped("\\\\\"x", 0, '"'), Some(2));
    }

    #[test]
    fn test_plain_scan_splits_on_separator() {
        assert_eq!(run("a.b.c", &Options::default()), ["a", "b", "c"]);
    }

    #[test]
    fn test_opener_without_closer_degrades_to_text() {
        let options = Options::new().brackets(true);
        assert_eq!(run("a.{b.c", &options), ["a", "{b", "c"]);
    }

    #[test]
    fn test_degradation_is_per_opener() {
        // the outer brace has no closer of its own, the inner pair does
        let options = Options::new().brackets(true);
        assert_eq!(run("a.{a.{b.c}.d", &options), ["a", "{a", "{b.c}", "d"]);
    }

    #[test]
    fn test_buried_separators_rejoin_on_unwind() {
        let options = Options::new().brackets(true).separators(["||", "&&"]);
        assert_eq!(run("[a&&a]&&[b||c]", &options), ["[a&&a]", "[b||c]"]);
    }

    #[test]
    fn test_lookahead_treats_quotes_as_opaque() {
        let options = Options::new().brackets(true);
        // the only closer is quoted, so the opener is not structural and the
        // quoted span is stripped to its interior as usual
        assert_eq!(run("a.{b\"}\"", &options), ["a", "{b}"]);
    }
}
