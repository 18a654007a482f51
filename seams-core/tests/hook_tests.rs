//! Tests for the per-token hook protocol

use seams_core::*;
use std::result::Result;

fn rewrite_escaped_b(token: &mut Token, _scan: &mut Scan<'_>) -> Result<(), HookError> {
    if token.is_escaped() && token.value() == "b" {
        token.set_value(r"\b");
    }
    Ok(())
}

// Swallow input until parentheses opened inside the token value balance out,
// so "@(b,c)"-style groups survive splitting on ",".
fn balance_parens(token: &mut Token, scan: &mut Scan<'_>) -> Result<(), HookError> {
    let opened = token.value().matches('(').count();
    let closed = token.value().matches(')').count();
    let mut depth = opened as i64 - closed as i64;
    while depth > 0 {
        let Some(ch) = scan.next_char() else { break };
        scan.consume(1);
        if ch == '(' {
            depth += 1;
        } else if ch == ')' {
            depth -= 1;
        }
        token.value_mut().push(ch);
    }
    Ok(())
}

fn keep_after_a(token: &mut Token, scan: &mut Scan<'_>) -> Result<(), HookError> {
    if token.is_separator() && scan.prev() == Some("a") {
        token.prevent_split();
    }
    Ok(())
}

#[test]
fn test_hook_can_rewrite_token_values() {
    assert_eq!(
        split_with_hook(r"a.\b.c", &Options::default(), &mut rewrite_escaped_b).unwrap(),
        ["a", r"\b", "c"]
    );
    // without the hook the escape is stripped
    assert_eq!(split(r"a.\b.c").unwrap(), ["a", "b", "c"]);
}

#[test]
fn test_hook_can_suppress_individual_splits() {
    assert_eq!(
        split_with_hook("a.b.c", &Options::default(), &mut keep_after_a).unwrap(),
        ["a.b", "c"]
    );
}

#[test]
fn test_hook_can_consume_extra_input() {
    let options = Options::new().separator(",");
    assert_eq!(
        split_with_hook("a,(b,c)", &options, &mut balance_parens).unwrap(),
        ["a", "(b,c)"]
    );
    assert_eq!(
        split_with_hook("a,@(b,(c,d)e)", &options, &mut balance_parens).unwrap(),
        ["a", "@(b,(c,d)e)"]
    );
    assert_eq!(
        split_with_hook("a,@(b,(a,b)c),z", &options, &mut balance_parens).unwrap(),
        ["a", "@(b,(a,b)c)", "z"]
    );
    // an unclosed group consumes to the end of input
    assert_eq!(
        split_with_hook("a,(b,c", &options, &mut balance_parens).unwrap(),
        ["a", "(b,c"]
    );
}

#[test]
fn test_hook_errors_abort_the_call() {
    let mut failing = |token: &mut Token, _scan: &mut Scan<'_>| -> Result<(), HookError> {
        if token.value() == "b" {
            return Err("unexpected token".into());
        }
        Ok(())
    };
    let result = split_with_hook("a.b.c", &Options::default(), &mut failing);
    assert!(matches!(result, Err(SplitError::Hook(_))));
}

#[test]
fn test_hook_sees_every_token_kind() {
    let mut kinds = Vec::new();
    let mut recorder = |token: &mut Token, _scan: &mut Scan<'_>| -> Result<(), HookError> {
        kinds.push(token.kind());
        Ok(())
    };
    let options = Options::new().brackets(true);
    split_with_hook(r"a.\b.{c}.d", &options, &mut recorder).unwrap();
    assert!(kinds.contains(&TokenKind::Text));
    assert!(kinds.contains(&TokenKind::Separator));
    assert!(kinds.contains(&TokenKind::Escape));
    assert!(kinds.contains(&TokenKind::BracketOpen));
    assert!(kinds.contains(&TokenKind::BracketClose));
}
