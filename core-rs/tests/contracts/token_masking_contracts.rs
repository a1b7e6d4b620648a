//! Token Masking & Allow-List Contract Tests
//!
//! These tests verify INVARIANTS that MUST NEVER BREAK regardless of implementation.
//! Masked tokens are the only form of a token that ever reaches the console.
//!
//! **Problem**: masking looks cosmetic, so it gets "simplified"
//! **Solution**: contract tests that pin the exact shape and what stays hidden

use saurus_core::tokens::{extract_tokens, OPAQUE_MASK};
use saurus_core::{is_authorized, mask_token};
use serde_json::json;

/// WHY: Prefix keeps 3 chars, suffix keeps 1, everything else is `*`
/// REASON: Operators recognise their token by the bot id prefix without seeing the secret
/// BREAKS: Operator diagnostics for an unregistered token
#[test]
fn mask_shape_is_fixed() {
    assert_eq!(mask_token("abc123:xyz789"), "abc***:x*****");
    assert_eq!(mask_token("1234567890:ABCDEFGH"), "123*******:A*******");
}

/// WHY: Short segments are padded to a minimum mask length
/// REASON: Mask length must not reveal that a secret is tiny
/// BREAKS: Length side channel on short tokens
#[test]
fn short_segments_still_get_minimum_mask() {
    assert_eq!(mask_token("a:b"), "a***:b****");
    assert_eq!(mask_token("ab:"), "ab***:****");
}

/// WHY: Tokens without `:` are fully opaque
/// REASON: There is no safe "prefix" to reveal in an unknown token shape
#[test]
fn colon_free_tokens_are_fully_hidden() {
    assert_eq!(mask_token("plainsecretvalue"), OPAQUE_MASK);
    assert_eq!(mask_token(""), OPAQUE_MASK);
}

/// WHY: Masking never emits the secret part
/// REASON: Console output may end up in screenshots and support tickets
/// SACRIFICES: If this fails, masked output is leaking credentials
#[test]
fn masked_output_never_contains_secret_tail() {
    let token = "7000000001:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw";
    let masked = mask_token(token);

    assert!(!masked.contains("AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw"));
    assert!(!masked.contains("7000000001"));
    assert!(!masked.contains("AH"));
}

/// WHY: Membership is exact string equality
/// REASON: Trimming would authorize a token that differs from the one the bot API sees
/// BREAKS: Allow-list semantics shared with the remote database
#[test]
fn membership_is_exact() {
    let tokens = vec!["1:abc".to_string(), "2:def".to_string()];

    assert!(is_authorized("1:abc", &tokens));
    assert!(!is_authorized("1:ABC", &tokens));
    assert!(!is_authorized(" 1:abc", &tokens));
    assert!(!is_authorized("", &tokens));
}

/// WHY: Blank allow-list entries are dropped, the rest kept verbatim
/// REASON: An empty entry must never make an empty local token valid
#[test]
fn blank_entries_are_not_tokens() {
    let tokens = extract_tokens(&json!({"tokens": ["", "   ", "1:abc", "\t"]})).unwrap();

    assert_eq!(tokens, vec!["1:abc".to_string()]);
    assert!(!is_authorized("", &tokens));
    assert!(!is_authorized("   ", &tokens));
}

/// WHY: A document without a `tokens` array is malformed, not empty
/// REASON: Distinguishes a broken database from one with no active tokens in logs
#[test]
fn missing_tokens_array_is_an_error() {
    assert!(extract_tokens(&json!({"token": ["1:abc"]})).is_err());
    assert!(extract_tokens(&json!({"tokens": "1:abc"})).is_err());
}
