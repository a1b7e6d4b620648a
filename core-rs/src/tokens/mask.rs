//! Display-only token redaction

/// Placeholder for tokens without a `prefix:suffix` shape
pub const OPAQUE_MASK: &str = "*****";

const PREFIX_VISIBLE: usize = 3;
const PREFIX_MIN_MASK: usize = 3;
const SUFFIX_VISIBLE: usize = 1;
const SUFFIX_MIN_MASK: usize = 4;

/// Mask a token for console output.
///
/// `prefix:suffix` keeps the first 3 characters of the prefix and the first
/// character of the suffix. Only the first two `:`-separated segments are
/// rendered.
///
/// # Example
///
/// ```
/// use saurus_core::tokens::mask_token;
///
/// assert_eq!(mask_token("abc123:xyz789"), "abc***:x*****");
/// assert_eq!(mask_token("notoken"), "*****");
/// ```
pub fn mask_token(token: &str) -> String {
    if !token.contains(':') {
        return OPAQUE_MASK.to_string();
    }

    let mut segments = token.split(':');
    let prefix = segments.next().unwrap_or_default();
    let suffix = segments.next().unwrap_or_default();

    format!(
        "{}:{}",
        mask_segment(prefix, PREFIX_VISIBLE, PREFIX_MIN_MASK),
        mask_segment(suffix, SUFFIX_VISIBLE, SUFFIX_MIN_MASK)
    )
}

fn mask_segment(segment: &str, visible: usize, min_mask: usize) -> String {
    let shown: String = segment.chars().take(visible).collect();
    let hidden = segment.chars().count().saturating_sub(visible).max(min_mask);
    format!("{}{}", shown, "*".repeat(hidden))
}
