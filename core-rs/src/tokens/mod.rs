//! Token module
//!
//! Remote allow-list of bot tokens: fetching, membership, and masking
//! for console diagnostics.

pub mod mask;
pub mod validator;

pub use mask::{mask_token, OPAQUE_MASK};
pub use validator::{describe_token_count, extract_tokens, is_authorized, TokenValidator};
