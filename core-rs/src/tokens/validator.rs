//! Token allow-list fetching and membership checks

use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::errors::{BootError, Result};
use crate::store::JsonFetcher;

/// Field of the token document that carries the allow-list
pub const TOKENS_FIELD: &str = "tokens";

/// Fetches the active token set from a database link
#[derive(Debug, Clone)]
pub struct TokenValidator {
    fetcher: JsonFetcher,
}

impl TokenValidator {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            fetcher: JsonFetcher::new(timeout)?,
        })
    }

    /// Fetch the non-blank tokens published at `link`, in document order.
    ///
    /// Transport and shape failures are logged and yield an empty set.
    pub async fn fetch_tokens(&self, link: &str) -> Vec<String> {
        let document = match self.fetcher.get_json(link).await {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "failed to load token database");
                return Vec::new();
            }
        };

        match extract_tokens(&document) {
            Ok(tokens) => {
                info!(count = tokens.len(), "token database loaded");
                tokens
            }
            Err(err) => {
                warn!(error = %err, "failed to load token database");
                Vec::new()
            }
        }
    }
}

/// Pull the `tokens` array out of a token document and drop blank entries.
///
/// Entries are kept verbatim; whitespace is only used to decide blankness.
pub fn extract_tokens(document: &JsonValue) -> Result<Vec<String>> {
    let entries = document
        .get(TOKENS_FIELD)
        .and_then(JsonValue::as_array)
        .ok_or_else(|| BootError::MalformedPayload("token document has no tokens array".to_string()))?;

    let mut tokens = Vec::with_capacity(entries.len());
    for entry in entries {
        let token = entry.as_str().ok_or_else(|| {
            BootError::MalformedPayload(format!("token entry is not a string: {}", entry))
        })?;
        if !token.trim().is_empty() {
            tokens.push(token.to_string());
        }
    }
    Ok(tokens)
}

/// Exact, case-sensitive membership of the local token in the allow-list
pub fn is_authorized(local_token: &str, token_set: &[String]) -> bool {
    token_set.iter().any(|token| token == local_token)
}

/// Human-readable count of valid tokens
pub fn describe_token_count(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{} active token{} found in database.", count, plural)
}
