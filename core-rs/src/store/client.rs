//! RemoteStoreClient - JSON documents over HTTP
//!
//! Resources live at `<host>/<owner>/<repo>/<branch>/<resource>`.
//! Every failure is recovered here and surfaced as `None`; the boot
//! orchestrator decides whether a missing document is fatal.

use std::time::Duration;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::errors::{BootError, Result};

/// Fixed owner/repository/branch coordinates of the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocator {
    host: String,
    owner: String,
    repo: String,
    branch: String,
}

impl StoreLocator {
    pub fn new(host: &str, owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            owner: owner.trim_matches('/').to_string(),
            repo: repo.trim_matches('/').to_string(),
            branch: branch.trim_matches('/').to_string(),
        }
    }

    /// Build the full URL of a named resource
    ///
    /// # Example
    ///
    /// ```
    /// use saurus_core::store::StoreLocator;
    ///
    /// let locator = StoreLocator::new("https://raw.githubusercontent.com", "saurusrawr", "dbsaurus", "main");
    /// assert_eq!(
    ///     locator.resource_url("password.json"),
    ///     "https://raw.githubusercontent.com/saurusrawr/dbsaurus/main/password.json"
    /// );
    /// ```
    pub fn resource_url(&self, resource_name: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.host,
            self.owner,
            self.repo,
            self.branch,
            resource_name.trim_start_matches('/')
        )
    }
}

/// Auth resource: `{ "password": string }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub password: String,
}

/// Token-db resource: `{ "databaseLink": string }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDbDescriptor {
    pub database_link: String,
}

/// HTTP GET + JSON helper shared by the store and the token validator
#[derive(Debug, Clone)]
pub struct JsonFetcher {
    http: reqwest::Client,
}

impl JsonFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }

    /// GET `url` and parse the body. Anything other than 200 is an error.
    pub async fn get_json(&self, url: &str) -> Result<JsonValue> {
        debug!(url, "GET");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(BootError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = response.text().await?;
        parse_json_body(&body)
    }
}

/// Parse a response body as JSON.
///
/// Some hosts serve the document as a JSON string literal wrapping the real
/// document; that inner string is parsed once more.
pub fn parse_json_body(body: &str) -> Result<JsonValue> {
    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| BootError::MalformedPayload(format!("response is not JSON: {}", e)))?;
    match value {
        JsonValue::String(inner) => serde_json::from_str(&inner)
            .map_err(|e| BootError::MalformedPayload(format!("embedded document is not JSON: {}", e))),
        other => Ok(other),
    }
}

/// Client for the remote configuration store
#[derive(Debug, Clone)]
pub struct RemoteStoreClient {
    locator: StoreLocator,
    fetcher: JsonFetcher,
}

impl RemoteStoreClient {
    pub fn new(locator: StoreLocator, timeout: Duration) -> Result<Self> {
        Ok(Self {
            locator,
            fetcher: JsonFetcher::new(timeout)?,
        })
    }

    pub fn locator(&self) -> &StoreLocator {
        &self.locator
    }

    /// Fetch a named resource. Transport, status and parse failures are
    /// logged and reported as `None`.
    pub async fn fetch(&self, resource_name: &str) -> Option<JsonValue> {
        let url = self.locator.resource_url(resource_name);
        info!(resource = resource_name, "connecting to remote store");
        match self.fetcher.get_json(&url).await {
            Ok(value) => {
                info!(resource = resource_name, "remote store resource loaded");
                Some(value)
            }
            Err(err) => {
                warn!(resource = resource_name, error = %err, "failed to access remote store");
                None
            }
        }
    }

    /// Fetch the auth resource. A missing or empty password is `None`.
    pub async fn fetch_credential(&self, resource_name: &str) -> Option<CredentialRecord> {
        let value = self.fetch(resource_name).await?;
        decode_non_empty::<CredentialRecord>(value, resource_name)
            .filter(|record| !record.password.is_empty())
    }

    /// Fetch the token-db descriptor. A missing or empty link is `None`.
    pub async fn fetch_token_db(&self, resource_name: &str) -> Option<TokenDbDescriptor> {
        let value = self.fetch(resource_name).await?;
        decode_non_empty::<TokenDbDescriptor>(value, resource_name)
            .filter(|descriptor| !descriptor.database_link.trim().is_empty())
    }
}

fn decode_non_empty<T: serde::de::DeserializeOwned>(value: JsonValue, resource_name: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(resource = resource_name, error = %err, "remote store resource has unexpected shape");
            None
        }
    }
}
