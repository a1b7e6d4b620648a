//! Remote store module
//!
//! Fetches JSON documents (auth record, token-db descriptor) from a
//! fixed owner/repository/branch location over HTTP.

pub mod client;

pub use client::{parse_json_body, CredentialRecord, JsonFetcher, RemoteStoreClient, StoreLocator, TokenDbDescriptor};
