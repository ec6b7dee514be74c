//! DNS provider API access.

mod cloudflare;
#[cfg(test)]
mod tests;

pub use cloudflare::CloudflareClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// A record as the provider currently holds it. Fetched fresh every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub proxied: bool,
}

/// Outcome of looking a record up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(RemoteRecord),
    /// No record with that name, or the provider answered with a body we
    /// could not read.
    NotFound,
}

/// Desired state written by a full-record replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    pub name: String,
    pub content: String,
    pub proxied: bool,
}

/// Thin client over a DNS provider's record API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordClient: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &'static str;

    /// Find the A record called `name` in `zone_id`.
    ///
    /// Transport errors and non-success statuses are `Err`; an absent name
    /// or malformed listing is `Ok(FetchOutcome::NotFound)`.
    async fn fetch_by_name(&self, zone_id: &str, name: &str) -> Result<FetchOutcome>;

    /// Replace record `record_id` in `zone_id` with an A record built from
    /// `record`. `Ok` only on a success status.
    async fn update(&self, zone_id: &str, record_id: &str, record: &RecordUpdate) -> Result<()>;
}
