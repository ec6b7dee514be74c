//! Cloudflare API v4 record client.

use super::{FetchOutcome, RecordClient, RecordUpdate, RemoteRecord};
use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const PROVIDER: &str = "cloudflare";
const RECORD_TYPE: &str = "A";

/// Largest page the listing endpoint serves.
const MAX_PER_PAGE: &str = "5000000";

/// TTL of 1 means "automatic" to Cloudflare.
const AUTO_TTL: u32 = 1;

/// Cloudflare DNS record client.
pub struct CloudflareClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    result: Option<Vec<RemoteRecord>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<CloudflareError>,
}

#[derive(Debug, Deserialize)]
struct CloudflareError {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: &'a str,
    ttl: u32,
    proxied: bool,
}

impl fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a client for the API rooted at `base_url`
    /// (e.g. `https://api.cloudflare.com/client/v4`).
    pub fn with_base_url(
        api_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            api_token: api_token.into(),
            base_url,
        })
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.base_url, zone_id)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_token)
    }
}

/// Render the `errors` array of a Cloudflare error body, if there is one.
fn describe_errors(body: &str) -> String {
    let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) else {
        return String::new();
    };

    let messages: Vec<String> = parsed
        .errors
        .iter()
        .map(|e| match e.code {
            Some(code) => format!("{} ({})", e.message, code),
            None => e.message.clone(),
        })
        .collect();

    if messages.is_empty() {
        String::new()
    } else {
        format!(": {}", messages.join("; "))
    }
}

#[async_trait]
impl RecordClient for CloudflareClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_by_name(&self, zone_id: &str, name: &str) -> Result<FetchOutcome> {
        let response = self
            .client
            .get(self.records_url(zone_id))
            .query(&[("type", RECORD_TYPE), ("name", name), ("per_page", MAX_PER_PAGE)])
            .header("Authorization", self.bearer())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DdnsError::provider(
                PROVIDER,
                format!("listing records failed with HTTP {}{}", status, describe_errors(&body)),
            ));
        }

        let listing: ListResponse = match serde_json::from_str(&body) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!(record = name, "Malformed record listing: {}", e);
                return Ok(FetchOutcome::NotFound);
            }
        };

        let found = listing
            .result
            .unwrap_or_default()
            .into_iter()
            .find(|record| record.name == name && record.record_type == RECORD_TYPE);

        match found {
            Some(record) => {
                tracing::debug!(
                    record = name,
                    id = %record.id,
                    content = %record.content,
                    proxied = record.proxied,
                    "Fetched record"
                );
                Ok(FetchOutcome::Found(record))
            }
            None => Ok(FetchOutcome::NotFound),
        }
    }

    async fn update(&self, zone_id: &str, record_id: &str, record: &RecordUpdate) -> Result<()> {
        let url = format!("{}/{}", self.records_url(zone_id), record_id);

        let request = UpdateRequest {
            record_type: RECORD_TYPE,
            name: &record.name,
            content: &record.content,
            ttl: AUTO_TTL,
            proxied: record.proxied,
        };

        let response = self
            .client
            .put(&url)
            .header("Authorization", self.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(record = %record.name, "Update request failed: {}", e);
                DdnsError::from(e)
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(
                record = %record.name,
                "Updated {} with proxy status: {}",
                record.name,
                if record.proxied { "enabled" } else { "disabled" }
            );
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let detail = describe_errors(&body);
        tracing::error!(
            record = %record.name,
            status = status.as_u16(),
            "Update failed for {}. Status code: {}{}",
            record.name,
            status.as_u16(),
            detail
        );

        Err(DdnsError::provider(
            PROVIDER,
            format!("update of {} failed with HTTP {}{}", record.name, status, detail),
        ))
    }
}
