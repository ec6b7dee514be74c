//! Public IP detection.

use crate::error::{DdnsError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Source of the caller's current public IPv4 address.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve the current address. Single attempt, no internal retry.
    async fn resolve(&self) -> Result<Ipv4Addr>;
}

#[derive(Debug, Deserialize)]
struct EchoResponse {
    ip: String,
}

/// Resolver backed by a JSON address-echo service such as ipify.
pub struct HttpAddressResolver {
    client: reqwest::Client,
    service: String,
}

impl HttpAddressResolver {
    /// Create a resolver for `service`, e.g. `https://api.ipify.org?format=json`.
    pub fn new(service: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            service: service.into(),
        })
    }
}

#[async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        let response = self.client.get(&self.service).send().await?;

        if !response.status().is_success() {
            return Err(DdnsError::IpDetection(format!(
                "HTTP {} from {}",
                response.status(),
                self.service
            )));
        }

        let body = response.text().await?;
        let echo: EchoResponse = serde_json::from_str(&body).map_err(|e| {
            DdnsError::IpDetection(format!("Unparsable response from {}: {}", self.service, e))
        })?;

        let ip = echo.ip.trim();
        let address = ip
            .parse()
            .map_err(|_| DdnsError::IpDetection(format!("Invalid IPv4 address: {}", ip)))?;

        tracing::debug!("Detected IPv4 {} from {}", address, self.service);
        Ok(address)
    }
}
