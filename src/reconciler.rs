//! Per-cycle record reconciliation.
//!
//! For each configured domain: fetch the live record, compare it with the
//! current address and the desired proxy flag, and write a full replacement
//! only when something drifted.

use crate::config::DomainSpec;
use crate::providers::{FetchOutcome, RecordClient, RecordUpdate};
use std::net::Ipv4Addr;
use tracing::{debug, error, info};

/// What happened to one domain during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainOutcome {
    /// Record missing or unreadable; nothing written.
    Skipped,
    /// Content and proxy flag already match.
    UpToDate,
    Updated,
    UpdateFailed,
}

/// Tally of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub updated: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CycleReport {
    fn record(&mut self, outcome: &DomainOutcome) {
        match outcome {
            DomainOutcome::Skipped => self.skipped += 1,
            DomainOutcome::UpToDate => self.up_to_date += 1,
            DomainOutcome::Updated => self.updated += 1,
            DomainOutcome::UpdateFailed => self.failed += 1,
        }
    }
}

/// Brings a zone's records in line with the current address.
pub struct Reconciler<C> {
    client: C,
    zone_id: String,
}

impl<C: RecordClient> Reconciler<C> {
    pub fn new(client: C, zone_id: impl Into<String>) -> Self {
        Self {
            client,
            zone_id: zone_id.into(),
        }
    }

    pub fn zone_id(&self) -> &str {
        &self.zone_id
    }

    /// Reconcile every domain in order. A failing domain never stops the pass.
    pub async fn reconcile_all(&self, domains: &[DomainSpec], address: Ipv4Addr) -> CycleReport {
        let mut report = CycleReport::default();
        for domain in domains {
            let outcome = self.reconcile_domain(domain, address).await;
            report.record(&outcome);
        }
        report
    }

    /// Reconcile a single domain: skip, update, or leave alone.
    pub async fn reconcile_domain(
        &self,
        domain: &DomainSpec,
        address: Ipv4Addr,
    ) -> DomainOutcome {
        let name = domain.record_name.as_str();

        let remote = match self.client.fetch_by_name(&self.zone_id, name).await {
            Ok(FetchOutcome::Found(record)) => record,
            Ok(FetchOutcome::NotFound) => {
                error!(
                    record = name,
                    "Could not fetch DNS information for {}: record not found", name
                );
                return DomainOutcome::Skipped;
            }
            Err(e) => {
                error!(record = name, "Could not fetch DNS information for {}: {}", name, e);
                return DomainOutcome::Skipped;
            }
        };

        let current = address.to_string();
        let content_drift = remote.content != current;
        let proxy_drift = remote.proxied != domain.proxied;

        if !content_drift && !proxy_drift {
            debug!(record = name, "No updates needed for {}", name);
            return DomainOutcome::UpToDate;
        }

        info!(record = name, "Update needed for {}", name);
        if content_drift {
            info!(
                record = name,
                "- IP mismatch. Current: {}, {}: {}",
                current,
                self.client.name(),
                remote.content
            );
        }
        if proxy_drift {
            info!(
                record = name,
                "- Proxy status change. Current: {}, Desired: {}", remote.proxied, domain.proxied
            );
        }

        let update = RecordUpdate {
            name: remote.name,
            content: current,
            proxied: domain.proxied,
        };

        match self.client.update(&self.zone_id, &remote.id, &update).await {
            Ok(()) => {
                info!(record = name, "Successfully updated DNS record for {}", name);
                DomainOutcome::Updated
            }
            Err(e) => {
                error!(record = name, "Failed to update DNS record for {}: {}", name, e);
                DomainOutcome::UpdateFailed
            }
        }
    }
}
