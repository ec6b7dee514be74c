//! Fixed-interval polling loop.

use crate::config::DomainSpec;
use crate::detector::AddressResolver;
use crate::error::{DdnsError, Result};
use crate::providers::RecordClient;
use crate::reconciler::{CycleReport, Reconciler};
use async_trait::async_trait;
use std::future::Future;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Suspends the loop between cycles.
#[async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production timer backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Result of one polling cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Current address unknown; no domain was touched.
    AddressUnavailable,
    Reconciled { address: Ipv4Addr, report: CycleReport },
}

/// Runs a [`Reconciler`] over all configured domains every `interval`.
pub struct Scheduler<R, C, T = TokioTimer> {
    resolver: R,
    reconciler: Reconciler<C>,
    domains: Vec<DomainSpec>,
    interval: Duration,
    timer: T,
}

impl<R, C> Scheduler<R, C, TokioTimer>
where
    R: AddressResolver,
    C: RecordClient,
{
    pub fn new(
        resolver: R,
        reconciler: Reconciler<C>,
        domains: Vec<DomainSpec>,
        interval: Duration,
    ) -> Result<Self> {
        Self::with_timer(resolver, reconciler, domains, interval, TokioTimer)
    }
}

impl<R, C, T> Scheduler<R, C, T>
where
    R: AddressResolver,
    C: RecordClient,
    T: Timer,
{
    /// Create a scheduler with a custom timer.
    ///
    /// Fails when there is nothing to manage or the interval is zero.
    pub fn with_timer(
        resolver: R,
        reconciler: Reconciler<C>,
        domains: Vec<DomainSpec>,
        interval: Duration,
        timer: T,
    ) -> Result<Self> {
        if domains.is_empty() {
            return Err(DdnsError::Config("no domains configured".to_string()));
        }
        if interval.is_zero() {
            return Err(DdnsError::Config("check interval must be positive".to_string()));
        }

        Ok(Self {
            resolver,
            reconciler,
            domains,
            interval,
            timer,
        })
    }

    /// Resolve the current address once, then reconcile every domain in order.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let address = match self.resolver.resolve().await {
            Ok(address) => address,
            Err(e) => {
                error!("Failed to get current IP address: {}", e);
                return CycleOutcome::AddressUnavailable;
            }
        };

        let report = self.reconciler.reconcile_all(&self.domains, address).await;
        info!(
            address = %address,
            updated = report.updated,
            up_to_date = report.up_to_date,
            skipped = report.skipped,
            failed = report.failed,
            "Cycle complete"
        );

        CycleOutcome::Reconciled { address, report }
    }

    /// Poll until `shutdown` completes. Shutdown is observed between cycles.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            zone = self.reconciler.zone_id(),
            "Starting DNS monitor for {} domains",
            self.domains.len()
        );

        loop {
            self.run_cycle().await;

            debug!("Sleeping for {} seconds", self.interval.as_secs());
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Stopped by user");
                    break;
                }
                () = self.timer.sleep(self.interval) => {}
            }
        }
    }
}
