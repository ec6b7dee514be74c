//! # cf-ddns
//!
//! Keeps a set of Cloudflare `A` records pointed at the host's current public
//! IPv4 address.
//!
//! Every cycle the [`Scheduler`] asks an [`AddressResolver`] for the current
//! address, then the [`Reconciler`] fetches each configured record and writes a
//! full replacement only when its content or proxy flag drifted. Failures are
//! logged and contained to the domain (or cycle) they happened in; the next
//! poll is the retry.
//!
//! ## Usage
//!
//! ```bash
//! # Uses $CF_DDNS_CONFIG, ~/.config/cf-ddns/config.toml,
//! # /etc/cf-ddns/config.toml or ./config.toml
//! cf-ddns
//! ```

pub mod config;
pub mod detector;
pub mod error;
pub mod logging;
pub mod providers;
pub mod reconciler;
pub mod scheduler;

pub use config::{Config, DomainSpec};
pub use detector::{AddressResolver, HttpAddressResolver};
pub use error::{DdnsError, Result};
pub use logging::LogHandle;
pub use providers::{CloudflareClient, RecordClient};
pub use reconciler::Reconciler;
pub use scheduler::Scheduler;
