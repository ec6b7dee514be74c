//! cf-ddns - Cloudflare dynamic DNS updater.
//!
//! Exits 0 after a graceful stop (Ctrl+C / SIGTERM) and nonzero when the
//! configuration is unusable.

use cf_ddns::config::Config;
use cf_ddns::{CloudflareClient, HttpAddressResolver, LogHandle, Reconciler, Scheduler};
use tokio::signal;
use tokio::sync::oneshot;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config_path = Config::discover_path();
    let loaded = Config::load_from(&config_path);

    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_default();
    let log = LogHandle::open(&logging)?;

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", config_path.display(), e);
            log.close()?;
            return Err(e.into());
        }
    };
    tracing::debug!(path = %config_path.display(), ?config, "Loaded configuration");

    let result = run(config).await;
    if let Err(e) = &result {
        tracing::error!("Unexpected error: {:#}", e);
    }

    log.close()?;
    result
}

async fn run(config: Config) -> anyhow::Result<()> {
    let resolver = HttpAddressResolver::new(&config.ip_service, config.request_timeout())?;
    let client = CloudflareClient::with_base_url(
        &config.api_token,
        &config.api_base_url,
        config.request_timeout(),
    )?;

    let scheduler = Scheduler::new(
        resolver,
        Reconciler::new(client, &config.zone_id),
        config.domains.clone(),
        config.check_interval(),
    )?;

    let (stop_tx, stop_rx) = oneshot::channel();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(());
    });

    scheduler
        .run(async move {
            let _ = stop_rx.await;
        })
        .await;

    Ok(())
}

/// Completes on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
