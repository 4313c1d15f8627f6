use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use labkom_core::today_utc;

use crate::service::LabService;

/// Configuration for the expiry sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to scan for ACTIVE requests past expiration (seconds).
    pub sweep_interval: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: 3600,
        }
    }
}

/// Start the background expiry sweep.
///
/// The sweep only counts and reports: ACTIVE requests past their
/// expiration date surface as EXPIRED in every read and in the
/// dashboard's toRevoke counter, and the actual revocation stays a
/// deliberate admin action. Nothing here mutates state.
///
/// Returns a CancellationToken that stops the sweep when cancelled.
pub fn start(service: Arc<LabService>, config: SweepConfig) -> CancellationToken {
    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        let interval = Duration::from_secs(config.sweep_interval);

        tokio::spawn(async move {
            info!("expiry sweep started (interval={interval:?})");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("expiry sweep stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        debug!("expiry sweep scan");
                        match service.store.count_expired_active(today_utc()) {
                            Ok(0) => {}
                            Ok(n) => info!("expiry sweep: {n} active requests past expiration"),
                            Err(e) => error!("expiry sweep error: {e}"),
                        }
                    }
                }
            }
        });
    }

    cancel
}
