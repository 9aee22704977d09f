// ── Poll coordinator ──
//
// One scheduled refresh loop per device: IDLE → FETCHING → (IDLE | FAILED).
// A failed cycle leaves the cache untouched (stale data stays visible) and
// the next interval retries. Coordinators are fully isolated -- one
// device's failures never block another's loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use govly_api::ApiClient;

use crate::cache::StateCache;
use crate::events::HubEvent;
use crate::model::Capability;

/// Observable refresh state of one device's coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Waiting for the next interval.
    Idle,
    /// A state request is in flight.
    Fetching,
    /// The last cycle failed; cached state is stale but intact.
    Failed { error: String },
}

/// Handle to one device's refresh loop.
pub(crate) struct PollCoordinator {
    pub state_rx: watch::Receiver<PollState>,
    pub handle: JoinHandle<()>,
}

/// Spawn the refresh loop for one device.
///
/// The caller has already fetched the initial baseline synchronously, so
/// the first tick fires one full interval after spawn. Teardown cancels
/// the token; an in-flight request is left to finish or hit its own
/// per-request timeout.
pub(crate) fn spawn(
    client: Arc<ApiClient>,
    cache: Arc<StateCache>,
    event_tx: broadcast::Sender<HubEvent>,
    device: String,
    sku: String,
    interval: Duration,
    cancel: CancellationToken,
) -> PollCoordinator {
    let (state_tx, state_rx) = watch::channel(PollState::Idle);

    let handle = tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(device = %device, "poll coordinator stopped");
                    break;
                }
                _ = ticker.tick() => {
                    run_cycle(&client, &cache, &event_tx, &device, &sku, &state_tx).await;
                }
            }
        }
    });

    PollCoordinator { state_rx, handle }
}

async fn run_cycle(
    client: &ApiClient,
    cache: &StateCache,
    event_tx: &broadcast::Sender<HubEvent>,
    device: &str,
    sku: &str,
    state_tx: &watch::Sender<PollState>,
) {
    let _ = state_tx.send(PollState::Fetching);
    debug!(device, "poll cycle: fetching device state");

    match client.device_state(sku, device).await {
        Ok(payload) => {
            let capabilities: Vec<Capability> =
                payload.capabilities.into_iter().map(Capability::from).collect();
            cache.replace(device, capabilities).await;
            let _ = state_tx.send(PollState::Idle);
            let _ = event_tx.send(HubEvent::StateUpdated {
                device: device.to_owned(),
            });
        }
        Err(e) if e.is_auth() || e.is_rate_limited() => {
            // Terminal-looking from the vendor's side, but in steady state
            // it only costs this cycle: the cache keeps its last snapshot
            // and the next interval tries again.
            error!(device, error = %e, "poll cycle rejected by the cloud");
            let _ = state_tx.send(PollState::Failed { error: e.to_string() });
            let _ = event_tx.send(HubEvent::PollFailed {
                device: device.to_owned(),
                error: e.to_string(),
            });
        }
        Err(e) => {
            warn!(device, error = %e, "poll cycle failed");
            let _ = state_tx.send(PollState::Failed { error: e.to_string() });
            let _ = event_tx.send(HubEvent::PollFailed {
                device: device.to_owned(),
                error: e.to_string(),
            });
        }
    }
}
