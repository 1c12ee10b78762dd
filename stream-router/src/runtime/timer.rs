//! Periodic timer task driving availability recomputation and notification.

use crate::observability::events;
use crate::router::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, trace};

const COMPONENT: &str = "recompute_timer";

/// Spawns the recompute timer: every `period`, availability is re-evaluated
/// and the state notifier runs. Stops when the shutdown signal flips to
/// `true`.
pub fn spawn_recompute_timer(
    router: Arc<Router>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; that is wanted, it publishes the
        // startup snapshot.
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!(
                            event = events::RECOMPUTE_SHUTDOWN,
                            component = COMPONENT,
                            "shutdown signalled; stopping recompute timer"
                        );
                        break;
                    }
                }
                _ = interval.tick() => {
                    trace!(event = events::RECOMPUTE_TICK, component = COMPONENT, "recompute tick");
                    router.recompute().await;
                }
            }
        }
    })
}
