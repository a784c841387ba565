//! Host-side event dispatch.
//!
//! The host delivers two signals: `Ready` once at startup, and
//! `MessageReceived` whenever the wearable asks for fresh weather. Each signal
//! starts exactly one refresh. Nothing is coalesced: overlapping signals run
//! overlapping refreshes.

use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinSet};
use tracing::{debug, error};

use crate::relay::WeatherRelay;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    Ready,
    MessageReceived,
}

/// Dispatch events until every sender is dropped, then wait for the refreshes
/// still in flight. Returns how many refreshes were started.
pub async fn run(relay: Arc<WeatherRelay>, mut events: mpsc::Receiver<HostEvent>) -> usize {
    let mut pipelines = JoinSet::new();
    let mut started = 0;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                debug!(?event, "host event");

                let relay = Arc::clone(&relay);
                pipelines.spawn(async move { relay.refresh_weather().await });
                started += 1;
            }
            Some(joined) = pipelines.join_next(), if !pipelines.is_empty() => {
                if let Err(e) = joined {
                    error!(error = %e, "refresh task failed");
                }
            }
        }
    }

    while let Some(joined) = pipelines.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "refresh task failed");
        }
    }

    started
}
