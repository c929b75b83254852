use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use url::Url;
use viewer_logging::{viewer_debug, viewer_info};

use crate::{EngineEvent, EventSink, StatusSource};

/// Fetches the status endpoint immediately and then once per interval until
/// stopped.
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    url: Url,
    interval: Duration,
}

/// Cancels a running [`StatusPoller`]. Cloning shares the same poller.
#[derive(Debug, Clone)]
pub struct PollerHandle {
    token: CancellationToken,
}

impl PollerHandle {
    /// Stops the timer and drops in-flight responses. Calling it again is a
    /// no-op.
    pub fn stop(&self) {
        if self.token.is_cancelled() {
            return;
        }
        viewer_info!("Stopping status polling");
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl StatusPoller {
    pub fn new(source: Arc<dyn StatusSource>, url: Url, interval: Duration) -> Self {
        Self {
            source,
            url,
            interval,
        }
    }

    /// Starts polling on the current tokio runtime.
    pub fn spawn(self, sink: Arc<dyn EventSink>) -> PollerHandle {
        let token = CancellationToken::new();
        tokio::spawn(self.run(sink, token.clone()));
        PollerHandle { token }
    }

    async fn run(self, sink: Arc<dyn EventSink>, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut seq = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            seq += 1;
            viewer_debug!("Polling status #{} from {}", seq, self.url);

            // Each tick fetches independently so a slow response never holds
            // back the timer; the core drops out-of-order results by `seq`.
            let source = self.source.clone();
            let url = self.url.clone();
            let sink = sink.clone();
            let token = token.clone();
            tokio::spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    result = source.fetch_status(&url) => result,
                };
                if token.is_cancelled() {
                    return;
                }
                sink.emit(EngineEvent::Status { seq, result });
            });
        }
        viewer_debug!("Status poller exited after {} ticks", seq);
    }
}
