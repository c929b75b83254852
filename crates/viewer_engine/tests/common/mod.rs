#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use tokio::sync::mpsc;
use viewer_engine::{EngineEvent, EventSink};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(viewer_logging::initialize_for_tests);
}

/// Records every event and also forwards it so tests can await arrivals.
pub struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl TestSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<EngineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(Self {
            events: Mutex::new(Vec::new()),
            tx,
        });
        (sink, rx)
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event.clone());
        let _ = self.tx.send(event);
    }
}

pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> EngineEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("event within timeout")
        .expect("sink still open")
}
