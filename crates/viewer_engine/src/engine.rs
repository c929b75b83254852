use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use viewer_core::ClientCommand;
use viewer_logging::{viewer_debug, viewer_error, viewer_warn};

use crate::http::{FinishRequester, StatusSource};
use crate::{
    ChannelEventSink, ClientSettings, EngineEvent, EventSink, EventStreamClient, PollerHandle,
    ReqwestSessionClient, SessionEndpoints, StatusPoller, StreamHandle,
};

const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

enum EngineCommand {
    StartPolling,
    StopPolling,
    ConnectStream,
    SendStream(ClientCommand),
    RequestFinish,
    Shutdown,
}

/// Runs all session IO on a background tokio runtime. Results come back as
/// [`EngineEvent`]s on a single channel, so whoever owns the view state is
/// its only writer.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

struct EngineWorker {
    endpoints: SessionEndpoints,
    client: Arc<ReqwestSessionClient>,
    sink: Arc<dyn EventSink>,
    poller: Option<PollerHandle>,
    stream: Option<StreamHandle>,
}

impl EngineHandle {
    pub fn new(endpoints: SessionEndpoints, settings: ClientSettings) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let client = ReqwestSessionClient::new(settings, endpoints.cookies.clone())
            .map_err(std::io::Error::other)?;

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let mut worker = EngineWorker {
            endpoints,
            client: Arc::new(client),
            sink: Arc::new(ChannelEventSink::new(event_tx)),
            poller: None,
            stream: None,
        };

        thread::Builder::new()
            .name("viewer-engine".to_string())
            .spawn(move || {
                {
                    let _guard = runtime.enter();
                    while let Ok(command) = cmd_rx.recv() {
                        if !worker.handle(command) {
                            break;
                        }
                    }
                }
                if let Some(stream) = worker.shutdown() {
                    runtime.block_on(async {
                        let _ = tokio::time::timeout(SHUTDOWN_GRACE, stream.closed()).await;
                    });
                }
                runtime.shutdown_timeout(SHUTDOWN_GRACE);
            })?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn start_polling(&self) {
        self.send(EngineCommand::StartPolling);
    }

    pub fn stop_polling(&self) {
        self.send(EngineCommand::StopPolling);
    }

    pub fn connect_stream(&self) {
        self.send(EngineCommand::ConnectStream);
    }

    pub fn send_stream_command(&self, command: ClientCommand) {
        self.send(EngineCommand::SendStream(command));
    }

    pub fn request_finish(&self) {
        self.send(EngineCommand::RequestFinish);
    }

    /// Stops the poller and closes the stream. Safe to call repeatedly.
    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.send(EngineCommand::Shutdown);
    }
}

impl EngineWorker {
    /// Returns `false` once the worker should exit.
    fn handle(&mut self, command: EngineCommand) -> bool {
        match command {
            EngineCommand::StartPolling => {
                if self.poller.is_some() {
                    viewer_warn!("Polling already started; ignoring");
                    return true;
                }
                let source: Arc<dyn StatusSource> = self.client.clone();
                let poller = StatusPoller::new(
                    source,
                    self.endpoints.status_url.clone(),
                    self.endpoints.poll_interval,
                );
                self.poller = Some(poller.spawn(self.sink.clone()));
            }
            EngineCommand::StopPolling => {
                if let Some(poller) = &self.poller {
                    poller.stop();
                }
            }
            EngineCommand::ConnectStream => {
                if self.stream.is_some() {
                    viewer_warn!("Event stream already connected; ignoring");
                    return true;
                }
                let client = EventStreamClient::new(self.endpoints.stream_url.clone());
                self.stream = Some(client.spawn(self.sink.clone()));
            }
            EngineCommand::SendStream(command) => {
                let sent = self
                    .stream
                    .as_ref()
                    .is_some_and(|stream| stream.send(command));
                if !sent {
                    viewer_error!("Event stream not open; dropping {:?}", command);
                }
            }
            EngineCommand::RequestFinish => {
                let client = self.client.clone();
                let sink = self.sink.clone();
                let url = self.endpoints.finish_url.clone();
                let csrf_token = self.endpoints.csrf_token.clone();
                tokio::spawn(async move {
                    viewer_debug!("Posting finish request to {}", url);
                    let result = client.request_finish(&url, csrf_token.as_deref()).await;
                    sink.emit(EngineEvent::Finish(result));
                });
            }
            EngineCommand::Shutdown => return false,
        }
        true
    }

    /// Stops everything; returns the stream so the caller can wait for its
    /// close frame to go out.
    fn shutdown(&mut self) -> Option<StreamHandle> {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        let stream = self.stream.take()?;
        stream.close();
        Some(stream)
    }
}
