use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;
use viewer_core::ClientCommand;
use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

use crate::{EngineEvent, EventSink, StreamEvent};

/// Owns one event-stream connection for its whole lifetime. There is no
/// reconnection: once closed, the stream stays closed.
pub struct EventStreamClient {
    url: Url,
}

/// Sends commands on, and closes, a running [`EventStreamClient`].
#[derive(Debug, Clone)]
pub struct StreamHandle {
    cmd_tx: mpsc::UnboundedSender<ClientCommand>,
    token: CancellationToken,
    done: CancellationToken,
}

impl StreamHandle {
    /// Queues a command frame. Returns `false` if the connection is gone.
    pub fn send(&self, command: ClientCommand) -> bool {
        self.cmd_tx.send(command).is_ok()
    }

    /// Closes the channel from the client side. Idempotent.
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.cmd_tx.is_closed()
    }

    /// Resolves once the connection task has finished.
    pub async fn closed(&self) {
        self.done.cancelled().await;
    }
}

impl EventStreamClient {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    /// Connects on the current tokio runtime and reports lifecycle and frames
    /// to `sink` as [`EngineEvent::Stream`].
    pub fn spawn(self, sink: Arc<dyn EventSink>) -> StreamHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let done = CancellationToken::new();
        let task = self.run(sink, cmd_rx, token.clone());
        let finished = done.clone();
        tokio::spawn(async move {
            task.await;
            finished.cancel();
        });
        StreamHandle {
            cmd_tx,
            token,
            done,
        }
    }

    async fn run(
        self,
        sink: Arc<dyn EventSink>,
        mut cmd_rx: mpsc::UnboundedReceiver<ClientCommand>,
        token: CancellationToken,
    ) {
        let emit = |event: StreamEvent| sink.emit(EngineEvent::Stream(event));

        viewer_info!("Connecting event stream {}", self.url);
        let connect = tokio::select! {
            _ = token.cancelled() => return,
            connect = tokio_tungstenite::connect_async(self.url.as_str()) => connect,
        };
        let (ws, _response) = match connect {
            Ok(value) => value,
            Err(err) => {
                viewer_warn!("Event stream connect failed: {}", err);
                emit(StreamEvent::Failed(err.to_string()));
                return;
            }
        };
        let (mut write, mut read) = ws.split();
        emit(StreamEvent::Opened);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    let frame = CloseFrame {
                        code: CloseCode::Normal,
                        reason: "".into(),
                    };
                    let _ = write.send(Message::Close(Some(frame))).await;
                    emit(StreamEvent::Closed {
                        code: Some(u16::from(CloseCode::Normal)),
                    });
                    break;
                }
                Some(command) = cmd_rx.recv() => {
                    let text = match serde_json::to_string(&command) {
                        Ok(text) => text,
                        Err(err) => {
                            viewer_warn!("Could not encode {:?}: {}", command, err);
                            continue;
                        }
                    };
                    viewer_debug!("Event stream send {}", text);
                    if let Err(err) = write.send(Message::Text(text)).await {
                        emit(StreamEvent::Failed(err.to_string()));
                        break;
                    }
                }
                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => emit(StreamEvent::Frame(text)),
                    Some(Ok(Message::Close(frame))) => {
                        let code = frame.map(|frame| u16::from(frame.code));
                        emit(StreamEvent::Closed { code });
                        break;
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        viewer_debug!("Ignoring binary frame of {} bytes", bytes.len());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        viewer_warn!("Event stream error: {}", err);
                        emit(StreamEvent::Failed(err.to_string()));
                        break;
                    }
                    None => {
                        emit(StreamEvent::Closed { code: None });
                        break;
                    }
                },
            }
        }
        token.cancel();
        cmd_rx.close();
    }
}
