use crate::error::EngineError;
use crate::signaling::SignalingTransport;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parley_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{info, warn};

/// WebSocket signaling channel to the relay. The receiver returned by
/// `connect` is the inbound subscription handle.
pub struct WsSignaling {
    tx: mpsc::UnboundedSender<Message>,
    read_task: JoinHandle<()>,
}

impl WsSignaling {
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerMessage>), EngineError> {
        let (socket, _) = connect_async(url)
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        info!(url, "signaling connected");

        let (mut write, mut read) = socket.split();
        let (tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerMessage>();

        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if write.send(msg).await.is_err() || closing {
                    break;
                }
            }
        });

        let read_task = tokio::spawn(async move {
            while let Some(Ok(msg)) = read.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                        Ok(frame) => {
                            if in_tx.send(frame).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("invalid server frame: {e}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        Ok((Self { tx, read_task }, in_rx))
    }

    /// Hang up cleanly: a close frame is flushed through the write pump
    /// so the relay sees a deliberate departure, then the pump exits on
    /// its own. Queued frames ahead of it still go out.
    pub fn close(&self) {
        let _ = self.tx.send(Message::Close(None));
        self.read_task.abort();
    }
}

#[async_trait]
impl SignalingTransport for WsSignaling {
    async fn send(&self, msg: ClientMessage) -> Result<(), EngineError> {
        let json =
            serde_json::to_string(&msg).map_err(|e| EngineError::Transport(e.to_string()))?;
        self.tx
            .send(Message::Text(json))
            .map_err(|_| EngineError::SignalingClosed)
    }
}
