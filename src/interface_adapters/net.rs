// WebSocket transport adapter: dials the sync endpoint, forwards parsed
// server messages into the sync loop, and drains outbound inputs.
//
// Reconnection/backoff policy belongs to the host; when this task ends the
// session is over until the host starts a new one.

use crate::domain::PlayerInput;
use crate::interface_adapters::protocol::{ClientMessage, PlayerInputDto, ServerMessage};
use crate::use_cases::types::SyncEvent;

use futures::SinkExt;
use futures_util::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    Connect(tungstenite::Error),
    Ws(tungstenite::Error),
    Serialization(serde_json::Error),
    // The sync loop dropped its event receiver.
    EventsClosed,
}

impl From<tungstenite::Error> for NetError {
    fn from(e: tungstenite::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Run one connection lifecycle: dial, pump messages both ways, report the
/// close back into the sync loop.
pub async fn run_connection(
    endpoint: String,
    event_tx: mpsc::Sender<SyncEvent>,
    outbound_rx: mpsc::Receiver<PlayerInput>,
) {
    match connection_lifecycle(&endpoint, &event_tx, outbound_rx).await {
        Ok(()) => {}
        Err(NetError::EventsClosed) => {
            // No receiver left to notify; just exit.
            debug!("sync loop gone; transport exiting");
            return;
        }
        Err(e) => warn!(error = ?e, "transport error"),
    }
    let _ = event_tx.send(SyncEvent::Closed).await;
}

async fn connection_lifecycle(
    endpoint: &str,
    event_tx: &mpsc::Sender<SyncEvent>,
    mut outbound_rx: mpsc::Receiver<PlayerInput>,
) -> Result<(), NetError> {
    info!(endpoint, "connecting");
    let (socket, _response) = connect_async(endpoint).await.map_err(NetError::Connect)?;
    let (mut sink, mut stream) = socket.split();

    event_tx
        .send(SyncEvent::Opened)
        .await
        .map_err(|_| NetError::EventsClosed)?;

    let mut msgs_in: u64 = 0;
    let mut msgs_out: u64 = 0;
    let mut bytes_in: u64 = 0;
    let mut bytes_out: u64 = 0;
    let mut last_invalid_log = Instant::now() - LOG_THROTTLE;

    let result = loop {
        tokio::select! {
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        msgs_in += 1;
                        bytes_in += text.len() as u64;
                        match serde_json::from_str::<ServerMessage>(&text) {
                            Ok(message) => {
                                if event_tx.send(server_message_event(message)).await.is_err() {
                                    break Err(NetError::EventsClosed);
                                }
                            }
                            Err(e) => {
                                // Malformed frames are dropped, never fatal.
                                if should_log(&mut last_invalid_log) {
                                    warn!(
                                        bytes = text.len(),
                                        error = %e,
                                        "failed to parse server message"
                                    );
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        if should_log(&mut last_invalid_log) {
                            warn!("binary frames not supported; dropping");
                        }
                    }
                    // tungstenite answers pings internally.
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) => {
                        info!("server closed the connection");
                        break Ok(());
                    }
                    Some(Ok(Message::Frame(_))) => {}
                    Some(Err(e)) => break Err(NetError::Ws(e)),
                    None => {
                        info!("connection ended");
                        break Ok(());
                    }
                }
            }
            outgoing = outbound_rx.recv() => {
                match outgoing {
                    Some(input) => {
                        // TODO: coalesce queued inputs into one frame if send
                        // backpressure ever shows up in the stats.
                        let message = ClientMessage::PlayerInput {
                            input: PlayerInputDto::from(input),
                        };
                        let text = serde_json::to_string(&message)
                            .map_err(NetError::Serialization)?;
                        msgs_out += 1;
                        bytes_out += text.len() as u64;
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            break Err(NetError::Ws(e));
                        }
                    }
                    None => {
                        // Session owner dropped the sender; close politely.
                        let _ = sink.send(Message::Close(None)).await;
                        break Ok(());
                    }
                }
            }
        }
    };

    debug!(msgs_in, msgs_out, bytes_in, bytes_out, "connection stats");
    result
}

fn server_message_event(message: ServerMessage) -> SyncEvent {
    match message {
        ServerMessage::StateUpdate { state } => SyncEvent::Snapshot(state.into()),
        ServerMessage::Reconciliation { entity } => SyncEvent::Correction(entity.into()),
        ServerMessage::InputAck { sequence } => SyncEvent::InputAck { sequence },
    }
}
