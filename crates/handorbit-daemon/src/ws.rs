//! WebSocket handler for streaming frames in and camera updates out
//!
//! Clients send detection frames as JSON text messages and receive a
//! `view_update` for every frame processed, from any client.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use handorbit_core::DetectionFrame;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::state::{parse_frame, AppState, ViewUpdate};

/// WebSocket message types
#[derive(Serialize)]
#[serde(tag = "type", content = "data")]
enum WsMessage {
    #[serde(rename = "view_update")]
    ViewUpdate(ViewUpdate),
    #[serde(rename = "pong")]
    Pong,
}

impl WsMessage {
    fn to_text(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(json) => Some(Message::Text(json.into())),
            Err(e) => {
                warn!(error = %e, "Failed to serialize WebSocket message");
                None
            }
        }
    }
}

/// A text message received from a client
#[derive(Debug, PartialEq)]
enum ClientText {
    Ping,
    Frame(DetectionFrame),
}

impl ClientText {
    /// Anything other than a keepalive is read as a detection frame
    fn parse(text: &str) -> Self {
        if text == "ping" {
            Self::Ping
        } else {
            Self::Frame(parse_frame(text))
        }
    }
}

/// WebSocket upgrade handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut updates = state.subscribe();

    info!("WebSocket client connected");

    // Send current view on connect
    if let Some(msg) = WsMessage::ViewUpdate(state.latest().await).to_text() {
        if sender.send(msg).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            // Forward view updates to client
            update = updates.recv() => {
                match update {
                    Ok(update) => {
                        if let Some(msg) = WsMessage::ViewUpdate(update).to_text() {
                            if sender.send(msg).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        debug!(skipped = n, "View update channel lagged");
                    }
                    Err(RecvError::Closed) => {
                        debug!("View update channel closed");
                        break;
                    }
                }
            }

            // Handle incoming messages from client
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        match ClientText::parse(text.as_str()) {
                            ClientText::Ping => {
                                if let Some(pong) = WsMessage::Pong.to_text() {
                                    if sender.send(pong).await.is_err() {
                                        break;
                                    }
                                }
                            }
                            ClientText::Frame(frame) => {
                                if let Err(e) = state.submit_frame(frame).await {
                                    warn!(error = %e, "Dropping frame");
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;
    use handorbit_core::HandLabel;

    #[test]
    fn test_ping_gets_pong() {
        assert_eq!(ClientText::parse("ping"), ClientText::Ping);

        let Some(Message::Text(pong)) = WsMessage::Pong.to_text() else {
            panic!("pong should serialize to a text message");
        };
        assert_eq!(pong.as_str(), r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_frame_text() {
        let frame = DetectionFrame::from_hands([(HandLabel::Left, vec![])]);
        let text = serde_json::to_string(&frame).unwrap();
        assert_eq!(ClientText::parse(&text), ClientText::Frame(frame));
    }

    #[test]
    fn test_malformed_text_is_empty_frame() {
        assert_eq!(
            ClientText::parse("{\"multiHandLandmarks\": "),
            ClientText::Frame(DetectionFrame::empty())
        );
        assert_eq!(
            ClientText::parse("PING"),
            ClientText::Frame(DetectionFrame::empty())
        );
    }
}
