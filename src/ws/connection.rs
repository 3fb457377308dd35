//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! applying follow/unfollow commands and forwarding filtered board events.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::thread_filter::{ThreadFilter, ThreadSelection};
use crate::domain::BoardEvent;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads subscription commands from the client and answers them.
/// - Forwards events of subscribed threads from the [`broadcast::Receiver`].
pub async fn run_connection(socket: WebSocket, mut event_rx: broadcast::Receiver<BoardEvent>) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut filter = ThreadFilter::default();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut filter);
                        if let Ok(json) = serde_json::to_string(&response)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(board_event) => {
                        if !filter.admits(board_event.thread_id()) {
                            continue;
                        }
                        let Some(json) = event_message(&board_event) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Wraps a board event in an `event` envelope.
fn event_message(event: &BoardEvent) -> Option<String> {
    let payload = match serde_json::to_value(event) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize board event");
            return None;
        }
    };
    let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
    serde_json::to_string(&msg).ok()
}

/// Handles a text frame from the client and returns the reply.
///
/// Both commands answer with the ids they parsed and the resulting
/// `following` set (`"*"` when following every thread).
fn handle_text_message(text: &str, filter: &mut ThreadFilter) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error("", 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    let payload = match command {
        WsCommand::Subscribe { thread_ids } => {
            let selection = ThreadSelection::parse(&thread_ids);
            filter.follow(&selection);
            serde_json::json!({
                "subscribed": selection.ids,
                "following": filter.to_json(),
            })
        }
        WsCommand::Unsubscribe { thread_ids } => {
            let selection = ThreadSelection::parse(&thread_ids);
            filter.unfollow(&selection);
            serde_json::json!({
                "unsubscribed": selection.ids,
                "following": filter.to_json(),
            })
        }
    };
    WsMessage::new(msg.id, WsMessageType::Response, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ThreadId;

    fn command(payload: &str) -> String {
        format!(r#"{{"id":"req-1","type":"command","payload":{payload}}}"#)
    }

    #[test]
    fn subscribe_then_unsubscribe() {
        let mut filter = ThreadFilter::default();

        let reply = handle_text_message(
            &command(r#"{"command":"subscribe","thread_ids":["5","x","4"]}"#),
            &mut filter,
        );
        assert_eq!(reply.msg_type, WsMessageType::Response);
        assert_eq!(reply.id, "req-1");
        assert_eq!(reply.payload["subscribed"], serde_json::json!([5, 4]));
        assert_eq!(reply.payload["following"], serde_json::json!([4, 5]));

        let reply = handle_text_message(
            &command(r#"{"command":"unsubscribe","thread_ids":["4"]}"#),
            &mut filter,
        );
        assert!(!filter.admits(ThreadId::from(4)));
        assert!(filter.admits(ThreadId::from(5)));
        assert_eq!(reply.payload["following"], serde_json::json!([5]));
    }

    #[test]
    fn star_follows_every_thread() {
        let mut filter = ThreadFilter::default();
        let reply = handle_text_message(
            &command(r#"{"command":"subscribe","thread_ids":["*"]}"#),
            &mut filter,
        );
        assert_eq!(filter, ThreadFilter::Everything);
        assert_eq!(reply.payload["following"], serde_json::json!("*"));
    }

    #[test]
    fn malformed_and_unknown_get_errors() {
        let mut filter = ThreadFilter::default();

        let reply = handle_text_message("{not json", &mut filter);
        assert_eq!(reply.msg_type, WsMessageType::Error);

        let reply = handle_text_message(&command(r#"{"command":"dance"}"#), &mut filter);
        assert_eq!(reply.msg_type, WsMessageType::Error);
        assert_eq!(reply.id, "req-1");
        assert_eq!(filter, ThreadFilter::default());
    }
}
