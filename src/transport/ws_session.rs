use crate::error::GameError;
use crate::game::registry::RoomRegistry;
use crate::protocol::{encode_server_event, ServerEvent};
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn handle_socket(
    socket: WebSocket,
    registry: Arc<RoomRegistry>,
    room_id: Result<String, GameError>,
) {
    let (mut sender, mut receiver) = socket.split();

    let room_id = match room_id {
        Ok(room_id) => room_id,
        Err(error) => {
            reject(&mut sender, &error).await;
            return;
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let (room, joined) = match registry.join(&room_id, tx).await {
        Ok(seated) => seated,
        Err(error) => {
            tracing::info!(room_id = %room_id, %error, "connection refused");
            reject(&mut sender, &error).await;
            return;
        }
    };

    tracing::debug!(
        room_id = %room_id,
        player_id = %joined.player_id,
        color = %joined.color,
        slot = joined.slot,
        "session seated"
    );

    let send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        let Ok(message) = result else { break };
        match message {
            Message::Text(text) => {
                room.handle_text_message(joined.connection_id, &text).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    registry.leave(&room, joined.connection_id).await;
    send_task.abort();
}

async fn reject(sender: &mut SplitSink<WebSocket, Message>, error: &GameError) {
    if let Ok(payload) = encode_server_event(&ServerEvent::error(error)) {
        let _ = sender.send(Message::Text(payload)).await;
    }
    let _ = sender.send(Message::Close(None)).await;
    let _ = sender.close().await;
}
