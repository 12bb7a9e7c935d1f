//! Live notification channel. One WebSocket endpoint; the bearer token
//! arrives as a query parameter and is validated before the socket is used.
//! The server pushes JSON notification payloads; the only client-to-server
//! message with meaning is a liveness "ping".

use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::auth::decode_token;
use crate::state::AppState;

/// Close code for a missing, malformed, or expired token.
const UNAUTHENTICATED_CLOSE: u16 = 4001;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

/// GET /api/notifications/ws?token=...
pub async fn handle_ws(
    State(state): State<AppState>,
    Query(params): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let claims = decode_token(&state.config.jwt_secret, &params.token);

    ws.on_upgrade(move |socket| async move {
        match claims {
            Some(claims) => serve_connection(state, claims.user_id, socket).await,
            None => close_unauthenticated(socket).await,
        }
    })
}

async fn close_unauthenticated(mut socket: WebSocket) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: UNAUTHENTICATED_CLOSE,
            reason: "invalid token".into(),
        })))
        .await;
}

/// Registers the connection, then pumps until the client goes away:
/// pushed payloads flow out, "ping" gets a "pong", everything else from
/// the client is ignored.
async fn serve_connection(state: AppState, user_id: Uuid, mut socket: WebSocket) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection_id = state.registry.register(user_id, tx).await;
    tracing::debug!("Live channel connected for user {user_id}");

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(Message::Text(text))) if text == "ping" => {
                        if socket.send(Message::Text("pong".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
            outbound = rx.recv() => {
                match outbound {
                    Some(payload) => {
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    state.registry.unregister(user_id, connection_id).await;
    tracing::debug!("Live channel disconnected for user {user_id}");
}
