use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::State;
use axum::{response::IntoResponse, routing::get, Router};

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout, Duration};

use crate::db::DBLayer;
use crate::generator::{GenerateRequest, Responder};
use crate::model::message::Message;
use crate::scenarios::{ScenarioTag, ToneTag};
use crate::templates::GenerationKind;
use anyhow::anyhow;
use tracing::info;
use uuid::Uuid;

// ------------------------------------------------------------
// TYPES
// ------------------------------------------------------------
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DBLayer>,
    pub responder: Arc<Responder>,
}

#[derive(Deserialize, Debug)]
pub struct ClientMsg {
    pub msg_type: MsgType,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub scenario: ScenarioTag,
    #[serde(default)]
    pub tone: ToneTag,
    #[serde(default)]
    pub mode: SimulationMode,
    #[serde(default)]
    pub text: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "snake_case")]
pub enum MsgType {
    Register,
    Prompt,
    Suggest,
}

/// Whether the human plays themselves (server replies as the other
/// party) or practices against a simulated opponent.
#[derive(Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    #[default]
    User,
    Opponent,
}

#[derive(Debug, Default)]
struct WsSession {
    session_id: Option<String>,
    scenario: ScenarioTag,
    tone: ToneTag,
    mode: SimulationMode,
}

// ------------------------------------------------------------
// ROUTER
// ------------------------------------------------------------
pub fn ws_router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(
    ws: axum::extract::WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

// ------------------------------------------------------------
// WEBSOCKET HANDLER (SPLIT SOCKET)
// ------------------------------------------------------------
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sender, mut receiver) = socket.split();

    let session = Arc::new(Mutex::new(WsSession::default()));
    let (tx, mut rx) = mpsc::channel::<WsMessage>(32);

    // Dedicated writer task keeps websocket flushing smoothly.
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match timeout(Duration::from_secs(5), ws_sender.send(msg)).await {
                Ok(Ok(_)) => {}
                Ok(Err(_)) => break,
                Err(_) => continue,
            }
        }
    });

    'socket_loop: while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            WsMessage::Text(raw) => {
                let parsed: ClientMsg = match serde_json::from_str(raw.as_str()) {
                    Ok(v) => v,
                    Err(_) => {
                        if let Err(err) = send_json(&tx, json_error("Invalid JSON")).await {
                            eprintln!("failed to send ws message: {err}");
                            break 'socket_loop;
                        }
                        continue;
                    }
                };

                info!(
                    session_id = parsed.session_id.as_str(),
                    msg_type = ?parsed.msg_type,
                    scenario = parsed.scenario.as_str(),
                    tone = parsed.tone.as_str(),
                    text = parsed.text.as_str(),
                    "incoming ws message"
                );

                match parsed.msg_type {
                    MsgType::Register => {
                        if let Err(err) = handle_register(parsed, &session, &tx).await {
                            eprintln!("failed to send ws message: {err}");
                            break 'socket_loop;
                        }
                    }

                    MsgType::Prompt => {
                        if parsed.text.trim().is_empty() {
                            if let Err(err) = send_json(&tx, json_error("empty_prompt")).await {
                                eprintln!("failed to send ws message: {err}");
                                break 'socket_loop;
                            }
                            continue;
                        }

                        let (session_id, scenario, tone) =
                            resolve_session(&session, &parsed, &tx).await;

                        // Persist the user's side of the exchange.
                        let user_msg = Message::new(&session_id, "user", parsed.text.clone());
                        if let Err(err) = state.db.save_message(&user_msg).await {
                            eprintln!("failed to save user message {}: {err}", user_msg.id);
                        }

                        // Typing indicator frames the simulated latency;
                        // generation is awaited inline, so a connection
                        // can never have two submissions in flight.
                        if let Err(err) = send_json(&tx, json_typing(&session_id, true)).await {
                            eprintln!("failed to send ws message: {err}");
                            break 'socket_loop;
                        }

                        let request = GenerateRequest {
                            prompt: parsed.text.clone(),
                            scenario,
                            tone,
                            max_chars: 200,
                        };
                        let outcome = state
                            .responder
                            .generate_or_fallback(&request, GenerationKind::Response)
                            .await;

                        if let Err(err) = send_json(&tx, json_typing(&session_id, false)).await {
                            eprintln!("failed to send ws message: {err}");
                            break 'socket_loop;
                        }

                        let ai_msg = Message::new(&session_id, "ai", outcome.output.clone());
                        if let Err(err) = state.db.save_message(&ai_msg).await {
                            eprintln!("failed to save ai message {}: {err}", ai_msg.id);
                        }

                        if let Err(err) = send_json(
                            &tx,
                            serde_json::json!({
                                "type": "message",
                                "session_id": session_id,
                                "id": ai_msg.id,
                                "role": "ai",
                                "text": outcome.output,
                                "source": outcome.source,
                                "ts": ai_msg.ts,
                            }),
                        )
                        .await
                        {
                            eprintln!("failed to send ws message: {err}");
                            break 'socket_loop;
                        }
                    }

                    MsgType::Suggest => {
                        let (session_id, scenario, tone) =
                            resolve_session(&session, &parsed, &tx).await;

                        // The latest AI message is the context the user
                        // needs help replying to; empty when none yet.
                        let context = state
                            .db
                            .list_messages_for_session(&session_id)
                            .await
                            .unwrap_or_default()
                            .into_iter()
                            .rev()
                            .find(|m| m.role == "ai")
                            .map(|m| m.text)
                            .unwrap_or_default();

                        if let Err(err) = send_json(&tx, json_typing(&session_id, true)).await {
                            eprintln!("failed to send ws message: {err}");
                            break 'socket_loop;
                        }

                        let request = GenerateRequest {
                            prompt: context,
                            scenario,
                            tone,
                            max_chars: 200,
                        };
                        let outcome = state
                            .responder
                            .generate_or_fallback(&request, GenerationKind::Suggestion)
                            .await;

                        if let Err(err) = send_json(&tx, json_typing(&session_id, false)).await {
                            eprintln!("failed to send ws message: {err}");
                            break 'socket_loop;
                        }

                        // Suggestions are coaching asides, not part of
                        // the transcript; they are not persisted.
                        if let Err(err) = send_json(
                            &tx,
                            serde_json::json!({
                                "type": "suggestion",
                                "session_id": session_id,
                                "text": outcome.output,
                                "source": outcome.source,
                            }),
                        )
                        .await
                        {
                            eprintln!("failed to send ws message: {err}");
                            break 'socket_loop;
                        }
                    }
                }
            }
            WsMessage::Ping(payload) => {
                let _ = tx.send(WsMessage::Pong(payload)).await;
            }
            WsMessage::Close(_) => break,
            _ => {}
        };
    }

    // Drop sender to stop writer task
    drop(tx);
    let _ = writer.await;
}

// ------------------------------------------------------------
// REGISTER HANDLER
// ------------------------------------------------------------
async fn handle_register(
    msg: ClientMsg,
    session: &Arc<Mutex<WsSession>>,
    sender: &mpsc::Sender<WsMessage>,
) -> anyhow::Result<()> {
    let mut s = session.lock().await;

    let session_id = if msg.session_id.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        msg.session_id
    };

    s.session_id = Some(session_id.clone());
    s.scenario = msg.scenario;
    s.tone = msg.tone;
    s.mode = msg.mode;

    send_json(
        sender,
        serde_json::json!({
            "type": "system",
            "event": "registered",
            "session_id": session_id,
            "scenario": s.scenario,
            "tone": s.tone,
            "mode": format!("{:?}", s.mode).to_lowercase(),
        }),
    )
    .await?;

    Ok(())
}

/// Effective identity for a message: fields on the message win, the
/// registered session fills the gaps, a fresh id is minted when both
/// are silent (client is told, mirroring chat creation).
async fn resolve_session(
    session: &Arc<Mutex<WsSession>>,
    msg: &ClientMsg,
    sender: &mpsc::Sender<WsMessage>,
) -> (String, ScenarioTag, ToneTag) {
    let mut s = session.lock().await;

    if !msg.session_id.is_empty() {
        s.session_id = Some(msg.session_id.clone());
    }

    let session_id = match s.session_id.clone() {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4().to_string();
            s.session_id = Some(id.clone());
            let _ = send_json(
                sender,
                serde_json::json!({
                    "type": "system",
                    "event": "session_created",
                    "session_id": id,
                }),
            )
            .await;
            id
        }
    };

    if msg.scenario != ScenarioTag::General {
        s.scenario = msg.scenario;
    }
    if msg.tone != ToneTag::Default {
        s.tone = msg.tone;
    }

    (session_id, s.scenario, s.tone)
}

// ------------------------------------------------------------
// SEND JSON WRAPPER
// ------------------------------------------------------------
async fn send_json(
    sender: &mpsc::Sender<WsMessage>,
    value: serde_json::Value,
) -> anyhow::Result<()> {
    let msg = WsMessage::Text(value.to_string().into());

    match timeout(Duration::from_secs(2), sender.send(msg)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(_)) => Err(anyhow!("ws channel closed")),
        Err(_) => Ok(()),
    }
}

fn json_error(msg: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "error",
        "message": msg
    })
}

fn json_typing(session_id: &str, active: bool) -> serde_json::Value {
    serde_json::json!({
        "type": "typing",
        "session_id": session_id,
        "active": active
    })
}
