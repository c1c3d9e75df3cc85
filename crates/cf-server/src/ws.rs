//! WebSocket event channel
//!
//! One socket subscribes to every [`cascadeflow_events::Channel`] on
//! connect and fans messages out as `{type, data, timestamp}` envelopes,
//! the shape [`cascadeflow_events::EventHub::publish`] already produces.
//! Per-IP admission goes through the same [`ConnectionLimiter`] used by the
//! rest of the transport; nothing about the core had an analogous surface
//! to ground this on, so the envelope and subscribe protocol follow the
//! spec directly.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, Query, State};
use axum::response::IntoResponse;
use cascadeflow_events::{Channel, EventHub, Subscription};
use serde::Deserialize;
use tokio::time::interval;

use crate::state::AppState;

const PING_INTERVAL: Duration = Duration::from_secs(30);
const ALL_CHANNELS: [Channel; 4] = [Channel::Event, Channel::Health, Channel::Budget, Channel::Cache];

fn channel_name(channel: Channel) -> &'static str {
    match channel {
        Channel::Event => "event",
        Channel::Health => "health",
        Channel::Budget => "budget",
        Channel::Cache => "cache",
    }
}

fn parse_channel(name: &str) -> Option<Channel> {
    match name {
        "event" => Some(Channel::Event),
        "health" => Some(Channel::Health),
        "budget" => Some(Channel::Budget),
        "cache" => Some(Channel::Cache),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ClientMessage {
    Subscribe { channel: String },
    Unsubscribe { channel: String },
    Pong,
}

fn envelope(event_type: &str, data: serde_json::Value) -> String {
    let timestamp = cascadeflow_core::time::to_epoch_millis(cascadeflow_core::time::now());
    serde_json::json!({ "type": event_type, "data": data, "timestamp": timestamp }).to_string()
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(query): Query<WsQuery>,
) -> axum::response::Response {
    if !state.ws_limiter.check(addr.ip()) {
        return (http::StatusCode::TOO_MANY_REQUESTS, "too many connection attempts").into_response();
    }

    // Tokens are opaque to the core: any non-empty value (header or query)
    // is accepted, the same way the spec leaves verification to the deployer.
    let authorized = query.token.is_some_and(|t| !t.is_empty());
    if !authorized {
        return (http::StatusCode::UNAUTHORIZED, "missing token").into_response();
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state.events))
}

async fn handle_socket(mut socket: WebSocket, events: std::sync::Arc<EventHub>) {
    let mut subscriptions: Vec<Subscription> = ALL_CHANNELS.iter().map(|&c| events.subscribe(c)).collect();

    if socket
        .send(Message::Text(envelope("connected", serde_json::json!({})).into()))
        .await
        .is_err()
    {
        return;
    }

    let mut ping_timer = interval(PING_INTERVAL);
    ping_timer.tick().await; // first tick fires immediately; consume it
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            _ = ping_timer.tick() => {
                if awaiting_pong {
                    tracing::debug!("client missed ping, dropping connection");
                    break;
                }
                awaiting_pong = true;
                if socket.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if !handle_client_message(&text, &events, &mut subscriptions, &mut socket).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            subscribed = recv_any(&mut subscriptions) => {
                let Some(envelope_msg) = subscribed else { continue };
                if socket.send(Message::Text(envelope_msg.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    for sub in subscriptions {
        events.unsubscribe(sub.channel, sub.id);
    }
}

async fn recv_any(subscriptions: &mut [Subscription]) -> Option<String> {
    if subscriptions.is_empty() {
        std::future::pending::<()>().await;
    }
    let futures: Vec<_> = subscriptions.iter_mut().map(Subscription::recv).collect();
    let (envelope_opt, _, _) = futures::future::select_all(futures.into_iter().map(Box::pin)).await;
    let env = envelope_opt?;
    Some(serde_json::json!({ "type": env.event_type, "data": env.data, "timestamp": env.timestamp }).to_string())
}

async fn handle_client_message(text: &str, events: &EventHub, subscriptions: &mut Vec<Subscription>, socket: &mut WebSocket) -> bool {
    let Ok(msg) = serde_json::from_str::<ClientMessage>(text) else {
        return true;
    };

    match msg {
        ClientMessage::Subscribe { channel } => {
            let Some(channel) = parse_channel(&channel) else { return true };
            if !subscriptions.iter().any(|s| s.channel == channel) {
                subscriptions.push(events.subscribe(channel));
            }
            let reply = envelope("subscribed", serde_json::json!({ "channel": channel_name(channel) }));
            socket.send(Message::Text(reply.into())).await.is_ok()
        }
        ClientMessage::Unsubscribe { channel } => {
            let Some(channel) = parse_channel(&channel) else { return true };
            if let Some(pos) = subscriptions.iter().position(|s| s.channel == channel) {
                let removed = subscriptions.remove(pos);
                events.unsubscribe(channel, removed.id);
            }
            let reply = envelope("unsubscribed", serde_json::json!({ "channel": channel_name(channel) }));
            socket.send(Message::Text(reply.into())).await.is_ok()
        }
        ClientMessage::Pong => {
            let reply = envelope("pong", serde_json::json!({}));
            socket.send(Message::Text(reply.into())).await.is_ok()
        }
    }
}
