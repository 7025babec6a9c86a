use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::{routing::get, Router};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::application::todo_sync_service::TodoSyncService;
use crate::config::Config;
use crate::domain::{message::ServerMessage, repository::TodoRepository};
use crate::http::types::{decode, encode, ConnectionError};
use crate::infrastructure::broadcaster::Subscription;

#[derive(Clone)]
pub struct AppState<R: TodoRepository> { pub service: TodoSyncService<R>, pub config: Config }

pub fn router<R: TodoRepository + Clone>(state: AppState<R>) -> Router {
    Router::new()
        .route("/todos", get(connect::<R>))
        .with_state(state)
}

async fn connect<R: TodoRepository + Clone>(ws: WebSocketUpgrade, State(state): State<AppState<R>>) -> Response {
    let connection_id = Uuid::new_v4();
    ws.on_upgrade(move |socket| async move {
        match serve_connection(socket, state).await {
            Ok(()) => info!("connection closed"),
            Err(e) => warn!(error = %e, "connection closed with error"),
        }
    }.instrument(tracing::info_span!("connection", %connection_id)))
}

/// Connected: send the snapshot. Active: relay broadcasts out and apply client
/// messages in, each on its own task. Closed: whichever task ends first aborts
/// the other, which drops the subscription.
async fn serve_connection<R: TodoRepository>(socket: WebSocket, state: AppState<R>) -> Result<(), ConnectionError> {
    let (mut sender, receiver) = socket.split();

    let (todos, subscription) = state.service.connect().await;
    debug!(todos = todos.len(), "connected, sending snapshot");
    sender.send(encode(&ServerMessage::AllTodos { todos })?).await?;

    info!("connection active");
    let mut send_task = tokio::spawn(relay(sender, subscription, state.config.ping_period, state.config.silence_limit()).in_current_span());
    let mut recv_task = tokio::spawn(consume(receiver, state.service, state.config.silence_limit()).in_current_span());

    let finished = tokio::select! {
        res = &mut send_task => { recv_task.abort(); res }
        res = &mut recv_task => { send_task.abort(); res }
    };
    match finished {
        Ok(result) => result,
        Err(e) => { warn!(error = %e, "connection task failed"); Ok(()) }
    }
}

/// Ends with `Lagged` once the broadcaster evicts this subscription, and with
/// `Stalled` when the client stops draining its socket.
async fn relay(mut sender: SplitSink<WebSocket, Message>, mut subscription: Subscription<ServerMessage>, ping_period: Duration, send_limit: Duration) -> Result<(), ConnectionError> {
    let mut keepalive = interval_at(Instant::now() + ping_period, ping_period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        let frame = tokio::select! {
            message = subscription.recv() => encode(&message.ok_or(ConnectionError::Lagged)?)?,
            _ = keepalive.tick() => Message::Ping(Vec::new()),
        };
        timeout(send_limit, sender.send(frame)).await.map_err(|_| ConnectionError::Stalled(send_limit))??;
    }
}

async fn consume<R: TodoRepository>(mut receiver: SplitStream<WebSocket>, service: TodoSyncService<R>, silence: Duration) -> Result<(), ConnectionError> {
    loop {
        let frame = match timeout(silence, receiver.next()).await {
            Err(_) => return Err(ConnectionError::Idle(silence)),
            Ok(None) => return Ok(()),
            Ok(Some(frame)) => frame?,
        };
        if let Message::Close(_) = frame {
            debug!("client sent close");
            return Ok(());
        }
        match decode(&frame) {
            Some(Ok(message)) => {
                debug!(kind = message.kind(), "received client message");
                service.apply(message).await;
            }
            Some(Err(e)) => warn!(error = %e, "skipping malformed client message"),
            None => {}
        }
    }
}
