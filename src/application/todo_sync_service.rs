use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::message::{ClientMessage, ServerMessage};
use crate::domain::repository::TodoRepository;
use crate::domain::todo::Todo;
use crate::infrastructure::broadcaster::{Broadcaster, Subscription};

/// Shared state behind every connection: the store plus the fan-out point.
///
/// Mutations and the publish that follows run under one commit gate, so every
/// subscriber receives `all_todos` frames in mutation order and a new
/// subscriber's initial snapshot never overlaps a broadcast it also receives.
pub struct TodoSyncService<R: TodoRepository> {
    repo: Arc<R>,
    broadcaster: Broadcaster<ServerMessage>,
    commit: Arc<Mutex<()>>,
}

impl<R: TodoRepository> Clone for TodoSyncService<R> {
    fn clone(&self) -> Self {
        Self { repo: self.repo.clone(), broadcaster: self.broadcaster.clone(), commit: self.commit.clone() }
    }
}

impl<R: TodoRepository> TodoSyncService<R> {
    pub fn new(repo: R) -> Self { Self::with_broadcaster(repo, Broadcaster::new()) }

    /// Each connection may have at most `queue_depth` broadcasts pending
    /// before it is evicted.
    pub fn with_queue_depth(repo: R, queue_depth: usize) -> Self {
        Self::with_broadcaster(repo, Broadcaster::with_queue_depth(queue_depth))
    }

    fn with_broadcaster(repo: R, broadcaster: Broadcaster<ServerMessage>) -> Self {
        Self { repo: Arc::new(repo), broadcaster, commit: Arc::new(Mutex::new(())) }
    }

    /// Opens a subscription together with the state it starts from.
    pub async fn connect(&self) -> (Vec<Todo>, Subscription<ServerMessage>) {
        let _gate = self.commit.lock().await;
        let subscription = self.broadcaster.subscribe();
        (self.repo.list_all().await, subscription)
    }

    /// Applies one client mutation and broadcasts the resulting list, even when
    /// the targeted item was not present.
    pub async fn apply(&self, message: ClientMessage) {
        let _gate = self.commit.lock().await;
        let kind = message.kind();
        let matched = match message {
            ClientMessage::AddTodo { todo } => { self.repo.add(todo).await; true }
            ClientMessage::RemoveTodo { todo } => self.repo.remove(&todo).await,
            ClientMessage::ToggleTodoCompletion { todo } => self.repo.toggle_completion(&todo).await,
        };
        let todos = self.repo.list_all().await;
        let count = todos.len();
        let delivered = self.broadcaster.publish(ServerMessage::AllTodos { todos });
        tracing::debug!(kind, matched, todos = count, subscribers = delivered, "applied client message");
    }

    /// Diagnostics: current list, outside the commit gate.
    pub async fn list(&self) -> Vec<Todo> { self.repo.list_all().await }

    /// Diagnostics: connections currently receiving broadcasts.
    pub fn subscriber_count(&self) -> usize { self.broadcaster.subscriber_count() }
}
