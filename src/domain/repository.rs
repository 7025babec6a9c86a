use async_trait::async_trait;
use super::todo::Todo;

/// Ordered, shared collection of todos. Lookups for `remove` and
/// `toggle_completion` use structural equality; the returned flag reports
/// whether a match was found, a miss is not an error.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn list_all(&self) -> Vec<Todo>;
    async fn add(&self, todo: Todo);
    async fn remove(&self, todo: &Todo) -> bool;
    async fn toggle_completion(&self, todo: &Todo) -> bool;
}
