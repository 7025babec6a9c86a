use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{repository::TodoRepository, todo::Todo};

/// Process-local store: one mutex around the whole sequence. Clones share the
/// same sequence.
#[derive(Clone, Default)]
pub struct InMemoryTodoRepository {
    todos: Arc<Mutex<Vec<Todo>>>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self { Self::default() }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self { todos: Arc::new(Mutex::new(todos)) }
    }

    // Every operation leaves the Vec valid, so a poisoned guard is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<Todo>> {
        self.todos.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn list_all(&self) -> Vec<Todo> { self.lock().clone() }

    async fn add(&self, todo: Todo) { self.lock().push(todo); }

    async fn remove(&self, todo: &Todo) -> bool {
        let mut todos = self.lock();
        let Some(index) = todos.iter().position(|t| t == todo) else { return false };
        todos.remove(index);
        true
    }

    async fn toggle_completion(&self, todo: &Todo) -> bool {
        let mut todos = self.lock();
        let Some(slot) = todos.iter_mut().find(|t| *t == todo) else { return false };
        *slot = slot.toggled();
        true
    }
}
