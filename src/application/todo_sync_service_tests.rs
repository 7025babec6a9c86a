#[cfg(test)]
mod tests {
    use super::super::todo_sync_service::TodoSyncService;
    use crate::domain::{message::{ClientMessage, ServerMessage}, todo::Todo};
    use crate::infrastructure::memory_repo::InMemoryTodoRepository;

    fn todos_of(message: ServerMessage) -> Vec<Todo> {
        match message { ServerMessage::AllTodos { todos } => todos }
    }

    #[tokio::test]
    async fn add_is_broadcast_to_every_subscriber() {
        let service = TodoSyncService::new(InMemoryTodoRepository::new());
        let (initial_a, mut a) = service.connect().await;
        let (initial_b, mut b) = service.connect().await;
        assert!(initial_a.is_empty() && initial_b.is_empty());

        let todo = Todo::new("A", "d");
        service.apply(ClientMessage::AddTodo { todo: todo.clone() }).await;

        assert_eq!(todos_of(a.recv().await.unwrap()), vec![todo.clone()]);
        assert_eq!(todos_of(b.recv().await.unwrap()), vec![todo]);
    }

    #[tokio::test]
    async fn toggle_flips_the_stored_item() {
        let x = Todo { id: "x".into(), name: "A".into(), description: "d".into(), is_completed: false };
        let service = TodoSyncService::new(InMemoryTodoRepository::with_todos(vec![x.clone()]));
        service.apply(ClientMessage::ToggleTodoCompletion { todo: x.clone() }).await;
        let listed = service.list().await;
        assert_eq!(listed, vec![Todo { is_completed: true, ..x }]);
    }

    #[tokio::test]
    async fn removing_missing_item_still_broadcasts() {
        let existing = Todo::new("A", "d");
        let service = TodoSyncService::new(InMemoryTodoRepository::with_todos(vec![existing.clone()]));
        let (initial, mut sub) = service.connect().await;
        assert_eq!(initial, vec![existing.clone()]);

        service.apply(ClientMessage::RemoveTodo { todo: Todo::new("ghost", "d") }).await;
        assert_eq!(todos_of(sub.recv().await.unwrap()), vec![existing]);
    }

    #[tokio::test]
    async fn snapshot_precedes_later_broadcasts() {
        let service = TodoSyncService::new(InMemoryTodoRepository::new());
        service.apply(ClientMessage::AddTodo { todo: Todo::new("before", "d") }).await;
        let (initial, mut sub) = service.connect().await;
        assert_eq!(initial.len(), 1);
        service.apply(ClientMessage::AddTodo { todo: Todo::new("after", "d") }).await;
        let next = todos_of(sub.recv().await.unwrap());
        assert_eq!(next.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), ["before", "after"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_mutations_broadcast_in_commit_order() {
        let service = TodoSyncService::new(InMemoryTodoRepository::new());
        let (_, mut sub) = service.connect().await;
        let mut handles = Vec::new();
        for n in 0..20 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.apply(ClientMessage::AddTodo { todo: Todo::new(format!("t{n}"), "d") }).await;
            }));
        }
        for handle in handles { handle.await.unwrap(); }

        // Each broadcast is one item longer than the previous one.
        for expected in 1..=20 {
            assert_eq!(todos_of(sub.recv().await.unwrap()).len(), expected);
        }
    }

    #[tokio::test]
    async fn dropped_subscription_is_unregistered() {
        let service = TodoSyncService::new(InMemoryTodoRepository::new());
        let (_, sub) = service.connect().await;
        assert_eq!(service.subscriber_count(), 1);
        drop(sub);
        assert_eq!(service.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn lagging_subscription_is_evicted() {
        let service = TodoSyncService::with_queue_depth(InMemoryTodoRepository::new(), 2);
        let (_, mut lagging) = service.connect().await;
        let (_, mut reader) = service.connect().await;
        for n in 0..3 {
            service.apply(ClientMessage::AddTodo { todo: Todo::new(format!("t{n}"), "d") }).await;
            assert_eq!(todos_of(reader.recv().await.unwrap()).len(), n + 1);
        }
        assert_eq!(service.subscriber_count(), 1);
        assert!(lagging.recv().await.is_some());
        assert!(lagging.recv().await.is_some());
        assert!(lagging.recv().await.is_none());
    }
}
