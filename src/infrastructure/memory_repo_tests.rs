#[cfg(test)]
mod tests {
    use super::super::memory_repo::InMemoryTodoRepository;
    use crate::domain::{repository::TodoRepository, todo::Todo};

    fn item(name: &str) -> Todo {
        Todo { id: format!("id-{name}"), name: name.into(), description: "d".into(), is_completed: false }
    }

    #[tokio::test]
    async fn add_appends_in_order() {
        let repo = InMemoryTodoRepository::new();
        repo.add(Todo::new("A", "d")).await;
        repo.add(Todo::new("B", "d")).await;
        let names: Vec<_> = repo.list_all().await.into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn toggle_replaces_in_place() {
        let (a, b, c) = (item("A"), item("B"), item("C"));
        let repo = InMemoryTodoRepository::with_todos(vec![a.clone(), b.clone(), c.clone()]);
        assert!(repo.toggle_completion(&b).await);
        assert_eq!(repo.list_all().await, vec![a, b.toggled(), c]);
    }

    #[tokio::test]
    async fn toggle_of_absent_item_is_noop() {
        let x = item("X");
        let repo = InMemoryTodoRepository::with_todos(vec![x.clone()]);
        assert!(!repo.toggle_completion(&item("Y")).await);
        // a stale copy (wrong completion flag) does not match either
        assert!(!repo.toggle_completion(&x.toggled()).await);
        assert_eq!(repo.list_all().await, vec![x]);
    }

    #[tokio::test]
    async fn remove_of_absent_item_is_noop() {
        let repo = InMemoryTodoRepository::with_todos(vec![item("A")]);
        assert!(!repo.remove(&item("B")).await);
        assert_eq!(repo.list_all().await.len(), 1);
    }

    #[tokio::test]
    async fn duplicates_resolve_to_first_match() {
        // Lookup is by value, not id: identical entries are indistinguishable.
        let dup = item("A");
        let other = item("B");
        let repo = InMemoryTodoRepository::with_todos(vec![dup.clone(), other.clone(), dup.clone()]);
        repo.toggle_completion(&dup).await;
        assert_eq!(repo.list_all().await, vec![dup.toggled(), other.clone(), dup.clone()]);
        repo.remove(&dup).await;
        assert_eq!(repo.list_all().await, vec![dup.toggled(), other]);
    }

    #[tokio::test]
    async fn snapshot_does_not_alias_storage() {
        let repo = InMemoryTodoRepository::new();
        repo.add(item("A")).await;
        let mut snapshot = repo.list_all().await;
        snapshot.clear();
        assert_eq!(repo.list_all().await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_lose_nothing() {
        let repo = InMemoryTodoRepository::new();
        let mut handles = Vec::new();
        for worker in 0..8 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                for n in 0..50 {
                    let todo = Todo::new(format!("{worker}-{n}"), "d");
                    repo.add(todo.clone()).await;
                    assert!(repo.toggle_completion(&todo).await);
                    if n % 2 == 0 { assert!(repo.remove(&todo.toggled()).await); }
                }
            }));
        }
        let reader = {
            let repo = repo.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    for todo in repo.list_all().await { assert!(!todo.name.is_empty()); }
                    tokio::task::yield_now().await;
                }
            })
        };
        for handle in handles { handle.await.unwrap(); }
        reader.await.unwrap();

        let todos = repo.list_all().await;
        assert_eq!(todos.len(), 8 * 25);
        assert!(todos.iter().all(|t| t.is_completed));
    }
}
