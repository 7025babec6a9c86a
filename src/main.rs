use todo_sync::application::todo_sync_service::TodoSyncService;
use todo_sync::config::Config;
use todo_sync::http::routing;
use todo_sync::http::routes::todos;
use todo_sync::infrastructure::memory_repo::InMemoryTodoRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let service = TodoSyncService::with_queue_depth(InMemoryTodoRepository::new(), config.queue_depth);
    let todos_router = todos::router(todos::AppState { service, config: config.clone() });
    let router = routing::app(todos_router);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %listener.local_addr()?, ping = ?config.ping_period, timeout = ?config.idle_timeout, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
