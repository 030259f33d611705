use tokio::net::TcpListener;
use todo_server::{db, Config, TodoItemService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_server=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let pool = db::open(&config.database).await?;

    let listener = TcpListener::bind(config.server.addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, database = %config.database.url, "listening");

    todo_server::run_with_shutdown(listener, TodoItemService::new(pool.clone()), shutdown_signal())
        .await?;

    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c, shutting down"),
    }
}
