use std::net::SocketAddr;
use tally_bot::storage::ensure_data_dir;
use tally_bot::{AppState, Config, load_data, router, scheduler};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}; export it or add it to the service environment");
            return Err(err.into());
        }
    };

    if let Err(err) = ensure_data_dir(&config.data_path).await {
        error!("{err}; tallies will be kept in memory only until the path is writable");
    }

    let store = load_data(&config.data_path).await;
    let state = AppState::new(
        config.data_path.clone(),
        store,
        &config.token,
        &config.command_prefix,
    );

    scheduler::run_reset_check(&state).await;
    let reset_task = scheduler::spawn_reset_task(state.clone(), config.reset_interval);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reset_task.abort();
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
