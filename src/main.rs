use std::env;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use ragpress_backend::core;
use ragpress_backend::server;
use ragpress_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize().await?;
    core::logging::init(&state.paths, &state.settings.logging);

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(0);
    let bind_addr = format!("{}:{}", state.settings.server.host, port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("RAGPRESS_PORT={}", addr.port());
    tracing::info!(
        "Listening on {} (llm provider: {}, search: {})",
        addr,
        state.llm.provider_name(),
        state.search.engine().as_str()
    );

    let app: Router = server::router::router(state);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
