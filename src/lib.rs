pub mod accounts;
pub mod app;
mod assets;
pub mod auth;
pub mod config;
mod export;
pub mod ports;
pub mod slam;
mod state;
pub mod store;
mod templates;

use std::net::SocketAddr;

pub async fn serve(addr: SocketAddr, config: config::AppConfig) {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app::app(config))
        .await
        .expect("server error");
}
