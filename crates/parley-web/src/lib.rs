//! Parley Web Server
//!
//! Axum-based REST API and WebSocket viewer endpoint.

pub mod routes;
pub mod state;
pub mod websocket;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Agents
        .route("/agents", get(routes::agents::list_agents).post(routes::agents::create_agent))
        .route(
            "/agents/{id}",
            put(routes::agents::update_agent).delete(routes::agents::delete_agent),
        )
        // Chat rooms
        .route("/chatrooms", get(routes::rooms::list_rooms).post(routes::rooms::create_room))
        .route(
            "/chatrooms/{id}",
            get(routes::rooms::get_room).delete(routes::rooms::delete_room),
        )
        .route("/chatrooms/{id}/start", post(routes::rooms::start_room))
        .route("/chatrooms/{id}/stop", post(routes::rooms::stop_room))
        .route("/chatrooms/{id}/messages", post(routes::rooms::post_message))
        // Viewers
        .route("/ws/{room_id}", get(websocket::ws_handler))
        // Diagnostics
        .route("/test-connection", post(routes::internal::test_connection));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until Ctrl+C.
pub async fn run_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Web server listening on http://{}:{}", host, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    }
}
