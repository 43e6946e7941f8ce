//! jotlink-api - HTTP API server for jotlink

mod auth;
mod error;
mod handlers;
mod services;
mod signing;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use jotlink_db::{create_pool, Database, PgMessageRepository, PgNoteRepository};
use jotlink_inference::OpenAiBackend;
use jotlink_jobs::{JobWorker, LinkPreviewHandler, WorkerConfig};

use handlers::files::{create_upload, download_file, upload_file};
use handlers::notes::{create_note, delete_note, get_note, list_notes, update_note};
use handlers::threads::{ask, create_thread, list_messages, post_message};
use services::AiResponder;
use signing::UrlSigner;
use state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "jotlink_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jotlink_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/jotlink".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);
    let file_storage_path = std::env::var("FILE_STORAGE_PATH")
        .unwrap_or_else(|_| "/var/lib/jotlink/files".to_string());

    // Connect to database and run pending migrations
    info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;
    let db = Database::new(pool.clone()).with_filesystem_storage(&file_storage_path);
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database ready");

    let db = Arc::new(db);

    // Start the background job worker with the link-preview handler
    let mut worker = JobWorker::new(db.clone(), WorkerConfig::from_env());
    worker.register_handler(LinkPreviewHandler::new(Arc::new(PgNoteRepository::new(
        pool.clone(),
    ))));
    let worker_handle = worker.start();

    // Chat backend and responder
    let chat_backend = Arc::new(OpenAiBackend::from_env()?);
    info!(model = chat_backend.model(), "Chat backend configured");
    let responder = Arc::new(AiResponder::new(
        Arc::new(PgNoteRepository::new(pool.clone())),
        Arc::new(PgMessageRepository::new(pool.clone())),
        chat_backend,
    ));

    let signer = UrlSigner::from_env()?;

    let state = AppState {
        db,
        signer,
        responder,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        // Notes CRUD
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        // Per-note chat threads
        .route("/api/notes/:id/thread", post(create_thread))
        .route(
            "/api/threads/:id/messages",
            get(list_messages).post(post_message),
        )
        .route("/api/threads/:id/ask", post(ask))
        // Image uploads via signed URLs
        .route("/api/uploads", post(create_upload))
        .route("/files/:id", put(upload_file).get(download_file))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, shutting down job worker");
    let _ = worker_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Received shutdown signal");
}
