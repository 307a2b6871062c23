//! HTTP server setup and routing
use crate::{
    api,
    context::AppContext,
    db,
    error::{FareboxError, FareboxResult},
};
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .merge(api::routes())
        .with_state(ctx)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .fallback(not_found)
}

/// API index handler
async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Farebox API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "accounts": "/accounts",
            "media": "/media",
            "transactions": "/transactions"
        }
    }))
}

/// Health check handler; pings the database
async fn health_check(State(ctx): State<AppContext>) -> FareboxResult<Json<serde_json::Value>> {
    db::test_connection(&ctx.db).await?;

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    })))
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> FareboxResult<()> {
    let addr = format!(
        "{}:{}",
        ctx.config.service.hostname, ctx.config.service.port
    );

    info!("Farebox API listening on {}", addr);
    info!("   Database: {}", ctx.config.storage.database.display());

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FareboxError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| FareboxError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
