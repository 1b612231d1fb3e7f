use crate::app::clean_use_case::CleanUseCase;
use crate::constants::FETCH_FAILED_MESSAGE;
use crate::types::SubmitRequest;
use axum::{
    extract::Path,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "doc-cleaner",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn fetch_failed() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": FETCH_FAILED_MESSAGE })),
    )
        .into_response()
}

/// Raw payload of one batch, untouched
async fn raw_batch(
    Path(batch): Path<u32>,
    Extension(use_case): Extension<Arc<CleanUseCase>>,
) -> Response {
    match use_case.raw_batch(batch).await {
        Some(payload) => Json(payload).into_response(),
        None => fetch_failed(),
    }
}

/// Normalized and deduplicated records of one batch
async fn cleaned_batch(
    Path(batch): Path<u32>,
    Extension(use_case): Extension<Arc<CleanUseCase>>,
) -> Response {
    match use_case.cleaned_batch(batch).await {
        Some((records, _report)) => Json(records).into_response(),
        None => fetch_failed(),
    }
}

/// Relay a cleaned batch to the remote submission endpoint
async fn submit(
    Extension(use_case): Extension<Arc<CleanUseCase>>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    match use_case.submit(request).await {
        Ok(reply) => {
            let status =
                StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(reply.body)).into_response()
        }
        Err(e) => {
            error!("Submission failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// Create the HTTP router with every route
pub fn create_server(use_case: Arc<CleanUseCase>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/raw/:batch", get(raw_batch))
        .route("/raw/:batch/", get(raw_batch))
        .route("/cleaned/:batch", get(cleaned_batch))
        .route("/cleaned/:batch/", get(cleaned_batch))
        .route("/submit", post(submit))
        .route("/submit/", post(submit))
        .layer(Extension(use_case))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(use_case: Arc<CleanUseCase>, port: u16) -> anyhow::Result<()> {
    let app = create_server(use_case);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server listening on http://{}", addr);
    info!("  raw batches:     GET  http://localhost:{}/raw/:batch", port);
    info!("  cleaned batches: GET  http://localhost:{}/cleaned/:batch", port);
    info!("  submission:      POST http://localhost:{}/submit", port);

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
