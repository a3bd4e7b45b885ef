use crate::config::Config;
use crate::error::{KgError, Result};
use crate::ingest::CandidateRow;
use crate::service::{GraphService, MutationOutcome};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// JSON-over-HTTP front end for a shared [`GraphService`]
pub struct HttpGraphServer {
    service: Arc<GraphService>,
    allowed_origins: Vec<String>,
}

impl HttpGraphServer {
    pub fn new(service: Arc<GraphService>, config: &Config) -> Self {
        Self {
            service,
            allowed_origins: config.http_server.allowed_origins.clone(),
        }
    }

    /// Run the HTTP server until it fails
    pub async fn run(&self, addr: &str) -> Result<()> {
        let app = self.create_router();

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            KgError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", addr, e),
            ))
        })?;
        log::info!("Knowledge graph API listening on http://{}", addr);

        axum::serve(listener, app).await?;
        Ok(())
    }

    /// Create the axum router
    pub fn create_router(&self) -> Router {
        // No restriction configured: allow all origins (local dev)
        let cors = if self.allowed_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> = self
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/api/health", get(handle_health))
            .route("/api/relationships/add", post(handle_add))
            .route("/api/relationships/bulk", post(handle_bulk))
            .route("/api/relationships/delete", delete(handle_delete))
            .route("/api/graph", get(handle_graph))
            .route("/api/graph/clear", post(handle_clear))
            .route("/api/graph/stats", get(handle_stats))
            .route("/api/query", post(handle_query))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(cors),
            )
            .with_state(Arc::clone(&self.service))
    }
}

type AppState = Arc<GraphService>;

impl IntoResponse for KgError {
    fn into_response(self) -> Response {
        if !self.is_client_error() {
            log::error!("Request failed: {}", self);
        }
        let status = match &self {
            KgError::Validation(_) | KgError::Row { .. } => StatusCode::BAD_REQUEST,
            KgError::NotFound(_) => StatusCode::NOT_FOUND,
            KgError::Internal(_) | KgError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(json!({ "success": false, "message": self.to_string() })),
        )
            .into_response()
    }
}

impl From<JsonRejection> for KgError {
    fn from(rejection: JsonRejection) -> Self {
        KgError::Validation(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the `{success:false,message}` body
#[derive(FromRequest)]
#[from_request(via(Json), rejection(KgError))]
struct JsonBody<T>(T);

/// Successful body: `{"success": true, ...fields of T}`
#[derive(Serialize)]
struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        body,
    })
}

#[derive(Debug, Deserialize)]
struct AddRequest {
    #[serde(default)]
    entity1: String,
    #[serde(default)]
    relationship: String,
    #[serde(default)]
    entity2: String,
}

/// Records already decoded from the uploaded table, header -> value
#[derive(Debug, Deserialize)]
struct BulkRequest {
    #[serde(default)]
    rows: Vec<IndexMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct QueryRequest {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct DeleteRequest {
    #[serde(default)]
    source: String,
    #[serde(default)]
    target: String,
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "message": "Knowledge Graph API is running" }))
}

async fn handle_add(
    State(service): State<AppState>,
    JsonBody(req): JsonBody<AddRequest>,
) -> Result<impl IntoResponse> {
    let outcome = service.add_relationship(&req.entity1, &req.relationship, &req.entity2)?;
    Ok((StatusCode::CREATED, success(outcome)))
}

async fn handle_bulk(
    State(service): State<AppState>,
    JsonBody(req): JsonBody<BulkRequest>,
) -> Result<impl IntoResponse> {
    let rows = req.rows.iter().map(|record| CandidateRow::from_record(record));
    let report = service.bulk_add(rows)?;
    Ok((StatusCode::CREATED, success(report)))
}

async fn handle_graph(State(service): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(service.snapshot()?))
}

async fn handle_query(
    State(service): State<AppState>,
    JsonBody(req): JsonBody<QueryRequest>,
) -> Result<impl IntoResponse> {
    Ok(success(service.query(&req.kind, &req.value)?))
}

async fn handle_delete(
    State(service): State<AppState>,
    JsonBody(req): JsonBody<DeleteRequest>,
) -> Result<impl IntoResponse> {
    Ok(success(service.delete_relationship(&req.source, &req.target)?))
}

async fn handle_clear(State(service): State<AppState>) -> Result<impl IntoResponse> {
    let graph = service.clear()?;
    Ok(success(MutationOutcome {
        message: "Knowledge graph cleared".to_string(),
        graph,
    }))
}

async fn handle_stats(State(service): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(service.stats()?))
}
