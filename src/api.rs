//! # API Server Module
//!
//! ## Purpose
//! Thin REST layer over the retrieval service. Transport framing is glue:
//! the contract is `(query, top_k)` in, an ordered list of chunk references
//! with metadata and matched text out, with the negative outcomes serialized
//! explicitly.
//!
//! ## Endpoints
//! - `POST /query`: retrieval request
//! - `GET /health`: component status
//! - `GET /stats`: corpus and index statistics
//! - `GET /`: minimal HTML index

use crate::errors::SearchError;
use crate::retrieval::RetrievalOutcome;
use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::{Deserialize, Serialize};

/// API server over shared application state.
pub struct ApiServer {
    app_state: crate::AppState,
}

/// Retrieval request payload.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

/// Retrieval response payload.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    #[serde(flatten)]
    pub outcome: RetrievalOutcome,
    /// Human-readable note for the negative outcomes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub query_time_ms: u64,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl ApiServer {
    pub fn new(app_state: crate::AppState) -> Self {
        Self { app_state }
    }

    /// Run the API server until shutdown.
    pub async fn run(self) -> crate::Result<()> {
        let bind_addr = format!(
            "{}:{}",
            self.app_state.config.server.host, self.app_state.config.server.port
        );
        let enable_cors = self.app_state.config.server.enable_cors;
        let workers = self.app_state.config.performance.worker_threads.max(1);

        tracing::info!("Starting API server on {}", bind_addr);

        let app_state = self.app_state;
        let server = HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::permissive()
            } else {
                Cors::default()
            };
            App::new()
                .app_data(web::Data::new(app_state.clone()))
                .wrap(cors)
                .route("/query", web::post().to(query_handler))
                .route("/health", web::get().to(health_handler))
                .route("/stats", web::get().to(stats_handler))
                .route("/", web::get().to(index_handler))
        })
        .workers(workers)
        .bind(&bind_addr)
        .map_err(|e| SearchError::Internal {
            message: format!("Failed to bind server to {}: {}", bind_addr, e),
        })?
        .run();

        server.await.map_err(|e| SearchError::Internal {
            message: format!("Server error: {}", e),
        })?;

        Ok(())
    }
}

/// Retrieval endpoint handler.
async fn query_handler(
    app_state: web::Data<crate::AppState>,
    request: web::Json<QueryRequest>,
) -> ActixResult<HttpResponse> {
    let start_time = std::time::Instant::now();
    let top_k = request
        .top_k
        .unwrap_or(app_state.config.retrieval.default_top_k);

    match app_state.retrieval.retrieve(&request.query, top_k).await {
        Ok(outcome) => {
            let response = QueryResponse {
                message: outcome.message(),
                outcome,
                query_time_ms: start_time.elapsed().as_millis() as u64,
            };
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e @ SearchError::InvalidSearchQuery { .. }) => {
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid query",
                "message": e.to_string(),
            })))
        }
        Err(e) => {
            tracing::error!("Retrieval error ({}): {}", e.category(), e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Retrieval failed",
                "message": e.to_string(),
            })))
        }
    }
}

/// Health check endpoint handler.
async fn health_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    // Indices are built before the server starts; a non-empty corpus is the
    // only runtime invariant left to report.
    let healthy = app_state.retrieval.stats().total_chunks > 0;

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Statistics endpoint handler.
async fn stats_handler(app_state: web::Data<crate::AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(app_state.retrieval.stats()))
}

/// Index page handler.
async fn index_handler() -> ActixResult<HttpResponse> {
    let html = r#"
    <!DOCTYPE html>
    <html>
    <head>
        <title>Statute Search Engine</title>
        <style>
            body { font-family: Arial, sans-serif; margin: 40px; }
            .header { color: #2c3e50; }
            .endpoint { margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 5px; }
            .method { font-weight: bold; color: #27ae60; }
        </style>
    </head>
    <body>
        <h1 class="header">Statute Search Engine API</h1>
        <p>Retrieval over the Indian Penal Code and the Code of Criminal Procedure.</p>

        <h2>Available Endpoints</h2>

        <div class="endpoint">
            <span class="method">POST</span> /query
            <p>Retrieve statute chunks for a natural language question.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /health
            <p>Check service health.</p>
        </div>

        <div class="endpoint">
            <span class="method">GET</span> /stats
            <p>Corpus and index statistics.</p>
        </div>

        <h2>Example Query Request</h2>
        <pre>{
  "query": "Explain IPC section 420",
  "top_k": 5
}</pre>
    </body>
    </html>
    "#;

    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}
