// Dwelling ETL - Trigger Server
// POST a CSV export, signed with the shared secret, and the whole pipeline
// runs against the configured database.

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hmac::{Hmac, Mac};
use rusqlite::Connection;
use serde::Serialize;
use sha2::Sha256;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dwelling_etl::{open_database, run, GroupSizePolicy, PipelineConfig, RowReader, RunSummary};

const SIGNATURE_HEADER: &str = "x-signature";

/// Shared application state
#[derive(Clone)]
struct AppState {
    db: Arc<Mutex<Connection>>,
    secret: Arc<String>,
    policy: GroupSizePolicy,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

// ============================================================================
// Signature
// ============================================================================

/// Constant-time check of a hex HMAC-SHA256 signature over `body`
fn verify_signature(secret: &str, body: &[u8], signature: Option<&str>) -> bool {
    let decoded = match signature.map(|s| hex::decode(s.trim())) {
        Some(Ok(decoded)) => decoded,
        _ => return false,
    };
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    mac.verify_slice(&decoded).is_ok()
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/trigger - run the pipeline over the posted CSV
async fn trigger(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if !verify_signature(&state.secret, &body, signature) {
        warn!("rejected trigger with missing or invalid signature");
        return (StatusCode::UNAUTHORIZED, Json(ApiResponse::err("invalid signature"))).into_response();
    }

    let db = state.db.clone();
    let policy = state.policy;
    let result = tokio::task::spawn_blocking(move || -> Result<RunSummary> {
        let mut conn = db
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        let rows = RowReader::from_reader(body.as_ref(), "upload.csv")?;
        run(&mut conn, rows, policy, None)
    })
    .await;

    match result {
        Ok(Ok(summary)) => {
            info!(dwellings = summary.transform.dwellings, "trigger finished");
            (StatusCode::OK, Json(ApiResponse::ok(summary))).into_response()
        }
        Ok(Err(err)) => {
            warn!(error = %format!("{:#}", err), "trigger failed");
            (StatusCode::BAD_REQUEST, Json(ApiResponse::err(format!("{:#}", err)))).into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(err.to_string())),
        )
            .into_response(),
    }
}

// ============================================================================
// Main Server
// ============================================================================

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/trigger", post(trigger))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var_os("DWELLING_ETL_CONFIG").map(PathBuf::from);
    let config = PipelineConfig::load_or_default(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let secret = std::env::var("DWELLING_ETL_SECRET")
        .context("DWELLING_ETL_SECRET must be set to verify trigger signatures")?;
    let database = std::env::var_os("DWELLING_ETL_DATABASE")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.database.clone());

    let conn = open_database(&database)?;
    info!(database = %database.display(), "database opened");

    let state = AppState {
        db: Arc::new(Mutex::new(conn)),
        secret: Arc::new(secret),
        policy: config.group_size,
    };

    let addr = std::env::var("DWELLING_ETL_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(addr = %addr, "trigger server listening");
    axum::serve(listener, app(state))
        .await
        .context("Server stopped")?;

    Ok(())
}
