//! Health and version endpoints
//!
//! `/health` and `/healthz` always answer 200 while the process is up. The
//! body reports the loaded dataset and whether the submission store is
//! reachable; a failing store shows up as `status: "degraded"`.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use super::json_response;
use crate::server::AppState;
use crate::submission::QueueDepth;
use crate::tree::DatasetStats;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    /// `online` or `degraded`
    pub status: &'static str,
    pub version: &'static str,
    /// Seconds since startup
    pub uptime: u64,
    pub timestamp: String,
    /// `development` or `production`
    pub mode: &'static str,
    pub dataset: DatasetHealth,
    pub store: StoreHealth,
}

#[derive(Serialize)]
pub struct DatasetHealth {
    #[serde(flatten)]
    pub stats: DatasetStats,
    pub loaded_at: String,
}

#[derive(Serialize)]
pub struct StoreHealth {
    /// `mongodb` or `memory`
    pub mode: &'static str,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<QueueDepth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn build_health_response(state: &AppState) -> HealthResponse {
    let dataset = state.dataset.snapshot();
    let store = state.gateway.store();

    let (pending, error) = match store.queue_depth().await {
        Ok(depth) => (Some(depth), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let connected = error.is_none();

    HealthResponse {
        healthy: true,
        status: if connected { "online" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        dataset: DatasetHealth {
            stats: dataset.stats(),
            loaded_at: dataset.loaded_at.to_rfc3339(),
        },
        store: StoreHealth {
            mode: store.mode(),
            connected,
            pending,
            error,
        },
    }
}

/// Liveness probe (/health, /healthz)
pub async fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = build_health_response(&state).await;
    json_response(StatusCode::OK, &response)
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub commit_full: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// GET /version
pub fn version_info() -> Response<Full<Bytes>> {
    let response = VersionResponse {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        commit_full: option_env!("GIT_COMMIT_FULL").unwrap_or("unknown"),
        build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        service: "career-tree",
    };
    json_response(StatusCode::OK, &response)
}
