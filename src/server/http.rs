//! HTTP server: accept loop and request routing

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::config::Args;
use crate::routes::{self, EXPLORE_PREFIX};
use crate::submission::SubmissionGateway;
use crate::tree::DatasetHandle;
use crate::types::Result;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub dataset: Arc<DatasetHandle>,
    pub gateway: SubmissionGateway,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, dataset: Arc<DatasetHandle>, gateway: SubmissionGateway) -> Self {
        Self {
            args,
            dataset,
            gateway,
            started_at: Instant::now(),
        }
    }
}

/// Serve HTTP until the listener fails to bind
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("career-tree listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { Ok::<_, Infallible>(dispatch(state, addr, req).await) }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        debug!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route one request
pub async fn dispatch<B>(state: Arc<AppState>, addr: SocketAddr, req: Request<B>) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = handle_request(&state, req, &method, &path).await;

    debug!(
        client = %addr,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Request"
    );
    response
}

async fn handle_request<B>(
    state: &Arc<AppState>,
    req: Request<B>,
    method: &Method,
    path: &str,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match (method, path) {
        (&Method::OPTIONS, _) => preflight_response(),

        (&Method::GET, "/health") | (&Method::GET, "/healthz") => {
            routes::health_check(Arc::clone(state)).await
        }
        (&Method::GET, "/version") => routes::version_info(),

        (&Method::GET, "/api/roots") => routes::handle_roots(&state.dataset.snapshot()),
        (&Method::GET, "/api/map") => routes::handle_map(&state.dataset.snapshot()),
        (&Method::GET, "/api/metadata") => {
            routes::handle_metadata(&state.dataset.snapshot(), req.uri().query())
        }
        (&Method::GET, p) if is_explore_path(p) => {
            routes::handle_explore(&state.dataset.snapshot(), p)
        }

        (&Method::POST, "/api/edit") => match read_body(req, state.args.max_body_bytes).await {
            Ok(body) => routes::handle_edit(&state.gateway, body).await,
            Err(response) => response,
        },
        (&Method::POST, "/api/suggest") => {
            match read_body(req, state.args.max_body_bytes).await {
                Ok(body) => routes::handle_suggest(&state.gateway, body).await,
                Err(response) => response,
            }
        }

        _ => not_found_response(path),
    }
}

fn is_explore_path(path: &str) -> bool {
    path == EXPLORE_PREFIX
        || path
            .strip_prefix(EXPLORE_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Collect a request body of at most `max` bytes
async fn read_body<B>(req: Request<B>, max: usize) -> std::result::Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let declared = req
        .headers()
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > max) {
        return Err(payload_too_large_response(max));
    }

    match Limited::new(req.into_body(), max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(payload_too_large_response(max))
        }
        Err(e) => {
            warn!(error = %e, "Failed to read request body");
            Err(routes::error_response(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ))
        }
    }
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    let headers = response.headers_mut();
    headers.insert("Access-Control-Allow-Origin", hyper::header::HeaderValue::from_static("*"));
    headers.insert("Access-Control-Allow-Headers", hyper::header::HeaderValue::from_static("*"));
    headers.insert(
        "Access-Control-Allow-Methods",
        hyper::header::HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    response
}

fn not_found_response(path: &str) -> Response<Full<Bytes>> {
    routes::json_response(
        StatusCode::NOT_FOUND,
        &serde_json::json!({
            "error": "Not Found",
            "path": path,
        }),
    )
}

fn payload_too_large_response(max: usize) -> Response<Full<Bytes>> {
    routes::error_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &format!("Request body exceeds {} bytes", max),
    )
}
