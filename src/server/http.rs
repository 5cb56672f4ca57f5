//! HTTP server for the record book
//!
//! One hyper http1 connection task per client. Bodies are read in full, up
//! to [`MAX_BODY_BYTES`], before the request reaches the router.

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::header::HeaderValue;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::db::Stores;
use crate::routes::{self, response::apply_cors, ApiRequest, ApiResponse};
use crate::services::{UpcClient, UpcConfig};
use crate::types::RecordError;

/// Largest request body accepted
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How long shutdown waits for open connections to finish
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Bearer token validator
    pub jwt: JwtValidator,
    /// One repository per entity
    pub stores: Stores,
    /// UPC lookup client
    pub upc: UpcClient,
    /// Server start, for uptime
    pub started: Instant,
    cors_origin: HeaderValue,
}

impl AppState {
    pub fn new(args: Args, stores: Stores) -> Result<Self, RecordError> {
        let jwt = args.jwt_validator()?;
        let upc = UpcClient::new(UpcConfig {
            api_url: args.upc_api_url.clone(),
            api_key: args.upc_api_key.clone(),
            ..Default::default()
        });
        let cors_origin = HeaderValue::from_str(&args.cors_origin).map_err(|_| {
            RecordError::Config(format!("invalid CORS_ORIGIN: {}", args.cors_origin))
        })?;

        Ok(Self {
            args,
            jwt,
            stores,
            upc,
            started: Instant::now(),
            cors_origin,
        })
    }

    /// Dispatch under the request timeout and stamp CORS headers
    pub async fn respond(&self, req: ApiRequest) -> ApiResponse {
        let timeout = self.args.request_timeout();
        let mut response = match tokio::time::timeout(timeout, routes::dispatch(self, req)).await {
            Ok(response) => response,
            Err(_) => {
                warn!(timeout_ms = self.args.request_timeout_ms, "request timed out");
                routes::error_response(RecordError::Timeout)
            }
        };
        apply_cors(&mut response, &self.cors_origin);
        response
    }
}

/// Start the HTTP server and run until Ctrl-C or SIGTERM
pub async fn run(state: Arc<AppState>) -> Result<(), RecordError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Record book listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - built-in JWT secret accepted");
    }

    let graceful = GracefulShutdown::new();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    let io = TokioIo::new(stream);
                    let state = Arc::clone(&state);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    let conn = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service);
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        if let Err(err) = conn.await {
                            error!("Error serving connection from {}: {:?}", addr, err);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                }
            },
            _ = &mut shutdown => {
                info!("Shutdown signal received, no longer accepting connections");
                break;
            }
        }
    }

    tokio::select! {
        _ = graceful.shutdown() => info!("All connections closed"),
        _ = tokio::time::sleep(SHUTDOWN_GRACE) => {
            warn!("Timed out waiting for connections to close")
        }
    }

    Ok(())
}

/// Collect the request body and hand the request to the router
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    info!("[{}] {} {}", addr, method, path);

    let response = match collect_body(body, MAX_BODY_BYTES).await {
        Ok(bytes) => state.respond(ApiRequest::from_parts(parts, bytes)).await,
        Err(e) => {
            warn!(peer = %addr, "rejected request body: {}", e);
            let mut response = routes::error_response(e);
            apply_cors(&mut response, &state.cors_origin);
            response
        }
    };

    debug!(
        peer = %addr,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request complete"
    );

    Ok(response)
}

/// Read the whole body; more than `limit` bytes is a 413
async fn collect_body<B>(body: B, limit: usize) -> Result<Bytes, RecordError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(RecordError::PayloadTooLarge(format!(
            "request body exceeds {limit} bytes"
        ))),
        Err(e) => Err(RecordError::Validation(format!(
            "failed to read request body: {e}"
        ))),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
