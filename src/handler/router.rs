//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method checks, route matching,
//! dispatch, and the access log line for each request.

use crate::config::AppState;
use crate::handler::{attach, files, public_url};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

const ATTACH_PATH: &str = "/attach";
const LIVENESS_PATH: &str = "/healthz";
const READINESS_PATH: &str = "/readyz";

/// Request details the read-only handlers need
pub struct RequestContext {
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let started = Instant::now();
    let entry = state
        .access_log_enabled()
        .then(|| access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert(SERVER, server);
    }
    if state.config.http.enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}

/// Route request based on method and path
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if method == Method::OPTIONS {
        return http::build_options_response(state.config.http.enable_cors);
    }

    // 1. Upload
    if path == ATTACH_PATH {
        if method != Method::POST {
            return http::build_405_response("POST, OPTIONS");
        }
        return attach::handle_attach(req, state).await;
    }

    let is_read = method == Method::GET || method == Method::HEAD;

    // 2. Health probes
    if path == LIVENESS_PATH || path == READINESS_PATH {
        if !is_read {
            return http::build_405_response("GET, HEAD, OPTIONS");
        }
        if path == READINESS_PATH && !store_ready(state).await {
            return http::build_health_response(StatusCode::SERVICE_UNAVAILABLE, "storage unavailable");
        }
        return http::build_health_response(StatusCode::OK, "ok");
    }

    // 3. Stored files
    let prefix = state.config.public_prefix();
    let Some(rest) = path.strip_prefix(prefix) else {
        return http::build_404_response();
    };
    if !rest.is_empty() && !rest.starts_with('/') {
        return http::build_404_response();
    }
    if !is_read {
        return http::build_405_response("GET, HEAD, OPTIONS");
    }

    let name = rest.trim_start_matches('/');
    if name.is_empty() {
        let (parts, _) = req.into_parts();
        let base = public_url::base_url(&parts, &state.config);
        return files::list_files(state, &base).await;
    }

    let Some(name) = public_url::decode_segment(name) else {
        return http::build_404_response();
    };
    let ctx = RequestContext {
        is_head: method == Method::HEAD,
        if_none_match: req
            .headers()
            .get("if-none-match")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
    };
    files::serve_stored(&ctx, state, &name).await
}

async fn store_ready(state: &AppState) -> bool {
    match tokio::fs::metadata(state.store.dir()).await {
        Ok(meta) => meta.is_dir(),
        Err(e) => {
            logger::log_warning(&format!(
                "Readiness check failed for '{}': {e}",
                state.store.dir().display()
            ));
            false
        }
    }
}
