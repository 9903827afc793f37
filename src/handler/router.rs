//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: path validation, method and body
//! checks, dispatch to the page handlers, and access logging.

use crate::config::AppState;
use crate::handler::wiki;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::{Action, Route};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.config.logging.access_log;
    let entry = access_log.then(|| access_entry(&req, remote_addr));

    let mut response = route_request(req, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time = started.elapsed();
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(req: &Request<B>, remote_addr: Option<SocketAddr>) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(req.method().as_str(), req.uri().path());
    if let Some(addr) = remote_addr {
        entry.remote_addr = addr.ip().to_string();
    }
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// Validate the path and dispatch to the handler bound to its action
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    // Routes match the decoded path, so `/view/te%73t` is the page `test`
    let path = percent_decode_str(req.uri().path()).decode_utf8_lossy();
    let Some(Route { action, title }) = state.router.match_path(&path) else {
        logger::log_debug(&format!("No route for {path}"));
        return http::build_404_response(&path);
    };

    if let Some(resp) = check_http_method(req.method(), action) {
        return resp;
    }

    let is_head = req.method() == Method::HEAD;
    match action {
        Action::View => wiki::view(state, &title, is_head).await,
        Action::Edit => wiki::edit(state, &title, is_head).await,
        Action::Save => {
            if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
                return resp;
            }
            wiki::save(state, &title, req).await
        }
    }
}

/// Reject methods the action does not accept
fn check_http_method(method: &Method, action: Action) -> Option<Response<Full<Bytes>>> {
    let allowed = match action {
        Action::View | Action::Edit => *method == Method::GET || *method == Method::HEAD,
        Action::Save => *method == Method::POST,
    };
    if allowed {
        return None;
    }

    logger::log_warning(&format!("Method {method} not allowed for {action}"));
    Some(http::build_405_response(match action {
        Action::View | Action::Edit => "GET, HEAD",
        Action::Save => "POST",
    }))
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    match content_length.to_str().ok()?.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        _ => None,
    }
}
