//! Request handler module
//!
//! The hyper-facing adapter: reduces an incoming request to the (headers,
//! url, method) triple the dispatcher consumes, runs the dispatcher, and
//! converts the outcome back into a wire response. No routing decisions
//! are made here; the dispatcher owns all of them.

mod access;

pub use access::AccessLogDraft;

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};

use crate::config::AppState;
use crate::http::build_dispatch_response;
use crate::logger;

/// Main entry point for request handling.
///
/// Generic over the body type: dispatch never reads request bodies, so a
/// body of any shape (or none at all, in tests) serves.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let access_log = state.cached_access_log.load(Ordering::Relaxed);

    // Capture request facts before dispatch so the timer covers it
    let draft = access_log.then(|| AccessLogDraft::capture(&req, peer_addr));

    let (show_headers, log_format) = {
        let logging = state.logging.read().await;
        (logging.show_headers, logging.access_log_format.clone())
    };
    logger::log_headers_count(req.headers().len(), show_headers);

    // Header pairs for rule predicates. Values that are not valid UTF-8
    // cannot participate in string comparisons and are skipped.
    let headers: Vec<(&str, &str)> = req
        .headers()
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
        .collect();

    let dispatcher = { Arc::clone(&*state.dispatcher.read().await) };
    let outcome = dispatcher.dispatch(&headers, req.uri().path(), req.method().as_str());

    if let Some(draft) = draft {
        let entry = draft.finish(&outcome);
        logger::log_access(&entry, &log_format);
    }

    Ok(build_dispatch_response(
        outcome,
        &state.config.http.content_type,
        &state.config.http.server_name,
    ))
}
