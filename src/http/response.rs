//! HTTP response building module
//!
//! Turns dispatch outcomes into wire responses, decoupled from the rules
//! that produced them.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::dispatch::CannedResponse;

/// Build the wire response for a dispatch outcome.
///
/// The body is sent verbatim with a Content-Length hyper derives from it.
/// A status code hyper cannot represent degrades to a logged 500; table
/// validation should have caught it long before this point.
pub fn build_dispatch_response(
    outcome: CannedResponse,
    content_type: &str,
    server_name: &str,
) -> Response<Full<Bytes>> {
    let Ok(status) = StatusCode::from_u16(outcome.code) else {
        crate::logger::log_error(&format!(
            "Dispatch produced unrepresentable status code {}",
            outcome.code
        ));
        return build_500_response();
    };

    Response::builder()
        .status(status)
        .header("Content-Type", content_type)
        .header("Server", server_name)
        .body(Full::new(Bytes::from(outcome.body)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_u16(), &e);
            build_500_response()
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(500)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from("500 Internal Server Error")))
        .unwrap_or_else(|e| {
            log_build_error(500, &e);
            Response::new(Full::new(Bytes::from("500 Internal Server Error")))
        })
}

/// Log response build error
fn log_build_error(status: u16, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
