//! Access log entry assembly.
//!
//! Captures the request facts the log formats need before the request is
//! consumed, then finishes the entry once the dispatch outcome is known.

use std::net::SocketAddr;
use std::time::Instant;

use hyper::Request;

use crate::dispatch::CannedResponse;
use crate::logger::AccessLogEntry;

/// Half-built access log entry captured at the start of a request
pub struct AccessLogDraft {
    entry: AccessLogEntry,
    started: Instant,
}

impl AccessLogDraft {
    /// Capture request facts and start the request timer
    pub fn capture<B>(req: &Request<B>, peer_addr: SocketAddr) -> Self {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.referer = header_string(req, "referer");
        entry.user_agent = header_string(req, "user-agent");

        Self {
            entry,
            started: Instant::now(),
        }
    }

    /// Fill in the outcome fields and hand back the finished entry
    pub fn finish(mut self, outcome: &CannedResponse) -> AccessLogEntry {
        self.entry.status = outcome.code;
        self.entry.body_bytes = outcome.body.len();
        self.entry.request_time_us =
            u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX);
        self.entry
    }
}

/// HTTP version label used in log lines
fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;

    fn peer() -> SocketAddr {
        "192.168.1.1:50000".parse().unwrap()
    }

    #[test]
    fn test_capture_and_finish() {
        let req = Request::builder()
            .method("GET")
            .uri("/about?page=1")
            .header("User-Agent", "curl/8.5.0")
            .header("Referer", "https://example.com")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let draft = AccessLogDraft::capture(&req, peer());
        let entry = draft.finish(&CannedResponse::new(200, "About this project"));

        assert_eq!(entry.remote_addr, "192.168.1.1");
        assert_eq!(entry.method, "GET");
        assert_eq!(entry.path, "/about");
        assert_eq!(entry.query.as_deref(), Some("page=1"));
        assert_eq!(entry.http_version, "1.1");
        assert_eq!(entry.status, 200);
        assert_eq!(entry.body_bytes, "About this project".len());
        assert_eq!(entry.user_agent.as_deref(), Some("curl/8.5.0"));
        assert_eq!(entry.referer.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_refused_method_still_logs_faithfully() {
        let req = Request::builder()
            .method("DELETE")
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let entry =
            AccessLogDraft::capture(&req, peer()).finish(&CannedResponse::invalid_method());
        assert_eq!(entry.method, "DELETE");
        assert_eq!(entry.status, 405);
        assert_eq!(entry.body_bytes, "Invalid method".len());
    }

    #[test]
    fn test_missing_headers_stay_none() {
        let req = Request::builder()
            .method("GET")
            .uri("/")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let entry = AccessLogDraft::capture(&req, peer()).finish(&CannedResponse::not_found());
        assert!(entry.query.is_none());
        assert!(entry.referer.is_none());
        assert!(entry.user_agent.is_none());
    }
}
