//! canned - a fixed-rule HTTP responder.
//!
//! The core is [`dispatch::Dispatcher`]: a pure mapping from a request
//! descriptor (headers, url, method) to a canned (status, body) response,
//! driven by an ordered, first-match-wins rule table. Everything else is
//! hosting for that function: a tokio + hyper HTTP/1.1 server, layered
//! configuration, access logging in several formats, and signal-driven
//! reload and shutdown.

pub mod config;
pub mod dispatch;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
