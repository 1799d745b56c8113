//! HTTP protocol layer module
//!
//! Wire-level response assembly, decoupled from dispatch logic.

pub mod response;

// Re-export commonly used builders
pub use response::{build_500_response, build_dispatch_response};
