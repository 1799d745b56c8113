//! Request dispatch module.
//!
//! The dispatcher maps a request descriptor (headers, url, method) onto a
//! canned response in three steps:
//!
//! 1. Method gate: anything but `GET`, compared byte-for-byte, is refused
//!    with `405 Invalid method` before any rule is consulted.
//! 2. Rule table: rules run in declared order, first match wins.
//! 3. Fallback: `404 Not found` when no rule fires.
//!
//! Dispatch is a pure function of its arguments and the installed table.
//! It performs no I/O and keeps no per-request state, so calls can run
//! concurrently and repeating a call always yields the same response.

mod matcher;
mod rule;

pub use rule::{default_rules, validate_rules, CannedResponse, HeaderMatcher, Rule, RuleMatch};

/// The only method the gate admits, compared case-sensitively
const ALLOWED_METHOD: &str = "GET";

/// Ordered-rule dispatcher
#[derive(Debug, Clone)]
pub struct Dispatcher {
    rules: Vec<Rule>,
}

impl Dispatcher {
    /// Build a dispatcher over an ordered rule table
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Number of rules in the table, fallbacks not counted
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Map a request descriptor to a response descriptor.
    ///
    /// `headers` is passed through to rule predicates; no built-in rule
    /// reads it. `url` is compared exactly as supplied, so `/About` or
    /// `/about/` do not hit the `/about` rule.
    ///
    /// ```
    /// use canned::dispatch::Dispatcher;
    ///
    /// let dispatcher = Dispatcher::default();
    /// assert_eq!(dispatcher.dispatch(&[], "/", "GET").code, 200);
    /// assert_eq!(dispatcher.dispatch(&[], "/", "POST").code, 405);
    /// assert_eq!(dispatcher.dispatch(&[], "/nope", "GET").code, 404);
    /// ```
    pub fn dispatch(&self, headers: &[(&str, &str)], url: &str, method: &str) -> CannedResponse {
        if method != ALLOWED_METHOD {
            return CannedResponse::invalid_method();
        }

        match matcher::find_match(&self.rules, url, headers) {
            Some(rule) => rule.respond.clone(),
            None => CannedResponse::not_found(),
        }
    }
}

impl Default for Dispatcher {
    /// Dispatcher over the built-in table
    fn default() -> Self {
        Self::new(default_rules())
    }
}
