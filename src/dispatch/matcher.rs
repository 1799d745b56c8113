//! Rule evaluation.
//!
//! Walks a rule table in declared order and returns the first rule whose
//! conditions all hold. Path comparison is byte-for-byte: no trailing-slash
//! folding, no percent-decoding, no case folding.

use super::rule::{HeaderMatcher, Rule, RuleMatch};

/// Find the first rule matching the given url and headers
pub fn find_match<'a>(
    rules: &'a [Rule],
    url: &str,
    headers: &[(&str, &str)],
) -> Option<&'a Rule> {
    rules
        .iter()
        .find(|rule| matches_rule(&rule.match_rule, url, headers))
}

/// Check whether a match block accepts the given url and headers
fn matches_rule(rule: &RuleMatch, url: &str, headers: &[(&str, &str)]) -> bool {
    if !match_path(rule, url) {
        return false;
    }

    if let Some(matchers) = &rule.headers {
        if !match_headers(matchers, headers) {
            return false;
        }
    }

    true
}

/// Check the path condition; a block without one matches every url
pub fn match_path(rule: &RuleMatch, url: &str) -> bool {
    match &rule.path {
        Some(exact) => url == exact,
        None => true,
    }
}

/// All header matchers must be satisfied
fn match_headers(matchers: &[HeaderMatcher], headers: &[(&str, &str)]) -> bool {
    matchers
        .iter()
        .all(|matcher| match_single_header(matcher, headers))
}

/// Check one header condition against the request's header pairs
fn match_single_header(matcher: &HeaderMatcher, headers: &[(&str, &str)]) -> bool {
    let header_value = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&matcher.name))
        .map(|(_, value)| *value);

    if let Some(required) = matcher.present {
        if header_value.is_some() != required {
            return false;
        }
        if matcher.exact.is_none() {
            return true;
        }
    }

    let Some(value) = header_value else {
        return false;
    };

    match &matcher.exact {
        Some(exact) => value == exact,
        None => true,
    }
}
