//! Dispatch rule data model.
//!
//! Rules are plain data: a match block paired with the canned response
//! returned when it fires. Tables are evaluated in declared order.

use serde::Deserialize;

/// Response descriptor produced by the dispatcher: a status code and a body.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CannedResponse {
    /// HTTP status code
    pub code: u16,
    /// Response payload
    pub body: String,
}

impl CannedResponse {
    /// Build a response from a code and a body literal
    pub fn new(code: u16, body: impl Into<String>) -> Self {
        Self {
            code,
            body: body.into(),
        }
    }

    /// Fixed response for requests refused by the method gate
    pub fn invalid_method() -> Self {
        Self::new(405, "Invalid method")
    }

    /// Fixed response when no rule matches the url
    pub fn not_found() -> Self {
        Self::new(404, "Not found")
    }
}

/// Match conditions for a single rule.
///
/// An empty block matches every request, which makes a trailing catch-all
/// rule possible in configured tables.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RuleMatch {
    /// Exact path to match. No prefixes, no patterns, no normalization.
    #[serde(default)]
    pub path: Option<String>,
    /// Header conditions. The built-in table never sets any; the field
    /// exists so configured tables can branch on headers without a new
    /// dispatcher contract.
    #[serde(default)]
    pub headers: Option<Vec<HeaderMatcher>>,
}

/// Header matching condition
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderMatcher {
    /// Header name (names compare case-insensitively)
    pub name: String,
    /// Expected value (exact match)
    #[serde(default)]
    pub exact: Option<String>,
    /// Require the header to be present (or absent, with `false`)
    #[serde(default)]
    pub present: Option<bool>,
}

/// A single dispatch rule: match conditions plus the response to return
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    /// Optional name for logs and config readability
    #[serde(default)]
    pub name: Option<String>,
    /// Match conditions
    #[serde(rename = "match", default)]
    pub match_rule: RuleMatch,
    /// Canned response returned when the rule fires
    pub respond: CannedResponse,
}

impl Rule {
    /// Exact-path rule, the only kind the built-in table uses
    pub fn exact(path: &str, code: u16, body: &str) -> Self {
        Self {
            name: None,
            match_rule: RuleMatch {
                path: Some(path.to_string()),
                headers: None,
            },
            respond: CannedResponse::new(code, body),
        }
    }
}

/// The built-in rule table, used whenever configuration supplies none
///
/// ```
/// let rules = canned::dispatch::default_rules();
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules[0].respond.body, "Main page");
/// ```
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::exact("/", 200, "Main page"),
        Rule::exact("/about", 200, "About this project"),
    ]
}

/// Validate a rule table before it is installed.
///
/// Rejects status codes outside 100..=599 and paths that do not start with
/// `/`. Request targets always start with `/`, so a relative path in a rule
/// can never match and is a config mistake.
pub fn validate_rules(rules: &[Rule]) -> Result<(), String> {
    for (index, rule) in rules.iter().enumerate() {
        let label = rule.name.as_deref().unwrap_or("unnamed");
        let code = rule.respond.code;
        if !(100..=599).contains(&code) {
            return Err(format!(
                "rule {index} ({label}): status code {code} is outside 100-599"
            ));
        }
        if let Some(path) = &rule.match_rule.path {
            if !path.starts_with('/') {
                return Err(format!(
                    "rule {index} ({label}): path '{path}' does not start with '/' and can never match"
                ));
            }
        }
    }
    Ok(())
}
