use serde::{Deserialize, Serialize};

/// Represents ways to locate an element in a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// Select using an XPath query addressing zero-or-one element
    Xpath(String),
    /// Represents an invalid selector string, with a reason.
    Invalid(String),
}

impl Selector {
    /// The selector text as passed to the page-query capability.
    pub fn expression(&self) -> &str {
        match self {
            Selector::Xpath(s) => s,
            Selector::Invalid(s) => s,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Xpath(s) => write!(f, "{s}"),
            Selector::Invalid(reason) => write!(f, "<invalid: {reason}>"),
        }
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        let s = s.trim();
        match s {
            _ if s.starts_with("xpath:") => Selector::Xpath(s["xpath:".len()..].to_string()),
            // Raw XPath: absolute paths and grouped expressions
            _ if s.starts_with('/') || s.starts_with('(') => Selector::Xpath(s.to_string()),
            "" => Selector::Invalid("empty selector".to_string()),
            _ => Selector::Invalid(format!(
                "Unknown selector format: \"{s}\". Use an 'xpath:' prefix or a raw XPath starting with '/'."
            )),
        }
    }
}

impl From<String> for Selector {
    fn from(s: String) -> Self {
        Selector::from(s.as_str())
    }
}

/// An XPath template parameterized by a 1-based row index.
///
/// The `{row}` placeholder is substituted when the template is resolved, so the
/// same sequence definition can drive any row of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorTemplate {
    template: String,
}

impl LocatorTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Substitute the row index into the template. Pure; no document access.
    pub fn resolve(&self, row: u32) -> Selector {
        Selector::from(self.template.replace("{row}", &row.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl From<&str> for LocatorTemplate {
    fn from(s: &str) -> Self {
        LocatorTemplate::new(s)
    }
}

/// Normalize a raw configured row index to the effective 1-based index.
///
/// Configs arrive from JSON, so the raw value is a float that may be missing,
/// fractional, zero, or negative; anything that is not a positive integer
/// falls back to row 1.
pub fn effective_row(raw: Option<f64>) -> u32 {
    match raw {
        Some(v) if v.is_finite() && v >= 1.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => v as u32,
        _ => 1,
    }
}
