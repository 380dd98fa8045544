//! Value and diagnostics types shared by the provider seam
//!
//! Configuration and state travel between the host and the provider as maps
//! of attribute name to [`Dynamic`] value.

use std::collections::HashMap;

/// Dynamic represents attribute values that can be of any type.
/// All numbers are f64 to match Terraform's number type.
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Dynamic>),
    Map(HashMap<String, Dynamic>),
}

impl Dynamic {
    pub fn as_string(&self) -> Option<&String> {
        match self {
            Dynamic::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Dynamic::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Dynamic::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Number narrowed to an integer, for the numeric ids and counters the
    /// remote API works in.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().map(|n| n as i64)
    }

    pub fn as_list(&self) -> Option<&Vec<Dynamic>> {
        match self {
            Dynamic::List(l) => Some(l),
            _ => None,
        }
    }
}

/// Declarative configuration supplied by the host for one resource block.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub values: HashMap<String, Dynamic>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_string()).map(|s| s.as_str())
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or(default).to_string()
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(|v| v.as_i64())
    }

    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.i64(key).unwrap_or(default)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(|v| v.as_bool())
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.bool(key).unwrap_or(default)
    }

    pub fn list(&self, key: &str) -> Option<&Vec<Dynamic>> {
        self.values.get(key).and_then(|v| v.as_list())
    }
}

/// Persisted state for one resource instance, refreshed from remote truth
/// on every read.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub values: HashMap<String, Dynamic>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Dynamic) {
        self.values.insert(key.into(), value);
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_string()).map(|s| s.as_str())
    }

    pub fn i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(|v| v.as_i64())
    }

    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.i64(key).unwrap_or(default)
    }

    pub fn list(&self, key: &str) -> Option<&Vec<Dynamic>> {
        self.values.get(key).and_then(|v| v.as_list())
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: Option<String>,
}

/// Errors and warnings surfaced to the host alongside an operation result.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.errors.push(Diagnostic {
            summary: summary.into(),
            detail: detail.map(Into::into),
        });
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: Option<impl Into<String>>) {
        self.warnings.push(Diagnostic {
            summary: summary.into(),
            detail: detail.map(Into::into),
        });
    }
}
