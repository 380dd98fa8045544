//! Shared types for the Tower/AWX REST API

use serde::Deserialize;

/// Envelope returned by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Collection and object paths for one API resource kind.
pub trait AwxApiResource {
    /// Collection path with trailing slash, e.g. `/api/v2/projects/`.
    fn collection_path() -> &'static str;

    fn object_path(id: i64) -> String {
        format!("{}{}/", Self::collection_path(), id)
    }
}

/// Query-string builder for list filters.
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}
