use serde::{Deserialize, Serialize};

use crate::models::SyncRecord;
use crate::service::{RefreshOutcome, ServiceState};

/// Query string of `GET /search`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub q: Option<String>,
    pub search_property: Option<String>,
}

impl SearchParams {
    /// Collect decoded query pairs; the last `q` wins and repeated
    /// `searchProperty` values join into one comma list
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => params.q = Some(value),
                "searchProperty" => {
                    params.search_property = Some(match params.search_property.take() {
                        Some(existing) => format!("{},{}", existing, value),
                        None => value,
                    })
                }
                _ => {}
            }
        }
        params
    }
}

/// Body of `GET /status`
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    #[serde(rename = "lastSync")]
    pub last_sync: SyncRecord,
    pub manifests: Vec<String>,
}

impl From<&ServiceState> for StatusResponse {
    fn from(state: &ServiceState) -> Self {
        Self {
            last_sync: state.sync,
            manifests: state.manifests(),
        }
    }
}

/// Body of `POST /refresh`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshResponse {
    pub refresh: RefreshOutcome,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// API Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_last_query_wins() {
        let params = SearchParams::from_pairs(pairs(&[("q", "connect"), ("q", "shell")]));
        assert_eq!(params.q.as_deref(), Some("shell"));
        assert_eq!(params.search_property, None);
    }

    #[test]
    fn test_repeated_scope_joins() {
        let params = SearchParams::from_pairs(pairs(&[
            ("searchProperty", "alpha"),
            ("page", "2"),
            ("searchProperty", "beta"),
        ]));
        assert_eq!(params.q, None);
        assert_eq!(params.search_property.as_deref(), Some("alpha,beta"));
    }
}
