use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How unresolvable collection names in a search scope are treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopePolicy {
    /// Unknown names contribute no documents
    #[default]
    Lenient,
    /// Unknown names reject the whole request
    Strict,
}

impl ScopePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "lenient" => Some(ScopePolicy::Lenient),
            "strict" => Some(ScopePolicy::Strict),
            _ => None,
        }
    }
}

/// Tokenizer configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenizerConfig {
    pub lowercase: bool,
    pub remove_stopwords: bool,
    pub stem: bool,
    pub min_token_length: usize,
    pub max_token_length: usize,
    pub language: String,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            remove_stopwords: false,
            stem: false,
            min_token_length: 2,
            max_token_length: 50,
            language: "english".to_string(),
        }
    }
}

/// Per-field ranking weights
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldWeights {
    pub title: f32,
    pub headings: f32,
    pub tags: f32,
    pub text: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 10.0,
            headings: 5.0,
            tags: 75.0,
            text: 1.0,
        }
    }
}

/// Query evaluation settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchSettings {
    pub max_results: usize,
    pub max_query_length: usize,
    pub max_edit_distance: usize,
    /// Added to a document's score for each phrase occurrence
    pub phrase_boost: f32,
    pub field_weights: FieldWeights,
    pub scope_policy: ScopePolicy,
    pub tokenizer_config: TokenizerConfig,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 150,
            max_query_length: 100,
            max_edit_distance: 2,
            phrase_boost: 20.0,
            field_weights: FieldWeights::default(),
            scope_policy: ScopePolicy::Lenient,
            tokenizer_config: TokenizerConfig::default(),
        }
    }
}

impl SearchSettings {
    pub fn with_scope_policy(mut self, policy: ScopePolicy) -> Self {
        self.scope_policy = policy;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_tokenizer(mut self, tokenizer_config: TokenizerConfig) -> Self {
        self.tokenizer_config = tokenizer_config;
        self
    }
}

/// Background refresh settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshSettings {
    /// Automatic refresh interval; `None` disables periodic refresh
    pub interval_secs: Option<u64>,
    /// How long shutdown waits for an in-flight rebuild
    pub drain_timeout_ms: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: None,
            drain_timeout_ms: 30_000,
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Option<Duration> {
        self.interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

/// Top-level service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub bind_addr: String,
    /// Source specification, e.g. `dir:/srv/manifests`
    pub source: String,
    pub search: SearchSettings,
    pub refresh: RefreshSettings,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            source: "dir:./manifests".to_string(),
            search: SearchSettings::default(),
            refresh: RefreshSettings::default(),
        }
    }
}

impl ServiceConfig {
    pub fn new(bind_addr: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn with_search(mut self, search: SearchSettings) -> Self {
        self.search = search;
        self
    }

    pub fn with_refresh_interval(mut self, secs: Option<u64>) -> Self {
        self.refresh.interval_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configs() {
        let settings = SearchSettings::default();
        assert_eq!(settings.max_results, 150);
        assert_eq!(settings.max_query_length, 100);
        assert_eq!(settings.scope_policy, ScopePolicy::Lenient);

        let tokenizer_config = TokenizerConfig::default();
        assert!(tokenizer_config.lowercase);
        assert!(!tokenizer_config.remove_stopwords);
        assert!(!tokenizer_config.stem);

        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert!(config.refresh.interval().is_none());
    }

    #[test]
    fn test_scope_policy_parse() {
        assert_eq!(ScopePolicy::parse("Strict"), Some(ScopePolicy::Strict));
        assert_eq!(ScopePolicy::parse("lenient"), Some(ScopePolicy::Lenient));
        assert_eq!(ScopePolicy::parse("reject"), None);
    }

    #[test]
    fn test_service_config_builder() {
        let config = ServiceConfig::new("0.0.0.0:8080", "dir:/srv/manifests")
            .with_search(SearchSettings::default().with_scope_policy(ScopePolicy::Strict))
            .with_refresh_interval(Some(0));

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.search.scope_policy, ScopePolicy::Strict);
        // zero disables the periodic refresh
        assert!(config.refresh.interval().is_none());
    }
}
