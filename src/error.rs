use thiserror::Error;

/// Main error type for docsift operations
#[derive(Error, Debug)]
pub enum DocsiftError {
    #[error("Source load error: {0}")]
    SourceLoad(String),

    #[error("Malformed source '{collection}': {message}")]
    MalformedSource { collection: String, message: String },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Unknown source protocol: {0}")]
    UnknownSourceProtocol(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Refresh worker unavailable")]
    WorkerUnavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for docsift operations
pub type Result<T> = std::result::Result<T, DocsiftError>;

impl DocsiftError {
    pub fn malformed(collection: impl Into<String>, message: impl Into<String>) -> Self {
        DocsiftError::MalformedSource {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Check if this error indicates a transient failure that a later refresh may clear
    pub fn is_retriable(&self) -> bool {
        matches!(self, DocsiftError::SourceLoad(_) | DocsiftError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DocsiftError::UnknownCollection("gamma".to_string());
        assert_eq!(err.to_string(), "Unknown collection: gamma");

        let err = DocsiftError::malformed("alpha", "duplicate url https://x/a");
        assert_eq!(
            err.to_string(),
            "Malformed source 'alpha': duplicate url https://x/a"
        );
    }

    #[test]
    fn test_retriable_errors() {
        assert!(DocsiftError::SourceLoad("timeout".to_string()).is_retriable());
        assert!(DocsiftError::Io(std::io::Error::other("disk")).is_retriable());
        assert!(!DocsiftError::malformed("alpha", "bad").is_retriable());
        assert!(!DocsiftError::UnknownCollection("x".to_string()).is_retriable());
    }
}
