use serde::{Deserialize, Serialize};

/// Position of a document inside its collection's store
pub type DocumentId = u32;

/// Document as delivered by a manifest source, before indexing
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawDocument {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub preview: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub tags: String,
}

impl RawDocument {
    pub fn new(slug: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = preview.into();
        self
    }

    pub fn with_headings(mut self, headings: Vec<String>) -> Self {
        self.headings = headings;
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }
}

/// One collection's raw input to the index builder
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectionSource {
    pub id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub base_url: String,
    #[serde(default = "default_include_in_global_search")]
    pub include_in_global_search: bool,
    pub documents: Vec<RawDocument>,
}

fn default_include_in_global_search() -> bool {
    true
}

impl CollectionSource {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            aliases: Vec::new(),
            base_url: base_url.into(),
            include_in_global_search: true,
            documents: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_document(mut self, document: RawDocument) -> Self {
        self.documents.push(document);
        self
    }

    pub fn excluded_from_global_search(mut self) -> Self {
        self.include_in_global_search = false;
        self
    }
}

/// Indexed, immutable document record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub title: String,
    pub preview: String,
    pub url: String,
    /// Lowercased title, headings, tags and body used for phrase matching
    #[serde(skip)]
    pub searchable_text: String,
}

/// Join a manifest base url and a document slug, trimming trailing slashes from both
pub fn join_url(base_url: &str, slug: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let slug = slug.trim_end_matches('/').trim_start_matches('/');
    if slug.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_trims_slashes() {
        assert_eq!(
            join_url("https://docs.example.com/alpha/", "connect/"),
            "https://docs.example.com/alpha/connect"
        );
        assert_eq!(
            join_url("https://docs.example.com/alpha", "/a/b//"),
            "https://docs.example.com/alpha/a/b"
        );
        assert_eq!(
            join_url("https://docs.example.com/alpha//", ""),
            "https://docs.example.com/alpha"
        );
    }

    #[test]
    fn test_collection_source_defaults() {
        let json = r#"{"id":"alpha","base_url":"https://x","documents":[]}"#;
        let source: CollectionSource = serde_json::from_str(json).unwrap();
        assert!(source.include_in_global_search);
        assert!(source.aliases.is_empty());
    }

    #[test]
    fn test_raw_document_builder() {
        let doc = RawDocument::new("intro", "Intro", "body text")
            .with_preview("preview")
            .with_tags("setup install");
        assert_eq!(doc.slug, "intro");
        assert_eq!(doc.preview, "preview");
        assert_eq!(doc.tags, "setup install");
        assert!(doc.headings.is_empty());
    }
}
