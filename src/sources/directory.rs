use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use super::SourceLoader;
use crate::error::{DocsiftError, Result};
use crate::models::{CollectionSource, RawDocument};

/// On-disk manifest layout; the collection id comes from the file name
#[derive(Debug, Deserialize)]
struct ManifestBody {
    url: String,
    #[serde(rename = "includeInGlobalSearch", default = "default_true")]
    include_in_global_search: bool,
    #[serde(default)]
    aliases: Vec<String>,
    documents: Vec<RawDocument>,
}

fn default_true() -> bool {
    true
}

/// Loads every `*.json` manifest below a directory
pub struct DirectorySourceLoader {
    root: PathBuf,
}

impl DirectorySourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load_manifest(path: &Path) -> Result<CollectionSource> {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        let body = fs::read_to_string(path).map_err(|e| {
            DocsiftError::SourceLoad(format!("Failed to read manifest {}: {}", path.display(), e))
        })?;
        let manifest: ManifestBody = serde_json::from_str(&body)
            .map_err(|e| DocsiftError::malformed(&id, format!("{}: {}", path.display(), e)))?;

        Ok(CollectionSource {
            id,
            aliases: manifest.aliases,
            base_url: manifest.url,
            include_in_global_search: manifest.include_in_global_search,
            documents: manifest.documents,
        })
    }
}

impl SourceLoader for DirectorySourceLoader {
    fn load(&self) -> Result<Vec<CollectionSource>> {
        if !self.root.is_dir() {
            return Err(DocsiftError::SourceLoad(format!(
                "Manifest directory not found: {}",
                self.root.display()
            )));
        }

        let mut sources = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry.map_err(|e| {
                DocsiftError::SourceLoad(format!(
                    "Error scanning {}: {}",
                    self.root.display(),
                    e
                ))
            })?;

            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map(|ext| ext != "json").unwrap_or(true)
            {
                continue;
            }

            let source = Self::load_manifest(path)?;
            debug!(
                collection = %source.id,
                documents = source.documents.len(),
                path = %path.display(),
                "Loaded manifest"
            );
            sources.push(source);
        }

        Ok(sources)
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.root.display())
    }
}
