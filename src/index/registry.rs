use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::ScopePolicy;
use crate::error::{DocsiftError, Result};

#[derive(Clone, Debug)]
struct CollectionEntry {
    aliases: Vec<String>,
    include_in_global_search: bool,
}

/// Maps canonical collection ids and their aliases
///
/// Canonical ids and aliases share a single namespace: a name resolves to at
/// most one collection.
#[derive(Clone, Debug, Default)]
pub struct CollectionRegistry {
    collections: BTreeMap<String, CollectionEntry>,
    aliases: HashMap<String, String>,
}

/// Resolved set of collections a query runs against
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    /// Canonical ids, sorted and deduplicated
    pub collections: Vec<String>,
    /// Names that matched nothing (only populated under the lenient policy)
    pub unresolved: Vec<String>,
}

impl Scope {
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection and its aliases
    pub fn register(
        &mut self,
        id: &str,
        aliases: &[String],
        include_in_global_search: bool,
    ) -> Result<()> {
        if id.trim().is_empty() {
            return Err(DocsiftError::malformed(id, "collection id must not be empty"));
        }
        if self.collections.contains_key(id) {
            return Err(DocsiftError::malformed(id, "duplicate collection id"));
        }
        if let Some(owner) = self.aliases.get(id) {
            return Err(DocsiftError::malformed(
                id,
                format!("collection id is already an alias of '{}'", owner),
            ));
        }

        let mut accepted = Vec::new();
        for alias in aliases {
            if alias.trim().is_empty() {
                return Err(DocsiftError::malformed(id, "alias must not be empty"));
            }
            if alias == id || accepted.contains(alias) {
                continue;
            }
            if self.collections.contains_key(alias) {
                return Err(DocsiftError::malformed(
                    id,
                    format!("alias '{}' collides with a collection id", alias),
                ));
            }
            if let Some(owner) = self.aliases.get(alias) {
                return Err(DocsiftError::malformed(
                    id,
                    format!("alias '{}' is already used by '{}'", alias, owner),
                ));
            }
            accepted.push(alias.clone());
        }

        for alias in &accepted {
            self.aliases.insert(alias.clone(), id.to_string());
        }
        self.collections.insert(
            id.to_string(),
            CollectionEntry {
                aliases: accepted,
                include_in_global_search,
            },
        );
        Ok(())
    }

    /// Canonical id for a name or alias
    pub fn resolve(&self, name: &str) -> Option<&str> {
        if let Some((id, _)) = self.collections.get_key_value(name) {
            return Some(id.as_str());
        }
        self.aliases.get(name).map(String::as_str)
    }

    /// Every canonical id, in sorted order
    pub fn list_collections(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) fn aliases_of(&self, id: &str) -> &[String] {
        self.collections
            .get(id)
            .map(|entry| entry.aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Collections searched when the caller does not name any
    pub fn default_scope(&self) -> Vec<String> {
        self.collections
            .iter()
            .filter(|(_, entry)| entry.include_in_global_search)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Resolve a comma-separated scope parameter
    ///
    /// An absent or blank parameter means the default scope. Names are
    /// trimmed and resolved through aliases; duplicates collapse.
    pub fn resolve_scope(&self, raw: Option<&str>, policy: ScopePolicy) -> Result<Scope> {
        let names: Vec<&str> = raw
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if names.is_empty() {
            return Ok(Scope {
                collections: self.default_scope(),
                unresolved: Vec::new(),
            });
        }

        let mut collections = BTreeSet::new();
        let mut unresolved = Vec::new();
        for name in names {
            match self.resolve(name) {
                Some(id) => {
                    collections.insert(id.to_string());
                }
                None => match policy {
                    ScopePolicy::Strict => {
                        return Err(DocsiftError::UnknownCollection(name.to_string()))
                    }
                    ScopePolicy::Lenient => unresolved.push(name.to_string()),
                },
            }
        }

        Ok(Scope {
            collections: collections.into_iter().collect(),
            unresolved,
        })
    }
}
