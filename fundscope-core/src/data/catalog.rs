//! Category catalogs: per-category fund lists.
//!
//! Each category is stored as its own JSON file (`{prefix}{CATEGORY}.json`)
//! holding an object keyed by the category name whose value is an array of
//! fund entries. Only the `cnpj` field of each entry is used.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::domain::{CatalogEntry, Category, FundId};

/// Catalog loading failures. Any of these aborts the run.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("catalog {path} has no '{category}' array")]
    MissingCategory { path: PathBuf, category: Category },

    #[error("catalog {path}: entry {index} has no usable 'cnpj' field")]
    MissingIdentifier { path: PathBuf, index: usize },
}

/// Path of the catalog file for a category.
pub fn catalog_path(dir: &Path, prefix: &str, category: Category) -> PathBuf {
    dir.join(format!("{prefix}{}.json", category.as_str()))
}

/// Load every entry of one category catalog, in file order.
pub fn load_category(path: &Path, category: Category) -> Result<Vec<CatalogEntry>, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_category(&content, category, path)
}

/// Parse a category catalog from its JSON text. `path` is only used in errors.
pub fn parse_category(
    content: &str,
    category: Category,
    path: &Path,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    let root: Value = serde_json::from_str(content).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let items = root
        .get(category.as_str())
        .and_then(Value::as_array)
        .ok_or_else(|| CatalogError::MissingCategory {
            path: path.to_path_buf(),
            category,
        })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let raw = match item.get("cnpj") {
                Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(CatalogError::MissingIdentifier {
                        path: path.to_path_buf(),
                        index,
                    })
                }
            };
            Ok(CatalogEntry {
                identifier: FundId::from_formatted(&raw),
                category,
            })
        })
        .collect()
}

/// Load and concatenate the catalogs of all given categories.
///
/// Order is category order, then file order. Identifiers listed under more
/// than one category appear once per category.
pub fn load_catalogs(
    dir: &Path,
    prefix: &str,
    categories: &[Category],
) -> Result<Vec<CatalogEntry>, CatalogError> {
    let mut entries = Vec::new();
    for &category in categories {
        let path = catalog_path(dir, prefix, category);
        let loaded = load_category(&path, category)?;
        tracing::debug!(%category, count = loaded.len(), path = %path.display(), "loaded catalog");
        entries.extend(loaded);
    }
    Ok(entries)
}
