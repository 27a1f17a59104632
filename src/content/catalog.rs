//! Exercise catalog derived from the archive layout.
//!
//! Every `<EXERCISE_BASE><name>.html` entry is one exercise. The catalog is a
//! pure function of the archive; access policy is applied later by callers.

use std::collections::BTreeSet;
use std::io::{Read, Seek};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use zip::ZipArchive;

use super::archive::{ArchiveError, ArchiveSource, ArchiveVersion};
use super::whitelist::WhitelistSource;
use crate::config::EXERCISE_BASE;

/// Exercise names found under the base prefix, with `.html` stripped.
pub fn list_exercise_names<R: Read + Seek>(archive: &ZipArchive<R>) -> BTreeSet<String> {
    archive
        .file_names()
        .filter_map(exercise_name_from_path)
        .collect()
}

/// Map an archive path to an exercise name, if it lies under the base prefix.
pub fn exercise_name_from_path(path: &str) -> Option<String> {
    let relative = path.strip_prefix(EXERCISE_BASE)?;
    if relative.is_empty() {
        return None;
    }
    Some(relative.strip_suffix(".html").unwrap_or(relative).to_string())
}

/// Human caption for an exercise name.
pub fn caption(name: &str) -> String {
    name.replace('_', " ")
}

/// One entry of the author-facing exercise picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionItem {
    pub name: String,
    pub label: String,
}

/// Immutable snapshot of the exercises in one archive version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseCatalog {
    names: BTreeSet<String>,
}

impl ExerciseCatalog {
    pub fn from_names(names: BTreeSet<String>) -> Self {
        Self { names }
    }

    pub fn from_archive(source: &ArchiveSource) -> Result<Self, ArchiveError> {
        let archive = source.open()?;
        Ok(Self::from_names(list_exercise_names(&archive)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Sorted, whitelist-filtered picker entries labelled `#<n>: <caption>`.
    pub fn selection_items<W: WhitelistSource + ?Sized>(
        &self,
        whitelist: &W,
    ) -> rusqlite::Result<Vec<SelectionItem>> {
        let raw = whitelist.whitelist_raw()?;
        let allowed = super::whitelist::Whitelist::parse(&raw);

        let items: Vec<SelectionItem> = self
            .names
            .iter()
            .filter(|name| allowed.allows(name))
            .enumerate()
            .map(|(i, name)| SelectionItem {
                name: name.clone(),
                label: format!("#{}: {}", i + 1, caption(name)),
            })
            .collect();
        Ok(items)
    }
}

/// Catalog snapshots keyed by archive version.
///
/// The bundled archive rarely changes within a deployment, so the zip
/// directory is scanned only when the file on disk changes.
#[derive(Debug, Default)]
pub struct CatalogCache {
    cached: Mutex<Option<(ArchiveVersion, Arc<ExerciseCatalog>)>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, source: &ArchiveSource) -> Result<Arc<ExerciseCatalog>, ArchiveError> {
        let version = source.version()?;

        if let Ok(guard) = self.cached.lock() {
            if let Some((cached_version, catalog)) = guard.as_ref() {
                if *cached_version == version {
                    return Ok(Arc::clone(catalog));
                }
            }
        }

        let catalog = crate::profile_scope!("catalog_scan", { ExerciseCatalog::from_archive(source) });
        let catalog = Arc::new(catalog?);
        tracing::debug!(
            "Scanned exercise archive {}: {} exercises",
            source.path().display(),
            catalog.len()
        );

        if let Ok(mut guard) = self.cached.lock() {
            *guard = Some((version, Arc::clone(&catalog)));
        }
        Ok(catalog)
    }
}
