//! Content stores - discover and read raw content units

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::error::ContentError;

/// Identifier of a unit inside a store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentId {
    /// Slug derived from the file name without extension
    pub slug: String,
    /// Location relative to the store root, used in diagnostics
    pub source: String,
}

/// One raw document produced by a scan
#[derive(Debug, Clone)]
pub struct ContentUnit {
    pub slug: String,
    pub source: String,
    pub raw: String,
}

/// Units found by [`ContentStore::list`]
#[derive(Debug, Default)]
pub struct Listing {
    pub ids: Vec<ContentId>,
    /// Entries that looked like units but could not be listed
    pub rejected: Vec<Rejected>,
}

/// A read-only source of content units
///
/// `list` must be deterministic: the same store contents yield the same
/// identifiers in the same order.
pub trait ContentStore: Send + Sync {
    /// List every unit currently present
    fn list(&self) -> Result<Listing, ContentError>;

    /// Read one unit's raw text
    fn read(&self, id: &ContentId) -> Result<String, ContentError>;
}

/// Store backed by a directory of markdown files
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Path relative to the root, for diagnostics
    fn source_of(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

impl ContentStore for FsContentStore {
    fn list(&self) -> Result<Listing, ContentError> {
        if !self.root.is_dir() {
            return Err(ContentError::RootNotFound(self.root.clone()));
        }

        let mut listing = Listing::default();

        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e.file_name().to_str()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // Dangling links and unreadable directories; other files are not content
                    if let Some(path) = e.path() {
                        let ignored = is_ignored(path.file_name().and_then(|n| n.to_str()));
                        if ignored || (path.extension().is_some() && !is_markdown_file(path)) {
                            tracing::debug!("Skipping unreadable entry {:?}: {}", path, e);
                            continue;
                        }
                    }
                    let source = e
                        .path()
                        .map(|path| self.source_of(path))
                        .unwrap_or_default();
                    tracing::warn!("Skipping unreadable entry {:?}: {}", source, e);
                    listing.rejected.push(Rejected {
                        source,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown_file(path) {
                continue;
            }

            let source = self.source_of(path);
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("Skipping {:?}: file name is not valid UTF-8", path);
                listing.rejected.push(Rejected {
                    source,
                    reason: "file name is not valid UTF-8".to_string(),
                });
                continue;
            };

            listing.ids.push(ContentId {
                slug: slug.to_string(),
                source,
            });
        }

        Ok(listing)
    }

    fn read(&self, id: &ContentId) -> Result<String, ContentError> {
        let path = self.root.join(&id.source);
        fs::read_to_string(&path).map_err(|e| ContentError::io(path, e))
    }
}

/// Store backed by an in-memory map, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    units: IndexMap<String, String>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit under `source`; the slug is its stem
    pub fn insert(&mut self, source: impl Into<String>, raw: impl Into<String>) {
        self.units.insert(source.into(), raw.into());
    }

    pub fn with(mut self, source: impl Into<String>, raw: impl Into<String>) -> Self {
        self.insert(source, raw);
        self
    }
}

impl ContentStore for MemoryContentStore {
    fn list(&self) -> Result<Listing, ContentError> {
        let ids = self
            .units
            .keys()
            .map(|source| ContentId {
                slug: Path::new(source)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(source)
                    .to_string(),
                source: source.clone(),
            })
            .collect();
        Ok(Listing {
            ids,
            rejected: Vec::new(),
        })
    }

    fn read(&self, id: &ContentId) -> Result<String, ContentError> {
        self.units
            .get(&id.source)
            .cloned()
            .ok_or_else(|| ContentError::UnitNotFound(id.source.clone()))
    }
}

/// A unit that could not be used, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejected {
    pub source: String,
    pub reason: String,
}

/// Result of scanning a store
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Units in discovery order, one per slug
    pub units: Vec<ContentUnit>,
    /// Units that could not be read
    pub unreadable: Vec<Rejected>,
    /// Units dropped because a later unit claimed the same slug
    pub collisions: Vec<Rejected>,
}

/// Read every unit of a store
///
/// A missing root aborts the scan. Unreadable units are skipped. When two
/// units share a slug the last-discovered one wins and takes the position
/// of the later unit in discovery order.
pub fn scan(store: &dyn ContentStore) -> Result<ScanReport, ContentError> {
    let listing = store.list()?;
    let mut report = ScanReport {
        unreadable: listing.rejected,
        ..Default::default()
    };
    let mut by_slug: IndexMap<String, ContentUnit> = IndexMap::with_capacity(listing.ids.len());

    for id in listing.ids {
        let raw = match store.read(&id) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", id.source, e);
                report.unreadable.push(Rejected {
                    source: id.source,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let unit = ContentUnit {
            slug: id.slug,
            source: id.source,
            raw,
        };

        if let Some(previous) = by_slug.shift_remove(&unit.slug) {
            tracing::warn!(
                "Slug `{}` is used by both {} and {}; keeping {}",
                unit.slug,
                previous.source,
                unit.source,
                unit.source
            );
            report.collisions.push(Rejected {
                source: previous.source,
                reason: format!("slug `{}` also claimed by {}", unit.slug, unit.source),
            });
        }
        by_slug.insert(unit.slug.clone(), unit);
    }

    report.units = by_slug.into_values().collect();
    tracing::debug!(
        "Scanned {} units ({} unreadable, {} collisions)",
        report.units.len(),
        report.unreadable.len(),
        report.collisions.len()
    );

    Ok(report)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Hidden and underscore-prefixed entries are not content
///
/// Names that are not valid UTF-8 pass, so the listing can report them.
fn is_ignored(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.starts_with('.') || n.starts_with('_'))
}
