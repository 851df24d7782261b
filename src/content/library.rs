//! Post library - lazily built, atomically reloadable post index

use once_cell::sync::OnceCell;
use std::sync::{Arc, PoisonError, RwLock};

use super::error::ContentError;
use super::frontmatter::{parse_unit, MetadataDefaults};
use super::index::PostIndex;
use super::post::Post;
use super::store::{scan, ContentStore, Rejected};

/// Outcome of one index build
#[derive(Debug, Default)]
pub struct BuildReport {
    pub posts: usize,
    /// Units excluded because they could not be read or parsed
    pub rejected: Vec<Rejected>,
    /// Units dropped by slug collisions
    pub collisions: Vec<Rejected>,
}

/// Build a fresh index from a store
pub fn build_index(
    store: &dyn ContentStore,
    defaults: &MetadataDefaults,
) -> Result<(PostIndex, BuildReport), ContentError> {
    let scanned = scan(store)?;
    let mut report = BuildReport {
        rejected: scanned.unreadable,
        collisions: scanned.collisions,
        ..Default::default()
    };

    let mut posts = Vec::with_capacity(scanned.units.len());
    for unit in scanned.units {
        match parse_unit(&unit.raw, defaults) {
            Ok((meta, body)) => {
                tracing::debug!("Parsed {} ({})", unit.slug, unit.source);
                posts.push(Post::new(unit.slug, unit.source, meta, body));
            }
            Err(e) => {
                tracing::warn!("Excluding {}: {}", unit.source, e);
                report.rejected.push(Rejected {
                    source: unit.source,
                    reason: e.to_string(),
                });
            }
        }
    }

    report.posts = posts.len();
    Ok((PostIndex::build(posts), report))
}

/// Query surface over the current post index
///
/// The index is built on first access. Concurrent first callers block on a
/// single build and all observe its result. [`PostLibrary::reload`] swaps in
/// a complete new index; readers keep whatever snapshot they already hold.
pub struct PostLibrary {
    store: Box<dyn ContentStore>,
    defaults: MetadataDefaults,
    current: OnceCell<RwLock<Arc<PostIndex>>>,
}

impl PostLibrary {
    pub fn new(store: impl ContentStore + 'static, defaults: MetadataDefaults) -> Self {
        Self {
            store: Box::new(store),
            defaults,
            current: OnceCell::new(),
        }
    }

    /// Current index, building it if this is the first access
    ///
    /// A failed first build is not cached; the next call tries again.
    pub fn snapshot(&self) -> Result<Arc<PostIndex>, ContentError> {
        let cell = self.current.get_or_try_init(|| {
            let index = self.build()?;
            Ok::<_, ContentError>(RwLock::new(Arc::new(index)))
        })?;
        let guard = cell.read().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(&*guard))
    }

    /// Rebuild from the store and swap the result in whole
    ///
    /// On failure the previous index stays in place.
    pub fn reload(&self) -> Result<Arc<PostIndex>, ContentError> {
        let fresh = Arc::new(self.build()?);

        // A concurrent first build may win the cell; ours still replaces it
        let cell = self.current.get_or_init(|| RwLock::new(Arc::clone(&fresh)));
        let mut guard = cell.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::clone(&fresh);

        Ok(fresh)
    }

    /// Build without installing; also reports excluded units
    pub fn check(&self) -> Result<(PostIndex, BuildReport), ContentError> {
        build_index(self.store.as_ref(), &self.defaults)
    }

    fn build(&self) -> Result<PostIndex, ContentError> {
        let start = std::time::Instant::now();
        let (index, report) = build_index(self.store.as_ref(), &self.defaults)?;
        tracing::info!(
            "Indexed {} posts ({} excluded, {} collisions) in {:.2}ms",
            report.posts,
            report.rejected.len(),
            report.collisions.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(index)
    }

    /// All posts in canonical order
    pub fn get_all(&self) -> Result<Vec<Post>, ContentError> {
        Ok(self.snapshot()?.posts().to_vec())
    }

    pub fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, ContentError> {
        Ok(self.snapshot()?.get(slug).cloned())
    }

    pub fn get_by_category(&self, category: &str) -> Result<Vec<Post>, ContentError> {
        Ok(self
            .snapshot()?
            .by_category(category)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Categories with post counts, in order of first appearance
    pub fn list_categories(&self) -> Result<Vec<(String, usize)>, ContentError> {
        Ok(self
            .snapshot()?
            .categories()
            .map(|(name, count)| (name.to_string(), count))
            .collect())
    }

    /// Posts grouped by year, newest year first
    pub fn archive(&self) -> Result<Vec<(i32, Vec<Post>)>, ContentError> {
        Ok(self
            .snapshot()?
            .archive()
            .into_iter()
            .map(|group| (group.year, group.posts.into_iter().cloned().collect()))
            .collect())
    }
}

/// One page of a post listing
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page number
    pub number: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn prev(&self) -> Option<usize> {
        (self.number > 1).then(|| self.number - 1)
    }

    pub fn next(&self) -> Option<usize> {
        (self.number < self.total_pages).then(|| self.number + 1)
    }
}

/// Slice `items` into pages of `per_page`
///
/// Pages are 1-based. An empty list still has one (empty) page; page 0 or a
/// page past the end yields `None`.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Option<Page<'_, T>> {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page).max(1);

    if page == 0 || page > total_pages {
        return None;
    }

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());

    Some(Page {
        items: &items[start..end],
        number: page,
        total_pages,
    })
}
