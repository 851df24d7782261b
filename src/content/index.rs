//! Post index - canonical ordering plus derived lookups

use indexmap::IndexMap;
use std::collections::HashMap;

use super::post::Post;

/// Posts published in one calendar year
#[derive(Debug, Clone, PartialEq)]
pub struct YearGroup<'a> {
    pub year: i32,
    pub posts: Vec<&'a Post>,
}

/// Immutable aggregate of all posts
///
/// Every derived structure is computed in [`PostIndex::build`] and never
/// updated afterwards; a content change means building a new index.
#[derive(Debug, Clone, Default)]
pub struct PostIndex {
    /// Newest first, discovery order on equal dates
    posts: Vec<Post>,
    /// Slug -> position in `posts`
    by_slug: HashMap<String, usize>,
    /// Category -> count, in order of first appearance over `posts`
    categories: IndexMap<String, usize>,
}

impl PostIndex {
    /// Build an index from posts given in discovery order
    ///
    /// Slugs must be unique; the scanner resolves collisions before this
    /// point. Should a duplicate slip through, the later post wins the
    /// slug lookup.
    pub fn build(mut posts: Vec<Post>) -> Self {
        // `sort_by` is stable, so equal dates keep discovery order
        posts.sort_by(|a, b| b.date().cmp(&a.date()));

        let mut by_slug = HashMap::with_capacity(posts.len());
        let mut categories: IndexMap<String, usize> = IndexMap::new();

        for (pos, post) in posts.iter().enumerate() {
            by_slug.insert(post.slug.clone(), pos);
            *categories.entry(post.category().to_string()).or_insert(0) += 1;
        }

        Self {
            posts,
            by_slug,
            categories,
        }
    }

    /// An index with no posts
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// All posts in canonical order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.by_slug.get(slug).map(|&pos| &self.posts[pos])
    }

    /// Posts whose category equals `category` exactly, in canonical order
    pub fn by_category(&self, category: &str) -> Vec<&Post> {
        if !self.categories.contains_key(category) {
            return Vec::new();
        }
        self.posts
            .iter()
            .filter(|p| p.category() == category)
            .collect()
    }

    /// Categories with their post counts, in order of first appearance
    pub fn categories(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.categories.iter().map(|(name, &count)| (name.as_str(), count))
    }

    pub fn category_count(&self, category: &str) -> usize {
        self.categories.get(category).copied().unwrap_or(0)
    }

    /// Posts grouped by year, newest year first
    pub fn archive(&self) -> Vec<YearGroup<'_>> {
        let mut groups: Vec<YearGroup<'_>> = Vec::new();

        // Posts are sorted by date, so each year forms one contiguous run
        for post in &self.posts {
            let year = post.year();
            match groups.last_mut() {
                Some(group) if group.year == year => group.posts.push(post),
                _ => groups.push(YearGroup {
                    year,
                    posts: vec![post],
                }),
            }
        }

        groups
    }

    /// Slugs in canonical order
    pub fn slugs(&self) -> impl Iterator<Item = &str> + '_ {
        self.posts.iter().map(|p| p.slug.as_str())
    }

    /// Neighbours of a post in canonical order: (newer, older)
    pub fn neighbours(&self, slug: &str) -> (Option<&Post>, Option<&Post>) {
        let Some(&pos) = self.by_slug.get(slug) else {
            return (None, None);
        };
        let newer = pos.checked_sub(1).and_then(|p| self.posts.get(p));
        let older = self.posts.get(pos + 1);
        (newer, older)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::post::PostMetadata;
    use chrono::NaiveDate;

    fn post(slug: &str, date: (i32, u32, u32), category: &str) -> Post {
        let meta = PostMetadata {
            title: slug.to_uppercase(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            read_time: "1 min read".to_string(),
            category: category.to_string(),
            extra: IndexMap::new(),
        };
        Post::new(slug.into(), format!("{slug}.md"), meta, String::new())
    }

    fn sample() -> Vec<Post> {
        vec![
            post("raft", (2024, 5, 1), "Consensus"),
            post("btree", (2025, 2, 10), "Storage"),
            post("paxos", (2024, 5, 1), "Consensus"),
            post("lsm", (2023, 11, 3), "Storage"),
            post("mvcc", (2025, 2, 10), "Transactions"),
        ]
    }

    #[test]
    fn test_sorted_newest_first_with_stable_ties() {
        let index = PostIndex::build(sample());
        let slugs: Vec<_> = index.slugs().collect();
        assert_eq!(slugs, vec!["btree", "mvcc", "raft", "paxos", "lsm"]);
    }

    #[test]
    fn test_lookup_by_slug() {
        let index = PostIndex::build(sample());
        assert_eq!(index.get("paxos").map(|p| p.slug.as_str()), Some("paxos"));
        assert!(index.get("missing").is_none());
    }

    #[test]
    fn test_categories_in_first_appearance_order() {
        let index = PostIndex::build(sample());
        let cats: Vec<_> = index.categories().collect();
        assert_eq!(
            cats,
            vec![("Storage", 2), ("Transactions", 1), ("Consensus", 2)]
        );
        let total: usize = index.categories().map(|(_, c)| c).sum();
        assert_eq!(total, index.len());
    }

    #[test]
    fn test_category_filter_is_exact_and_ordered() {
        let mut posts = sample();
        posts.push(post("wal", (2022, 1, 1), "storage"));
        let index = PostIndex::build(posts);

        let storage: Vec<_> = index.by_category("Storage").iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(storage, vec!["btree", "lsm"]);
        assert_eq!(index.category_count("storage"), 1);
        assert!(index.by_category("Unknown").is_empty());
    }

    #[test]
    fn test_archive_groups_by_year() {
        let index = PostIndex::build(sample());
        let archive = index.archive();
        let years: Vec<_> = archive.iter().map(|g| g.year).collect();
        assert_eq!(years, vec![2025, 2024, 2023]);
        let in_2024: Vec<_> = archive[1].posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(in_2024, vec!["raft", "paxos"]);
    }

    #[test]
    fn test_neighbours() {
        let index = PostIndex::build(sample());
        let (newer, older) = index.neighbours("raft");
        assert_eq!(newer.map(|p| p.slug.as_str()), Some("mvcc"));
        assert_eq!(older.map(|p| p.slug.as_str()), Some("paxos"));
        assert_eq!(index.neighbours("btree").0, None);
        assert_eq!(index.neighbours("lsm").1, None);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        let a = PostIndex::build(sample());
        let b = PostIndex::build(sample());
        assert_eq!(a.posts(), b.posts());
        assert_eq!(
            a.categories().collect::<Vec<_>>(),
            b.categories().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_index() {
        let index = PostIndex::empty();
        assert!(index.is_empty());
        assert!(index.archive().is_empty());
        assert_eq!(index.categories().count(), 0);
    }
}
