//! Content module - scanning, parsing, indexing and rendering posts

mod error;
pub mod frontmatter;
mod index;
pub mod library;
pub mod markdown;
mod post;
pub mod store;

pub use error::{ContentError, FrontMatterError};
pub use frontmatter::{FrontMatter, MetadataDefaults};
pub use index::{PostIndex, YearGroup};
pub use library::{build_index, paginate, BuildReport, Page, PostLibrary};
pub use markdown::{
    DefaultRules, Element, HeadingEntry, LinkKind, MarkdownRenderer, RenderRules, RenderedPost,
};
pub use post::{Post, PostMetadata, MORE_MARKER};
pub use store::{ContentStore, ContentUnit, FsContentStore, Listing, MemoryContentStore};
