//! HTTP host rendering posts on demand, with optional content watching

mod pages;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::{paginate, MarkdownRenderer, Post, PostIndex, PostLibrary};
use crate::Blog;

/// Shared server state
pub struct AppState {
    config: SiteConfig,
    library: Arc<PostLibrary>,
    renderer: MarkdownRenderer,
}

impl AppState {
    pub fn new(config: SiteConfig, library: Arc<PostLibrary>, renderer: MarkdownRenderer) -> Self {
        Self {
            config,
            library,
            renderer,
        }
    }

    /// Current index; content that cannot be loaded renders as an empty blog
    fn index(&self) -> Arc<PostIndex> {
        match self.library.snapshot() {
            Ok(index) => index,
            Err(e) => {
                tracing::error!("Failed to load posts: {}", e);
                Arc::new(PostIndex::empty())
            }
        }
    }
}

/// Build the router for a given state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/blog", get(blog_handler))
        .route("/archive", get(archive_handler))
        .route("/archive/", get(archive_handler))
        .route("/posts/:slug", get(post_handler))
        .route("/posts/:slug/", get(post_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool) -> Result<()> {
    let library = Arc::new(blog.library());

    // Build up front so content problems show at startup
    match library.snapshot() {
        Ok(index) => tracing::info!("Serving {} posts", index.len()),
        Err(e) => tracing::warn!("No posts loaded: {}", e),
    }

    let state = Arc::new(AppState::new(
        blog.config.clone(),
        Arc::clone(&library),
        blog.renderer(),
    ));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching {} for changes...", blog.content_dir.display());
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let content_dir = blog.content_dir.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(content_dir, library) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the content directory and swap in a rebuilt index on change
fn watch_and_reload(content_dir: PathBuf, library: Arc<PostLibrary>) -> Result<()> {
    if !content_dir.is_dir() {
        tracing::warn!(
            "Content directory {} does not exist, not watching",
            content_dir.display()
        );
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;
    debouncer
        .watcher()
        .watch(&content_dir, RecursiveMode::Recursive)?;
    tracing::debug!("Watching: {:?}", content_dir);

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains("/.") && !path_str.ends_with('~')
                    })
                    .collect();

                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("Changed: {}", event.path.display());
                }

                if let Err(e) = library.reload() {
                    tracing::error!("Reload failed, keeping previous posts: {}", e);
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    category: Option<String>,
    /// Raw; anything but a page number is a 404
    page: Option<String>,
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let index = state.index();
    Html(pages::home_page(&state.config, &index))
}

async fn blog_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let index = state.index();
    let category = query.category.as_deref().filter(|c| !c.is_empty());

    let posts: Vec<&Post> = match category {
        Some(category) => index.by_category(category),
        None => index.posts().iter().collect(),
    };

    let number = match query.page.as_deref() {
        None | Some("") => 1,
        Some(raw) => match raw.parse::<usize>() {
            Ok(number) => number,
            Err(_) => return not_found(&state.config),
        },
    };

    match paginate(&posts, number, state.config.per_page) {
        Some(page) => Html(pages::list_page(&state.config, &index, category, &page)).into_response(),
        None => not_found(&state.config),
    }
}

async fn archive_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let index = state.index();
    Html(pages::archive_page(&state.config, &index))
}

async fn post_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Response {
    let index = state.index();
    let Some(post) = index.get(&slug) else {
        return not_found(&state.config);
    };

    let rendered = state.renderer.render(&post.body);
    let neighbours = index.neighbours(&slug);
    Html(pages::post_page(&state.config, post, &rendered, neighbours)).into_response()
}

async fn not_found_handler(State(state): State<Arc<AppState>>) -> Response {
    not_found(&state.config)
}

fn not_found(config: &SiteConfig) -> Response {
    (StatusCode::NOT_FOUND, Html(pages::not_found_page(config))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{FsContentStore, MemoryContentStore, MetadataDefaults};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn post(title: &str, date: &str, category: &str, body: &str) -> String {
        format!(
            "---\ntitle: {}\ndate: {}\ncategory: {}\n---\n{}",
            title, date, category, body
        )
    }

    fn app_with(config: SiteConfig, store: MemoryContentStore) -> Router {
        let library = PostLibrary::new(store, MetadataDefaults::default());
        let renderer = MarkdownRenderer::from_config(&config);
        router(Arc::new(AppState::new(config, Arc::new(library), renderer)))
    }

    fn app() -> Router {
        let store = MemoryContentStore::new()
            .with(
                "raft.md",
                post("Raft", "2025-02-01", "Consensus", "## Log\n\nEntries *replicate*."),
            )
            .with(
                "paxos.md",
                post("Paxos", "2024-11-20", "Consensus", "Prepare and accept."),
            )
            .with(
                "lsm.md",
                post("LSM Trees", "2024-06-03", "Storage", "Write `memtable` first."),
            );
        app_with(SiteConfig::default(), store)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_home_lists_latest_posts() {
        let (status, html) = get(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        let raft = html.find(">Raft<").unwrap();
        let paxos = html.find(">Paxos<").unwrap();
        assert!(raft < paxos);
        assert!(html.contains(">Consensus<"));
    }

    #[tokio::test]
    async fn test_home_respects_home_posts() {
        let config = SiteConfig {
            home_posts: 1,
            ..SiteConfig::default()
        };
        let store = MemoryContentStore::new()
            .with("a.md", post("Newest", "2025-01-02", "X", "a"))
            .with("b.md", post("Oldest", "2025-01-01", "X", "b"));
        let (_, html) = get(app_with(config, store), "/").await;
        assert!(html.contains(">Newest<"));
        assert!(!html.contains(">Oldest<"));
        assert!(html.contains("All posts"));
    }

    #[tokio::test]
    async fn test_blog_category_filter() {
        let (status, html) = get(app(), "/blog?category=Storage").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(">LSM Trees<"));
        assert!(!html.contains(">Raft<"));
        assert!(html.contains("<title>Storage | Inkwell</title>"));
    }

    #[tokio::test]
    async fn test_blog_pagination() {
        let config = SiteConfig {
            per_page: 2,
            ..SiteConfig::default()
        };
        let store = MemoryContentStore::new()
            .with("a.md", post("First", "2025-03-03", "X", "a"))
            .with("b.md", post("Second", "2025-03-02", "X", "b"))
            .with("c.md", post("Third", "2025-03-01", "X", "c"));

        let (status, html) = get(app_with(config.clone(), store.clone()), "/blog?page=2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(">Third<"));
        assert!(!html.contains(">First<"));
        assert!(html.contains("2 / 2"));

        let (status, _) = get(app_with(config.clone(), store.clone()), "/blog?page=3").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(app_with(config.clone(), store.clone()), "/blog?page=0").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, html) = get(app_with(config, store), "/blog?page=abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Not found"));
    }

    #[tokio::test]
    async fn test_post_page() {
        let (status, html) = get(app(), "/posts/raft/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains(r#"<h1 class="post-title">Raft</h1>"#));
        assert!(html.contains("<em>replicate</em>"));
        assert!(html.contains(r#"id="log""#));
        assert!(html.contains(r#"class="post-nav-older" href="/posts/paxos/""#));

        let (status, _) = get(app(), "/posts/raft").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let (status, html) = get(app(), "/posts/missing/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Not found"));

        let (status, _) = get(app(), "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_archive() {
        let (status, html) = get(app(), "/archive").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.find("<h2>2025").unwrap() < html.find("<h2>2024").unwrap());
    }

    #[tokio::test]
    async fn test_missing_content_root_shows_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::default();
        let library = PostLibrary::new(
            FsContentStore::new(dir.path().join("absent")),
            config.metadata_defaults(),
        );
        let renderer = MarkdownRenderer::from_config(&config);
        let app = router(Arc::new(AppState::new(config, Arc::new(library), renderer)));

        let (status, html) = get(app.clone(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("empty-state"));

        let (status, html) = get(app, "/blog").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("empty-state"));
    }
}
