//! CLI entry point for inkwell

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inkwell::Blog;

#[derive(Parser)]
#[command(name = "inkwell")]
#[command(version)]
#[command(about = "A markdown blog engine", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the blog over HTTP
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip)
        #[arg(short, long)]
        ip: Option<String>,

        /// Rebuild the post index when content changes
        #[arg(short, long)]
        watch: bool,
    },

    /// List site content
    List {
        /// Type of content to list (posts, categories, archive)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Render one post to HTML on stdout
    Render {
        /// Slug of the post
        slug: String,
    },

    /// Parse all content and report excluded files
    Check,

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Category of the new post
        #[arg(short = 'C', long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkwell=debug,info"
    } else {
        "inkwell=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let blog = Blog::new(&base_dir)?;

    match cli.command {
        Commands::Serve { port, ip, watch } => {
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            inkwell::server::start(&blog, &ip, port, watch).await?;
        }

        Commands::List { r#type } => {
            inkwell::commands::list::run(&blog.library(), &r#type)?;
        }

        Commands::Render { slug } => {
            inkwell::commands::render::run(&blog, &slug)?;
        }

        Commands::Check => {
            inkwell::commands::check::run(&blog)?;
        }

        Commands::New { title, category } => {
            tracing::info!("Creating new post with title: {}", title);
            inkwell::commands::new::run(&blog, &title, category.as_deref())?;
        }
    }

    Ok(())
}
