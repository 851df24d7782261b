//! Configuration module

mod site;

pub use site::ExternalLinkConfig;
pub use site::HighlightConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
