//! Helper functions for page rendering
//!
//! URL generation, date formatting and small HTML fragments used by the
//! server's page shell.

mod date;
mod html;
mod list;
mod url;

pub use date::*;
pub use html::*;
pub use list::*;
pub use url::*;
