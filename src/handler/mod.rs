//! Request handler module
//!
//! Method checks and dispatch, the static site pipeline, and directory listings.

pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
pub use static_files::StaticSite;
