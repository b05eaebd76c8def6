//! HTTP protocol layer module
//!
//! Response bodies, response builders and content-type detection, decoupled
//! from how paths are resolved.

pub mod body;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use body::{FileBody, ServeBody};
pub use response::{
    build_400_response, build_403_response, build_404_response, build_405_response,
    build_500_response, build_file_response, build_html_response, build_options_response,
    build_redirect_response,
};
