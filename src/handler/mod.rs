//! Request handler module
//!
//! Routes requests to the upload relay (`POST /attach`) and to the stored
//! file listing and retrieval under the public prefix.

pub mod attach;
pub mod files;
pub mod public_url;
pub mod router;
pub mod upload;

// Re-export main entry point
pub use router::handle_request;
