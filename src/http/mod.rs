//! HTTP protocol helpers
//!
//! Response builders, content-type detection and `ETag` handling shared by
//! the relay's handlers.

pub mod cache;
pub mod mime;
pub mod response;

pub use response::{
    build_304_response, build_404_response, build_405_response, build_file_response,
    build_health_response, build_options_response, json_response,
};
