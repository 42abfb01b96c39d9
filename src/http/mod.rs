//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the logo lookup.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    apply_common_headers, build_304_response, build_405_response, build_error_response,
    build_health_response, build_json_response, build_logo_response, build_options_response,
    build_redirect_response, LogoPayload,
};
