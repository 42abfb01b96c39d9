//! Request handler module
//!
//! Responsible for request routing dispatch and logo serving.

mod info;
mod logo;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
