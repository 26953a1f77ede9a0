//! Utility modules for podfm-rs.

pub mod url;

pub use url::{base_name, child_url, ensure_container_url, parent_url};
