//! Remote store traits and types for hierarchical pod storage.
//!
//! A pod store exposes *containers* (which hold child nodes) and *resources*
//! (which hold opaque bytes with a content type). Every node is addressed by
//! an absolute URL; container URLs end with a trailing slash. All operations
//! are asynchronous and fallible.

mod http_store;
mod memory_store;

pub use http_store::HttpStore;
pub use memory_store::{MemoryStore, MemoryStoreBuilder};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in remote store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The node was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server refused access to the node.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The node exists but is not a container.
    #[error("not a container: {0}")]
    NotAContainer(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// A custom error message.
    #[error("{0}")]
    Other(String),
}

// =============================================================================
// RemoteNode
// =============================================================================

/// A single node in the remote tree: a container or a resource.
///
/// Nodes are discovered through [`RemoteStore::list_children`] and
/// [`RemoteStore::get_metadata`]; the only client-side construction happens
/// as the result of a write or a container creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    /// Absolute URL identifying the node, stable for the node's lifetime.
    pub url: String,

    /// Whether the node is a container. Containers may have children;
    /// resources may not.
    #[serde(rename = "container")]
    pub is_container: bool,

    /// Content type, present only for resources.
    #[serde(
        default,
        rename = "contentType",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
}

impl RemoteNode {
    /// Create a container node.
    pub fn container(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_container: true,
            content_type: None,
        }
    }

    /// Create a resource node with the given content type.
    pub fn resource(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_container: false,
            content_type: Some(content_type.into()),
        }
    }

    /// Decoded base name of the node.
    pub fn name(&self) -> String {
        crate::util::base_name(&self.url)
    }
}

// =============================================================================
// RemoteStore Trait
// =============================================================================

/// The primary interface to a remote pod store.
///
/// Implementations provide listing, metadata, read, write, delete, and
/// container creation over the remote tree. The store owns the
/// authoritative state; callers must not cache results across operations.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List the immediate children of a container. Not recursive.
    ///
    /// Returns `StoreError::NotFound` if the container does not exist and
    /// `StoreError::NotAContainer` if the URL names a resource.
    async fn list_children(&self, container_url: &str) -> Result<Vec<RemoteNode>>;

    /// Fetch metadata for a node.
    ///
    /// Returns `StoreError::NotFound` if the node does not exist.
    async fn get_metadata(&self, url: &str) -> Result<RemoteNode>;

    /// Read a resource's contents, returning the bytes and the content type.
    async fn read_bytes(&self, url: &str) -> Result<(Bytes, String)>;

    /// Write a resource into a container under the requested slug.
    ///
    /// The server may rename the slug on collision; callers must not assume
    /// the returned node's URL matches the requested name.
    async fn write_bytes(
        &self,
        container_url: &str,
        bytes: Bytes,
        slug: &str,
        content_type: &str,
    ) -> Result<RemoteNode>;

    /// Delete a resource or an empty container.
    async fn delete_resource(&self, url: &str) -> Result<()>;

    /// Create a container at the given URL.
    async fn create_container(&self, url: &str) -> Result<RemoteNode>;
}
