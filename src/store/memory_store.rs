use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use crate::util::{child_url, ensure_container_url};

use super::{RemoteNode, RemoteStore, Result, StoreError};

/// One node held by a [`MemoryStore`].
#[derive(Debug, Clone)]
struct MemoryEntry {
    container: bool,
    content_type: Option<String>,
    data: Bytes,
}

/// An in-memory implementation of [`RemoteStore`], intended primarily for
/// testing.
///
/// Nodes are keyed by URL; container URLs end with `/`. Like the HTTP API,
/// reading a container yields its JSON listing, and writes that collide
/// with an existing resource are renamed with a numeric suffix. Deleting a
/// container that still has children is refused, so ordering mistakes in
/// recursive deletion surface as hard errors.
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, MemoryEntry>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a builder for seeding a store with a tree of nodes.
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::new()
    }

    /// Number of nodes currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether the store holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a node exists at `url`.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.read().unwrap().contains_key(url)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `url` is an immediate child of `container_url`.
fn is_child_of(url: &str, container_url: &str) -> bool {
    match url.strip_prefix(container_url) {
        Some(rest) if !rest.is_empty() => {
            let rest = rest.strip_suffix('/').unwrap_or(rest);
            !rest.is_empty() && !rest.contains('/')
        }
        _ => false,
    }
}

fn node_for(url: &str, entry: &MemoryEntry) -> RemoteNode {
    RemoteNode {
        url: url.to_string(),
        is_container: entry.container,
        content_type: entry.content_type.clone(),
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn list_children(&self, container_url: &str) -> Result<Vec<RemoteNode>> {
        let entries = self.entries.read().unwrap();
        let entry = entries
            .get(container_url)
            .ok_or_else(|| StoreError::NotFound(container_url.to_string()))?;
        if !entry.container {
            return Err(StoreError::NotAContainer(container_url.to_string()));
        }

        Ok(entries
            .iter()
            .filter(|(url, _)| is_child_of(url, container_url))
            .map(|(url, entry)| node_for(url, entry))
            .collect())
    }

    async fn get_metadata(&self, url: &str) -> Result<RemoteNode> {
        let entries = self.entries.read().unwrap();
        let entry = entries
            .get(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        Ok(node_for(url, entry))
    }

    async fn read_bytes(&self, url: &str) -> Result<(Bytes, String)> {
        let entries = self.entries.read().unwrap();
        let entry = entries
            .get(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;

        if entry.container {
            // Reading a container yields its listing document, the same
            // representation a GET against the HTTP API returns.
            let children: Vec<RemoteNode> = entries
                .iter()
                .filter(|(child, _)| is_child_of(child, url))
                .map(|(child, entry)| node_for(child, entry))
                .collect();
            let body = serde_json::to_vec(&children)
                .map_err(|e| StoreError::Other(format!("listing serialization: {}", e)))?;
            return Ok((Bytes::from(body), "application/json".to_string()));
        }

        let content_type = entry
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        Ok((entry.data.clone(), content_type))
    }

    async fn write_bytes(
        &self,
        container_url: &str,
        bytes: Bytes,
        slug: &str,
        content_type: &str,
    ) -> Result<RemoteNode> {
        let mut entries = self.entries.write().unwrap();
        let parent = entries
            .get(container_url)
            .ok_or_else(|| StoreError::NotFound(container_url.to_string()))?;
        if !parent.container {
            return Err(StoreError::NotAContainer(container_url.to_string()));
        }

        // Rename on collision the way pod servers do: probe stem-1, stem-2,
        // ... until a free URL is found.
        let mut url = child_url(container_url, slug, false);
        if entries.contains_key(&url) {
            let (stem, extension) = match slug.rfind('.') {
                Some(i) if i > 0 => slug.split_at(i),
                _ => (slug, ""),
            };
            let mut n = 1u32;
            loop {
                let candidate = child_url(
                    container_url,
                    &format!("{}-{}{}", stem, n, extension),
                    false,
                );
                if !entries.contains_key(&candidate) {
                    url = candidate;
                    break;
                }
                n += 1;
            }
        }

        entries.insert(
            url.clone(),
            MemoryEntry {
                container: false,
                content_type: Some(content_type.to_string()),
                data: bytes,
            },
        );

        Ok(RemoteNode {
            url,
            is_container: false,
            content_type: Some(content_type.to_string()),
        })
    }

    async fn delete_resource(&self, url: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        let entry = entries
            .get(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;

        if entry.container {
            let has_children = entries.keys().any(|child| is_child_of(child, url));
            if has_children {
                return Err(StoreError::Other(format!("container not empty: {}", url)));
            }
        }

        entries.remove(url);
        Ok(())
    }

    async fn create_container(&self, url: &str) -> Result<RemoteNode> {
        let url = ensure_container_url(url);
        let mut entries = self.entries.write().unwrap();

        if let Some(existing) = entries.get(&url) {
            if !existing.container {
                return Err(StoreError::Other(format!("resource exists at {}", url)));
            }
            return Ok(RemoteNode::container(url));
        }

        entries.insert(
            url.clone(),
            MemoryEntry {
                container: true,
                content_type: None,
                data: Bytes::new(),
            },
        );
        Ok(RemoteNode::container(url))
    }
}

// =============================================================================
// MemoryStoreBuilder
// =============================================================================

/// Builder for seeding a [`MemoryStore`] with a tree of nodes.
pub struct MemoryStoreBuilder {
    entries: BTreeMap<String, MemoryEntry>,
}

impl MemoryStoreBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Add a container at `url` (a trailing slash is added if missing).
    pub fn container(mut self, url: &str) -> Self {
        self.entries.insert(
            ensure_container_url(url),
            MemoryEntry {
                container: true,
                content_type: None,
                data: Bytes::new(),
            },
        );
        self
    }

    /// Add a resource with the given content type and contents.
    pub fn resource(mut self, url: &str, content_type: &str, data: impl Into<Bytes>) -> Self {
        self.entries.insert(
            url.to_string(),
            MemoryEntry {
                container: false,
                content_type: Some(content_type.to_string()),
                data: data.into(),
            },
        );
        self
    }

    /// Build the store.
    pub fn build(self) -> MemoryStore {
        MemoryStore {
            entries: RwLock::new(self.entries),
        }
    }
}

impl Default for MemoryStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_roundtrip() {
        let store = MemoryStore::builder()
            .container("https://pod.example/docs/")
            .build();

        let node = store
            .write_bytes(
                "https://pod.example/docs/",
                Bytes::from_static(b"hello"),
                "a.txt",
                "text/plain",
            )
            .await
            .unwrap();
        assert_eq!(node.url, "https://pod.example/docs/a.txt");

        let (bytes, content_type) = store.read_bytes(&node.url).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
        assert_eq!(content_type, "text/plain");
    }

    #[tokio::test]
    async fn test_write_renames_on_collision() {
        let store = MemoryStore::builder()
            .container("https://pod.example/docs/")
            .resource("https://pod.example/docs/a.txt", "text/plain", "first")
            .build();

        let node = store
            .write_bytes(
                "https://pod.example/docs/",
                Bytes::from_static(b"second"),
                "a.txt",
                "text/plain",
            )
            .await
            .unwrap();
        assert_eq!(node.url, "https://pod.example/docs/a-1.txt");
        assert!(store.contains("https://pod.example/docs/a.txt"));
    }

    #[tokio::test]
    async fn test_list_children_is_shallow() {
        let store = MemoryStore::builder()
            .container("https://pod.example/docs/")
            .resource("https://pod.example/docs/a.txt", "text/plain", "a")
            .container("https://pod.example/docs/sub/")
            .resource("https://pod.example/docs/sub/deep.txt", "text/plain", "d")
            .build();

        let children = store
            .list_children("https://pod.example/docs/")
            .await
            .unwrap();
        let urls: Vec<&str> = children.iter().map(|n| n.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://pod.example/docs/a.txt",
                "https://pod.example/docs/sub/"
            ]
        );
    }

    #[tokio::test]
    async fn test_delete_refuses_nonempty_container() {
        let store = MemoryStore::builder()
            .container("https://pod.example/docs/")
            .resource("https://pod.example/docs/a.txt", "text/plain", "a")
            .build();

        let result = store.delete_resource("https://pod.example/docs/").await;
        assert!(matches!(result, Err(StoreError::Other(_))));

        store
            .delete_resource("https://pod.example/docs/a.txt")
            .await
            .unwrap();
        store
            .delete_resource("https://pod.example/docs/")
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_node_is_not_found() {
        let store = MemoryStore::new();
        let result = store.get_metadata("https://pod.example/nope").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
