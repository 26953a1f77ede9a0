//! Folder move and single-file rename.

use crate::store::{RemoteStore, StoreError};
use crate::util::{base_name, parent_url};

use super::plan::TransferPlan;
use super::progress::ProgressSink;
use super::{item_error, Result};

/// Copy the immediate children of `source_url` into a newly created
/// container at `destination_url`.
///
/// Only the immediate children are copied: nested containers are not
/// descended into, so anything inside them is left behind. Each child is
/// read as raw bytes and rewritten under the destination with the same
/// decoded base name and content type. The source container is left in
/// place for the caller to delete once the copy has succeeded.
///
/// Children are processed sequentially; the first read or write failure
/// aborts the remaining children and carries the failing child's URL.
pub async fn move_folder(
    store: &dyn RemoteStore,
    source_url: &str,
    destination_url: &str,
    sink: &dyn ProgressSink,
) -> Result<()> {
    sink.on_prepare("Creating new folder");
    store
        .create_container(destination_url)
        .await
        .map_err(|e| item_error(sink, destination_url, e))?;

    let children = store
        .list_children(source_url)
        .await
        .map_err(|e| item_error(sink, source_url, e))?;

    let mut plan = TransferPlan::new(children.len() as u64);

    for child in children {
        let name = base_name(&child.url);
        sink.on_progress(&format!("Moving {}", name), plan.percent());

        let (bytes, content_type) = store
            .read_bytes(&child.url)
            .await
            .map_err(|e| item_error(sink, &child.url, e))?;
        store
            .write_bytes(destination_url, bytes, &name, &content_type)
            .await
            .map_err(|e| item_error(sink, &child.url, e))?;
        plan.record_completed();
    }

    sink.on_complete("Folder moved successfully");
    Ok(())
}

/// Rename a resource in place: copy it under the same parent container
/// with `new_name`, then delete the original.
///
/// The copy and the delete are separate store calls; a failure between
/// them leaves both the old and the new resource behind.
pub async fn rename_file(
    store: &dyn RemoteStore,
    source_url: &str,
    new_name: &str,
    sink: &dyn ProgressSink,
) -> Result<()> {
    sink.on_prepare("Preparing to rename file");

    let (bytes, content_type) = store
        .read_bytes(source_url)
        .await
        .map_err(|e| item_error(sink, source_url, e))?;

    let parent = parent_url(source_url).ok_or_else(|| {
        item_error(
            sink,
            source_url,
            StoreError::Other(format!("no parent container for {}", source_url)),
        )
    })?;

    sink.on_progress("Moving file to new name", 50.0);

    store
        .write_bytes(&parent, bytes, new_name, &content_type)
        .await
        .map_err(|e| item_error(sink, source_url, e))?;
    store
        .delete_resource(source_url)
        .await
        .map_err(|e| item_error(sink, source_url, e))?;

    sink.on_complete("File renamed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::store::{MemoryStore, RemoteNode, StoreError};
    use crate::transfer::testing::{Event, RecordingSink};
    use crate::transfer::TransferError;

    use super::*;

    fn source_tree() -> MemoryStore {
        MemoryStore::builder()
            .container("https://pod.example/old/")
            .resource("https://pod.example/old/a.txt", "text/plain", "alpha")
            .resource("https://pod.example/old/b.md", "text/markdown", "beta")
            .container("https://pod.example/old/sub/")
            .resource("https://pod.example/old/sub/deep.txt", "text/plain", "deep")
            .build()
    }

    #[tokio::test]
    async fn copies_immediate_children_only() {
        let store = source_tree();
        let sink = RecordingSink::new();

        move_folder(
            &store,
            "https://pod.example/old/",
            "https://pod.example/new/",
            &sink,
        )
        .await
        .unwrap();

        let (bytes, content_type) = store
            .read_bytes("https://pod.example/new/a.txt")
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"alpha");
        assert_eq!(content_type, "text/plain");
        assert!(store.contains("https://pod.example/new/b.md"));

        // The grandchild is silently left behind, and the source tree is
        // still in place for the caller to delete.
        assert!(!store.contains("https://pod.example/new/sub/deep.txt"));
        assert!(store.contains("https://pod.example/old/sub/deep.txt"));
        assert!(store.contains("https://pod.example/old/a.txt"));

        assert_eq!(
            sink.events().first(),
            Some(&Event::Prepare("Creating new folder".to_string()))
        );
        assert_eq!(
            sink.completed().as_deref(),
            Some("Folder moved successfully")
        );
    }

    #[tokio::test]
    async fn move_reports_running_percentages() {
        let store = source_tree();
        let sink = RecordingSink::new();

        move_folder(
            &store,
            "https://pod.example/old/",
            "https://pod.example/new/",
            &sink,
        )
        .await
        .unwrap();

        // Three immediate children: percent before each copy.
        let rounded: Vec<i64> = sink
            .progress_percents()
            .iter()
            .map(|p| p.round() as i64)
            .collect();
        assert_eq!(rounded, vec![0, 33, 67]);
    }

    #[tokio::test]
    async fn rename_replaces_the_source() {
        let store = source_tree();
        let sink = RecordingSink::new();

        rename_file(
            &store,
            "https://pod.example/old/a.txt",
            "renamed.txt",
            &sink,
        )
        .await
        .unwrap();

        assert!(!store.contains("https://pod.example/old/a.txt"));
        let (bytes, content_type) = store
            .read_bytes("https://pod.example/old/renamed.txt")
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"alpha");
        assert_eq!(content_type, "text/plain");

        assert_eq!(
            sink.events(),
            vec![
                Event::Prepare("Preparing to rename file".to_string()),
                Event::Progress("Moving file to new name".to_string(), 50.0),
                Event::Complete("File renamed successfully".to_string()),
            ]
        );
    }

    /// Fails deletion of one chosen URL.
    struct FailingDeleteStore {
        inner: MemoryStore,
        fail_url: String,
    }

    #[async_trait]
    impl RemoteStore for FailingDeleteStore {
        async fn list_children(&self, url: &str) -> crate::store::Result<Vec<RemoteNode>> {
            self.inner.list_children(url).await
        }

        async fn get_metadata(&self, url: &str) -> crate::store::Result<RemoteNode> {
            self.inner.get_metadata(url).await
        }

        async fn read_bytes(&self, url: &str) -> crate::store::Result<(Bytes, String)> {
            self.inner.read_bytes(url).await
        }

        async fn write_bytes(
            &self,
            container_url: &str,
            bytes: Bytes,
            slug: &str,
            content_type: &str,
        ) -> crate::store::Result<RemoteNode> {
            self.inner
                .write_bytes(container_url, bytes, slug, content_type)
                .await
        }

        async fn delete_resource(&self, url: &str) -> crate::store::Result<()> {
            if url == self.fail_url {
                return Err(StoreError::Forbidden(url.to_string()));
            }
            self.inner.delete_resource(url).await
        }

        async fn create_container(&self, url: &str) -> crate::store::Result<RemoteNode> {
            self.inner.create_container(url).await
        }
    }

    // A failure after the copy but before the delete leaves both the old
    // and the new resource in place.
    #[tokio::test]
    async fn rename_failure_after_copy_keeps_both() {
        let store = FailingDeleteStore {
            inner: source_tree(),
            fail_url: "https://pod.example/old/a.txt".to_string(),
        };
        let sink = RecordingSink::new();

        let result = rename_file(
            &store,
            "https://pod.example/old/a.txt",
            "renamed.txt",
            &sink,
        )
        .await;

        assert!(matches!(result, Err(TransferError::Item { .. })));
        assert!(store.inner.contains("https://pod.example/old/a.txt"));
        assert!(store.inner.contains("https://pod.example/old/renamed.txt"));
        assert_eq!(sink.error_count(), 1);
        assert!(sink.completed().is_none());
    }
}
