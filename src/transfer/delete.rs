//! Recursive deletion of containers and resources.

use crate::store::{RemoteStore, StoreError};
use crate::util::base_name;

use super::plan::TransferPlan;
use super::progress::ProgressSink;
use super::{item_error, Result};

/// Delete the node at `url`, recursing into containers.
///
/// A plain resource is deleted directly, with no tree walk. A container is
/// first walked in full to count its descendants for progress accounting,
/// then emptied depth-first — children strictly before their parent — with
/// one progress report per deleted item. The first failed deletion aborts
/// the traversal; everything deleted up to that point stays deleted.
pub async fn delete_resource(
    store: &dyn RemoteStore,
    url: &str,
    sink: &dyn ProgressSink,
) -> Result<()> {
    let node = store
        .get_metadata(url)
        .await
        .map_err(|e| item_error(sink, url, e))?;

    if !node.is_container {
        sink.on_prepare(&format!("Preparing to delete {}", node.name()));
        store
            .delete_resource(url)
            .await
            .map_err(|e| item_error(sink, url, e))?;
        sink.on_complete("File deleted successfully");
        return Ok(());
    }

    sink.on_prepare("Calculating items to delete...");

    // The container itself counts as one item; the pre-pass adds every
    // discovered descendant.
    let mut plan = TransferPlan::new(1);
    count_descendants(store, url, &mut plan)
        .await
        .map_err(|e| item_error(sink, url, e))?;

    delete_tree(store, url, &mut plan, sink).await?;
    sink.on_complete("Deletion completed successfully");
    Ok(())
}

/// Pre-pass count of every node under `root_url`, the root excluded.
///
/// Runs over an explicit worklist so arbitrarily deep trees cannot grow
/// the call stack. A child whose metadata fetch fails is counted as a leaf
/// and not descended into; if the deletion pass later finds it to be a
/// container after all, its contents are deleted without ever having been
/// counted and the reported percentage can run past 100.
async fn count_descendants(
    store: &dyn RemoteStore,
    root_url: &str,
    plan: &mut TransferPlan,
) -> std::result::Result<(), StoreError> {
    let mut worklist = vec![root_url.to_string()];
    let mut at_root = true;

    while let Some(current) = worklist.pop() {
        let children = match store.list_children(&current).await {
            Ok(children) => children,
            // A descendant container that cannot be listed was already
            // counted when it was discovered; skip its subtree.
            Err(_) if !at_root => continue,
            Err(e) => return Err(e),
        };
        at_root = false;

        plan.add_discovered(children.len() as u64);
        for child in children {
            // The listing's container flag is advisory; the node's own
            // metadata decides whether to descend.
            if let Ok(meta) = store.get_metadata(&child.url).await {
                if meta.is_container {
                    worklist.push(child.url);
                }
            }
        }
    }

    Ok(())
}

/// Depth-first deletion of a container: every child first, the container
/// itself last.
async fn delete_tree(
    store: &dyn RemoteStore,
    container_url: &str,
    plan: &mut TransferPlan,
    sink: &dyn ProgressSink,
) -> Result<()> {
    let children = store
        .list_children(container_url)
        .await
        .map_err(|e| item_error(sink, container_url, e))?;

    for child in children {
        let meta = store
            .get_metadata(&child.url)
            .await
            .map_err(|e| item_error(sink, &child.url, e))?;

        if meta.is_container {
            Box::pin(delete_tree(store, &child.url, plan, sink)).await?;
        } else {
            store
                .delete_resource(&child.url)
                .await
                .map_err(|e| item_error(sink, &child.url, e))?;
            plan.record_completed();
            sink.on_progress(
                &format!("Deleting {}", base_name(&child.url)),
                plan.percent(),
            );
        }
    }

    store
        .delete_resource(container_url)
        .await
        .map_err(|e| item_error(sink, container_url, e))?;
    plan.record_completed();
    sink.on_progress(
        &format!("Deleting {}", base_name(container_url)),
        plan.percent(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::store::{MemoryStore, RemoteNode, RemoteStore, StoreError};
    use crate::transfer::testing::{Event, RecordingSink};
    use crate::transfer::TransferError;

    use super::*;

    fn tree_store() -> MemoryStore {
        MemoryStore::builder()
            .container("https://pod.example/docs/")
            .resource("https://pod.example/docs/a.txt", "text/plain", "a")
            .resource("https://pod.example/docs/b.txt", "text/plain", "b")
            .container("https://pod.example/docs/sub/")
            .resource("https://pod.example/docs/sub/deep.txt", "text/plain", "d")
            .build()
    }

    /// Counts delete calls on the way through to a memory store.
    struct CountingStore {
        inner: MemoryStore,
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl RemoteStore for CountingStore {
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
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_resource(url).await
        }

        async fn create_container(&self, url: &str) -> crate::store::Result<RemoteNode> {
            self.inner.create_container(url).await
        }
    }

    #[tokio::test]
    async fn deletes_every_descendant_then_the_container() {
        let store = CountingStore {
            inner: tree_store(),
            deletes: AtomicUsize::new(0),
        };
        let sink = RecordingSink::new();

        delete_resource(&store, "https://pod.example/docs/", &sink)
            .await
            .unwrap();

        // 4 descendants plus the container itself.
        assert_eq!(store.deletes.load(Ordering::SeqCst), 5);
        assert!(store.inner.is_empty());

        let events = sink.events();
        assert_eq!(
            events[0],
            Event::Prepare("Calculating items to delete...".to_string())
        );

        let percents = sink.progress_percents();
        assert_eq!(percents.len(), 5);
        assert_eq!(*percents.last().unwrap(), 100.0);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(
            sink.completed().as_deref(),
            Some("Deletion completed successfully")
        );
    }

    #[tokio::test]
    async fn children_are_reported_before_their_parent() {
        let store = tree_store();
        let sink = RecordingSink::new();

        delete_resource(&store, "https://pod.example/docs/", &sink)
            .await
            .unwrap();

        let names: Vec<String> = sink
            .events()
            .iter()
            .filter_map(|event| match event {
                Event::Progress(message, _) => Some(message.clone()),
                _ => None,
            })
            .collect();

        let deep = names.iter().position(|m| m == "Deleting deep.txt").unwrap();
        let sub = names.iter().position(|m| m == "Deleting sub").unwrap();
        let root = names.iter().position(|m| m == "Deleting docs").unwrap();
        assert!(deep < sub);
        assert!(sub < root);
    }

    #[tokio::test]
    async fn single_resource_skips_the_tree_walk() {
        let store = tree_store();
        let sink = RecordingSink::new();

        delete_resource(&store, "https://pod.example/docs/a.txt", &sink)
            .await
            .unwrap();

        assert!(!store.contains("https://pod.example/docs/a.txt"));
        assert!(store.contains("https://pod.example/docs/b.txt"));

        let events = sink.events();
        assert_eq!(
            events,
            vec![
                Event::Prepare("Preparing to delete a.txt".to_string()),
                Event::Complete("File deleted successfully".to_string()),
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

    #[tokio::test]
    async fn one_failed_deletion_aborts_the_rest() {
        let store = FailingDeleteStore {
            inner: tree_store(),
            fail_url: "https://pod.example/docs/b.txt".to_string(),
        };
        let sink = RecordingSink::new();

        let result = delete_resource(&store, "https://pod.example/docs/", &sink).await;

        match result {
            Err(TransferError::Item { item, .. }) => {
                assert_eq!(item, "https://pod.example/docs/b.txt");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        // a.txt went first and stays deleted; the subtree scheduled after
        // the failure point was never touched.
        assert!(!store.inner.contains("https://pod.example/docs/a.txt"));
        assert!(store.inner.contains("https://pod.example/docs/sub/deep.txt"));
        assert!(store.inner.contains("https://pod.example/docs/"));

        assert_eq!(sink.error_count(), 1);
        assert!(sink.completed().is_none());
    }

    /// Fails the first metadata fetch of one chosen URL, succeeding after.
    struct FlakyMetadataStore {
        inner: MemoryStore,
        flaky_url: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteStore for FlakyMetadataStore {
        async fn list_children(&self, url: &str) -> crate::store::Result<Vec<RemoteNode>> {
            self.inner.list_children(url).await
        }

        async fn get_metadata(&self, url: &str) -> crate::store::Result<RemoteNode> {
            if url == self.flaky_url && self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(StoreError::Transport("connection reset".to_string()));
            }
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
            self.inner.delete_resource(url).await
        }

        async fn create_container(&self, url: &str) -> crate::store::Result<RemoteNode> {
            self.inner.create_container(url).await
        }
    }

    // Documents a quirk kept on purpose: a child whose metadata fetch
    // fails during the pre-count is counted as a single leaf. When the
    // deletion pass then finds it to be a container, its contents are
    // deleted without having been counted, and the percentage overshoots
    // 100 instead of finishing exactly there.
    #[tokio::test]
    async fn precount_metadata_failure_overshoots_percent() {
        let store = FlakyMetadataStore {
            inner: tree_store(),
            flaky_url: "https://pod.example/docs/sub/".to_string(),
            calls: AtomicUsize::new(0),
        };
        let sink = RecordingSink::new();

        delete_resource(&store, "https://pod.example/docs/", &sink)
            .await
            .unwrap();

        assert!(store.inner.is_empty());

        let percents = sink.progress_percents();
        // Counted total was 4 (root + three children); 5 items completed.
        assert_eq!(percents.len(), 5);
        assert!(*percents.last().unwrap() > 100.0);
    }
}
