use tracing::warn;

use crate::error::Result;
use crate::media::{MediaKind, MediaList};
use crate::storage::{ObjectStore, UploadResult};

/// What to do with the rest of the queue after one transfer fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadPolicy {
    /// Keep going and report which files failed. This matches the file
    /// picker flow: one bad file in a multi-selection should not discard
    /// the rest.
    #[default]
    ContinueOnError,
    /// Stop at the first failure, keeping the refs appended so far.
    AbortOnFirstError,
}

/// One file as handed over by the caller.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }
}

#[derive(Debug)]
pub struct UploadFailure {
    /// Position of the file in the submitted batch.
    pub index: usize,
    pub name: String,
    pub message: String,
}

/// Outcome of one batch: successes in submission order, plus per-file
/// failures.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub uploaded: Vec<UploadResult>,
    pub failures: Vec<UploadFailure>,
}

/// Hands files to object storage one at a time and feeds the resulting refs
/// into a [`MediaList`].
///
/// Transfers are serialized deliberately: append order must match submission
/// order, and a ref is appended only after its transfer fully succeeded, so
/// a failed transfer never leaves a partial entry behind.
pub struct UploadGateway<S: ObjectStore> {
    store: S,
    policy: UploadPolicy,
}

impl<S: ObjectStore> UploadGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store, policy: UploadPolicy::default() }
    }

    pub fn with_policy(store: S, policy: UploadPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Uploads a single file. The caller appends the returned ref itself.
    pub async fn upload(&self, kind: MediaKind, file: SourceFile) -> Result<UploadResult> {
        self.store.put(kind, &file.name, file.bytes).await
    }

    /// Uploads a batch sequentially, appending each successful ref to `list`.
    pub async fn upload_into(
        &self,
        kind: MediaKind,
        files: Vec<SourceFile>,
        list: &mut MediaList,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for (index, file) in files.into_iter().enumerate() {
            let name = file.name.clone();
            match self.store.put(kind, &file.name, file.bytes).await {
                Ok(result) => {
                    list.append(result.url.clone());
                    report.uploaded.push(result);
                }
                Err(err) => {
                    warn!("upload of {name} failed: {err}");
                    report.failures.push(UploadFailure {
                        index,
                        name,
                        message: err.to_string(),
                    });
                    if self.policy == UploadPolicy::AbortOnFirstError {
                        break;
                    }
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::InMemoryObjectStore;

    fn batch(names: &[&str]) -> Vec<SourceFile> {
        names.iter().map(|n| SourceFile::new(*n, vec![0u8; 4])).collect()
    }

    #[tokio::test]
    async fn single_upload_returns_the_stored_ref() {
        let gateway = UploadGateway::new(InMemoryObjectStore::new());
        let result = gateway
            .upload(MediaKind::Photo, SourceFile::new("a.jpg", vec![1, 2, 3]))
            .await
            .unwrap();
        assert_eq!(result.original_name, "a.jpg");
        assert_eq!(result.url, "/api/upload/files/blob0001.jpg");
        assert!(gateway.store().contains(&result.stored_name));
    }

    #[tokio::test]
    async fn single_upload_surfaces_transfer_failures() {
        let store = InMemoryObjectStore::new();
        store.fail_on_call(1);
        let gateway = UploadGateway::new(store);
        let err = gateway
            .upload(MediaKind::Photo, SourceFile::new("a.jpg", vec![1]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TransferFailed(_)));
        assert_eq!(gateway.store().blob_count(), 0);
    }

    #[tokio::test]
    async fn continue_on_error_keeps_survivors_in_order() {
        let store = InMemoryObjectStore::new();
        store.fail_on_call(2);
        let gateway = UploadGateway::new(store);

        let mut list = MediaList::new();
        let report = gateway
            .upload_into(MediaKind::Photo, batch(&["a.jpg", "b.jpg", "c.jpg"]), &mut list)
            .await;

        assert_eq!(report.uploaded.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[0].name, "b.jpg");

        // refs of files 1 and 3, in submission order
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0), Some("/api/upload/files/blob0001.jpg"));
        assert_eq!(list.get(1), Some("/api/upload/files/blob0003.jpg"));
    }

    #[tokio::test]
    async fn abort_on_first_error_stops_the_queue() {
        let store = InMemoryObjectStore::new();
        store.fail_on_call(2);
        let gateway = UploadGateway::with_policy(store, UploadPolicy::AbortOnFirstError);

        let mut list = MediaList::new();
        let report = gateway
            .upload_into(MediaKind::Photo, batch(&["a.jpg", "b.jpg", "c.jpg"]), &mut list)
            .await;

        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(list.len(), 1);
        // the third file was never transferred
        assert_eq!(gateway.store().blob_count(), 1);
    }

    #[tokio::test]
    async fn failed_transfer_appends_nothing() {
        let store = InMemoryObjectStore::new();
        store.fail_on_call(1);
        let gateway = UploadGateway::new(store);

        let mut list = MediaList::new();
        let report = gateway.upload_into(MediaKind::Photo, batch(&["a.jpg"]), &mut list).await;
        assert!(report.uploaded.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let gateway = UploadGateway::new(InMemoryObjectStore::new());
        let mut list = MediaList::new();
        let report = gateway.upload_into(MediaKind::Video, Vec::new(), &mut list).await;
        assert!(report.uploaded.is_empty());
        assert!(report.failures.is_empty());
        assert!(list.is_empty());
    }
}
