use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::ApiConfiguration;
use crate::error::{Error, Result};
use crate::media::{extension, MediaKind};
use crate::session::SessionProvider;

/// Reference returned by object storage for one accepted file.
///
/// `stored_name` is the server-generated storage key (wire name `filename`);
/// `original_name` is preserved for display only and never used as a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(rename = "filename")]
    pub stored_name: String,
    pub url: String,
    pub original_name: String,
}

/// Object-storage seam: one stored blob per successful `put`.
pub trait ObjectStore {
    async fn put(&self, kind: MediaKind, original_name: &str, bytes: Vec<u8>) -> Result<UploadResult>;

    async fn delete(&self, stored_name: &str) -> Result<()>;
}

/// Talks to the backend's upload endpoints over multipart HTTP.
pub struct HttpObjectStore {
    client: Client,
    config: Arc<ApiConfiguration>,
    session: Arc<dyn SessionProvider>,
}

impl HttpObjectStore {
    pub fn new(config: ApiConfiguration, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.credential() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.expire();
            return Err(Error::AuthExpired);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TransferFailed(format!("storage returned {status}: {body}")));
        }
        Ok(response)
    }
}

impl ObjectStore for HttpObjectStore {
    async fn put(&self, kind: MediaKind, original_name: &str, bytes: Vec<u8>) -> Result<UploadResult> {
        let mime = mime_guess::from_path(original_name).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(original_name.to_string())
            .mime_str(mime.essence_str())
            .map_err(Error::transfer)?;
        let form = Form::new().part("file", part);

        let response = self
            .authorize(self.client.post(self.url(&format!("/api/upload/{}", kind.as_str()))))
            .multipart(form)
            .send()
            .await?;
        let response = self.check(response).await?;
        let result: UploadResult = response.json().await.map_err(Error::transfer)?;
        info!("stored {} {} as {}", kind, result.original_name, result.stored_name);
        Ok(result)
    }

    async fn delete(&self, stored_name: &str) -> Result<()> {
        let path = format!("/api/upload/files/{}", urlencoding::encode(stored_name));
        let response = self.authorize(self.client.delete(self.url(&path))).send().await?;
        self.check(response).await?;
        info!("deleted stored blob {stored_name}");
        Ok(())
    }
}

/// In-memory object store for tests and offline runs.
///
/// Individual calls can be told to fail, to exercise the gateway's failure
/// policies.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    state: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    calls: u64,
    blobs: HashMap<String, Vec<u8>>,
    fail_on: Vec<u64>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the nth `put` call (1-based) fail with `TransferFailed`.
    pub fn fail_on_call(&self, call: u64) {
        self.state.lock().unwrap().fail_on.push(call);
    }

    pub fn blob_count(&self) -> usize {
        self.state.lock().unwrap().blobs.len()
    }

    pub fn contains(&self, stored_name: &str) -> bool {
        self.state.lock().unwrap().blobs.contains_key(stored_name)
    }
}

impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, kind: MediaKind, original_name: &str, bytes: Vec<u8>) -> Result<UploadResult> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if state.fail_on.contains(&state.calls) {
            return Err(Error::TransferFailed(format!(
                "simulated failure on call {}",
                state.calls
            )));
        }
        if !kind.accepts(original_name) {
            return Err(Error::TransferFailed(format!(
                "storage rejected {original_name}: not a {kind} file"
            )));
        }
        let ext = extension(original_name).unwrap_or_default();
        let stored_name = format!("blob{:04}.{ext}", state.calls);
        state.blobs.insert(stored_name.clone(), bytes);
        Ok(UploadResult {
            url: format!("/api/upload/files/{stored_name}"),
            stored_name,
            original_name: original_name.to_string(),
        })
    }

    async fn delete(&self, stored_name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.blobs.remove(stored_name).is_none() {
            return Err(Error::TransferFailed(format!("no stored blob named {stored_name}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_stores_one_blob_per_call() {
        let store = InMemoryObjectStore::new();
        let first = store.put(MediaKind::Photo, "a.jpg", vec![1]).await.unwrap();
        let second = store.put(MediaKind::Photo, "a.jpg", vec![2]).await.unwrap();
        assert_ne!(first.stored_name, second.stored_name);
        assert_eq!(first.original_name, "a.jpg");
        assert_eq!(store.blob_count(), 2);
    }

    #[tokio::test]
    async fn put_rejects_mismatched_kind() {
        let store = InMemoryObjectStore::new();
        let err = store.put(MediaKind::Video, "a.jpg", vec![1]).await.unwrap_err();
        assert!(matches!(err, Error::TransferFailed(_)));
        assert_eq!(store.blob_count(), 0);
    }

    #[tokio::test]
    async fn delete_removes_by_stored_name() {
        let store = InMemoryObjectStore::new();
        let result = store.put(MediaKind::Photo, "a.jpg", vec![1]).await.unwrap();
        store.delete(&result.stored_name).await.unwrap();
        assert!(!store.contains(&result.stored_name));
        assert!(store.delete(&result.stored_name).await.is_err());
    }
}
