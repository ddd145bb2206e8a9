use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::sync::Arc;

/// StorageService
///
/// Contract for the media object store. The core uploads bytes and persists
/// only the returned reference; it never stores raw media in the database.
/// Swappable between the real S3-compatible client (R2 in production, MinIO
/// locally) and the in-memory mock used by tests.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in the local setup to
    /// provision the MinIO bucket at startup. No-op in production.
    async fn ensure_bucket_exists(&self);

    /// Stores an object and returns its public URL. The object is written
    /// before any metadata row referencing it; if the metadata write later
    /// fails, the object is left behind (no compensating delete).
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>)
    -> Result<String, String>;

    /// Deletes an object by key. Returns false when the delete call fails;
    /// callers treat that as advisory, not fatal.
    async fn delete(&self, key: &str) -> bool;
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;

/// S3StorageClient
///
/// The concrete implementation using the AWS SDK for S3. R2, MinIO, and any
/// other S3-compatible endpoint are reached through the same client;
/// `force_path_style(true)` is required for both R2 and MinIO gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    endpoint: String,
    bucket_name: String,
}

impl S3StorageClient {
    /// Constructs the S3 client from static credentials and an explicit endpoint.
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        let client = s3::Client::from_conf(config);

        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket_name: bucket.to_string(),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket_name, key)
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// Calls the S3 CreateBucket API. Idempotent; safe to call at startup.
    async fn ensure_bucket_exists(&self) {
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, String> {
        let key = sanitize_key(key);

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        Ok(self.public_url(&key))
    }

    async fn delete(&self, key: &str) -> bool {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(sanitize_key(key))
            .send()
            .await
            .is_ok()
    }
}

/// Removes directory-navigation components (`..`, `.`, empty segments) from a
/// user-influenced key to prevent path traversal.
fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// In-memory implementation used by unit and integration tests. Records
/// uploaded keys so tests can assert on them without a network connection.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    uploads: Arc<std::sync::Mutex<Vec<String>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Keys uploaded so far, in order.
    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {
        // No-op in mock environment.
    }

    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }

        let sanitized_key = sanitize_key(key);
        self.uploads.lock().unwrap().push(sanitized_key.clone());

        Ok(format!(
            "http://localhost:9000/mock-bucket/{sanitized_key}"
        ))
    }

    async fn delete(&self, key: &str) -> bool {
        if self.should_fail {
            return false;
        }
        let sanitized_key = sanitize_key(key);
        let mut uploads = self.uploads.lock().unwrap();
        if let Some(pos) = uploads.iter().position(|k| *k == sanitized_key) {
            uploads.remove(pos);
            true
        } else {
            // Deleting a never-uploaded key mirrors S3: the call still succeeds.
            true
        }
    }
}
