use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::presigning::PresigningConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// StorageService
///
/// The abstract contract for the object storage holding uploaded PDF
/// documents. The concrete implementation is swappable: the real S3 client in
/// production, the in-memory mock in tests. The record store only ever holds
/// object keys; the bytes live behind this trait.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in the `Env::Local` setup
    /// to provision the bucket in MinIO. Safe to call repeatedly.
    async fn ensure_bucket_exists(&self);

    /// Generates a temporary, signed URL allowing a client to PUT a document
    /// directly into the bucket, constrained to the given content type.
    async fn presigned_upload_url(&self, key: &str, content_type: &str) -> Result<String, String>;

    /// Removes a stored object. Callers treat this as best-effort: a failure
    /// is logged by the caller and never rolls anything back.
    async fn delete_object(&self, key: &str) -> Result<(), String>;
}

/// StorageState
///
/// The concrete type used to share the storage service across the
/// application state.
pub type StorageState = Arc<dyn StorageService>;

/// S3StorageClient
///
/// The real implementation using the AWS SDK for S3. S3 compatibility means
/// this transparently covers a Dockerized MinIO instance locally and any
/// S3-compatible endpoint in production. `force_path_style(true)` is required
/// for MinIO-style gateways.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
}

impl S3StorageClient {
    /// Constructs the S3 client from the credentials resolved by AppConfig.
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
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// Calls the S3 CreateBucket API; idempotent, so safe at startup.
    async fn ensure_bucket_exists(&self) {
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn presigned_upload_url(&self, key: &str, content_type: &str) -> Result<String, String> {
        // Ten minutes is enough for a single PDF PUT.
        let expires_in = Duration::from_secs(600);

        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| e.to_string())?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            // Constrains the client request to the declared content type.
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| e.to_string())?;

        Ok(presigned_req.uri().to_string())
    }

    async fn delete_object(&self, key: &str) -> Result<(), String> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// sanitize_key
///
/// Strips directory-navigation components (`..`, `.`, empty segments) from a
/// key before it is embedded anywhere, closing off path traversal through
/// client-influenced names.
fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// In-memory implementation for tests: deterministic URLs, no network, and a
/// record of every deleted key so tests can observe the post-delete hook.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    /// Keys passed to `delete_object`, in call order.
    pub deleted_keys: Arc<Mutex<Vec<String>>>,
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

    /// Snapshot of the keys deleted so far.
    pub fn deleted(&self) -> Vec<String> {
        self.deleted_keys.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {
        // No-op in the mock environment.
    }

    async fn presigned_upload_url(&self, key: &str, _content_type: &str) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Storage Error: simulation requested".to_string());
        }

        let sanitized_key = sanitize_key(key);

        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitized_key
        ))
    }

    async fn delete_object(&self, key: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("Mock Storage Error: simulation requested".to_string());
        }
        self.deleted_keys
            .lock()
            .expect("mock lock poisoned")
            .push(key.to_string());
        Ok(())
    }
}
