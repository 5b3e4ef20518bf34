//! Cloud storage output support (S3, R2, GCS, Azure)

use crate::error::{Error, Result};
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::fmt;
use std::sync::Arc;

/// Cloud storage destination parsed from URL
#[derive(Clone)]
pub struct CloudDestination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Bucket, container or local root used when rendering locations
    root: String,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// Original URL scheme for logging
    scheme: String,
}

impl fmt::Debug for CloudDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudDestination")
            .field("scheme", &self.scheme)
            .field("root", &self.root)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Split `bucket/some/prefix/` into the bucket and a prefix without slashes at its ends
fn split_bucket(rest: &str) -> (&str, String) {
    match rest.find('/') {
        Some(idx) => (&rest[..idx], rest[idx + 1..].trim_matches('/').to_string()),
        None => (rest, String::new()),
    }
}

impl CloudDestination {
    /// Parse a destination URL and create appropriate object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `file:///local/path/`, `/local/path/` or `./path/` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        if url.starts_with("s3://") {
            Self::parse_s3(url, false)
        } else if url.starts_with("r2://") {
            Self::parse_s3(url, true)
        } else if url.starts_with("gs://") {
            Self::parse_gcs(url)
        } else if url.starts_with("az://") {
            Self::parse_azure(url)
        } else {
            Self::parse_local(url)
        }
    }

    /// Wrap an existing object store
    ///
    /// Used for stores that cannot be described by a URL, such as
    /// `object_store::memory::InMemory`.
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        scheme: impl Into<String>,
        root: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            root: root.into(),
            prefix: prefix.into().trim_matches('/').to_string(),
            scheme: scheme.into(),
        }
    }

    /// Parse S3 or R2 URL
    fn parse_s3(url: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let without_scheme = url
            .strip_prefix(&format!("{scheme}://"))
            .ok_or_else(|| Error::config(format!("Invalid {scheme} URL: {url}")))?;

        let (bucket, prefix) = split_bucket(without_scheme);
        if bucket.is_empty() {
            return Err(Error::invalid_value("bucket", format!("no bucket in {url}")));
        }

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // R2 endpoint: https://<account_id>.r2.cloudflarestorage.com
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            root: bucket.to_string(),
            prefix,
            scheme: scheme.to_string(),
        })
    }

    /// Parse GCS URL
    fn parse_gcs(url: &str) -> Result<Self> {
        let without_scheme = url
            .strip_prefix("gs://")
            .ok_or_else(|| Error::config(format!("Invalid GCS URL: {url}")))?;

        let (bucket, prefix) = split_bucket(without_scheme);

        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            root: bucket.to_string(),
            prefix,
            scheme: "gs".to_string(),
        })
    }

    /// Parse Azure Blob URL
    fn parse_azure(url: &str) -> Result<Self> {
        let without_scheme = url
            .strip_prefix("az://")
            .ok_or_else(|| Error::config(format!("Invalid Azure URL: {url}")))?;

        let (container, prefix) = split_bucket(without_scheme);

        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            root: container.to_string(),
            prefix,
            scheme: "az".to_string(),
        })
    }

    /// Parse local filesystem path
    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);
        if path.is_empty() {
            return Err(Error::config("Empty local output path"));
        }

        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            root: path.trim_end_matches('/').to_string(),
            prefix: String::new(),
            scheme: "file".to_string(),
        })
    }

    /// Get the scheme (s3, r2, gs, az, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the bucket, container or local root
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Get the prefix inside the bucket
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Object path for a key relative to the prefix
    fn object_path(&self, key: &str) -> ObjectPath {
        let key = key.trim_start_matches('/');
        if self.prefix.is_empty() {
            ObjectPath::from(key)
        } else {
            ObjectPath::from(format!("{}/{key}", self.prefix))
        }
    }

    /// Render the full location of an object path, e.g. `s3://bucket/prefix/key`
    fn location(&self, path: &ObjectPath) -> String {
        format!("{}://{}/{path}", self.scheme, self.root)
    }

    /// Write bytes to a key in the destination, returning the full location
    pub async fn write(&self, key: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(key);

        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::output(format!("Failed to write {path}: {e}")))?;

        Ok(self.location(&path))
    }

    /// Read the object stored at a key
    pub async fn read(&self, key: &str) -> Result<Bytes> {
        let path = self.object_path(key);
        let data = self.store.get(&path).await?.bytes().await?;
        Ok(data)
    }

    /// List `.parquet` keys under a sub-prefix, relative to the destination prefix
    ///
    /// Keys are returned sorted.
    pub async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let base = match prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
            Some(sub) => self.object_path(sub),
            None if self.prefix.is_empty() => ObjectPath::default(),
            None => ObjectPath::from(self.prefix.as_str()),
        };
        let search = if base.as_ref().is_empty() {
            None
        } else {
            Some(&base)
        };

        let objects: Vec<_> = self.store.list(search).try_collect().await?;

        let mut keys: Vec<String> = objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .filter(|location| location.ends_with(".parquet"))
            .map(|location| self.relative_key(&location))
            .collect();
        keys.sort();

        Ok(keys)
    }

    /// Strip the destination prefix from a full object path
    fn relative_key(&self, location: &str) -> String {
        if self.prefix.is_empty() {
            return location.to_string();
        }
        location
            .strip_prefix(self.prefix.as_str())
            .map_or(location, |rest| rest.trim_start_matches('/'))
            .to_string()
    }
}
