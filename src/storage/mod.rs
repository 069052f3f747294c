//! # Object Storage
//!
//! Read access to the durable store holding transcript documents. The operator
//! only ever needs `get(bucket, key)`, so that is the whole trait.
//!
//! ## Backends:
//! - **http**: path-style GET against an S3-compatible endpoint
//!   (`{endpoint}/{bucket}/{key}`)
//! - **filesystem**: `{root}/{bucket}/{key}` on local disk, handy for
//!   development and tests

pub mod filesystem;
pub mod http;

pub use filesystem::FilesystemObjectStore;
pub use http::HttpObjectStore;

use crate::config::{AppConfig, ClientConfig, ObjectStoreBackend};
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the full object body.
    ///
    /// Fails when the object does not exist or cannot be accessed.
    async fn get(&self, bucket: &str, key: &str) -> anyhow::Result<Vec<u8>>;
}

/// Build the backend selected in the configuration.
pub fn from_config(
    config: &AppConfig,
    client_config: &ClientConfig,
) -> anyhow::Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.object_store.backend {
        ObjectStoreBackend::Http => Arc::new(HttpObjectStore::new(
            &config.object_store.endpoint,
            client_config.build_http_client()?,
        )),
        ObjectStoreBackend::Filesystem => {
            Arc::new(FilesystemObjectStore::new(&config.object_store.root))
        }
    };
    Ok(store)
}
