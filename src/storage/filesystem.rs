use super::ObjectStore;
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Object store backed by a local directory: `{root}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStore {
    root: PathBuf,
}

impl FilesystemObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve an object path, refusing anything that would escape the root.
    fn object_path(&self, bucket: &str, key: &str) -> anyhow::Result<PathBuf> {
        for part in [bucket, key] {
            let escapes = Path::new(part)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
            if part.is_empty() || escapes {
                anyhow::bail!("invalid object path component '{}'", part);
            }
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> anyhow::Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        tracing::debug!(path = %path.display(), "Reading object from filesystem");
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed to read s3://{}/{}", bucket, key))
    }
}
