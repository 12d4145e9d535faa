//! Local filesystem media storage.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use scribe_core::ports::{ImageFormat, MediaError, MediaStore};

/// Stores uploads below a root directory as `<dir>/<uuid>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored relative path, refusing anything that could escape the root.
    fn resolve(&self, relative: &str) -> Result<PathBuf, MediaError> {
        let path = Path::new(relative);
        let safe = !relative.is_empty()
            && path
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !safe {
            return Err(MediaError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn store(
        &self,
        dir: &str,
        format: ImageFormat,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        let relative = format!("{dir}/{}.{}", Uuid::new_v4(), format.extension());
        let path = self.resolve(&relative)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MediaError::Io(e.to_string()))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::debug!(path = %relative, size = bytes.len(), "Stored upload");
        Ok(relative)
    }

    async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        let path = self.resolve(relative)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}
