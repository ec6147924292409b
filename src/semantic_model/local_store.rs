use super::store::{StageFile, StageStore, StageStoreError};
use async_trait::async_trait;
use log::info;
use std::path::{Path, PathBuf};

/// Stage kept on the local filesystem, one directory per stage
#[derive(Clone)]
pub struct LocalStageStore {
    root: PathBuf,
}

impl LocalStageStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        LocalStageStore {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, file: &StageFile) -> PathBuf {
        self.root.join(file.stage_path()).join(&file.file_name)
    }

    /// Write `content` straight into the root directory
    pub async fn download(&self, file_name: &str, content: &[u8]) -> Result<PathBuf, StageStoreError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(file_name);
        tokio::fs::write(&path, content).await?;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}

#[async_trait]
impl StageStore for LocalStageStore {
    async fn put(&self, file: &StageFile, content: &[u8]) -> Result<(), StageStoreError> {
        let path = self.path(file);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        info!("Stored {} at {}", file, path.display());
        Ok(())
    }

    async fn get(&self, file: &StageFile) -> Result<Vec<u8>, StageStoreError> {
        let path = self.path(file);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StageStoreError::FileNotFound(file.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
