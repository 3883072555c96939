//! JSON file-backed store: a single document at `<dir>/state.json`, written
//! with a write-temp-then-rename sequence so a crash mid-save can never
//! corrupt the previous, readable state.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::model::State;

use super::{Store, StoreError, StoreKind};

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// `dir` is created if missing; the state document lives at
    /// `dir/state.json`.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;
        Ok(Self {
            path: dir.join("state.json"),
        })
    }
}

#[async_trait]
impl Store for FileStore {
    async fn load(&self) -> Result<State, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no state file yet, starting empty");
                Ok(State::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, state: &State) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(state)?;
        let temp_path = self.path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;
        tracing::debug!(path = %self.path.display(), items = state.items.len(), "state saved");
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::File
    }
}
