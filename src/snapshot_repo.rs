// Last-snapshot JSON dump for external inspection (overwritten each save)

use crate::models::EnrichedSnapshot;
use std::path::{Path, PathBuf};
use tracing::instrument;

pub struct SnapshotRepo {
    path: PathBuf,
}

impl SnapshotRepo {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Writes the pretty-printed latest snapshot (no history) to the
    /// configured path, replacing any previous dump.
    #[instrument(skip(self, snapshot), fields(repo = "snapshot", operation = "save_latest"))]
    pub async fn save_latest(&self, snapshot: &EnrichedSnapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(snapshot)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
