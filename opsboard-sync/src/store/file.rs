//! File-backed board store
//!
//! The whole board lives in one YAML or JSON document. Every write reloads
//! the document, updates one item and replaces the file through a rename so
//! readers never see a half-written board.

use crate::collaborators::{Persistence, SnapshotSource};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use opsboard_reorder::{ItemId, ItemUpdate, Snapshot};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, trace};

/// Serialization format of a board file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardFormat {
    Yaml,
    Json,
}

impl BoardFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(StoreError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    fn parse(self, content: &str) -> Result<Snapshot, StoreError> {
        match self {
            Self::Yaml => Ok(serde_yaml_ng::from_str(content)?),
            Self::Json => Ok(serde_json::from_str(content)?),
        }
    }

    fn render(self, snapshot: &Snapshot) -> Result<String, StoreError> {
        match self {
            Self::Yaml => Ok(serde_yaml_ng::to_string(snapshot)?),
            Self::Json => Ok(serde_json::to_string_pretty(snapshot)?),
        }
    }
}

/// Board stored in a single file
#[derive(Debug)]
pub struct FileBoard {
    path: PathBuf,
    format: BoardFormat,
    write_lock: Mutex<()>,
}

impl FileBoard {
    /// Open a board file; the file itself is read lazily
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let format = BoardFormat::from_path(&path)?;
        Ok(Self {
            path,
            format,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> BoardFormat {
        self.format
    }

    /// Read and parse the board
    pub async fn load(&self) -> Result<Snapshot, StoreError> {
        trace!("Loading board from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        self.format.parse(&content)
    }

    /// Replace the board file with `snapshot`
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_atomic(snapshot).await
    }

    async fn write_atomic(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let content = self.format.render(snapshot)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Wrote board to {}", self.path.display());
        Ok(())
    }
}

#[async_trait]
impl Persistence for FileBoard {
    async fn update_item(&self, id: &ItemId, update: &ItemUpdate) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.load().await?;
        let item = snapshot
            .item_mut(id)
            .ok_or_else(|| StoreError::ItemNotFound { id: id.to_string() })?;
        update.apply_to(item);
        item.updated_at = Some(Utc::now());

        self.write_atomic(&snapshot).await
    }
}

#[async_trait]
impl SnapshotSource for FileBoard {
    async fn fetch_snapshot(&self) -> Result<Snapshot, StoreError> {
        self.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard_reorder::{ColumnKey, Item, OrderKey};
    use tempfile::TempDir;

    fn sample() -> Snapshot {
        Snapshot::new(
            vec![ColumnKey::from("pending"), ColumnKey::from("done")],
            vec![
                Item::new("t1", "pending", 1024).with_title("Restock minibar 112"),
                Item::new("t2", "pending", 2048),
            ],
        )
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            BoardFormat::from_path(Path::new("board.yaml")).unwrap(),
            BoardFormat::Yaml
        );
        assert_eq!(
            BoardFormat::from_path(Path::new("board.yml")).unwrap(),
            BoardFormat::Yaml
        );
        assert_eq!(
            BoardFormat::from_path(Path::new("board.json")).unwrap(),
            BoardFormat::Json
        );
        assert!(matches!(
            BoardFormat::from_path(Path::new("board.csv")),
            Err(StoreError::UnsupportedFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_and_load_yaml() {
        let temp = TempDir::new().unwrap();
        let board = FileBoard::open(temp.path().join("board.yaml")).unwrap();

        board.save(&sample()).await.unwrap();
        assert_eq!(board.load().await.unwrap(), sample());
        assert!(!temp.path().join("board.yaml.tmp").exists());
    }

    #[tokio::test]
    async fn test_update_item_json() {
        let temp = TempDir::new().unwrap();
        let board = FileBoard::open(temp.path().join("board.json")).unwrap();
        board.save(&sample()).await.unwrap();

        let update = ItemUpdate {
            column: Some("done".into()),
            order_key: OrderKey::new(1024),
        };
        board.update_item(&"t2".into(), &update).await.unwrap();

        let snapshot = board.fetch_snapshot().await.unwrap();
        let item = snapshot.find_item(&"t2".into()).unwrap();
        assert_eq!(item.column, ColumnKey::from("done"));
        assert!(item.updated_at.is_some());

        let untouched = snapshot.find_item(&"t1".into()).unwrap();
        assert_eq!(untouched.title.as_deref(), Some("Restock minibar 112"));
        assert!(untouched.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let board = FileBoard::open(temp.path().join("absent.yaml")).unwrap();
        assert!(matches!(board.load().await, Err(StoreError::Io(_))));
    }
}
