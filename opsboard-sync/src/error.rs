//! Error types for applying reorder plans

use opsboard_reorder::{ItemId, ReorderError, Snapshot};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// A single write that the store refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub item_id: ItemId,
    pub message: String,
}

/// Errors raised while moving an item against a live store
#[derive(Debug, Error)]
pub enum SyncError {
    /// Engine rejected the gesture; nothing was written
    #[error(transparent)]
    Reorder(#[from] ReorderError),

    /// Snapshot could not be fetched
    #[error("snapshot fetch failed: {0}")]
    Snapshot(#[source] StoreError),

    /// Some writes of an applied plan failed
    ///
    /// `refreshed` holds the authoritative snapshot fetched after the failure,
    /// or `None` when that refetch failed as well.
    #[error("{} of {} writes failed while moving {item_id}", .failures.len(), .failures.len() + .applied)]
    PersistenceFailure {
        item_id: ItemId,
        failures: Vec<WriteFailure>,
        applied: usize,
        refreshed: Option<Box<Snapshot>>,
    },

    /// Affected columns kept changing between snapshot and lock acquisition
    #[error("columns for {item_id} changed during {attempts} attempts")]
    ConcurrentModification { item_id: ItemId, attempts: u32 },

    /// Configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Whether repeating the whole gesture may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Snapshot(error) => error.is_retryable(),
            Self::PersistenceFailure { .. } | Self::ConcurrentModification { .. } => true,
            Self::Reorder(_) | Self::Config(_) => false,
        }
    }
}

/// Errors reported by persistence and snapshot collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    /// Item does not exist in the store
    #[error("item not found: {id}")]
    ItemNotFound { id: String },

    /// Store refused the write
    #[error("write rejected for {id}: {message}")]
    WriteRejected { id: String, message: String },

    /// Board file has an extension we cannot read
    #[error("unsupported board format: {path}")]
    UnsupportedFormat { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Create a write rejected error
    pub fn write_rejected(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WriteRejected {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Errors delivering an "item moved" notification
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Webhook answered with a non-success status
    #[error("webhook returned status {status}")]
    Status { status: u16 },

    /// Request could not be sent or timed out
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Webhook URL is malformed
    #[error("invalid webhook URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },
}

impl NotifyError {
    /// Server errors, throttling and transport failures are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status } => *status >= 500 || *status == 429,
            Self::Transport(error) => !error.is_builder(),
            Self::InvalidUrl { .. } => false,
        }
    }
}

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicitly requested config file does not exist
    #[error("config file not found: {path}")]
    MissingFile { path: PathBuf },

    /// Sources could not be merged or extracted
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A value is out of range
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self::Load(Box::new(error))
    }
}
