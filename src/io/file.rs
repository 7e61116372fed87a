use std::path::{Path, PathBuf};

use crate::model::TaskFeed;

/// Errors raised while reading or writing a task feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read feed {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write feed {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed feed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Save a task feed to a JSON file.
pub fn save_feed(feed: &TaskFeed, path: &Path) -> Result<(), FeedError> {
    let json = serde_json::to_string_pretty(feed)?;
    std::fs::write(path, json).map_err(|source| FeedError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a task feed from a JSON file.
pub fn load_feed(path: &Path) -> Result<TaskFeed, FeedError> {
    let json = std::fs::read_to_string(path).map_err(|source| FeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}
