use std::path::PathBuf;

use icons_font::FontError;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Font(#[from] FontError),

    #[error("IO error accessing {path}: {0}", path = .1.display())]
    Io(std::io::Error, PathBuf),

    #[error("zlib codec failed: {0}")]
    Codec(#[from] std::io::Error),

    #[error("descriptions file not found: {}", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("icon references missing font row {0}")]
    MissingFont(i64),
}

pub type StoreResult<T> = Result<T, StoreError>;
