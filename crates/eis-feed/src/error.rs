use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum FeedError {
    /// Reading the file at the given path failed.
    Io(PathBuf, std::io::Error),
    Json(serde_json::Error),
    Toml(toml::de::Error),
    InvalidData(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Io(path, e) => write!(f, "failed to read {}: {e}", path.display()),
            FeedError::Json(e) => write!(f, "JSON error: {e}"),
            FeedError::Toml(e) => write!(f, "TOML error: {e}"),
            FeedError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Io(_, e) => Some(e),
            FeedError::Json(e) => Some(e),
            FeedError::Toml(e) => Some(e),
            FeedError::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Json(e)
    }
}

impl From<toml::de::Error> for FeedError {
    fn from(e: toml::de::Error) -> Self {
        FeedError::Toml(e)
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
