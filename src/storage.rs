//! Object storage for rendered images and the keys/URLs they are published under.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::BoxFuture;
use crate::constants::{
    DEFAULT_CACHE_CONTROL, DUCK_CACHE_CONTROL, DUCK_KEY_PREFIX, MEME_CACHE_CONTROL,
    MEME_KEY_PREFIX, PNG_EXTENSION,
};

/// Errors returned by an [`ObjectStore`].
#[derive(Debug)]
pub enum StorageError {
    /// The key would escape the store or is empty.
    InvalidKey(String),
    /// The backing store failed.
    Io(std::io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "Invalid object key: {key:?}"),
            Self::Io(err) => write!(f, "Object store I/O error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

/// Somewhere to put finished images.
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Writes `bytes` under `key`, replacing any existing object.
    fn put<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
        cache_control: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;
}

/// Stores objects as files below a root directory.
#[derive(Clone, Debug)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Store rooted at `root`; the directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(StorageError::InvalidKey(key.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl ObjectStore for LocalObjectStore {
    fn put<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
        cache_control: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            let parent = path
                .parent()
                .ok_or_else(|| StorageError::InvalidKey(key.to_string()))?
                .to_path_buf();
            tokio::fs::create_dir_all(&parent).await?;
            let size = bytes.len();
            tokio::task::spawn_blocking(move || replace_file(&parent, &path, &bytes))
                .await
                .map_err(|err| StorageError::Io(std::io::Error::other(err)))??;
            debug!(
                "Stored {} ({} bytes, {}, {})",
                key, size, content_type, cache_control
            );
            Ok(())
        })
    }
}

/// Writes through a uniquely named staging file in `dir`, then renames it over
/// `path`. Readers never see a partial image and concurrent writers of the
/// same key each land a complete file; the last rename wins.
fn replace_file(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let mut staging = tempfile::NamedTempFile::new_in(dir)?;
    staging.write_all(bytes)?;
    staging.flush()?;
    staging
        .persist(path)
        .map_err(|err| StorageError::Io(err.error))?;
    Ok(())
}

/// Replaces anything outside `[A-Za-z0-9_-]` with `-`; empty input becomes
/// `unknown`.
pub fn normalize_key_segment(segment: &str) -> String {
    let cleaned: String = segment
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

/// `{prefix}/{name}-{timestamp}.png`
pub fn object_key(prefix: &str, name: &str, timestamp: i64) -> String {
    format!(
        "{prefix}/{}-{timestamp}.{PNG_EXTENSION}",
        normalize_key_segment(name)
    )
}

/// Cache-Control an object is published with, chosen by its key prefix.
pub fn cache_control_for_key(key: &str) -> &'static str {
    match key.trim_start_matches('/').split('/').next() {
        Some(DUCK_KEY_PREFIX) => DUCK_CACHE_CONTROL,
        Some(MEME_KEY_PREFIX) => MEME_CACHE_CONTROL,
        _ => DEFAULT_CACHE_CONTROL,
    }
}

/// Joins `key` onto the public base URL, treating the base as a directory.
pub fn public_url(base: &Url, key: &str) -> Result<Url, url::ParseError> {
    if base.path().ends_with('/') {
        return base.join(key);
    }
    let mut base = base.clone();
    let path = format!("{}/", base.path());
    base.set_path(&path);
    base.join(key)
}
