// ── Per-collection fetch state ──

use std::fmt;
use std::sync::Arc;

/// What the rendering layer sees for one collection.
///
/// `data` is never absent: before the first successful fetch it is an
/// empty list, so counts derived from it are always valid. A failed
/// refresh keeps the last good `data` and only sets `error`.
#[derive(Debug)]
pub struct CollectionState<T> {
    pub data: Arc<Vec<T>>,
    pub loading: bool,
    pub error: Option<FetchError>,
}

impl<T> CollectionState<T> {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            data: Arc::new(Vec::new()),
            loading: false,
            error: None,
        }
    }
}

impl<T> Clone for CollectionState<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            loading: self.loading,
            error: self.error.clone(),
        }
    }
}

/// Cloneable summary of a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub message: String,
    pub status: Option<u16>,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {status})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl From<&headdeck_api::Error> for FetchError {
    fn from(err: &headdeck_api::Error) -> Self {
        Self {
            message: err.to_string(),
            status: err.status(),
        }
    }
}
