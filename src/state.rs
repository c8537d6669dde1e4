//! Shared latest-reading state between the sampling loop and the web server.

use crate::sampling::reading::Reading;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The most recent complete reading, behind an explicit accessor.
///
/// The sampling loop swaps in each finished reading whole, so readers
/// observe either the previous or the current cycle, never a partially
/// assembled one.
#[derive(Debug, Clone, Default)]
pub struct LatestReading {
    inner: Arc<RwLock<Option<Reading>>>,
}

impl LatestReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored reading with this cycle's result.
    pub async fn update(&self, reading: Reading) {
        *self.inner.write().await = Some(reading);
    }

    /// A snapshot of the most recent reading, if any cycle has completed.
    pub async fn snapshot(&self) -> Option<Reading> {
        self.inner.read().await.clone()
    }
}
