use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use super::MetricsSource;
use crate::error::DashboardError;

/// A static JSON export on local disk, re-read on every cycle.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MetricsSource for FileSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn fetch(&self) -> Result<Value, DashboardError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DashboardError::fetch(self.describe(), e))?;
        serde_json::from_slice(&bytes).map_err(|e| DashboardError::fetch(self.describe(), format!("invalid json: {}", e)))
    }
}
