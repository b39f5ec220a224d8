//! Where a refresh cycle gets its payload from.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::DashboardConfig;
use crate::error::DashboardError;

mod file;
mod http;

pub use file::FileSource;
pub use http::{merge_payloads, EndpointSet, HttpSource};

#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Short human-readable name used in logs and error messages.
    fn describe(&self) -> String;
    async fn fetch(&self) -> Result<Value, DashboardError>;
}

fn is_url(s: &str) -> bool {
    Url::parse(s).map(|u| matches!(u.scheme(), "http" | "https")).unwrap_or(false)
}

/// Builds the configured source.
///
/// Several endpoints become an [`EndpointSet`]; otherwise `DASH_SOURCE` is a
/// URL or a local file path.
pub fn source_from_config(cfg: &DashboardConfig) -> Result<Box<dyn MetricsSource>> {
    if !cfg.endpoints.is_empty() {
        for e in &cfg.endpoints {
            if !is_url(e) {
                return Err(anyhow!("endpoint is not an http(s) url: {}", e));
            }
        }
        return Ok(Box::new(EndpointSet::new(cfg.endpoints.iter().map(|e| HttpSource::new(e.clone())).collect())));
    }
    if cfg.source.trim().is_empty() {
        return Err(anyhow!("no data source configured (DASH_SOURCE or DASH_ENDPOINTS)"));
    }
    if is_url(&cfg.source) {
        Ok(Box::new(HttpSource::new(cfg.source.clone())))
    } else {
        Ok(Box::new(FileSource::new(&cfg.source)))
    }
}
