use anyhow::{anyhow, Result};

use crate::chart::Profile;

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub profile: Profile,
    /// File path or URL of a single JSON payload.
    pub source: String,
    /// Endpoints merged in order (first writer wins). Overrides `source` when set.
    pub endpoints: Vec<String>,
    pub refresh_secs: u64,
    pub pie_label_min_pct: f64,
    pub bind: String,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        let profile_name = std::env::var("DASH_PROFILE").unwrap_or_else(|_| "behavior".to_string());
        let profile = Profile::parse(&profile_name).ok_or_else(|| anyhow!("unknown DASH_PROFILE: {}", profile_name))?;
        let cfg = Self {
            profile,
            source: std::env::var("DASH_SOURCE").unwrap_or_else(|_| match profile {
                Profile::Behavior => "web/dashboard_data.json".to_string(),
                Profile::Culture => String::new(),
            }),
            endpoints: std::env::var("DASH_ENDPOINTS").map(|v| split_list(&v)).unwrap_or_default(),
            refresh_secs: std::env::var("DASH_REFRESH_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(60),
            pie_label_min_pct: std::env::var("DASH_PIE_LABEL_MIN_PCT").ok().and_then(|v| v.parse().ok()).unwrap_or(8.0),
            bind: std::env::var("DASH_BIND").unwrap_or_else(|_| "127.0.0.1:8787".to_string()),
        };
        cfg.check()?;
        Ok(cfg)
    }

    fn check(&self) -> Result<()> {
        if self.refresh_secs == 0 {
            return Err(anyhow!("DASH_REFRESH_SECS must be at least 1"));
        }
        if !(0.0..=100.0).contains(&self.pie_label_min_pct) {
            return Err(anyhow!("DASH_PIE_LABEL_MIN_PCT must be within 0..=100"));
        }
        Ok(())
    }
}

fn split_list(v: &str) -> Vec<String> {
    v.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_list_is_trimmed() {
        assert_eq!(
            split_list(" http://a/api/culture-metrics, ,http://a/api/trend-data "),
            vec!["http://a/api/culture-metrics", "http://a/api/trend-data"]
        );
    }

    #[test]
    fn zero_period_is_rejected() {
        let cfg = DashboardConfig {
            profile: Profile::Behavior,
            source: "x.json".into(),
            endpoints: vec![],
            refresh_secs: 0,
            pie_label_min_pct: 8.0,
            bind: "127.0.0.1:0".into(),
        };
        assert!(cfg.check().is_err());
    }
}
