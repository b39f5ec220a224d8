use thiserror::Error;

/// Failures that abort a refresh cycle.
///
/// Fetch and schema errors are raised before any region is touched, so the
/// page keeps showing its last good render.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("failed to load {source_name}: {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("payload missing required sections: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("chart {chart} could not be rendered: {reason}")]
    Render { chart: String, reason: String },
}

impl DashboardError {
    pub fn fetch(source_name: impl Into<String>, reason: impl ToString) -> Self {
        DashboardError::Fetch { source_name: source_name.into(), reason: reason.to_string() }
    }

    pub fn render(chart: impl Into<String>, reason: impl Into<String>) -> Self {
        DashboardError::Render { chart: chart.into(), reason: reason.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Fetch { .. } => "fetch",
            DashboardError::Schema { .. } => "schema",
            DashboardError::Render { .. } => "render",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_every_section() {
        let err = DashboardError::Schema { missing: vec!["risk".into(), "phishing".into()] };
        assert_eq!(err.to_string(), "payload missing required sections: risk, phishing");
        assert_eq!(err.kind(), "schema");
    }

    #[test]
    fn fetch_error_carries_source() {
        let err = DashboardError::fetch("dashboard_data.json", "HTTP 404");
        assert_eq!(err.to_string(), "failed to load dashboard_data.json: HTTP 404");
    }
}
