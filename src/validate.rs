use serde_json::Value;

use crate::dataset::MetricsDataset;
use crate::error::DashboardError;

/// Checks a decoded payload against the sections the chart set needs.
///
/// Nested values are left alone; coercion happens during projection. Every
/// missing section is reported, in the order given by `required`.
pub fn validate<S: AsRef<str>>(raw: Value, required: &[S]) -> Result<MetricsDataset, DashboardError> {
    let root = match raw {
        Value::Object(map) => map,
        _ => {
            return Err(DashboardError::Schema {
                missing: required.iter().map(|s| s.as_ref().to_string()).collect(),
            })
        }
    };

    let missing: Vec<String> = required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !matches!(root.get(*name), Some(Value::Object(_)) | Some(Value::Array(_))))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(MetricsDataset::from_validated(root))
    } else {
        Err(DashboardError::Schema { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BEHAVIOR: [&str; 4] = ["summary", "departments", "risk", "phishing"];

    #[test]
    fn accepts_complete_payload_unchanged() {
        let raw = json!({
            "summary": {"pre_avg": 40},
            "departments": [],
            "risk": {"risk_level_counts": {}},
            "phishing": {},
            "generated_at": "2024-01-01T00:00:00Z"
        });
        let ds = validate(raw.clone(), &BEHAVIOR).unwrap();
        assert_eq!(ds.into_value(), raw);
    }

    #[test]
    fn names_all_missing_sections() {
        let raw = json!({"summary": {}, "departments": null, "phishing": 3});
        let err = validate(raw, &BEHAVIOR).unwrap_err();
        assert_eq!(
            err,
            DashboardError::Schema {
                missing: vec!["departments".into(), "risk".into(), "phishing".into()]
            }
        );
    }

    #[test]
    fn non_object_payload_misses_everything() {
        let err = validate(json!([1, 2, 3]), &BEHAVIOR).unwrap_err();
        match err {
            DashboardError::Schema { missing } => assert_eq!(missing.len(), 4),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn does_not_inspect_nested_values() {
        let raw = json!({
            "summary": {"pre_avg": "not a number"},
            "departments": [{"Department": null}],
            "risk": {},
            "phishing": {}
        });
        assert!(validate(raw, &BEHAVIOR).is_ok());
    }
}
