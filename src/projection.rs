//! Chart-ready views of a validated dataset.
//!
//! Each projection is a pure function returning fresh rows; nothing here keeps
//! state between refresh cycles. Numeric fields go through `coerce_number`, so a
//! malformed value shows up as 0 instead of failing the cycle.

use std::cmp::Ordering;

use serde_json::Value;

use crate::dataset::{coerce_label, coerce_number, MetricsDataset};
use crate::format;

// =============================================================================
// Metric cards
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardFormat {
    /// Value as the source wrote it (numbers without trailing `.0`).
    Plain,
    Fixed(usize),
    Integer,
}

/// What a card shows when its summary field is absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Missing {
    Blank,
    Zero,
}

#[derive(Debug, Clone)]
pub struct CardSpec {
    pub title: &'static str,
    pub path: &'static str,
    pub format: CardFormat,
    pub suffix: &'static str,
    pub subtext: &'static str,
    pub missing: Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub title: String,
    pub value: String,
    pub subtext: String,
}

pub fn metric_cards(ds: &MetricsDataset, cards: &[CardSpec]) -> Vec<CardRow> {
    cards
        .iter()
        .map(|card| CardRow {
            title: card.title.to_string(),
            value: card_value(ds.pointer(card.path), card),
            subtext: card.subtext.to_string(),
        })
        .collect()
}

fn card_value(raw: Option<&Value>, card: &CardSpec) -> String {
    let zero = Value::Null;
    let raw = match (raw, card.missing) {
        (None | Some(Value::Null), Missing::Blank) => return String::new(),
        (None | Some(Value::Null), Missing::Zero) => &zero,
        (Some(v), _) => v,
    };
    let body = match (card.format, raw) {
        (CardFormat::Plain, Value::String(s)) => s.clone(),
        (CardFormat::Plain, v) => format::plain(coerce_number(v)),
        (CardFormat::Fixed(d), v) => format::fixed(coerce_number(v), d),
        (CardFormat::Integer, v) => format::integer(coerce_number(v)),
    };
    format!("{}{}", body, card.suffix)
}

// =============================================================================
// Fixed single-series values
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ValueRow {
    pub label: String,
    pub value: f64,
}

/// A small, fixed set of named aggregates (e.g. pre/post/improvement averages).
pub fn fixed_values(ds: &MetricsDataset, points: &[(&str, &str)]) -> Vec<ValueRow> {
    points
        .iter()
        .map(|(label, path)| ValueRow { label: label.to_string(), value: ds.number_at(path) })
        .collect()
}

// =============================================================================
// Per-department rows
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortSpec {
    /// Index into `DepartmentSpec::fields`.
    pub field: usize,
    pub descending: bool,
}

#[derive(Debug, Clone)]
pub struct DepartmentSpec {
    pub path: &'static str,
    pub name_key: &'static str,
    pub fields: &'static [&'static str],
    pub sort: Option<SortSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DepartmentRow {
    pub name: String,
    pub values: Vec<f64>,
}

impl DepartmentRow {
    pub fn value(&self, field: usize) -> f64 {
        self.values.get(field).copied().unwrap_or(0.0)
    }
}

pub fn department_rows(ds: &MetricsDataset, spec: &DepartmentSpec) -> Vec<DepartmentRow> {
    let mut rows: Vec<DepartmentRow> = records(ds, spec.path)
        .iter()
        .map(|rec| DepartmentRow {
            name: coerce_label(rec.get(spec.name_key)),
            values: spec
                .fields
                .iter()
                .map(|f| rec.get(*f).map(coerce_number).unwrap_or(0.0))
                .collect(),
        })
        .collect();

    if let Some(sort) = spec.sort {
        // sort_by is stable: ties keep source order
        rows.sort_by(|a, b| {
            let ord = a.value(sort.field).partial_cmp(&b.value(sort.field)).unwrap_or(Ordering::Equal);
            if sort.descending {
                ord.reverse()
            } else {
                ord
            }
        });
    }
    rows
}

// =============================================================================
// Pie slices
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SliceRow {
    pub category: String,
    pub count: f64,
}

/// One slice per entry of a counts mapping, in source insertion order.
pub fn pie_slices(ds: &MetricsDataset, path: &str) -> Vec<SliceRow> {
    match ds.pointer(path) {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| SliceRow { category: k.clone(), count: coerce_number(v) })
            .collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// Time series
// =============================================================================

#[derive(Debug, Clone)]
pub struct SeriesSpec {
    pub path: &'static str,
    pub x_key: &'static str,
    pub fields: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub x: String,
    pub values: Vec<f64>,
}

/// One point per period, kept in source order.
pub fn time_series(ds: &MetricsDataset, spec: &SeriesSpec) -> Vec<SeriesPoint> {
    records(ds, spec.path)
        .iter()
        .map(|rec| SeriesPoint {
            x: coerce_label(rec.get(spec.x_key)),
            values: spec
                .fields
                .iter()
                .map(|f| rec.get(*f).map(coerce_number).unwrap_or(0.0))
                .collect(),
        })
        .collect()
}

fn records<'a>(ds: &'a MetricsDataset, path: &str) -> Vec<&'a serde_json::Map<String, Value>> {
    match ds.pointer(path) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    fn ds(v: Value) -> MetricsDataset {
        validate(v, &[] as &[&str]).unwrap()
    }

    const CARD: CardSpec = CardSpec {
        title: "Avg Pre Score",
        path: "/summary/pre_avg",
        format: CardFormat::Plain,
        suffix: "",
        subtext: "Average before training",
        missing: Missing::Blank,
    };

    #[test]
    fn cards_format_and_blank_missing() {
        let data = ds(json!({"summary": {"pre_avg": 40, "mfa": 88.5, "score": 7.456}}));
        let specs = [
            CARD,
            CardSpec { title: "MFA", path: "/summary/mfa", suffix: "%", ..CARD },
            CardSpec { title: "Score", path: "/summary/score", format: CardFormat::Fixed(2), suffix: "/10", ..CARD },
            CardSpec { title: "Gone", path: "/summary/none", suffix: "%", ..CARD },
            CardSpec { title: "Zeroed", path: "/summary/none", format: CardFormat::Fixed(2), missing: Missing::Zero, ..CARD },
        ];
        let rows = metric_cards(&data, &specs);
        let values: Vec<&str> = rows.iter().map(|r| r.value.as_str()).collect();
        assert_eq!(values, vec!["40", "88.5%", "7.46/10", "", "0.00"]);
        assert_eq!(rows[0].subtext, "Average before training");
    }

    #[test]
    fn department_sort_is_descending_and_stable() {
        let data = ds(json!({"departments": [
            {"Department": "HR", "behavior_avg": 6.0, "employees": "12"},
            {"Department": "IT", "behavior_avg": 8.1, "employees": 30},
            {"Department": "Ops", "behavior_avg": 6.0},
            {"Department": "Legal", "behavior_avg": "bad"},
            {"Department": "Sales", "behavior_avg": 6.0}
        ]}));
        let spec = DepartmentSpec {
            path: "/departments",
            name_key: "Department",
            fields: &["behavior_avg", "employees"],
            sort: Some(SortSpec { field: 0, descending: true }),
        };
        let rows = department_rows(&data, &spec);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["IT", "HR", "Ops", "Sales", "Legal"]);
        assert_eq!(rows[1].value(1), 12.0);
        assert_eq!(rows[2].value(1), 0.0);
        assert_eq!(rows[4].value(0), 0.0);
    }

    #[test]
    fn pie_keeps_insertion_order() {
        let data = ds(json!({"risk": {"risk_level_counts": {"Medium": 30, "Low": "60", "High": null}}}));
        let slices = pie_slices(&data, "/risk/risk_level_counts");
        let cats: Vec<&str> = slices.iter().map(|s| s.category.as_str()).collect();
        assert_eq!(cats, vec!["Medium", "Low", "High"]);
        assert_eq!(slices[1].count, 60.0);
        assert_eq!(slices[2].count, 0.0);
    }

    #[test]
    fn series_keeps_source_order() {
        let data = ds(json!({"phishing_trends": {"monthly": [
            {"month": "2024-03", "click_rate": 12.5, "report_rate": 40},
            {"month": "2024-01", "click_rate": "20"}
        ]}}));
        let spec = SeriesSpec {
            path: "/phishing_trends/monthly",
            x_key: "month",
            fields: &["click_rate", "report_rate"],
        };
        let pts = time_series(&data, &spec);
        assert_eq!(pts[0].x, "2024-03");
        assert_eq!(pts[1].values, vec![20.0, 0.0]);
    }

    #[test]
    fn empty_or_absent_lists_project_to_nothing() {
        let data = ds(json!({"departments": [], "phishing_trends": {}}));
        let spec = DepartmentSpec { path: "/departments", name_key: "department", fields: &["x"], sort: None };
        assert!(department_rows(&data, &spec).is_empty());
        let series = SeriesSpec { path: "/phishing_trends/monthly", x_key: "month", fields: &["x"] };
        assert!(time_series(&data, &series).is_empty());
        assert!(pie_slices(&data, "/risk/risk_level_counts").is_empty());
    }

    #[test]
    fn fixed_values_coerce_missing_to_zero() {
        let data = ds(json!({"summary": {"pre_avg": 40, "post_avg": 75}}));
        let rows = fixed_values(&data, &[("Avg Pre", "/summary/pre_avg"), ("Avg Improvement", "/summary/improvement_avg")]);
        assert_eq!(rows[0], ValueRow { label: "Avg Pre".into(), value: 40.0 });
        assert_eq!(rows[1].value, 0.0);
    }
}
