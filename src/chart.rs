//! Chart sets: which charts a deployment shows, where their data lives, and how
//! each one is projected and rendered.

use serde_json::Value;

use crate::dataset::MetricsDataset;
use crate::error::DashboardError;
use crate::projection::{
    department_rows, fixed_values, metric_cards, pie_slices, time_series, CardFormat, CardSpec, DepartmentSpec,
    Missing, SeriesPoint, SeriesSpec, SortSpec,
};
use crate::render::bar::{self, BarStyle};
use crate::render::hbar::{self, FieldLabel, HBarStyle};
use crate::render::line::{self, LineSeries, LineStyle};
use crate::render::pie::{self, PieStyle};
use crate::render::{caption, cards, Element, Frame};
use crate::scale::{PerformanceBands, CATEGORY10, RISK};

#[derive(Debug, Clone)]
pub enum ChartKind {
    Cards(&'static [CardSpec]),
    /// Fixed named aggregates as vertical bars.
    ValueBars { points: &'static [(&'static str, &'static str)], style: BarStyle },
    /// One vertical bar per department, first field only.
    DepartmentBars { rows: DepartmentSpec, style: BarStyle },
    GroupedBars { rows: DepartmentSpec, metrics: &'static [&'static str], style: BarStyle },
    HorizontalBars { rows: DepartmentSpec, style: HBarStyle },
    Pie { path: &'static str, style: PieStyle },
    /// Fixed named aggregates as a single line.
    ValueLine { points: &'static [(&'static str, &'static str)], style: LineStyle },
    SeriesLine { series: SeriesSpec, style: LineStyle },
}

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub region: &'static str,
    pub title: &'static str,
    pub requires: &'static [&'static str],
    /// `(label, pointer)` pairs shown as "label: value" under the chart.
    pub captions: &'static [(&'static str, &'static str)],
    pub kind: ChartKind,
}

#[derive(Debug, Clone)]
pub struct ChartSet {
    pub title: &'static str,
    pub charts: Vec<ChartSpec>,
}

impl ChartSet {
    /// Union of every chart's sections, first-seen order, no duplicates.
    pub fn required_sections(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for s in self.charts.iter().flat_map(|c| c.requires.iter()) {
            if !out.contains(s) {
                out.push(s);
            }
        }
        out
    }

    pub fn regions(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.charts.iter().map(|c| (c.region, c.title))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// One static JSON export with `summary`, `departments`, `risk`, `phishing`.
    Behavior,
    /// Culture metrics, trend data and department metrics endpoints.
    Culture,
}

impl Profile {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "behavior" | "behaviour" => Some(Profile::Behavior),
            "culture" => Some(Profile::Culture),
            _ => None,
        }
    }

    pub fn chart_set(self, label_min_pct: f64) -> ChartSet {
        match self {
            Profile::Behavior => behavior_charts(label_min_pct),
            Profile::Culture => culture_charts(label_min_pct),
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

#[derive(Clone, Copy)]
enum Shape {
    List,
    Mapping,
}

/// A chart's data path, if present, must hold the collection it expects.
fn check_shape(ds: &MetricsDataset, spec: &ChartSpec, path: &str, shape: Shape) -> Result<(), DashboardError> {
    match (ds.pointer(path), shape) {
        (None | Some(Value::Null), _) => Ok(()),
        (Some(Value::Array(_)), Shape::List) | (Some(Value::Object(_)), Shape::Mapping) => Ok(()),
        (Some(other), _) => Err(DashboardError::render(
            spec.region,
            format!(
                "{} should be a {}, found {}",
                path,
                match shape {
                    Shape::List => "list",
                    Shape::Mapping => "mapping",
                },
                kind_name(other)
            ),
        )),
    }
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

fn value_points(ds: &MetricsDataset, points: &[(&str, &str)]) -> Vec<SeriesPoint> {
    fixed_values(ds, points)
        .into_iter()
        .map(|r| SeriesPoint { x: r.label, values: vec![r.value] })
        .collect()
}

fn caption_text(ds: &MetricsDataset, captions: &[(&str, &str)]) -> Option<String> {
    let parts: Vec<String> = captions
        .iter()
        .filter_map(|(label, path)| ds.text_at(path).map(|v| format!("{}: {}", label, v)))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

/// Projects and renders one chart from a validated dataset.
pub fn render_chart(ds: &MetricsDataset, spec: &ChartSpec) -> Result<Element, DashboardError> {
    let mut el = match &spec.kind {
        ChartKind::Cards(list) => cards::render(&metric_cards(ds, list)),
        ChartKind::ValueBars { points, style } => bar::render(&fixed_values(ds, points), style),
        ChartKind::DepartmentBars { rows, style } => {
            check_shape(ds, spec, rows.path, Shape::List)?;
            let values: Vec<_> = department_rows(ds, rows)
                .into_iter()
                .map(|r| crate::projection::ValueRow { value: r.value(0), label: r.name })
                .collect();
            bar::render(&values, style)
        }
        ChartKind::GroupedBars { rows, metrics, style } => {
            check_shape(ds, spec, rows.path, Shape::List)?;
            bar::render_grouped(&department_rows(ds, rows), metrics, style)
        }
        ChartKind::HorizontalBars { rows, style } => {
            check_shape(ds, spec, rows.path, Shape::List)?;
            hbar::render(&department_rows(ds, rows), style)
        }
        ChartKind::Pie { path, style } => {
            check_shape(ds, spec, path, Shape::Mapping)?;
            pie::render(&pie_slices(ds, path), style)
        }
        ChartKind::ValueLine { points, style } => line::render(&value_points(ds, points), style),
        ChartKind::SeriesLine { series, style } => {
            check_shape(ds, spec, series.path, Shape::List)?;
            line::render(&time_series(ds, series), style)
        }
    };
    if let Some(text) = caption_text(ds, spec.captions) {
        el = el.child(caption(&text));
    }
    Ok(el)
}

// =============================================================================
// Built-in chart sets
// =============================================================================

const WIDE: Frame = Frame::new(900.0, 320.0, [20.0, 20.0, 50.0, 60.0]);
const PANEL: Frame = Frame::new(600.0, 300.0, [20.0, 20.0, 60.0, 50.0]);

const BEHAVIOR_CARDS: &[CardSpec] = &[
    card("Employees Analyzed", "/summary/total_employees", "", "Total records in dataset"),
    card("Avg Pre Score", "/summary/pre_avg", "", "Average before training"),
    card("Avg Post Score", "/summary/post_avg", "", "Average after training"),
    card("Avg Improvement", "/summary/improvement_avg", "", "Post - Pre average"),
    card("Avg Behavior Score", "/summary/behavior_avg", "", "0 (worst) to 10 (best)"),
    card("Password Compliance", "/summary/password_compliance_rate_pct", "%", "Yes rate"),
    card("MFA Enabled", "/summary/mfa_enabled_rate_pct", "%", "Yes rate"),
    card("Phishing Pass (Sim 3)", "/summary/phishing_pass_rate_pct/sim3", "%", "Latest simulation pass rate"),
];

const fn card(title: &'static str, path: &'static str, suffix: &'static str, subtext: &'static str) -> CardSpec {
    CardSpec { title, path, format: CardFormat::Plain, suffix, subtext, missing: Missing::Blank }
}

const fn kpi(title: &'static str, path: &'static str, format: CardFormat, suffix: &'static str) -> CardSpec {
    CardSpec { title, path, format, suffix, subtext: "", missing: Missing::Zero }
}

const CULTURE_CARDS: &[CardSpec] = &[
    kpi("Avg Training Score (90d)", "/training_effectiveness/average_score", CardFormat::Fixed(2), "%"),
    kpi("Training Completions (90d)", "/training_effectiveness/completion_count", CardFormat::Plain, ""),
    kpi("Phishing Click Rate (90d)", "/phishing_resilience/click_rate", CardFormat::Fixed(2), "%"),
    kpi("Phishing Report Rate (90d)", "/phishing_resilience/report_rate", CardFormat::Fixed(2), "%"),
    kpi("Overall Culture Score (90d)", "/culture_score/overall_culture_score", CardFormat::Fixed(2), "/10"),
    kpi("Awareness Score (90d)", "/culture_score/awareness_score", CardFormat::Fixed(2), "/10"),
    kpi("Behavior Score (90d)", "/culture_score/behavior_score", CardFormat::Fixed(2), "/10"),
    kpi("Incidents Logged (90d)", "/incident_summary/total_incidents", CardFormat::Plain, ""),
];

const DEPARTMENT_FIELDS: &[FieldLabel] = &[
    FieldLabel { label: "Behavior Avg", count: false },
    FieldLabel { label: "Improvement Avg", count: false },
    FieldLabel { label: "Employees", count: true },
];

fn behavior_charts(label_min_pct: f64) -> ChartSet {
    ChartSet {
        title: "Security Behavior Dashboard",
        charts: vec![
            ChartSpec {
                region: "metrics",
                title: "Key Metrics",
                requires: &["summary"],
                captions: &[],
                kind: ChartKind::Cards(BEHAVIOR_CARDS),
            },
            ChartSpec {
                region: "knowledge-chart",
                title: "Knowledge Improvement",
                requires: &["summary"],
                captions: &[],
                kind: ChartKind::ValueBars {
                    points: &[
                        ("Avg Pre", "/summary/pre_avg"),
                        ("Avg Post", "/summary/post_avg"),
                        ("Avg Improvement", "/summary/improvement_avg"),
                    ],
                    style: BarStyle {
                        frame: WIDE,
                        domain: (0.0, 100.0),
                        padding: 0.25,
                        fill: "#667eea",
                        value_name: "Value",
                        value_labels: true,
                        label_rotation: None,
                    },
                },
            },
            ChartSpec {
                region: "department-chart",
                title: "Department Behavior Scores",
                requires: &["departments"],
                captions: &[],
                kind: ChartKind::HorizontalBars {
                    rows: DepartmentSpec {
                        path: "/departments",
                        name_key: "Department",
                        fields: &["behavior_avg", "improvement_avg", "employees"],
                        sort: Some(SortSpec { field: 0, descending: true }),
                    },
                    style: HBarStyle {
                        frame: Frame::new(900.0, 420.0, [20.0, 30.0, 40.0, 140.0]),
                        domain: (0.0, 10.0),
                        padding: 0.2,
                        bands: PerformanceBands::default(),
                        fields: DEPARTMENT_FIELDS,
                    },
                },
            },
            ChartSpec {
                region: "risk-chart",
                title: "Risk Distribution",
                requires: &["risk"],
                captions: &[],
                kind: ChartKind::Pie {
                    path: "/risk/risk_level_counts",
                    style: PieStyle {
                        width: 600.0,
                        height: 360.0,
                        palette: &RISK,
                        label_min_pct,
                        category_noun: "risk level",
                        count_label: "Employees",
                    },
                },
            },
            ChartSpec {
                region: "phishing-chart",
                title: "Phishing Simulation Progress",
                requires: &["phishing"],
                captions: &[],
                kind: ChartKind::ValueLine {
                    points: &[
                        ("Sim 1", "/phishing/overall_pass_rates_pct/sim1_pass_rate_pct"),
                        ("Sim 2", "/phishing/overall_pass_rates_pct/sim2_pass_rate_pct"),
                        ("Sim 3", "/phishing/overall_pass_rates_pct/sim3_pass_rate_pct"),
                    ],
                    style: LineStyle {
                        frame: WIDE,
                        domain: (0.0, 100.0),
                        series: &[LineSeries { label: "Pass Rate", color: "#667eea" }],
                        unit: "%",
                    },
                },
            },
        ],
    }
}

fn culture_charts(label_min_pct: f64) -> ChartSet {
    const DEPARTMENTS: &str = "/departments";
    ChartSet {
        title: "Security Culture Dashboard",
        charts: vec![
            ChartSpec {
                region: "kpi-container",
                title: "Key Indicators",
                requires: &["training_effectiveness", "phishing_resilience", "culture_score", "incident_summary"],
                captions: &[],
                kind: ChartKind::Cards(CULTURE_CARDS),
            },
            ChartSpec {
                region: "training-chart",
                title: "Training Score by Department",
                requires: &["departments"],
                captions: &[],
                kind: ChartKind::DepartmentBars {
                    rows: DepartmentSpec {
                        path: DEPARTMENTS,
                        name_key: "department",
                        fields: &["avg_training_score"],
                        sort: None,
                    },
                    style: BarStyle {
                        frame: PANEL,
                        domain: (0.0, 100.0),
                        padding: 0.2,
                        fill: "#667eea",
                        value_name: "Avg Training Score",
                        value_labels: false,
                        label_rotation: Some(-30.0),
                    },
                },
            },
            ChartSpec {
                region: "phishing-chart",
                title: "Phishing Click and Report Rates",
                requires: &["phishing_trends"],
                captions: &[
                    ("Click rate", "/phishing_trends/direction_click"),
                    ("Report rate", "/phishing_trends/direction_report"),
                ],
                kind: ChartKind::SeriesLine {
                    series: SeriesSpec {
                        path: "/phishing_trends/monthly",
                        x_key: "month",
                        fields: &["click_rate", "report_rate"],
                    },
                    style: LineStyle {
                        frame: PANEL,
                        domain: (0.0, 100.0),
                        series: &[
                            LineSeries { label: "Click Rate", color: "#e74c3c" },
                            LineSeries { label: "Report Rate", color: "#2ecc71" },
                        ],
                        unit: "%",
                    },
                },
            },
            ChartSpec {
                region: "culture-chart",
                title: "Culture Score Trend",
                requires: &["culture_trends"],
                captions: &[("Trend", "/culture_trends/direction")],
                kind: ChartKind::SeriesLine {
                    series: SeriesSpec {
                        path: "/culture_trends/monthly",
                        x_key: "month",
                        fields: &["culture_score"],
                    },
                    style: LineStyle {
                        frame: PANEL,
                        domain: (0.0, 10.0),
                        series: &[LineSeries { label: "Culture Score", color: "#667eea" }],
                        unit: "",
                    },
                },
            },
            ChartSpec {
                region: "department-chart",
                title: "Department Comparison",
                requires: &["departments"],
                captions: &[],
                kind: ChartKind::GroupedBars {
                    rows: DepartmentSpec {
                        path: DEPARTMENTS,
                        name_key: "department",
                        fields: &["avg_training_score", "phishing_click_rate", "phishing_report_rate", "culture_score"],
                        sort: None,
                    },
                    metrics: &["Training Score", "Click Rate", "Report Rate", "Culture Score"],
                    style: BarStyle {
                        frame: Frame::new(600.0, 300.0, [30.0, 20.0, 70.0, 50.0]),
                        domain: (0.0, 100.0),
                        padding: 0.2,
                        fill: "#667eea",
                        value_name: "Value",
                        value_labels: false,
                        label_rotation: None,
                    },
                },
            },
            ChartSpec {
                region: "incident-chart",
                title: "Incidents by Severity",
                requires: &["incident_summary"],
                captions: &[],
                kind: ChartKind::Pie {
                    path: "/incident_summary/incidents_by_severity",
                    style: PieStyle {
                        width: 600.0,
                        height: 360.0,
                        palette: &CATEGORY10,
                        label_min_pct,
                        category_noun: "severity",
                        count_label: "Incidents",
                    },
                },
            },
        ],
    }
}
