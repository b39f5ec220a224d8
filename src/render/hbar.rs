use crate::format;
use crate::projection::DepartmentRow;
use crate::scale::{BandScale, LinearScale, PerformanceBands};

use super::{axis, Element, Frame};

/// A department field as shown in the tooltip.
#[derive(Debug, Clone, Copy)]
pub struct FieldLabel {
    pub label: &'static str,
    /// Counts print as integers, scores at two decimals.
    pub count: bool,
}

#[derive(Debug, Clone)]
pub struct HBarStyle {
    pub frame: Frame,
    pub domain: (f64, f64),
    pub padding: f64,
    pub bands: PerformanceBands,
    /// Labels for `DepartmentRow::values`, the first one drives bar length.
    pub fields: &'static [FieldLabel],
}

/// Horizontal per-department bars coloured by performance band.
pub fn render(rows: &[DepartmentRow], style: &HBarStyle) -> Element {
    let f = &style.frame;
    let y = BandScale::new(rows.iter().map(|r| r.name.clone()).collect(), f.y_range(), style.padding);
    let x = LinearScale::new(style.domain, f.x_range()).nice();
    let origin = x.map(0.0);

    let mut svg = f
        .svg()
        .child(axis::bottom(&x, f.baseline(), None))
        .child(axis::left(&y, f.left));

    for r in rows {
        let Some(y0) = y.map(&r.name) else { continue };
        let score = r.value(0);
        svg = svg.child(
            Element::new("rect")
                .class("deptbar")
                .num("x", origin)
                .num("y", y0)
                .num("height", y.bandwidth())
                .num("width", (x.map(score) - origin).max(0.0))
                .attr("fill", style.bands.level(score).color())
                .on_hover(tooltip(r, style.fields)),
        );
    }
    for r in rows {
        let Some(y0) = y.map(&r.name) else { continue };
        let score = r.value(0);
        svg = svg.child(
            Element::new("text")
                .class("deptlabel")
                .num("x", x.map(score) + 6.0)
                .num("y", y0 + y.bandwidth() / 2.0 + 4.0)
                .attr("font-size", "12px")
                .text(format::fixed(score, 2)),
        );
    }

    Element::new("div").class("chart").child(svg)
}

fn tooltip(row: &DepartmentRow, fields: &[FieldLabel]) -> String {
    let mut out = format!("<strong>{}</strong>", row.name);
    for (i, field) in fields.iter().enumerate() {
        let v = row.value(i);
        let shown = if field.count { format::integer(v) } else { format::fixed(v, 2) };
        out.push_str(&format!("<br/>{}: {}", field.label, shown));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldLabel] = &[
        FieldLabel { label: "Behavior Avg", count: false },
        FieldLabel { label: "Improvement Avg", count: false },
        FieldLabel { label: "Employees", count: true },
    ];

    fn style() -> HBarStyle {
        HBarStyle {
            frame: Frame::new(900.0, 420.0, [20.0, 30.0, 40.0, 140.0]),
            domain: (0.0, 10.0),
            padding: 0.2,
            bands: PerformanceBands::default(),
            fields: FIELDS,
        }
    }

    #[test]
    fn bars_coloured_by_band_with_labels() {
        let rows = vec![
            DepartmentRow { name: "IT".into(), values: vec![8.0, 1.5, 30.0] },
            DepartmentRow { name: "Sales".into(), values: vec![5.0, 0.5, 12.0] },
            DepartmentRow { name: "Ops".into(), values: vec![3.256, 0.0, 7.0] },
        ];
        let chart = render(&rows, &style());
        let bars = chart.find_all("rect", Some("deptbar"));
        let fills: Vec<_> = bars.iter().map(|b| b.get_attr("fill").unwrap()).collect();
        assert_eq!(fills, vec!["#2ca02c", "#ff7f0e", "#d62728"]);
        // 730px for a 0..10 domain
        let width: f64 = bars[0].get_attr("width").unwrap().parse().unwrap();
        assert!((width - 584.0).abs() < 0.01);
        let labels: Vec<_> = chart.find_all("text", Some("deptlabel")).iter().map(|t| t.text.clone().unwrap()).collect();
        assert_eq!(labels, vec!["8.00", "5.00", "3.26"]);
        assert_eq!(
            bars[1].hover.as_deref(),
            Some("<strong>Sales</strong><br/>Behavior Avg: 5.00<br/>Improvement Avg: 0.50<br/>Employees: 12")
        );
    }

    #[test]
    fn repeated_department_name_gets_one_axis_tick() {
        let rows = vec![
            DepartmentRow { name: "IT".into(), values: vec![8.0, 1.5, 30.0] },
            DepartmentRow { name: "IT".into(), values: vec![6.0, 1.0, 10.0] },
        ];
        let chart = render(&rows, &style());
        let left = chart.find_all("g", Some("axis axis-left"))[0];
        assert_eq!(left.find_all("g", Some("tick")).len(), 1);
        let bars = chart.find_all("rect", Some("deptbar"));
        assert_eq!(bars[0].get_attr("y"), bars[1].get_attr("y"));
        // A single band fills the plot less its outer padding.
        let height: f64 = bars[0].get_attr("height").unwrap().parse().unwrap();
        assert!((height - 360.0 / 1.2 * 0.8).abs() < 0.01);
    }

    #[test]
    fn no_departments_no_bars() {
        let chart = render(&[], &style());
        assert!(chart.find_all("rect", None).is_empty());
        assert_eq!(chart.find_all("path", Some("domain")).len(), 2);
    }
}
