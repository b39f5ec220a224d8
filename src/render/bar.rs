use crate::format;
use crate::projection::{DepartmentRow, ValueRow};
use crate::scale::{BandScale, LinearScale, OrdinalColors, CATEGORY10};

use super::{axis, legend, Element, Frame};

#[derive(Debug, Clone)]
pub struct BarStyle {
    pub frame: Frame,
    pub domain: (f64, f64),
    pub padding: f64,
    pub fill: &'static str,
    /// Tooltip name for the value, e.g. "Value" or "Avg Training Score".
    pub value_name: &'static str,
    pub value_labels: bool,
    pub label_rotation: Option<f64>,
}

/// Single-series vertical bars over a banded category axis.
pub fn render(rows: &[ValueRow], style: &BarStyle) -> Element {
    let f = &style.frame;
    let x = BandScale::new(rows.iter().map(|r| r.label.clone()).collect(), f.x_range(), style.padding);
    let y = LinearScale::new(style.domain, (f.baseline(), f.top)).nice();

    let mut svg = f
        .svg()
        .child(axis::bottom(&x, f.baseline(), style.label_rotation))
        .child(axis::left(&y, f.left));

    for r in rows {
        let Some(x0) = x.map(&r.label) else { continue };
        let top = y.map(r.value);
        svg = svg.child(
            Element::new("rect")
                .class("bar")
                .num("x", x0)
                .num("y", top.min(f.baseline()))
                .num("width", x.bandwidth())
                .num("height", (f.baseline() - top).max(0.0))
                .attr("fill", style.fill)
                .on_hover(format!(
                    "<strong>{}</strong><br/>{}: {}",
                    r.label,
                    style.value_name,
                    format::fixed(r.value, 2)
                )),
        );
    }
    if style.value_labels {
        for r in rows {
            let Some(x0) = x.map(&r.label) else { continue };
            svg = svg.child(
                Element::new("text")
                    .class("value-label")
                    .num("x", x0 + x.bandwidth() / 2.0)
                    .num("y", y.map(r.value) - 6.0)
                    .attr("text-anchor", "middle")
                    .attr("font-size", "12px")
                    .text(format::fixed(r.value, 2)),
            );
        }
    }

    Element::new("div").class("chart").child(svg)
}

/// One group per department, one bar per metric, shared linear axis.
pub fn render_grouped(rows: &[DepartmentRow], metrics: &[&str], style: &BarStyle) -> Element {
    let f = &style.frame;
    let x0 = BandScale::new(rows.iter().map(|r| r.name.clone()).collect(), f.x_range(), style.padding);
    let x1 = BandScale::new(metrics.iter().map(|m| m.to_string()).collect(), (0.0, x0.bandwidth()), 0.05);
    let y = LinearScale::new(style.domain, (f.baseline(), f.top)).nice();
    let mut colors = OrdinalColors::with_domain(&CATEGORY10, metrics);

    let mut svg = f
        .svg()
        .child(axis::bottom(&x0, f.baseline(), style.label_rotation))
        .child(axis::left(&y, f.left));

    for row in rows {
        let Some(gx) = x0.map(&row.name) else { continue };
        let bars = metrics.iter().enumerate().filter_map(|(i, metric)| {
            let bx = x1.map(metric)?;
            let v = row.value(i);
            let top = y.map(v);
            Some(
                Element::new("rect")
                    .class("group-bar")
                    .num("x", bx)
                    .num("y", top.min(f.baseline()))
                    .num("width", x1.bandwidth())
                    .num("height", (f.baseline() - top).max(0.0))
                    .attr("fill", colors.color(metric))
                    .on_hover(format!("<strong>{}</strong><br/>{}: {}", row.name, metric, format::fixed(v, 2))),
            )
        });
        let group = Element::new("g").class("group").attr("transform", super::translate(gx, 0.0));
        svg = svg.child(group.children(bars.collect::<Vec<_>>()));
    }

    let key = legend(metrics.iter().map(|m| (colors.color(m), m.to_string())).collect::<Vec<_>>());
    Element::new("div").class("chart").child(svg).child(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> BarStyle {
        BarStyle {
            frame: Frame::new(900.0, 320.0, [20.0, 20.0, 50.0, 60.0]),
            domain: (0.0, 100.0),
            padding: 0.25,
            fill: "#667eea",
            value_name: "Value",
            value_labels: true,
            label_rotation: None,
        }
    }

    fn num(el: &Element, attr: &str) -> f64 {
        el.get_attr(attr).unwrap().parse().unwrap()
    }

    #[test]
    fn knowledge_bars_scale_to_hundred() {
        let rows = vec![
            ValueRow { label: "Avg Pre".into(), value: 40.0 },
            ValueRow { label: "Avg Post".into(), value: 75.0 },
            ValueRow { label: "Avg Improvement".into(), value: 35.0 },
        ];
        let chart = render(&rows, &style());
        let bars = chart.find_all("rect", Some("bar"));
        assert_eq!(bars.len(), 3);
        // plot height 250 on a 0..100 domain
        assert!((num(bars[0], "height") - 100.0).abs() < 0.01);
        assert!((num(bars[1], "height") - 187.5).abs() < 0.01);
        assert!((num(bars[2], "height") - 87.5).abs() < 0.01);
        let labels: Vec<_> = chart
            .find_all("text", Some("value-label"))
            .iter()
            .map(|t| t.text.clone().unwrap())
            .collect();
        assert_eq!(labels, vec!["40.00", "75.00", "35.00"]);
        assert_eq!(bars[0].hover.as_deref(), Some("<strong>Avg Pre</strong><br/>Value: 40.00"));
    }

    #[test]
    fn empty_rows_draw_axes_only() {
        let chart = render(&[], &style());
        assert!(chart.find_all("rect", None).is_empty());
        assert_eq!(chart.find_all("g", Some("axis axis-left")).len(), 1);
    }

    #[test]
    fn grouped_bars_one_per_metric() {
        let rows = vec![
            DepartmentRow { name: "Finance".into(), values: vec![80.0, 12.0, 45.0, 7.0] },
            DepartmentRow { name: "IT".into(), values: vec![90.0, 5.0, 60.0, 8.0] },
        ];
        let metrics = ["Training", "Click", "Report", "Culture"];
        let chart = render_grouped(&rows, &metrics, &style());
        let bars = chart.find_all("rect", Some("group-bar"));
        assert_eq!(bars.len(), 8);
        assert_eq!(bars[0].get_attr("fill"), bars[4].get_attr("fill"));
        assert_ne!(bars[0].get_attr("fill"), bars[1].get_attr("fill"));
        assert_eq!(chart.find_all("div", Some("legend-item")).len(), 4);
        assert_eq!(bars[5].hover.as_deref(), Some("<strong>IT</strong><br/>Click: 5.00"));
    }
}
