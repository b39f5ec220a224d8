use crate::format::{self, coord};
use crate::projection::SeriesPoint;
use crate::scale::{LinearScale, PointScale};

use super::{axis, legend, Element, Frame};

#[derive(Debug, Clone, Copy)]
pub struct LineSeries {
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone)]
pub struct LineStyle {
    pub frame: Frame,
    pub domain: (f64, f64),
    /// One entry per `SeriesPoint::values` column.
    pub series: &'static [LineSeries],
    /// Appended to values in labels and tooltips, e.g. "%".
    pub unit: &'static str,
}

/// Line chart over a point scale; one path and one marker set per series.
///
/// Single-series charts also get a value label above each marker.
pub fn render(points: &[SeriesPoint], style: &LineStyle) -> Element {
    let f = &style.frame;
    let x = PointScale::new(points.iter().map(|p| p.x.clone()).collect(), f.x_range());
    let y = LinearScale::new(style.domain, (f.baseline(), f.top)).nice();

    let mut svg = f
        .svg()
        .child(axis::bottom(&x, f.baseline(), None))
        .child(axis::left(&y, f.left));

    let value = |v: f64| format!("{}{}", format::fixed(v, 2), style.unit);

    for (s, series) in style.series.iter().enumerate() {
        if !points.is_empty() {
            let d: Vec<String> = points
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{},{}", coord(x.at(i)), coord(y.map(p.values.get(s).copied().unwrap_or(0.0)))))
                .collect();
            svg = svg.child(
                Element::new("path")
                    .class("line")
                    .attr("d", format!("M{}", d.join("L")))
                    .attr("fill", "none")
                    .attr("stroke", series.color)
                    .attr("stroke-width", if style.series.len() == 1 { "3" } else { "2" }),
            );
        }
        for (i, p) in points.iter().enumerate() {
            let v = p.values.get(s).copied().unwrap_or(0.0);
            svg = svg.child(
                Element::new("circle")
                    .class("marker")
                    .num("cx", x.at(i))
                    .num("cy", y.map(v))
                    .attr("r", if style.series.len() == 1 { "6" } else { "4" })
                    .attr("fill", series.color)
                    .on_hover(format!("<strong>{}</strong><br/>{}: {}", p.x, series.label, value(v))),
            );
        }
    }

    if let [_] = style.series {
        for (i, p) in points.iter().enumerate() {
            let v = p.values.first().copied().unwrap_or(0.0);
            svg = svg.child(
                Element::new("text")
                    .class("point-label")
                    .num("x", x.at(i))
                    .num("y", y.map(v) - 10.0)
                    .attr("text-anchor", "middle")
                    .attr("font-size", "12px")
                    .text(value(v)),
            );
        }
    }

    let mut chart = Element::new("div").class("chart").child(svg);
    if style.series.len() > 1 {
        chart = chart.child(legend(style.series.iter().map(|s| (s.color, s.label.to_string())).collect::<Vec<_>>()));
    }
    chart
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASS: &[LineSeries] = &[LineSeries { label: "Pass Rate", color: "#667eea" }];
    const RATES: &[LineSeries] = &[
        LineSeries { label: "Click Rate", color: "#e74c3c" },
        LineSeries { label: "Report Rate", color: "#2ecc71" },
    ];

    fn pts(rows: &[(&str, &[f64])]) -> Vec<SeriesPoint> {
        rows.iter().map(|(x, v)| SeriesPoint { x: x.to_string(), values: v.to_vec() }).collect()
    }

    fn style(series: &'static [LineSeries]) -> LineStyle {
        LineStyle {
            frame: Frame::new(900.0, 320.0, [20.0, 20.0, 50.0, 60.0]),
            domain: (0.0, 100.0),
            series,
            unit: "%",
        }
    }

    #[test]
    fn single_series_path_markers_and_labels() {
        let chart = render(&pts(&[("Sim 1", &[50.0]), ("Sim 2", &[62.5]), ("Sim 3", &[81.0])]), &style(PASS));
        let path = chart.find_all("path", Some("line"))[0];
        assert_eq!(path.get_attr("d"), Some("M60,145L470,113.75L880,67.5"));
        assert_eq!(chart.find_all("circle", Some("marker")).len(), 3);
        let labels: Vec<_> = chart.find_all("text", Some("point-label")).iter().map(|t| t.text.clone().unwrap()).collect();
        assert_eq!(labels, vec!["50.00%", "62.50%", "81.00%"]);
        assert!(chart.find_all("div", Some("legend")).is_empty());
    }

    #[test]
    fn two_series_get_legend_and_no_labels() {
        let chart = render(&pts(&[("2024-01", &[20.0, 30.0]), ("2024-02", &[15.0, 42.0])]), &style(RATES));
        assert_eq!(chart.find_all("path", Some("line")).len(), 2);
        let markers = chart.find_all("circle", Some("marker"));
        assert_eq!(markers.len(), 4);
        assert_eq!(markers[3].hover.as_deref(), Some("<strong>2024-02</strong><br/>Report Rate: 42.00%"));
        assert!(chart.find_all("text", Some("point-label")).is_empty());
        assert_eq!(chart.find_all("div", Some("legend-item")).len(), 2);
    }

    #[test]
    fn empty_series_draws_axes() {
        let chart = render(&[], &style(RATES));
        assert!(chart.find_all("path", Some("line")).is_empty());
        assert_eq!(chart.find_all("path", Some("domain")).len(), 2);
    }
}
