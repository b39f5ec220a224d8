use std::f64::consts::{PI, TAU};

use crate::format::{self, coord};
use crate::projection::SliceRow;
use crate::scale::OrdinalColors;

use super::{legend, translate, Element};

#[derive(Debug, Clone)]
pub struct PieStyle {
    pub width: f64,
    pub height: f64,
    pub palette: &'static [&'static str],
    /// Inline percentage text is dropped for slices below this share.
    pub label_min_pct: f64,
    /// Used in the click notice, e.g. "risk level".
    pub category_noun: &'static str,
    /// Used in the click notice, e.g. "Employees".
    pub count_label: &'static str,
}

impl PieStyle {
    pub fn radius(&self) -> f64 {
        (self.width.min(self.height) / 2.0 - 20.0).max(0.0)
    }
}

/// Share of the total per slice, in slice order. All zeros when the total is zero.
pub fn slice_percentages(slices: &[SliceRow]) -> Vec<f64> {
    let total: f64 = slices.iter().map(|s| s.count.max(0.0)).sum();
    slices
        .iter()
        .map(|s| if total > 0.0 { s.count.max(0.0) / total * 100.0 } else { 0.0 })
        .collect()
}

/// Start and end angle per slice, clockwise from twelve o'clock.
///
/// Larger slices are laid out first (ties keep source order); the returned
/// vector is still indexed like `slices`.
fn slice_angles(slices: &[SliceRow]) -> Vec<(f64, f64)> {
    let total: f64 = slices.iter().map(|s| s.count.max(0.0)).sum();
    let mut order: Vec<usize> = (0..slices.len()).collect();
    order.sort_by(|&a, &b| {
        slices[b]
            .count
            .partial_cmp(&slices[a].count)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut angles = vec![(0.0, 0.0); slices.len()];
    let mut at = 0.0;
    for i in order {
        let span = if total > 0.0 { slices[i].count.max(0.0) / total * TAU } else { 0.0 };
        angles[i] = (at, at + span);
        at += span;
    }
    angles
}

fn point(r: f64, angle: f64) -> (f64, f64) {
    (r * angle.sin(), -r * angle.cos())
}

fn arc_path(r: f64, a0: f64, a1: f64) -> String {
    let r_s = coord(r);
    if a1 - a0 >= TAU - 1e-9 {
        return format!("M0,-{r}A{r},{r},0,1,1,0,{r}A{r},{r},0,1,1,0,-{r}Z", r = r_s);
    }
    let (x0, y0) = point(r, a0);
    let (x1, y1) = point(r, a1);
    let large = if a1 - a0 > PI { 1 } else { 0 };
    format!(
        "M{},{}A{},{},0,{},1,{},{}L0,0Z",
        coord(x0),
        coord(y0),
        r_s,
        r_s,
        large,
        coord(x1),
        coord(y1)
    )
}

pub fn render(slices: &[SliceRow], style: &PieStyle) -> Element {
    let r = style.radius();
    let pcts = slice_percentages(slices);
    let angles = slice_angles(slices);
    let mut colors = OrdinalColors::with_domain(style.palette, slices.iter().map(|s| s.category.as_str()));

    let mut g = Element::new("g").attr("transform", translate(style.width / 2.0, style.height / 2.0));

    for (i, s) in slices.iter().enumerate() {
        let (a0, a1) = angles[i];
        if a1 <= a0 {
            continue;
        }
        g = g.child(
            Element::new("path")
                .class("slice")
                .attr("d", arc_path(r, a0, a1))
                .attr("fill", colors.color(&s.category))
                .attr("stroke", "white")
                .attr("stroke-width", "2")
                .on_hover(format!(
                    "<strong>{}</strong><br/>Count: {}<br/>{}",
                    s.category,
                    format::integer(s.count),
                    format::percent(pcts[i], 1)
                ))
                .on_click(format!(
                    "Clicked {}: {}\n{}: {}",
                    style.category_noun,
                    s.category,
                    style.count_label,
                    format::integer(s.count)
                )),
        );
    }
    for (i, _) in slices.iter().enumerate() {
        let (a0, a1) = angles[i];
        if a1 <= a0 || pcts[i] < style.label_min_pct {
            continue;
        }
        let (cx, cy) = point(r / 2.0, (a0 + a1) / 2.0);
        g = g.child(
            Element::new("text")
                .class("slice-label")
                .attr("transform", translate(cx, cy))
                .attr("text-anchor", "middle")
                .attr("font-size", "12px")
                .attr("fill", "white")
                .text(format::percent(pcts[i], 0)),
        );
    }

    let svg = Element::new("svg")
        .attr("xmlns", "http://www.w3.org/2000/svg")
        .attr("viewBox", format!("0 0 {} {}", coord(style.width), coord(style.height)))
        .child(g);
    let key = legend(
        slices
            .iter()
            .map(|s| (colors.color(&s.category), format!("{} ({})", s.category, format::integer(s.count))))
            .collect::<Vec<_>>(),
    );
    Element::new("div").class("chart").child(svg).child(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::RISK;

    fn style() -> PieStyle {
        PieStyle {
            width: 600.0,
            height: 360.0,
            palette: &RISK,
            label_min_pct: 8.0,
            category_noun: "risk level",
            count_label: "Employees",
        }
    }

    fn slices(pairs: &[(&str, f64)]) -> Vec<SliceRow> {
        pairs.iter().map(|(c, n)| SliceRow { category: c.to_string(), count: *n }).collect()
    }

    #[test]
    fn percentages_sum_to_hundred() {
        let s = slices(&[("Low", 7.0), ("Medium", 5.0), ("High", 1.0)]);
        let total: f64 = slice_percentages(&s).iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_reports_zero() {
        let s = slices(&[("Low", 0.0), ("High", 0.0)]);
        assert_eq!(slice_percentages(&s), vec![0.0, 0.0]);
        let chart = render(&s, &style());
        assert!(chart.find_all("path", None).is_empty());
        assert_eq!(chart.find_all("div", Some("legend-item")).len(), 2);
    }

    #[test]
    fn small_slices_lose_inline_label() {
        let s = slices(&[("Low", 60.0), ("Medium", 33.0), ("High", 7.0)]);
        let chart = render(&s, &style());
        assert_eq!(chart.find_all("path", Some("slice")).len(), 3);
        let labels: Vec<_> = chart.find_all("text", Some("slice-label")).iter().map(|t| t.text.clone().unwrap()).collect();
        assert_eq!(labels, vec!["60%", "33%"]);
    }

    #[test]
    fn slices_carry_tooltip_and_click() {
        let s = slices(&[("Low", 60.0), ("Medium", 30.0), ("High", 10.0)]);
        let chart = render(&s, &style());
        let paths = chart.find_all("path", Some("slice"));
        assert_eq!(paths[2].hover.as_deref(), Some("<strong>High</strong><br/>Count: 10<br/>10.0%"));
        assert_eq!(paths[0].click.as_deref(), Some("Clicked risk level: Low\nEmployees: 60"));
        assert_eq!(paths[0].get_attr("fill"), Some("#2ca02c"));
        assert_eq!(paths[2].get_attr("fill"), Some("#d62728"));
    }

    #[test]
    fn largest_slice_starts_at_top() {
        let s = slices(&[("Small", 25.0), ("Big", 75.0)]);
        let angles = slice_angles(&s);
        assert_eq!(angles[1].0, 0.0);
        assert!((angles[0].0 - 1.5 * PI).abs() < 1e-9);
    }

    #[test]
    fn single_category_draws_full_circle() {
        let s = slices(&[("Low", 4.0)]);
        let chart = render(&s, &style());
        let d = chart.find_all("path", Some("slice"))[0].get_attr("d").unwrap().to_string();
        assert!(d.starts_with("M0,-160A160,160"));
    }
}
