use crate::format::coord;
use crate::scale::AxisScale;

use super::{translate, Element};

const TICK: f64 = 6.0;

/// Horizontal axis along `y`, labels below the ticks.
pub fn bottom(scale: &dyn AxisScale, y: f64, label_rotation: Option<f64>) -> Element {
    let (r0, r1) = scale.range();
    let domain = Element::new("path")
        .class("domain")
        .attr("d", format!("M{},{}V0H{}V{}", coord(r0), coord(TICK), coord(r1), coord(TICK)))
        .attr("stroke", "currentColor")
        .attr("fill", "none");

    let ticks = scale.ticks().into_iter().map(|(x, label)| {
        let mut text = Element::new("text").attr("fill", "currentColor").num("y", TICK + 3.0);
        text = match label_rotation {
            Some(deg) => text
                .attr("transform", format!("rotate({})", coord(deg)))
                .attr("text-anchor", "end"),
            None => text.attr("dy", "0.71em").attr("text-anchor", "middle"),
        };
        Element::new("g")
            .class("tick")
            .attr("transform", translate(x, 0.0))
            .child(Element::new("line").attr("stroke", "currentColor").num("y2", TICK))
            .child(text.text(label))
    });

    Element::new("g")
        .class("axis axis-bottom")
        .attr("transform", translate(0.0, y))
        .child(domain)
        .children(ticks)
}

/// Vertical axis along `x`, labels to the left of the ticks.
pub fn left(scale: &dyn AxisScale, x: f64) -> Element {
    let (r0, r1) = scale.range();
    let (lo, hi) = if r0 <= r1 { (r0, r1) } else { (r1, r0) };
    let domain = Element::new("path")
        .class("domain")
        .attr("d", format!("M{},{}H0V{}H{}", coord(-TICK), coord(lo), coord(hi), coord(-TICK)))
        .attr("stroke", "currentColor")
        .attr("fill", "none");

    let ticks = scale.ticks().into_iter().map(|(y, label)| {
        Element::new("g")
            .class("tick")
            .attr("transform", translate(0.0, y))
            .child(Element::new("line").attr("stroke", "currentColor").num("x2", -TICK))
            .child(
                Element::new("text")
                    .attr("fill", "currentColor")
                    .num("x", -(TICK + 3.0))
                    .attr("dy", "0.32em")
                    .attr("text-anchor", "end")
                    .text(label),
            )
    });

    Element::new("g")
        .class("axis axis-left")
        .attr("transform", translate(x, 0.0))
        .child(domain)
        .children(ticks)
}
