//! Chart renderers.
//!
//! A renderer is a pure function from a projection to an [`Element`] tree. It
//! never touches the page or the tooltip: pointer behaviour is declared on the
//! element (`hover` / `click`) and the page wires it to the tooltip controller
//! when the tree is mounted.

pub mod axis;
pub mod bar;
pub mod cards;
pub mod hbar;
pub mod line;
pub mod pie;

use crate::format;

/// Outer size of an SVG chart and its plot margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Frame {
    pub const fn new(width: f64, height: f64, margins: [f64; 4]) -> Self {
        Self { width, height, top: margins[0], right: margins[1], bottom: margins[2], left: margins[3] }
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.left, self.width - self.right)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (self.top, self.height - self.bottom)
    }

    pub fn baseline(&self) -> f64 {
        self.height - self.bottom
    }

    pub(crate) fn svg(&self) -> Element {
        Element::new("svg")
            .attr("xmlns", "http://www.w3.org/2000/svg")
            .attr("viewBox", format!("0 0 {} {}", format::coord(self.width), format::coord(self.height)))
    }
}

/// A node in a rendered chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
    /// Pre-formatted tooltip markup shown while the pointer is over the element.
    pub hover: Option<String>,
    /// Notification raised when the element is clicked.
    pub click: Option<String>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self { tag, ..Default::default() }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn num(self, name: &'static str, value: f64) -> Self {
        self.attr(name, format::coord(value))
    }

    pub fn class(self, name: &str) -> Self {
        self.attr("class", name.to_string())
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn on_hover(mut self, content: impl Into<String>) -> Self {
        self.hover = Some(content.into());
        self
    }

    pub fn on_click(mut self, notice: impl Into<String>) -> Self {
        self.click = Some(notice.into());
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }

    pub fn is_interactive(&self) -> bool {
        self.hover.is_some() || self.click.is_some()
    }

    /// Depth-first walk, parents before children.
    pub fn walk<'a>(&'a self, out: &mut Vec<&'a Element>) {
        out.push(self);
        for c in &self.children {
            c.walk(out);
        }
    }

    pub fn find_all(&self, tag: &str, class: Option<&str>) -> Vec<&Element> {
        let mut all = Vec::new();
        self.walk(&mut all);
        all.into_iter()
            .filter(|e| e.tag == tag && class.map_or(true, |c| e.get_attr("class") == Some(c)))
            .collect()
    }

    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (k, v) in &self.attrs {
            out.push(' ');
            out.push_str(k);
            out.push_str("=\"");
            out.push_str(&escape(v));
            out.push('"');
        }
        out.push('>');
        if let Some(t) = &self.text {
            out.push_str(&escape(t));
        }
        for c in &self.children {
            c.write_markup(out);
        }
        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// `translate(x,y)` transform attribute value.
pub(crate) fn translate(x: f64, y: f64) -> String {
    format!("translate({},{})", format::coord(x), format::coord(y))
}

/// Optional caption line under a chart, e.g. a trend direction.
pub(crate) fn caption(text: &str) -> Element {
    Element::new("div").class("caption").text(text)
}

/// Legend entries: colour swatch plus text.
pub(crate) fn legend<'a>(items: impl IntoIterator<Item = (&'a str, String)>) -> Element {
    Element::new("div").class("legend").children(items.into_iter().map(|(color, label)| {
        Element::new("div")
            .class("legend-item")
            .child(Element::new("span").class("legend-swatch").attr("style", format!("background:{}", color)))
            .child(Element::new("span").text(label))
    }))
}
