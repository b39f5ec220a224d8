//! The rendered page: chart regions, status line, notices and the tooltip.
//!
//! Each region is written only by the renderer assigned to it, through
//! [`Page::mount`], which replaces whatever was there before. Pointer events
//! arrive as `(region, target)` pairs; the page looks up what the target
//! declared and drives the tooltip or the notice queue. The served HTML
//! carries a small script that forwards browser pointer events on
//! `[data-target]` elements to `/event` and applies the tooltip it returns.

use std::collections::VecDeque;

use crate::format::coord;
use crate::logging::{log, obj, v_str, ts_now, Domain, Level};
use crate::render::{escape, Element};
use crate::tooltip::{TooltipController, TooltipState, OFFSET_PX};

const MAX_NOTICES: usize = 20;

/// `{offset}` is replaced with the tooltip offset in pixels.
const EVENT_SCRIPT: &str = r#"<script>
(function () {
  function send(kind, el, ev) {
    var region = el.closest("section.chart-region");
    if (!region) return Promise.resolve(null);
    var q = "kind=" + kind + "&region=" + encodeURIComponent(region.id) +
      "&target=" + el.getAttribute("data-target") +
      "&x=" + (ev.pageX || 0) + "&y=" + (ev.pageY || 0);
    return fetch("/event?" + q, { cache: "no-store" }).then(function (r) { return r.json(); });
  }
  function apply(reply) {
    var tip = document.getElementById("tooltip");
    if (!reply || !tip) return;
    var t = reply.tooltip;
    tip.innerHTML = t.content;
    tip.style.left = (t.x + {offset}) + "px";
    tip.style.top = (t.y + {offset}) + "px";
    tip.style.opacity = t.visible ? 1 : 0;
  }
  document.querySelectorAll("[data-target]").forEach(function (el) {
    el.addEventListener("mousemove", function (ev) { send("move", el, ev).then(apply); });
    el.addEventListener("mouseleave", function (ev) { send("leave", el, ev).then(apply); });
    el.addEventListener("click", function (ev) {
      send("click", el, ev).then(function (reply) {
        if (reply && reply.handled) window.location.reload();
      });
    });
  });
})();
</script>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: String,
}

#[derive(Debug, Clone, Default)]
struct Target {
    hover: Option<String>,
    click: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Region {
    pub id: String,
    pub title: String,
    content: Option<Element>,
    targets: Vec<Target>,
    mounts: u64,
}

impl Region {
    pub fn content(&self) -> Option<&Element> {
        self.content.as_ref()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// How many times this region has been (re)rendered.
    pub fn mounts(&self) -> u64 {
        self.mounts
    }
}

#[derive(Debug)]
pub struct Page {
    title: String,
    regions: Vec<Region>,
    tooltip: TooltipController,
    last_updated: Option<String>,
    notices: VecDeque<Notice>,
}

impl Page {
    pub fn new<'a>(title: &str, regions: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            title: title.to_string(),
            regions: regions
                .into_iter()
                .map(|(id, title)| Region {
                    id: id.to_string(),
                    title: title.to_string(),
                    content: None,
                    targets: Vec::new(),
                    mounts: 0,
                })
                .collect(),
            tooltip: TooltipController::new(),
            last_updated: None,
            notices: VecDeque::new(),
        }
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Replaces a region's content. Interactive elements are numbered in
    /// document order and tagged with `data-target`.
    pub fn mount(&mut self, id: &str, mut content: Element) -> bool {
        let Some(region) = self.regions.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        let mut targets = Vec::new();
        index_targets(&mut content, &mut targets);
        region.content = Some(content);
        region.targets = targets;
        region.mounts += 1;
        true
    }

    fn target(&self, region: &str, target: usize) -> Option<&Target> {
        self.region(region).and_then(|r| r.targets.get(target))
    }

    pub fn pointer_move(&mut self, region: &str, target: usize, x: f64, y: f64) -> bool {
        let Some(content) = self.target(region, target).and_then(|t| t.hover.clone()) else {
            return false;
        };
        self.tooltip.show(&content, x, y);
        true
    }

    pub fn pointer_leave(&mut self, region: &str, target: usize) -> bool {
        if self.target(region, target).map_or(true, |t| t.hover.is_none()) {
            return false;
        }
        self.tooltip.hide();
        true
    }

    pub fn click(&mut self, region: &str, target: usize) -> bool {
        let Some(message) = self.target(region, target).and_then(|t| t.click.clone()) else {
            return false;
        };
        log(
            Level::Info,
            Domain::Tooltip,
            "click",
            obj(&[("region", v_str(region)), ("msg", v_str(&message))]),
        );
        self.notify(NoticeLevel::Info, message);
        true
    }

    pub fn tooltip(&self) -> &TooltipState {
        self.tooltip.state()
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice { level, message: message.into(), at: ts_now() });
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn set_last_updated(&mut self, stamp: impl Into<String>) {
        self.last_updated = Some(stamp.into());
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.last_updated.as_deref()
    }

    /// Drops every interaction target and hides the tooltip; rendered content stays.
    pub fn detach(&mut self) {
        for r in &mut self.regions {
            r.targets.clear();
        }
        self.tooltip.hide();
    }

    pub fn to_html(&self) -> String {
        let mut body = String::new();
        body.push_str(&format!("<header><h1>{}</h1>", escape(&self.title)));
        body.push_str(
            "<form method=\"post\" action=\"/refresh\"><button id=\"refresh\" type=\"submit\">Refresh</button></form>",
        );
        body.push_str(&format!(
            "<p id=\"lastUpdated\">Last Updated (UTC): {}</p></header>",
            escape(self.last_updated.as_deref().unwrap_or("Unknown"))
        ));
        if !self.notices.is_empty() {
            body.push_str("<ul class=\"notices\">");
            for n in &self.notices {
                let class = match n.level {
                    NoticeLevel::Info => "notice",
                    NoticeLevel::Error => "notice error",
                };
                body.push_str(&format!("<li class=\"{}\">{}</li>", class, escape(&n.message)));
            }
            body.push_str("</ul>");
        }
        for r in &self.regions {
            body.push_str(&format!(
                "<section id=\"{}\" class=\"chart-region\"><h2>{}</h2>",
                escape(&r.id),
                escape(&r.title)
            ));
            if let Some(c) = &r.content {
                body.push_str(&c.to_markup());
            }
            body.push_str("</section>");
        }
        body.push_str(&self.tooltip.to_markup());
        body.push_str(&EVENT_SCRIPT.replace("{offset}", &coord(OFFSET_PX)));
        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{}</title></head><body>{}</body></html>",
            escape(&self.title),
            body
        )
    }
}

fn index_targets(el: &mut Element, targets: &mut Vec<Target>) {
    if el.is_interactive() {
        el.attrs.push(("data-target", targets.len().to_string()));
        targets.push(Target { hover: el.hover.clone(), click: el.click.clone() });
    }
    for c in &mut el.children {
        index_targets(c, targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Page {
        Page::new("Dashboard", [("risk-chart", "Risk"), ("metrics", "Metrics")])
    }

    fn chart() -> Element {
        Element::new("svg")
            .child(Element::new("path").on_hover("<strong>Low</strong>").on_click("Clicked Low"))
            .child(Element::new("text").text("60%"))
            .child(Element::new("path").on_hover("<strong>High</strong>"))
    }

    #[test]
    fn mount_replaces_and_indexes_targets() {
        let mut p = page();
        assert!(p.mount("risk-chart", chart()));
        assert!(p.mount("risk-chart", chart()));
        let r = p.region("risk-chart").unwrap();
        assert_eq!(r.mounts(), 2);
        assert_eq!(r.target_count(), 2);
        let paths = r.content().unwrap().find_all("path", None);
        assert_eq!(paths[1].get_attr("data-target"), Some("1"));
        assert!(!p.mount("nope", chart()));
    }

    #[test]
    fn pointer_events_drive_tooltip() {
        let mut p = page();
        p.mount("risk-chart", chart());
        assert!(p.pointer_move("risk-chart", 1, 10.0, 20.0));
        assert_eq!(p.tooltip().content, "<strong>High</strong>");
        assert!(p.tooltip().visible);
        assert!(p.pointer_leave("risk-chart", 1));
        assert!(!p.tooltip().visible);
        assert!(!p.pointer_move("risk-chart", 9, 0.0, 0.0));
        assert!(!p.pointer_move("metrics", 0, 0.0, 0.0));
    }

    #[test]
    fn click_raises_notice() {
        let mut p = page();
        p.mount("risk-chart", chart());
        assert!(p.click("risk-chart", 0));
        assert!(!p.click("risk-chart", 1));
        let notices: Vec<_> = p.notices().collect();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Clicked Low");
        assert_eq!(notices[0].level, NoticeLevel::Info);
    }

    #[test]
    fn notices_are_bounded() {
        let mut p = page();
        for i in 0..25 {
            p.notify(NoticeLevel::Error, format!("n{}", i));
        }
        let all: Vec<_> = p.notices().map(|n| n.message.clone()).collect();
        assert_eq!(all.len(), MAX_NOTICES);
        assert_eq!(all[0], "n5");
    }

    #[test]
    fn detach_drops_targets() {
        let mut p = page();
        p.mount("risk-chart", chart());
        p.pointer_move("risk-chart", 0, 1.0, 1.0);
        p.detach();
        assert!(!p.tooltip().visible);
        assert!(!p.pointer_move("risk-chart", 0, 1.0, 1.0));
        assert!(p.region("risk-chart").unwrap().content().is_some());
    }

    #[test]
    fn html_has_refresh_control_and_regions() {
        let mut p = page();
        p.set_last_updated("2024-05-01T00:00:00Z");
        p.mount("metrics", Element::new("div").class("metrics"));
        let html = p.to_html();
        assert!(html.contains("id=\"refresh\""));
        assert!(html.contains("Last Updated (UTC): 2024-05-01T00:00:00Z"));
        assert!(html.contains("<section id=\"metrics\""));
        assert!(html.contains("id=\"tooltip\""));
    }

    #[test]
    fn html_forwards_pointer_events() {
        let mut p = page();
        p.mount("risk-chart", chart());
        let html = p.to_html();
        assert!(html.contains("data-target=\"0\""));
        let script = &html[html.find("<script>").unwrap()..];
        assert!(script.contains("fetch(\"/event?\""));
        for kind in ["\"move\"", "\"leave\"", "\"click\""] {
            assert!(script.contains(kind), "missing {}", kind);
        }
        assert!(script.contains("t.x + 12"));
        assert!(!script.contains("{offset}"));
        assert!(html.ends_with("</script></body></html>"));
    }
}
