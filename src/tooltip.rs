use crate::format::coord;
use crate::logging::{log, obj, v_num, Domain, Level};
use crate::render::Element;

/// Pixel offset between the pointer and the overlay's top-left corner.
pub const OFFSET_PX: f64 = 12.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipState {
    pub visible: bool,
    pub content: String,
    pub x: f64,
    pub y: f64,
}

/// The page's single tooltip overlay.
///
/// Content is caller-formatted markup and is inserted as-is. There is no
/// queueing: each call overwrites whatever the previous one set.
#[derive(Debug, Default)]
pub struct TooltipController {
    state: TooltipState,
}

impl TooltipController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, content: &str, x: f64, y: f64) {
        self.state.content.clear();
        self.state.content.push_str(content);
        self.state.x = x;
        self.state.y = y;
        self.state.visible = true;
        log(Level::Trace, Domain::Tooltip, "show", obj(&[("x", v_num(x)), ("y", v_num(y))]));
    }

    pub fn hide(&mut self) {
        self.state.visible = false;
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    /// Overlay markup. Content is raw, so it is spliced in after the element is
    /// serialised rather than set as (escaped) element text.
    pub fn to_markup(&self) -> String {
        let s = &self.state;
        let shell = Element::new("div")
            .attr("id", "tooltip")
            .class("tooltip")
            .attr(
                "style",
                format!(
                    "left:{}px;top:{}px;opacity:{}",
                    coord(s.x + OFFSET_PX),
                    coord(s.y + OFFSET_PX),
                    if s.visible { 1 } else { 0 }
                ),
            )
            .to_markup();
        match shell.strip_suffix("</div>") {
            Some(open) => format!("{}{}</div>", open, s.content),
            None => shell,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_overwrites_and_hide_keeps_content() {
        let mut t = TooltipController::new();
        assert!(!t.state().visible);
        t.show("<strong>IT</strong>", 100.0, 40.0);
        t.show("<strong>HR</strong>", 5.0, 6.0);
        assert_eq!(
            t.state(),
            &TooltipState { visible: true, content: "<strong>HR</strong>".into(), x: 5.0, y: 6.0 }
        );
        t.hide();
        assert!(!t.state().visible);
        assert_eq!(t.state().content, "<strong>HR</strong>");
    }

    #[test]
    fn markup_is_offset_and_unescaped() {
        let mut t = TooltipController::new();
        t.show("<b>A&B</b>", 100.0, 40.0);
        assert_eq!(
            t.to_markup(),
            "<div id=\"tooltip\" class=\"tooltip\" style=\"left:112px;top:52px;opacity:1\"><b>A&B</b></div>"
        );
        t.hide();
        assert!(t.to_markup().contains("opacity:0"));
    }
}
