use crate::projection::CardRow;

use super::Element;

/// Metric-card grid: one card per row, in projection order.
pub fn render(rows: &[CardRow]) -> Element {
    Element::new("div").class("metrics").children(rows.iter().map(|c| {
        Element::new("div")
            .class("metric-card")
            .child(Element::new("h3").text(c.title.as_str()))
            .child(Element::new("p").class("value").text(c.value.as_str()))
            .child(Element::new("div").class("subtext").text(c.subtext.as_str()))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_card_per_row() {
        let rows = vec![
            CardRow { title: "Employees Analyzed".into(), value: "120".into(), subtext: "Total records".into() },
            CardRow { title: "MFA Enabled".into(), value: "".into(), subtext: "Yes rate".into() },
        ];
        let grid = render(&rows);
        let cards = grid.find_all("div", Some("metric-card"));
        assert_eq!(cards.len(), 2);
        let values = grid.find_all("p", Some("value"));
        assert_eq!(values[0].text.as_deref(), Some("120"));
        assert_eq!(values[1].text.as_deref(), Some(""));
    }
}
