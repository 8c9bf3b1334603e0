use crate::element::{Element, ElementType};
use crate::style::{Breakpoint, StyleState};

impl Element {
    /// Default element for an "add element" action in the editor
    pub fn from_palette(kind: ElementType, id: impl Into<String>) -> Element {
        let element = Element::new(id, kind, default_tag(kind));
        let base = |el: Element, property: &str, value: &str| {
            el.with_style(StyleState::Normal, Breakpoint::Desktop, property, value)
        };

        match kind {
            ElementType::Heading => base(element.with_content("Heading"), "margin-bottom", "1rem"),
            ElementType::Text => base(element.with_content("Paragraph text..."), "margin-bottom", "1rem"),
            ElementType::Image => base(
                base(element.with_attribute("alt", ""), "max-width", "100%"),
                "height",
                "auto",
            ),
            ElementType::Button => element
                .with_content("Button")
                .with_attribute("href", "#")
                .with_class("btn")
                .with_class("btn-primary"),
            ElementType::Link => element.with_content("Link").with_attribute("href", "#"),
            ElementType::Container => base(element, "padding", "1rem"),
            ElementType::Row => base(base(element.with_class("row"), "display", "flex"), "gap", "1rem"),
            ElementType::Column => base(element.with_class("col"), "flex", "1"),
            ElementType::List => base(element, "padding-left", "1.5rem"),
            ElementType::ListItem => element.with_content("List item"),
            ElementType::Icon => element.with_class("icon").with_class("icon-check"),
            ElementType::Spacer => base(element, "height", "2rem"),
            ElementType::Divider => base(
                base(base(element, "border", "none"), "border-top", "1px solid #e5e7eb"),
                "margin",
                "1rem 0",
            ),
            _ => element,
        }
    }
}

fn default_tag(kind: ElementType) -> &'static str {
    match kind {
        ElementType::Fragment => "",
        ElementType::Heading => "h2",
        ElementType::Text => "p",
        ElementType::Image => "img",
        ElementType::Button | ElementType::Link => "a",
        ElementType::List => "ul",
        ElementType::ListItem => "li",
        ElementType::Divider => "hr",
        ElementType::Icon => "span",
        ElementType::Picture => "picture",
        ElementType::Source => "source",
        ElementType::RawHtml => "div",
        ElementType::Container | ElementType::Row | ElementType::Column | ElementType::Spacer => "div",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_defaults() {
        let row = Element::from_palette(ElementType::Row, "r");
        assert_eq!(row.tag, "div");
        assert!(row.classes.contains("row"));
        assert_eq!(row.styles.get(StyleState::Normal, Breakpoint::Desktop, "display"), Some("flex"));

        let button = Element::from_palette(ElementType::Button, "b");
        assert_eq!(button.tag, "a");
        assert_eq!(button.attributes.get("href").map(String::as_str), Some("#"));
        assert_eq!(button.classes.iter().collect::<Vec<_>>(), vec!["btn", "btn-primary"]);

        let divider = Element::from_palette(ElementType::Divider, "d");
        assert_eq!(divider.styles.declarations(StyleState::Normal, Breakpoint::Desktop).map(|d| d.len()), Some(3));
    }
}
