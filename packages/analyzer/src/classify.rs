//! Heuristic element-kind detection from tag, classes and children.

use crate::dom::{DomElement, DomNode};
use tessera_document::ElementType;

/// Inline formatting that keeps a generic container "just text"
fn is_formatting(tag: &str) -> bool {
    matches!(
        tag,
        "b" | "strong"
            | "em"
            | "i"
            | "u"
            | "s"
            | "small"
            | "sub"
            | "sup"
            | "br"
            | "span"
            | "code"
            | "mark"
            | "abbr"
            | "q"
            | "cite"
            | "time"
            | "kbd"
            | "var"
            | "wbr"
            | "del"
            | "ins"
    )
}

/// Phrasing content allowed inside headings, paragraphs, list items and links
fn is_phrasing(tag: &str) -> bool {
    is_formatting(tag) || matches!(tag, "a" | "img" | "label" | "picture" | "source")
}

pub fn has_class(element: &DomElement, predicate: impl Fn(&str) -> bool) -> bool {
    element.classes().any(predicate)
}

fn is_icon(element: &DomElement) -> bool {
    matches!(element.tag.as_str(), "span" | "i")
        && has_class(element, |c| c == "icon" || c.starts_with("icon-") || c.starts_with("fa-"))
}

fn is_row(element: &DomElement) -> bool {
    let by_class = has_class(element, |c| {
        c == "row" || c.starts_with("row-") || c == "flex" || c == "d-flex" || c == "grid" || c == "d-grid"
    });
    let by_style = element
        .attribute("style")
        .map(|style| {
            let compact: String = style.chars().filter(|c| !c.is_whitespace()).collect();
            compact.contains("display:flex") || compact.contains("display:grid")
        })
        .unwrap_or(false);
    by_class || by_style
}

fn is_column(element: &DomElement) -> bool {
    has_class(element, |c| c == "col" || c.starts_with("col-") || c == "column")
}

fn all_children(children: &[DomNode], allowed: &dyn Fn(&DomElement) -> bool) -> bool {
    children.iter().all(|child| match child {
        DomNode::Text(_) => true,
        DomNode::Element(el) => allowed(el) && all_children(&el.children, allowed),
    })
}

/// Children are text and phrasing elements only
pub fn only_phrasing(element: &DomElement) -> bool {
    all_children(&element.children, &|el: &DomElement| is_phrasing(&el.tag))
}

fn only_formatting(element: &DomElement) -> bool {
    all_children(&element.children, &|el: &DomElement| {
        is_formatting(&el.tag) && !is_icon(el)
    })
}

fn has_text(children: &[DomNode], source: &str) -> bool {
    children.iter().any(|child| match child {
        DomNode::Text(range) => source
            .get(range.clone())
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false),
        DomNode::Element(el) => has_text(&el.children, source),
    })
}

pub fn classify(element: &DomElement, source: &str) -> ElementType {
    match element.tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" if only_phrasing(element) => ElementType::Heading,
        "p" if only_phrasing(element) => ElementType::Text,
        "img" => ElementType::Image,
        "picture" => ElementType::Picture,
        "source" => ElementType::Source,
        "a" if has_class(element, |c| c == "btn" || c.starts_with("btn-") || c == "button") => {
            ElementType::Button
        }
        "a" => ElementType::Link,
        "button" => ElementType::Button,
        "hr" => ElementType::Divider,
        "span" | "i" if is_icon(element) => ElementType::Icon,
        "ul" | "ol" => ElementType::List,
        "li" => ElementType::ListItem,
        "style" | "script" | "template" | "iframe" | "svg" => ElementType::RawHtml,
        _ if is_row(element) => ElementType::Row,
        _ if is_column(element) => ElementType::Column,
        _ if only_formatting(element) && has_text(&element.children, source) => ElementType::Text,
        _ => ElementType::Container,
    }
}

/// Kinds whose inline content is kept verbatim instead of being split into children
pub fn keeps_inline_content(kind: ElementType, element: &DomElement) -> bool {
    match kind {
        ElementType::Heading | ElementType::Text | ElementType::Icon | ElementType::RawHtml => true,
        ElementType::ListItem | ElementType::Button | ElementType::Link => only_phrasing(element),
        _ => false,
    }
}
