//! Stack-based DOM builder over the two-mode lexer.
//!
//! Strict about balance: void elements never need a closing tag, every
//! other element must be closed by a matching end tag.

use crate::error::{AnalyzeResult, StructuralParseError};
use crate::lexer::{ContentToken, TagToken};
use logos::{Lexer, Logos};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    /// Lowercased tag name
    pub tag: String,
    /// Attributes in source order, values entity-decoded
    pub attributes: Vec<(String, String)>,
    pub children: Vec<DomNode>,
    /// Source range of the start tag
    pub span: Range<usize>,
    /// Source range between the start and end tag
    pub inner: Range<usize>,
}

impl DomElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    Element(DomElement),
    Text(Range<usize>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dom<'src> {
    pub source: &'src str,
    pub children: Vec<DomNode>,
    /// Every class attribute value, in order of appearance
    pub classes: Vec<String>,
}

impl<'src> Dom<'src> {
    pub fn text(&self, range: &Range<usize>) -> &'src str {
        self.source.get(range.clone()).unwrap_or_default()
    }
}

pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "textarea")
}

/// Parse an HTML fragment. `max_depth` bounds element nesting.
pub fn parse_fragment(source: &str, max_depth: usize) -> AnalyzeResult<Dom<'_>> {
    let mut builder = DomBuilder {
        source,
        stack: Vec::new(),
        roots: Vec::new(),
        classes: Vec::new(),
        max_depth,
    };

    let mut lex = ContentToken::lexer(source);
    while let Some(token) = lex.next() {
        let span = lex.span();
        match token {
            Ok(ContentToken::CommentStart) => match lex.remainder().find("-->") {
                Some(end) => lex.bump(end + 3),
                None => {
                    return Err(StructuralParseError::new(
                        "unterminated comment",
                        source,
                        span.start..source.len(),
                    ))
                }
            },
            Ok(ContentToken::Declaration) | Ok(ContentToken::ProcessingInstruction) => {}
            Ok(ContentToken::Text(_)) | Ok(ContentToken::Stray) => builder.push_text(span),
            Ok(ContentToken::TagOpen(name)) => {
                let name = name.to_ascii_lowercase();
                let mut tag_lex: Lexer<TagToken> = lex.morph();
                let (attributes, self_closing) = read_attributes(&mut tag_lex, source, span.start)?;
                let open_span = span.start..tag_lex.span().end;
                lex = tag_lex.morph();

                builder.record_classes(&attributes);
                let element = DomElement {
                    tag: name.clone(),
                    attributes,
                    children: Vec::new(),
                    span: open_span.clone(),
                    inner: open_span.end..open_span.end,
                };

                if self_closing || is_void(&name) {
                    builder.check_depth(open_span.clone())?;
                    builder.attach(DomNode::Element(element));
                    continue;
                }

                builder.open(element)?;

                if is_raw_text(&name) {
                    let closing = format!("</{}", name);
                    match lex.remainder().to_ascii_lowercase().find(&closing) {
                        Some(len) => {
                            let start = open_span.end;
                            if len > 0 {
                                builder.push_text(start..start + len);
                            }
                            lex.bump(len);
                        }
                        None => {
                            return Err(StructuralParseError::new(
                                format!("unclosed <{}>", name),
                                source,
                                open_span,
                            ))
                        }
                    }
                }
            }
            Ok(ContentToken::TagClose(name)) => builder.close(&name.to_ascii_lowercase(), span)?,
            Err(()) => {
                return Err(StructuralParseError::new("unexpected input", source, span));
            }
        }
    }

    builder.finish()
}

fn read_attributes<'s>(
    lex: &mut Lexer<'s, TagToken<'s>>,
    source: &str,
    tag_start: usize,
) -> AnalyzeResult<(Vec<(String, String)>, bool)> {
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut pending: Option<String> = None;

    let push = |attributes: &mut Vec<(String, String)>, name: String, value: &str| {
        // first occurrence wins, as in browsers
        if !attributes.iter().any(|(n, _)| *n == name) {
            let value = html_escape::decode_html_entities(value).into_owned();
            attributes.push((name, value));
        }
    };

    loop {
        let Some(token) = lex.next() else {
            return Err(StructuralParseError::new(
                "unterminated start tag",
                source,
                tag_start..source.len(),
            ));
        };
        match token {
            Ok(TagToken::Word(word)) => {
                if let Some(name) = pending.take() {
                    push(&mut attributes, name, "");
                }
                pending = Some(word.to_ascii_lowercase());
            }
            Ok(TagToken::Eq) => {
                let Some(name) = pending.take() else {
                    return Err(StructuralParseError::new(
                        "attribute value without a name",
                        source,
                        lex.span(),
                    ));
                };
                match lex.next() {
                    Some(Ok(TagToken::DoubleQuoted(value)))
                    | Some(Ok(TagToken::SingleQuoted(value)))
                    | Some(Ok(TagToken::Word(value))) => push(&mut attributes, name, value),
                    _ => {
                        return Err(StructuralParseError::new(
                            format!("missing value for attribute `{}`", name),
                            source,
                            tag_start..lex.span().end,
                        ))
                    }
                }
            }
            Ok(TagToken::End) | Ok(TagToken::SelfClose) => {
                if let Some(name) = pending.take() {
                    push(&mut attributes, name, "");
                }
                return Ok((attributes, token == Ok(TagToken::SelfClose)));
            }
            Ok(TagToken::DoubleQuoted(_)) | Ok(TagToken::SingleQuoted(_)) => {
                return Err(StructuralParseError::new(
                    "quoted value without an attribute name",
                    source,
                    lex.span(),
                ));
            }
            Err(()) => {
                return Err(StructuralParseError::new(
                    "unexpected character in start tag",
                    source,
                    tag_start..lex.span().end,
                ));
            }
        }
    }
}

struct DomBuilder<'src> {
    source: &'src str,
    stack: Vec<DomElement>,
    roots: Vec<DomNode>,
    classes: Vec<String>,
    max_depth: usize,
}

impl<'src> DomBuilder<'src> {
    fn children_mut(&mut self) -> &mut Vec<DomNode> {
        match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        }
    }

    fn attach(&mut self, node: DomNode) {
        self.children_mut().push(node);
    }

    /// Adjacent text ranges are merged into one node
    fn push_text(&mut self, span: Range<usize>) {
        let children = self.children_mut();
        if let Some(DomNode::Text(last)) = children.last_mut() {
            if last.end == span.start {
                last.end = span.end;
                return;
            }
        }
        children.push(DomNode::Text(span));
    }

    fn record_classes(&mut self, attributes: &[(String, String)]) {
        let Some((_, value)) = attributes.iter().find(|(n, _)| n == "class") else {
            return;
        };
        for class in value.split_ascii_whitespace() {
            if !self.classes.iter().any(|c| c == class) {
                self.classes.push(class.to_string());
            }
        }
    }

    fn check_depth(&self, span: Range<usize>) -> AnalyzeResult<()> {
        if self.stack.len() + 1 > self.max_depth {
            return Err(StructuralParseError::new(
                format!("elements nested deeper than {} levels", self.max_depth),
                self.source,
                span,
            ));
        }
        Ok(())
    }

    fn open(&mut self, element: DomElement) -> AnalyzeResult<()> {
        self.check_depth(element.span.clone())?;
        self.stack.push(element);
        Ok(())
    }

    fn close(&mut self, name: &str, span: Range<usize>) -> AnalyzeResult<()> {
        if is_void(name) {
            return Ok(());
        }
        match self.stack.last() {
            Some(top) if top.tag == name => {
                if let Some(mut element) = self.stack.pop() {
                    element.inner.end = span.start;
                    self.attach(DomNode::Element(element));
                }
                Ok(())
            }
            Some(top) => Err(StructuralParseError::new(
                format!("unexpected </{}>, expected </{}>", name, top.tag),
                self.source,
                span,
            )),
            None => Err(StructuralParseError::new(
                format!("</{}> has no matching start tag", name),
                self.source,
                span,
            )),
        }
    }

    fn finish(mut self) -> AnalyzeResult<Dom<'src>> {
        if let Some(open) = self.stack.pop() {
            return Err(StructuralParseError::new(
                format!("unclosed <{}>", open.tag),
                self.source,
                open.span,
            ));
        }
        Ok(Dom {
            source: self.source,
            children: self.roots,
            classes: self.classes,
        })
    }
}
