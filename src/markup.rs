//! # Markup Loader
//!
//! Builds a [`Document`] from SVG markup. This is deliberately thin: tags
//! map to [`ElementKind`]s, known attributes map to [`PropertyId`]s, and an
//! inline `style` attribute contributes presentation properties. There is
//! no stylesheet or selector matching.
//!
//! Raw values are stored unparsed; the layout engine interprets them.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::VellumError;
use crate::model::{Document, Element, ElementKind, PropertyId, TextNode};

/// Parse SVG markup into an element tree.
pub fn parse_document(markup: &str) -> Result<Document, VellumError> {
    let mut reader = Reader::from_str(markup);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(element_from_tag(&e)?),
            Event::Empty(e) => {
                let element = element_from_tag(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Text(t) => {
                let text = collapse_whitespace(&t.unescape()?);
                append_text(&mut stack, text);
            }
            Event::CData(c) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                append_text(&mut stack, text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // Unclosed elements are kept, folded into their parents.
    while let Some(element) = stack.pop() {
        attach(&mut stack, &mut root, element);
    }

    root.map(Document::new)
        .ok_or_else(|| VellumError::Markup("document has no root element".to_string()))
}

fn element_from_tag(tag: &BytesStart<'_>) -> Result<Element, VellumError> {
    let local_name = tag.local_name();
    let name = String::from_utf8_lossy(local_name.as_ref());
    let mut element = Element::new(ElementKind::from_tag(&name));
    let mut style = None;

    for attr in tag.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?;
        if key == "style" {
            style = Some(value.into_owned());
            continue;
        }
        match PropertyId::from_name(&key) {
            Some(property) => element.set(property, value.into_owned()),
            None => trace!(tag = %name, attribute = %key, "ignoring attribute"),
        }
    }

    if let Some(style) = style {
        apply_inline_style(&mut element, &style);
    }
    Ok(element)
}

/// `name: value; ...` declarations. Later declarations win, and all of
/// them win over attributes.
fn apply_inline_style(element: &mut Element, style: &str) {
    for declaration in style.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        match PropertyId::from_name(name.trim()) {
            Some(property) if property.is_presentation() => {
                element.set(property, value.trim());
            }
            _ => trace!(declaration, "ignoring style declaration"),
        }
    }
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.append_child(element),
        None if root.is_none() => *root = Some(element),
        None => trace!(kind = ?element.kind(), "ignoring content after the root element"),
    }
}

fn append_text(stack: &mut [Element], text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(parent) = stack.last_mut() {
        parent.append_child(TextNode::new(text));
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
