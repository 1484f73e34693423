//! # Element Tree
//!
//! The input representation for the layout engine. A document is a tree of
//! nodes: elements, which carry a kind, raw (unparsed) property strings and
//! children, and text nodes, which carry literal character data.
//!
//! The tree is produced by a front end (the JSON deserializer or the markup
//! loader in [`crate::markup`]) and is read-only during layout. Children are
//! owned by their parent; the parent back-reference needed for inheritance
//! is provided during traversal by [`ElementRef`], a borrowed ancestor chain.

mod property;
mod shapes;

pub use property::PropertyId;

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;

use crate::geometry::Transform;
use crate::parser;

/// A complete document ready for layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// The outermost element. Usually an `svg` element.
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// First element in document order whose `id` property equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<&Element> {
        self.root.find(&|e: &Element| e.id() == Some(id))
    }
}

/// The closed set of element kinds the engine knows how to lay out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Svg,
    G,
    Defs,
    Symbol,
    Use,
    Rect,
    Circle,
    Ellipse,
    Line,
    Polyline,
    Polygon,
    Path,
    Text,
    /// Any other tag. Laid out as a generic graphics element.
    #[serde(other)]
    Unknown,
}

impl ElementKind {
    /// Map a markup tag name (without namespace prefix) to a kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "svg" => ElementKind::Svg,
            "g" => ElementKind::G,
            "defs" => ElementKind::Defs,
            "symbol" => ElementKind::Symbol,
            "use" => ElementKind::Use,
            "rect" => ElementKind::Rect,
            "circle" => ElementKind::Circle,
            "ellipse" => ElementKind::Ellipse,
            "line" => ElementKind::Line,
            "polyline" => ElementKind::Polyline,
            "polygon" => ElementKind::Polygon,
            "path" => ElementKind::Path,
            "text" => ElementKind::Text,
            _ => ElementKind::Unknown,
        }
    }
}

/// A node in the element tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Element(Element),
    Text(TextNode),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<TextNode> for Node {
    fn from(text: TextNode) -> Self {
        Node::Text(text)
    }
}

/// Literal character data. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    content: String,
}

impl TextNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.content
    }
}

/// A styled, possibly graphical element.
///
/// Cloning is a deep copy: the clone owns its own properties and children
/// and shares nothing with the original.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    kind: ElementKind,
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "known_properties"
    )]
    properties: BTreeMap<PropertyId, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
    /// Parsed `transform`, filled on first access.
    #[serde(skip)]
    transform: OnceLock<Transform>,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.properties == other.properties
            && self.children == other.children
    }
}

/// Property keys the engine does not read are dropped, as the markup loader
/// drops unknown attributes.
fn known_properties<'de, D>(deserializer: D) -> Result<BTreeMap<PropertyId, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match PropertyId::from_name(&key) {
            Some(property) => Some((property, value)),
            None => {
                trace!(property = %key, "ignoring property");
                None
            }
        })
        .collect())
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            properties: BTreeMap::new(),
            children: Vec::new(),
            transform: OnceLock::new(),
        }
    }

    /// Builder-style property setter.
    pub fn with(mut self, property: PropertyId, value: impl Into<String>) -> Self {
        self.set(property, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.append_child(child);
        self
    }

    pub fn set(&mut self, property: PropertyId, value: impl Into<String>) {
        if property == PropertyId::Transform {
            self.transform = OnceLock::new();
        }
        self.properties.insert(property, value.into());
    }

    pub fn append_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// The element's own raw value for `property`, or `""` when unset.
    /// Inheritance is the style resolver's job, not this lookup's.
    pub fn get(&self, property: PropertyId) -> &str {
        self.properties
            .get(&property)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has(&self, property: PropertyId) -> bool {
        self.properties.contains_key(&property)
    }

    pub fn id(&self) -> Option<&str> {
        self.properties
            .get(&PropertyId::Id)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// `display: none` suppresses the element and its whole subtree.
    pub fn is_display_none(&self) -> bool {
        self.get(PropertyId::Display).trim() == "none"
    }

    /// The element's own transform. Identity when absent or unparsable.
    pub fn transform(&self) -> Transform {
        *self
            .transform
            .get_or_init(|| parser::parse_transform(self.get(PropertyId::Transform)))
    }

    /// The trailing text child, if the last child is text-bearing.
    pub fn last_text_child(&self) -> Option<&TextNode> {
        match self.children.last()? {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    /// Pre-order search of this subtree, including `self`.
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find_map(|child| child.find(predicate))
    }
}

/// An element seen during traversal, linked to its parent's view.
///
/// This is the non-owning parent back-reference of the element tree: it only
/// exists on the stack while a layout pass walks the tree.
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    element: &'a Element,
    parent: Option<&'a ElementRef<'a>>,
}

impl<'a> ElementRef<'a> {
    pub fn root(element: &'a Element) -> Self {
        Self {
            element,
            parent: None,
        }
    }

    /// View of `element` as a child of `self`.
    pub fn child<'b>(&'b self, element: &'b Element) -> ElementRef<'b> {
        ElementRef {
            element,
            parent: Some(self),
        }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub fn parent(&self) -> Option<&'a ElementRef<'a>> {
        self.parent
    }

    /// `self`, then each ancestor up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a Element> + '_ {
        std::iter::successors(Some(self), |r| r.parent).map(|r| r.element)
    }

    /// Nearest value of `property` on this element or an ancestor, skipping
    /// empty values and the `inherit` keyword.
    pub fn inherited_value(&self, property: PropertyId) -> Option<&'a str> {
        self.ancestors()
            .map(|e| e.get(property).trim())
            .find(|v| !v.is_empty() && *v != "inherit")
    }

    /// Like [`inherited_value`](Self::inherited_value), but keeps walking past
    /// values that `parse` rejects, so an invalid declaration behaves as if
    /// it were absent.
    pub fn inherited_parsed<T>(
        &self,
        property: PropertyId,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        self.ancestors()
            .map(|e| e.get(property).trim())
            .filter(|v| !v.is_empty() && *v != "inherit")
            .find_map(parse)
    }
}
