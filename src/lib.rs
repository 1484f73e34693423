//! # Vellum
//!
//! A vector-graphics layout engine.
//!
//! Vellum takes a styled, SVG-like element tree and flattens it into an
//! ordered list of paint-ready primitives: shapes with resolved paths and
//! text runs with resolved anchors, each carrying its absolute transform and
//! resolved fill and stroke. A rasterizer can draw the result without ever
//! seeing the element tree.
//!
//! Layout never fails. Malformed input degrades element by element: an
//! unparsable transform is the identity, an unparsable length is its
//! default, and an element that cannot be laid out contributes nothing.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / SVG markup)
//!       ↓
//!   [model]     Element tree: kinds, raw properties, children
//!       ↓
//!   [style]     Paint inheritance, currentColor, font size
//!   [length]    Units and percentages against the nearest viewport
//!       ↓
//!   [layout]    Traversal, per-kind geometry, flattening
//!       ↓
//! LayoutTree (serde, for the rasterizer)
//! ```

pub mod error;
pub mod geometry;
pub mod layout;
pub mod length;
pub mod markup;
pub mod model;
pub mod options;
pub mod parser;
pub mod style;

pub use error::VellumError;
pub use layout::{LayoutContainer, LayoutEngine, LayoutObject, LayoutTree};
pub use model::{Document, Element, ElementKind, Node, PropertyId, TextNode};
pub use options::LayoutOptions;

/// Lay out a document with the built-in style resolver.
///
/// This is the primary entry point. The document is not modified, so the
/// same tree can be laid out again under different options.
pub fn layout(document: &Document, options: &LayoutOptions) -> LayoutTree {
    LayoutEngine::new(options.clone()).layout(document)
}

/// Lay out a document described as JSON, with default options.
pub fn layout_json(json: &str) -> Result<LayoutTree, VellumError> {
    layout_json_with(json, &LayoutOptions::default())
}

/// Lay out a document described as JSON.
pub fn layout_json_with(json: &str, options: &LayoutOptions) -> Result<LayoutTree, VellumError> {
    let document: Document = serde_json::from_str(json)?;
    Ok(layout(&document, options))
}

/// Lay out SVG markup, with default options.
pub fn layout_svg(markup: &str) -> Result<LayoutTree, VellumError> {
    layout_svg_with(markup, &LayoutOptions::default())
}

/// Lay out SVG markup.
pub fn layout_svg_with(markup: &str, options: &LayoutOptions) -> Result<LayoutTree, VellumError> {
    let document = markup::parse_document(markup)?;
    Ok(layout(&document, options))
}

/// Serialize a layout tree as pretty-printed JSON.
pub fn to_json(tree: &LayoutTree) -> Result<String, VellumError> {
    serde_json::to_string_pretty(tree).map_err(VellumError::Output)
}
