//! # Layout Engine
//!
//! Walks the element tree and flattens it into paint-ready primitives.
//!
//! Every visited element is in one of three states:
//!
//! - **suppressed** (`display: none`, or past the depth ceiling): the whole
//!   subtree contributes nothing.
//! - **leaf**: shapes and text emit at most one primitive and ignore any
//!   other children.
//! - **container**: `svg`, `g` and `use` recurse into their children in
//!   document order and wrap what they produce in a group.
//!
//! Paint order is document order, depth-first. Every primitive carries its
//! absolute transform, so a consumer can draw the flattened list without
//! composing group transforms itself. Malformed input never aborts a pass;
//! the offending element just contributes nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, trace, warn};

use crate::geometry::{Path, Rect, Size, Transform};
use crate::length::{LengthContext, LengthMode};
use crate::model::{Document, Element, ElementKind, ElementRef, Node, PropertyId, TextNode};
use crate::options::{LayoutOptions, DEFAULT_VIEWPORT};
use crate::parser;
use crate::style::{element_opacity, CascadeResolver, FillData, StrokeData, StyleResolver};

/// The result of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    /// Output size in device units.
    pub width: f64,
    pub height: f64,
    pub root: LayoutContainer,
}

impl LayoutTree {
    /// Every leaf primitive in paint order, with groups flattened away.
    pub fn primitives(&self) -> Vec<&LayoutObject> {
        let mut out = Vec::new();
        self.root.collect_leaves(&mut out);
        out
    }
}

/// An ordered, append-only list of layout objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutContainer {
    children: Vec<LayoutObject>,
}

impl LayoutContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_child(&mut self, object: LayoutObject) {
        self.children.push(object);
    }

    pub fn children(&self) -> &[LayoutObject] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayoutObject> {
        self.children.iter()
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a LayoutObject>) {
        for object in &self.children {
            match object {
                LayoutObject::Group(group) => group.children.collect_leaves(out),
                leaf => out.push(leaf),
            }
        }
    }
}

impl<'a> IntoIterator for &'a LayoutContainer {
    type Item = &'a LayoutObject;
    type IntoIter = std::slice::Iter<'a, LayoutObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

/// A paint-ready primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutObject {
    Text(LayoutText),
    Shape(LayoutShape),
    Group(LayoutGroup),
}

/// A positioned text run. `x`/`y` are the anchor in the coordinate system
/// given by `transform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutText {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub font_family: String,
    pub transform: Transform,
    pub fill: FillData,
    pub stroke: StrokeData,
    pub opacity: f64,
}

/// Geometry in local coordinates plus the transform that places it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutShape {
    pub path: Path,
    pub transform: Transform,
    pub fill: FillData,
    pub stroke: StrokeData,
    pub opacity: f64,
}

/// Primitives of one container element. `transform` is the container's
/// absolute coordinate system; children already include it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutGroup {
    pub transform: Transform,
    pub opacity: f64,
    pub children: LayoutContainer,
}

/// The layout engine. Stateless between passes; one engine can lay out any
/// number of documents, from any number of threads when `R: Sync`.
pub struct LayoutEngine<R = CascadeResolver> {
    options: LayoutOptions,
    resolver: R,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutOptions::default())
    }
}

impl LayoutEngine {
    /// An engine using the built-in cascade resolver.
    pub fn new(options: LayoutOptions) -> Self {
        let resolver = CascadeResolver::new(options.default_font_size, options.dpi);
        Self { options, resolver }
    }
}

impl<R: StyleResolver> LayoutEngine<R> {
    /// An engine with a caller-supplied style resolver.
    pub fn with_resolver(options: LayoutOptions, resolver: R) -> Self {
        Self { options, resolver }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Main entry point: lay out a document into a fresh layout tree.
    pub fn layout(&self, document: &Document) -> LayoutTree {
        let span = debug_span!("layout", root = ?document.root.kind());
        let _enter = span.enter();

        let pass = LayoutPass {
            resolver: &self.resolver,
            options: &self.options,
            document,
        };
        let tree = pass.run();
        debug!(
            width = tree.width,
            height = tree.height,
            objects = tree.root.len(),
            "layout complete"
        );
        tree
    }
}

/// Per-element traversal state.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// Viewport that percentages resolve against.
    viewport: Size,
    /// Absolute transform of the parent's coordinate system.
    transform: Transform,
    depth: usize,
}

impl Frame {
    fn nested(&self, viewport: Size, transform: Transform) -> Frame {
        Frame {
            viewport,
            transform,
            depth: self.depth + 1,
        }
    }
}

struct LayoutPass<'a, R> {
    resolver: &'a R,
    options: &'a LayoutOptions,
    document: &'a Document,
}

impl<R: StyleResolver> LayoutPass<'_, R> {
    fn run(&self) -> LayoutTree {
        let root = &self.document.root;
        let root_ref = ElementRef::root(root);
        let requested = self.options.viewport.unwrap_or(DEFAULT_VIEWPORT);
        let mut container = LayoutContainer::new();

        if root.kind() != ElementKind::Svg {
            let frame = Frame {
                viewport: requested,
                transform: Transform::IDENTITY,
                depth: 0,
            };
            self.layout_element(&root_ref, &frame, &mut container);
            return LayoutTree {
                width: requested.width,
                height: requested.height,
                root: container,
            };
        }

        let lengths = self.lengths(&root_ref, requested);
        let intrinsic = Size::new(
            lengths.value_for_length(root.width(), LengthMode::Width),
            lengths.value_for_length(root.height(), LengthMode::Height),
        );
        let output = self.options.viewport.unwrap_or(intrinsic);
        if intrinsic.is_empty() || output.is_empty() || root.is_display_none() {
            debug!(?intrinsic, "root has no paintable area");
            return LayoutTree {
                width: output.width,
                height: output.height,
                root: container,
            };
        }

        let to_output = match self.options.viewport {
            Some(_) => aspect_ratio(root).view_box_transform(
                Rect::new(0.0, 0.0, intrinsic.width, intrinsic.height),
                Rect::new(0.0, 0.0, output.width, output.height),
            ),
            None => Transform::IDENTITY,
        };
        let (view_box, viewport) =
            view_box_mapping(root, Rect::new(0.0, 0.0, intrinsic.width, intrinsic.height));
        let frame = Frame {
            viewport,
            transform: to_output
                .multiply(&root.transform())
                .multiply(&view_box),
            depth: 1,
        };
        // The root is flattened into the top-level container unless it needs
        // a group to carry its opacity.
        let opacity = element_opacity(&root_ref);
        if opacity < 1.0 {
            self.push_group(&root_ref, frame, opacity, &mut container, |group| {
                self.layout_children(&root_ref, &frame, group)
            });
        } else {
            self.layout_children(&root_ref, &frame, &mut container);
        }

        LayoutTree {
            width: output.width,
            height: output.height,
            root: container,
        }
    }

    fn lengths(&self, element: &ElementRef<'_>, viewport: Size) -> LengthContext {
        LengthContext::new(viewport, self.resolver.font_size(element)).with_dpi(self.options.dpi)
    }

    fn layout_children(&self, parent: &ElementRef<'_>, frame: &Frame, out: &mut LayoutContainer) {
        for child in parent.element().children().iter().filter_map(Node::as_element) {
            self.layout_element(&parent.child(child), frame, out);
        }
    }

    fn layout_element(&self, element: &ElementRef<'_>, frame: &Frame, out: &mut LayoutContainer) {
        let e = element.element();
        if frame.depth > self.options.max_depth {
            warn!(
                kind = ?e.kind(),
                max_depth = self.options.max_depth,
                "element nested too deeply, skipping subtree"
            );
            return;
        }
        if e.is_display_none() {
            trace!(kind = ?e.kind(), "display: none, skipping subtree");
            return;
        }

        let transform = frame.transform.multiply(&e.transform());
        match e.kind() {
            ElementKind::Svg => self.layout_viewport(element, transform, frame, out),
            ElementKind::G => {
                let inner = frame.nested(frame.viewport, transform);
                self.push_group(element, inner, element_opacity(element), out, |group| {
                    self.layout_children(element, &inner, group)
                });
            }
            ElementKind::Use => self.layout_use(element, transform, frame, out),
            ElementKind::Defs | ElementKind::Symbol => {}
            ElementKind::Text => self.layout_text(element, transform, frame, out),
            ElementKind::Rect
            | ElementKind::Circle
            | ElementKind::Ellipse
            | ElementKind::Line
            | ElementKind::Polyline
            | ElementKind::Polygon
            | ElementKind::Path
            | ElementKind::Unknown => self.layout_graphics(element, transform, frame, out),
        }
    }

    /// Run `fill` against a fresh container and keep it as a group unless it
    /// came back empty.
    fn push_group(
        &self,
        element: &ElementRef<'_>,
        frame: Frame,
        opacity: f64,
        out: &mut LayoutContainer,
        fill: impl FnOnce(&mut LayoutContainer),
    ) {
        let mut children = LayoutContainer::new();
        fill(&mut children);
        if children.is_empty() {
            trace!(kind = ?element.element().kind(), "empty group omitted");
            return;
        }
        out.add_child(LayoutObject::Group(LayoutGroup {
            transform: frame.transform,
            opacity,
            children,
        }));
    }

    /// A nested `svg`: a new viewport at `x, y, width, height`.
    fn layout_viewport(
        &self,
        element: &ElementRef<'_>,
        transform: Transform,
        frame: &Frame,
        out: &mut LayoutContainer,
    ) {
        let e = element.element();
        let lengths = self.lengths(element, frame.viewport);
        let port = Rect::new(
            lengths.value_for_length(e.x(), LengthMode::Width),
            lengths.value_for_length(e.y(), LengthMode::Height),
            lengths.value_for_length(e.width(), LengthMode::Width),
            lengths.value_for_length(e.height(), LengthMode::Height),
        );
        if port.size().is_empty() {
            debug!(?port, "nested viewport has no area");
            return;
        }

        let (view_box, viewport) = view_box_mapping(e, port);
        let inner = frame.nested(viewport, transform.multiply(&view_box));
        self.push_group(element, inner, element_opacity(element), out, |group| {
            self.layout_children(element, &inner, group)
        });
    }

    /// `use`: instantiate a deep copy of the referenced element.
    fn layout_use(
        &self,
        element: &ElementRef<'_>,
        transform: Transform,
        frame: &Frame,
        out: &mut LayoutContainer,
    ) {
        let e = element.element();
        let href = e.get(PropertyId::Href).trim();
        let Some(id) = href.strip_prefix('#') else {
            debug!(href, "use without a local reference");
            return;
        };
        let cyclic = element
            .ancestors()
            .skip(1)
            .any(|a| a.kind() == ElementKind::Use && a.get(PropertyId::Href).trim() == href);
        if cyclic {
            warn!(href, "use reference cycle, skipping");
            return;
        }
        let Some(target) = self.document.element_by_id(id) else {
            debug!(href, "use references a missing element");
            return;
        };

        let instance = target.clone();
        let instance_ref = element.child(&instance);
        let lengths = self.lengths(element, frame.viewport);
        let placed = transform.translate(
            lengths.value_for_length(e.x(), LengthMode::Width),
            lengths.value_for_length(e.y(), LengthMode::Height),
        );
        let inner = frame.nested(frame.viewport, placed);

        if instance.kind() != ElementKind::Symbol {
            self.push_group(element, inner, element_opacity(element), out, |group| {
                self.layout_element(&instance_ref, &inner, group)
            });
            return;
        }

        if instance.is_display_none() {
            return;
        }
        let port = Rect::new(
            0.0,
            0.0,
            lengths.value_for_length(e.width(), LengthMode::Width),
            lengths.value_for_length(e.height(), LengthMode::Height),
        );
        if port.size().is_empty() {
            debug!(href, "symbol instance has no area");
            return;
        }
        let (view_box, viewport) = view_box_mapping(&instance, port);
        let symbol = inner.nested(viewport, placed.multiply(&instance.transform()).multiply(&view_box));
        // The symbol is not laid out as an element of its own, so its opacity
        // folds into the instance group.
        let opacity = element_opacity(element) * element_opacity(&instance_ref);
        self.push_group(element, inner, opacity, out, |group| {
            self.layout_children(&instance_ref, &symbol, group)
        });
    }

    fn layout_text(
        &self,
        element: &ElementRef<'_>,
        transform: Transform,
        frame: &Frame,
        out: &mut LayoutContainer,
    ) {
        match element.element().last_text_child() {
            Some(text) => out.add_child(self.text_object(element, text, transform, frame)),
            None => debug!("text element without trailing text content, skipping"),
        }
    }

    /// Shapes and unknown kinds. Geometry wins; an element without geometry
    /// falls back to rendering a trailing text child.
    fn layout_graphics(
        &self,
        element: &ElementRef<'_>,
        transform: Transform,
        frame: &Frame,
        out: &mut LayoutContainer,
    ) {
        let e = element.element();
        let lengths = self.lengths(element, frame.viewport);
        let path = e.path(&lengths);

        if !path.is_empty() {
            let fill = match e.kind() {
                ElementKind::Line => FillData::none(),
                _ => self.resolver.fill_data(element),
            };
            out.add_child(LayoutObject::Shape(LayoutShape {
                path,
                transform,
                fill,
                stroke: self.resolver.stroke_data(element, &lengths),
                opacity: element_opacity(element),
            }));
            return;
        }

        match e.last_text_child() {
            Some(text) => out.add_child(self.text_object(element, text, transform, frame)),
            None => trace!(kind = ?e.kind(), "no geometry, nothing to emit"),
        }
    }

    fn text_object(
        &self,
        element: &ElementRef<'_>,
        text: &TextNode,
        transform: Transform,
        frame: &Frame,
    ) -> LayoutObject {
        let e = element.element();
        let lengths = self.lengths(element, frame.viewport);
        LayoutObject::Text(LayoutText {
            text: text.text().to_string(),
            x: lengths.value_for_length(e.x(), LengthMode::Width),
            y: lengths.value_for_length(e.y(), LengthMode::Height),
            font_size: lengths.font_size,
            font_family: self.resolver.font_family(element),
            transform,
            fill: self.resolver.fill_data(element),
            stroke: self.resolver.stroke_data(element, &lengths),
            opacity: element_opacity(element),
        })
    }
}

fn aspect_ratio(element: &Element) -> crate::geometry::AspectRatio {
    parser::parse_preserve_aspect_ratio(element.get(PropertyId::PreserveAspectRatio))
}

/// Transform from `element`'s `viewBox` into `port`, and the size that
/// percentages inside resolve against. Without a viewBox the port is only
/// translated.
fn view_box_mapping(element: &Element, port: Rect) -> (Transform, Size) {
    match parser::parse_view_box(element.get(PropertyId::ViewBox)) {
        Some(view_box) => (
            aspect_ratio(element).view_box_transform(view_box, port),
            view_box.size(),
        ),
        None => (Transform::translation(port.x, port.y), port.size()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PathCommand;
    use crate::style::{Color, Paint};

    fn svg(width: &str, height: &str) -> Element {
        Element::new(ElementKind::Svg)
            .with(PropertyId::Width, width)
            .with(PropertyId::Height, height)
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::new(ElementKind::Rect)
            .with(PropertyId::X, x.to_string())
            .with(PropertyId::Y, y.to_string())
            .with(PropertyId::Width, w.to_string())
            .with(PropertyId::Height, h.to_string())
    }

    fn text(content: &str) -> Element {
        Element::new(ElementKind::Text).with_child(TextNode::new(content))
    }

    fn run(root: Element) -> LayoutTree {
        LayoutEngine::default().layout(&Document::new(root))
    }

    fn only(tree: &LayoutTree) -> &LayoutObject {
        let primitives = tree.primitives();
        assert_eq!(primitives.len(), 1, "got {:?}", primitives);
        primitives[0]
    }

    fn only_text(tree: &LayoutTree) -> &LayoutText {
        match only(tree) {
            LayoutObject::Text(t) => t,
            other => panic!("expected a text primitive, got {:?}", other),
        }
    }

    fn only_shape(tree: &LayoutTree) -> &LayoutShape {
        match only(tree) {
            LayoutObject::Shape(s) => s,
            other => panic!("expected a shape primitive, got {:?}", other),
        }
    }

    #[test]
    fn text_percentage_position() {
        let root = svg("200", "100").with_child(
            text("Hello")
                .with(PropertyId::X, "50%")
                .with(PropertyId::Y, "10"),
        );
        let tree = run(root);
        assert_eq!(tree.root.len(), 1);
        let t = only_text(&tree);
        assert_eq!(t.text, "Hello");
        assert_eq!((t.x, t.y), (100.0, 10.0));
        assert!(t.transform.is_identity());
        assert_eq!(t.fill.paint, Paint::Color(Color::BLACK));
    }

    #[test]
    fn suppressed_group_emits_nothing() {
        let root = svg("100", "100").with_child(
            Element::new(ElementKind::G)
                .with(PropertyId::Display, "none")
                .with_child(rect(0.0, 0.0, 10.0, 10.0)),
        );
        assert!(run(root).root.is_empty());
    }

    #[test]
    fn text_without_trailing_text_emits_nothing() {
        let empty = Element::new(ElementKind::Text);
        let trailing_element = text("Hi").with_child(rect(0.0, 0.0, 5.0, 5.0));
        let root = svg("100", "100").with_child(empty).with_child(trailing_element);
        assert!(run(root).root.is_empty());
    }

    #[test]
    fn shape_geometry_wins_over_text_fallback() {
        let r = rect(0.0, 0.0, 10.0, 10.0).with_child(TextNode::new("label"));
        let tree = run(svg("100", "100").with_child(r));
        assert!(!only_shape(&tree).path.is_empty());
    }

    #[test]
    fn unknown_kind_falls_back_to_text() {
        let placeholder = Element::new(ElementKind::Unknown)
            .with(PropertyId::X, "5")
            .with_child(TextNode::new("?"));
        let tree = run(svg("100", "100").with_child(placeholder));
        let t = only_text(&tree);
        assert_eq!(t.text, "?");
        assert_eq!(t.x, 5.0);
    }

    #[test]
    fn unknown_kind_without_text_emits_nothing() {
        let root = svg("100", "100").with_child(Element::new(ElementKind::Unknown));
        assert!(run(root).root.is_empty());
    }

    #[test]
    fn paint_order_is_document_order() {
        let root = svg("100", "100")
            .with_child(rect(0.0, 0.0, 10.0, 10.0))
            .with_child(
                Element::new(ElementKind::G)
                    .with_child(text("a"))
                    .with_child(rect(5.0, 5.0, 1.0, 1.0)),
            )
            .with_child(text("b"));
        let tree = run(root);
        let kinds: Vec<&str> = tree
            .primitives()
            .into_iter()
            .map(|o| match o {
                LayoutObject::Text(t) => t.text.as_str(),
                LayoutObject::Shape(_) => "shape",
                LayoutObject::Group(_) => "group",
            })
            .collect();
        assert_eq!(kinds, vec!["shape", "a", "shape", "b"]);
        assert_eq!(tree.root.len(), 3);
    }

    #[test]
    fn group_transform_is_composed() {
        let root = svg("100", "100").with_child(
            Element::new(ElementKind::G)
                .with(PropertyId::Transform, "translate(10 20)")
                .with_child(rect(0.0, 0.0, 5.0, 5.0).with(PropertyId::Transform, "scale(2)")),
        );
        let tree = run(root);
        let shape = only_shape(&tree);
        assert_eq!(shape.transform, Transform::new(2.0, 0.0, 0.0, 2.0, 10.0, 20.0));
        match &tree.root.children()[0] {
            LayoutObject::Group(g) => {
                assert_eq!(g.transform, Transform::translation(10.0, 20.0));
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn empty_groups_are_omitted() {
        let root = svg("100", "100").with_child(
            Element::new(ElementKind::G).with_child(Element::new(ElementKind::G)),
        );
        assert!(run(root).root.is_empty());
    }

    #[test]
    fn view_box_scales_children() {
        let root = svg("200", "200")
            .with(PropertyId::ViewBox, "0 0 100 100")
            .with_child(text("x").with(PropertyId::X, "50%"));
        let tree = run(root);
        let t = only_text(&tree);
        assert_eq!(t.x, 50.0);
        assert_eq!(t.transform, Transform::scaling(2.0, 2.0));
    }

    #[test]
    fn requested_viewport_scales_intrinsic_size() {
        let doc = Document::new(svg("100", "50").with_child(rect(0.0, 0.0, 10.0, 10.0)));
        let tree = LayoutEngine::new(LayoutOptions::default().with_viewport(200.0, 100.0))
            .layout(&doc);
        assert_eq!((tree.width, tree.height), (200.0, 100.0));
        assert_eq!(only_shape(&tree).transform, Transform::scaling(2.0, 2.0));
    }

    #[test]
    fn default_root_size() {
        let tree = run(Element::new(ElementKind::Svg));
        assert_eq!((tree.width, tree.height), (300.0, 150.0));
    }

    #[test]
    fn non_svg_root_uses_requested_viewport() {
        let doc = Document::new(text("Hello").with(PropertyId::X, "50%"));
        let tree = LayoutEngine::new(LayoutOptions::default().with_viewport(200.0, 100.0))
            .layout(&doc);
        assert_eq!(only_text(&tree).x, 100.0);
    }

    #[test]
    fn nested_svg_establishes_viewport() {
        let inner = svg("50", "40")
            .with(PropertyId::X, "10")
            .with(PropertyId::Y, "20")
            .with_child(text("t").with(PropertyId::X, "100%"));
        let tree = run(svg("200", "100").with_child(inner));
        let t = only_text(&tree);
        assert_eq!(t.x, 50.0);
        assert_eq!(t.transform, Transform::translation(10.0, 20.0));
    }

    #[test]
    fn zero_sized_nested_svg_emits_nothing() {
        let inner = svg("0", "40").with_child(rect(0.0, 0.0, 5.0, 5.0));
        assert!(run(svg("200", "100").with_child(inner)).root.is_empty());
    }

    #[test]
    fn lines_are_never_filled() {
        let line = Element::new(ElementKind::Line)
            .with(PropertyId::X2, "10")
            .with(PropertyId::Stroke, "red");
        let tree = run(svg("100", "100").with_child(line));
        let shape = only_shape(&tree);
        assert_eq!(shape.fill.paint, Paint::None);
        assert!(shape.stroke.is_visible());
    }

    #[test]
    fn use_instantiates_a_copy() {
        let root = svg("100", "100")
            .with_child(
                Element::new(ElementKind::Defs)
                    .with_child(rect(0.0, 0.0, 4.0, 4.0).with(PropertyId::Id, "box")),
            )
            .with_child(
                Element::new(ElementKind::Use)
                    .with(PropertyId::Href, "#box")
                    .with(PropertyId::X, "30")
                    .with(PropertyId::Fill, "blue"),
            );
        let tree = run(root);
        let shape = only_shape(&tree);
        assert_eq!(shape.transform, Transform::translation(30.0, 0.0));
        assert_eq!(shape.fill.paint, Paint::Color(Color::rgba8(0, 0, 255, 255)));
    }

    #[test]
    fn use_of_symbol_maps_view_box() {
        let symbol = Element::new(ElementKind::Symbol)
            .with(PropertyId::Id, "icon")
            .with(PropertyId::ViewBox, "0 0 10 10")
            .with_child(rect(0.0, 0.0, 10.0, 10.0));
        let root = svg("100", "100").with_child(symbol).with_child(
            Element::new(ElementKind::Use)
                .with(PropertyId::Href, "#icon")
                .with(PropertyId::Width, "20")
                .with(PropertyId::Height, "20"),
        );
        let tree = run(root);
        assert_eq!(tree.primitives().len(), 1);
        assert_eq!(only_shape(&tree).transform, Transform::scaling(2.0, 2.0));
    }

    #[test]
    fn use_cycles_terminate() {
        let root = svg("100", "100").with_child(
            Element::new(ElementKind::G).with(PropertyId::Id, "loop").with_child(
                Element::new(ElementKind::Use).with(PropertyId::Href, "#loop"),
            ),
        );
        assert!(run(root).root.is_empty());
    }

    #[test]
    fn dangling_use_emits_nothing() {
        let root = svg("100", "100")
            .with_child(Element::new(ElementKind::Use).with(PropertyId::Href, "#nope"));
        assert!(run(root).root.is_empty());
    }

    #[test]
    fn depth_ceiling_stops_descent() {
        let mut deep = rect(0.0, 0.0, 1.0, 1.0);
        for _ in 0..10 {
            deep = Element::new(ElementKind::G).with_child(deep);
        }
        let doc = Document::new(svg("10", "10").with_child(deep));
        let shallow = LayoutEngine::new(LayoutOptions::default().with_max_depth(5)).layout(&doc);
        assert!(shallow.root.is_empty());
        assert_eq!(LayoutEngine::default().layout(&doc).primitives().len(), 1);
    }

    #[test]
    fn cloned_tree_lays_out_identically() {
        let original = svg("120", "80")
            .with(PropertyId::Fill, "red")
            .with_child(rect(1.0, 2.0, 30.0, 40.0).with(PropertyId::Ry, "5"))
            .with_child(text("copy").with(PropertyId::Y, "50%"));
        let copy = original.clone();
        assert_eq!(run(original), run(copy));
    }

    #[test]
    fn rounded_rect_path_in_output() {
        let tree = run(svg("200", "100").with_child(
            rect(0.0, 0.0, 100.0, 50.0).with(PropertyId::Ry, "10"),
        ));
        let shape = only_shape(&tree);
        assert_eq!(shape.path.commands()[0], PathCommand::MoveTo(10.0, 0.0));
        assert_eq!(
            shape.path.bounding_box(),
            Some(Rect::new(0.0, 0.0, 100.0, 50.0))
        );
    }

    #[test]
    fn group_opacity_is_attached() {
        let root = svg("100", "100").with_child(
            Element::new(ElementKind::G)
                .with(PropertyId::Opacity, "0.25")
                .with_child(rect(0.0, 0.0, 1.0, 1.0)),
        );
        match &run(root).root.children()[0] {
            LayoutObject::Group(g) => assert_eq!(g.opacity, 0.25),
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn root_opacity_wraps_children_in_a_group() {
        let root = svg("100", "100")
            .with(PropertyId::Opacity, "0.5")
            .with_child(rect(0.0, 0.0, 10.0, 10.0));
        let tree = run(root);
        assert_eq!(tree.root.len(), 1);
        match &tree.root.children()[0] {
            LayoutObject::Group(g) => {
                assert_eq!(g.opacity, 0.5);
                assert_eq!(g.children.len(), 1);
            }
            other => panic!("expected group, got {:?}", other),
        }
        assert_eq!(only_shape(&tree).opacity, 1.0);
    }

    #[test]
    fn opaque_root_is_flattened() {
        let tree = run(svg("100", "100").with_child(rect(0.0, 0.0, 10.0, 10.0)));
        assert!(matches!(tree.root.children()[0], LayoutObject::Shape(_)));
    }

    #[test]
    fn symbol_opacity_combines_with_use() {
        let symbol = Element::new(ElementKind::Symbol)
            .with(PropertyId::Id, "icon")
            .with(PropertyId::Opacity, "0.5")
            .with_child(rect(0.0, 0.0, 10.0, 10.0));
        let root = svg("100", "100").with_child(symbol).with_child(
            Element::new(ElementKind::Use)
                .with(PropertyId::Href, "#icon")
                .with(PropertyId::Width, "10")
                .with(PropertyId::Height, "10")
                .with(PropertyId::Opacity, "0.5"),
        );
        match &run(root).root.children()[0] {
            LayoutObject::Group(g) => assert_eq!(g.opacity, 0.25),
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn independent_passes_on_threads() {
        let doc = Document::new(
            svg("100%", "100%").with_child(text("w").with(PropertyId::X, "100%")),
        );
        let engine = LayoutEngine::default();
        let (a, b) = std::thread::scope(|s| {
            let a = s.spawn(|| {
                LayoutEngine::new(LayoutOptions::default().with_viewport(100.0, 10.0))
                    .layout(&doc)
            });
            let b = s.spawn(|| engine.layout(&doc));
            (a.join().unwrap(), b.join().unwrap())
        });
        assert_eq!(only_text(&a).x, 100.0);
        assert_eq!(only_text(&b).x, 300.0);
        assert_eq!(a.width, 100.0);
        assert_eq!(b.width, 300.0);
    }
}
