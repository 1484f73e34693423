//! Integration tests for the Vellum layout pipeline.
//!
//! These tests exercise the public API end to end:
//! - element trees built in code, from JSON and from SVG markup
//! - the behavioral guarantees of geometry synthesis and traversal
//! - custom style resolvers
//! - the serialized layout tree consumed by rasterizers

use vellum::geometry::{PathCommand, Rect, Transform};
use vellum::layout::{LayoutObject, LayoutShape, LayoutText};
use vellum::length::LengthContext;
use vellum::model::ElementRef;
use vellum::style::{
    Color, FillData, FillRule, LineCap, LineJoin, Paint, StrokeData, StyleResolver,
};
use vellum::*;

// ─── Helpers ────────────────────────────────────────────────────

fn make_svg(width: f64, height: f64, children: Vec<Element>) -> Element {
    children.into_iter().fold(
        Element::new(ElementKind::Svg)
            .with(PropertyId::Width, width.to_string())
            .with(PropertyId::Height, height.to_string()),
        Element::with_child,
    )
}

fn make_group(children: Vec<Element>) -> Element {
    children
        .into_iter()
        .fold(Element::new(ElementKind::G), Element::with_child)
}

fn make_rect(x: &str, y: &str, width: &str, height: &str) -> Element {
    Element::new(ElementKind::Rect)
        .with(PropertyId::X, x)
        .with(PropertyId::Y, y)
        .with(PropertyId::Width, width)
        .with(PropertyId::Height, height)
}

fn make_text(content: &str, x: &str, y: &str) -> Element {
    Element::new(ElementKind::Text)
        .with(PropertyId::X, x)
        .with(PropertyId::Y, y)
        .with_child(TextNode::new(content))
}

fn layout_default(root: Element) -> LayoutTree {
    layout(&Document::new(root), &LayoutOptions::default())
}

fn texts(tree: &LayoutTree) -> Vec<&LayoutText> {
    tree.primitives()
        .into_iter()
        .filter_map(|o| match o {
            LayoutObject::Text(t) => Some(t),
            _ => None,
        })
        .collect()
}

fn shapes(tree: &LayoutTree) -> Vec<&LayoutShape> {
    tree.primitives()
        .into_iter()
        .filter_map(|o| match o {
            LayoutObject::Shape(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.001
}

// ─── Geometry guarantees ────────────────────────────────────────

#[test]
fn test_zero_width_rect_has_empty_path() {
    let rect = make_rect("10", "10", "0", "20").with(PropertyId::Rx, "5");
    let lengths = LengthContext::new(geometry::Size::new(100.0, 100.0), 16.0);
    assert!(rect.path(&lengths).is_empty());

    let tree = layout_default(make_svg(100.0, 100.0, vec![rect]));
    assert!(tree.root.is_empty());
}

#[test]
fn test_ry_only_rect_copies_radius() {
    let rect = make_rect("0", "0", "100", "50").with(PropertyId::Ry, "10");
    let lengths = LengthContext::new(geometry::Size::new(100.0, 100.0), 16.0);
    assert_eq!(rect.radii(&lengths), (10.0, 10.0));

    let path = rect.path(&lengths);
    assert_eq!(path.bounding_box(), Some(Rect::new(0.0, 0.0, 100.0, 50.0)));
    // Rounded corners use curves; a square rect would be 4 lines + close.
    let curves = path
        .commands()
        .iter()
        .filter(|c| matches!(c, PathCommand::CubicTo(..)))
        .count();
    assert_eq!(curves, 4);
}

#[test]
fn test_oversized_radius_is_clamped() {
    let rect = make_rect("0", "0", "20", "10").with(PropertyId::Rx, "50");
    let lengths = LengthContext::new(geometry::Size::new(100.0, 100.0), 16.0);
    let path = rect.path(&lengths);
    assert_eq!(path.commands()[0], PathCommand::MoveTo(10.0, 0.0));
    assert_eq!(path.bounding_box(), Some(Rect::new(0.0, 0.0, 20.0, 10.0)));
}

// ─── Traversal guarantees ───────────────────────────────────────

#[test]
fn test_text_scenario_percentage_anchor() {
    let tree = layout_default(make_svg(
        200.0,
        100.0,
        vec![make_text("Hello", "50%", "10")],
    ));
    let texts = texts(&tree);
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].text, "Hello");
    assert!(approx(texts[0].x, 100.0));
    assert!(approx(texts[0].y, 10.0));
}

#[test]
fn test_suppressed_subtree_emits_nothing() {
    let group = make_group(vec![make_rect("0", "0", "10", "10")])
        .with(PropertyId::Display, "none");
    let tree = layout_default(make_svg(100.0, 100.0, vec![group]));
    assert!(tree.root.is_empty());
    assert!(tree.primitives().is_empty());
}

#[test]
fn test_text_without_content_emits_nothing() {
    let empty = Element::new(ElementKind::Text).with(PropertyId::X, "1");
    let trailing_shape = make_text("x", "0", "0").with_child(make_rect("0", "0", "1", "1"));
    let tree = layout_default(make_svg(100.0, 100.0, vec![empty, trailing_shape]));
    assert!(tree.root.is_empty());
}

#[test]
fn test_clone_lays_out_identically() {
    let original = make_svg(
        300.0,
        200.0,
        vec![
            make_group(vec![
                make_rect("5%", "5%", "50", "40").with(PropertyId::Rx, "3"),
                make_text("label", "10", "1em"),
            ])
            .with(PropertyId::Transform, "rotate(15) translate(4 2)")
            .with(PropertyId::Stroke, "navy"),
            Element::new(ElementKind::Path).with(PropertyId::D, "M0 0 q 10 10 20 0 a5 5 0 0 1 10 0z"),
        ],
    );
    let copy = original.clone();
    assert_eq!(copy, original);
    assert_eq!(layout_default(copy), layout_default(original));
}

#[test]
fn test_relayout_under_new_viewport() {
    let doc = Document::new(
        Element::new(ElementKind::Svg)
            .with_child(make_rect("0", "0", "50%", "50%")),
    );
    let small = layout(&doc, &LayoutOptions::default().with_viewport(100.0, 100.0));
    let large = layout(&doc, &LayoutOptions::default().with_viewport(400.0, 200.0));
    let small_box = shapes(&small)[0].path.bounding_box().unwrap();
    let large_box = shapes(&large)[0].path.bounding_box().unwrap();
    assert!(approx(small_box.width, 50.0));
    assert!(approx(large_box.width, 200.0));
    assert!(approx(large_box.height, 100.0));
}

#[test]
fn test_inherited_paint_reaches_primitives() {
    let group = make_group(vec![
        make_rect("0", "0", "10", "10"),
        make_rect("0", "0", "10", "10").with(PropertyId::Fill, "none"),
    ])
    .with(PropertyId::Fill, "#00ff00")
    .with(PropertyId::Stroke, "currentColor")
    .with(PropertyId::Color, "rgb(255, 0, 0)");
    let tree = layout_default(make_svg(100.0, 100.0, vec![group]));
    let shapes = shapes(&tree);
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].fill.paint, Paint::Color(Color::rgba8(0, 255, 0, 255)));
    assert_eq!(shapes[0].stroke.paint, Paint::Color(Color::rgba8(255, 0, 0, 255)));
    assert_eq!(shapes[1].fill.paint, Paint::None);
}

#[test]
fn test_use_and_symbol_instancing() {
    let symbol = Element::new(ElementKind::Symbol)
        .with(PropertyId::Id, "star")
        .with(PropertyId::ViewBox, "0 0 10 10")
        .with_child(
            Element::new(ElementKind::Polygon)
                .with(PropertyId::Points, "5,0 10,10 0,10"),
        );
    let place = |x: &str| {
        Element::new(ElementKind::Use)
            .with(PropertyId::Href, "#star")
            .with(PropertyId::X, x)
            .with(PropertyId::Width, "20")
            .with(PropertyId::Height, "20")
    };
    let tree = layout_default(make_svg(100.0, 100.0, vec![symbol, place("0"), place("50")]));
    let shapes = shapes(&tree);
    assert_eq!(shapes.len(), 2);
    assert_eq!(shapes[0].transform, Transform::scaling(2.0, 2.0));
    assert!(approx(shapes[1].transform.e, 50.0));
    assert!(approx(shapes[1].transform.a, 2.0));
}

// ─── Custom resolver ────────────────────────────────────────────

struct Monochrome;

impl StyleResolver for Monochrome {
    fn fill_data(&self, _element: &ElementRef<'_>) -> FillData {
        FillData {
            paint: Paint::Color(Color::rgb(0.5, 0.5, 0.5)),
            opacity: 1.0,
            rule: FillRule::EvenOdd,
        }
    }

    fn stroke_data(&self, _element: &ElementRef<'_>, _lengths: &LengthContext) -> StrokeData {
        StrokeData {
            paint: Paint::None,
            opacity: 1.0,
            width: 0.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 4.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
        }
    }

    fn font_size(&self, _element: &ElementRef<'_>) -> f64 {
        10.0
    }
}

#[test]
fn test_custom_resolver_descriptors_pass_through() {
    let doc = Document::new(make_svg(
        100.0,
        100.0,
        vec![
            make_rect("0", "0", "10", "10").with(PropertyId::Fill, "red"),
            make_text("em", "2em", "0"),
        ],
    ));
    let engine = LayoutEngine::with_resolver(LayoutOptions::default(), Monochrome);
    let tree = engine.layout(&doc);
    let shapes = shapes(&tree);
    assert_eq!(shapes[0].fill.rule, FillRule::EvenOdd);
    assert_eq!(shapes[0].fill.paint, Paint::Color(Color::rgb(0.5, 0.5, 0.5)));
    let texts = texts(&tree);
    assert_eq!(texts[0].font_size, 10.0);
    assert!(approx(texts[0].x, 20.0));
    assert_eq!(texts[0].font_family, "sans-serif");
}

// ─── Front ends ─────────────────────────────────────────────────

#[test]
fn test_layout_json_end_to_end() {
    let json = r#"{
        "root": {
            "kind": "svg",
            "properties": { "width": "200", "height": "100" },
            "children": [
                { "type": "element", "kind": "circle",
                  "properties": { "cx": "50", "cy": "50", "r": "10", "fill": "orange" } },
                { "type": "element", "kind": "text", "properties": { "x": "50%", "y": "10" },
                  "children": [ { "type": "text", "content": "Hello" } ] }
            ]
        }
    }"#;
    let tree = layout_json(json).unwrap();
    assert_eq!((tree.width, tree.height), (200.0, 100.0));
    assert_eq!(shapes(&tree).len(), 1);
    assert!(approx(texts(&tree)[0].x, 100.0));
}

#[test]
fn test_layout_json_ignores_unknown_properties() {
    let json = r#"{
        "root": {
            "kind": "svg",
            "properties": { "width": "100", "height": "100", "data-name": "badge" },
            "children": [
                { "type": "element", "kind": "rect",
                  "properties": { "class": "x", "width": "10", "height": "10" } }
            ]
        }
    }"#;
    let tree = layout_json(json).unwrap();
    assert_eq!(tree.primitives().len(), 1);
    assert_eq!(
        shapes(&tree)[0].path.bounding_box(),
        Some(Rect::new(0.0, 0.0, 10.0, 10.0))
    );
}

#[test]
fn test_root_opacity_survives_markup_layout() {
    let tree = layout_svg(
        r#"<svg width="100" height="100" opacity="0.5"><rect width="10" height="10"/></svg>"#,
    )
    .unwrap();
    match &tree.root.children()[0] {
        LayoutObject::Group(group) => assert!(approx(group.opacity, 0.5)),
        other => panic!("expected a group, got {:?}", other),
    }
}

#[test]
fn test_layout_json_reports_hint() {
    let err = layout_json(r#"{ "root": { "kind": "svg", } }"#).unwrap_err();
    assert!(matches!(err, VellumError::Parse { .. }));
    assert!(err.to_string().contains("Hint"));
}

#[test]
fn test_layout_svg_end_to_end() {
    let tree = layout_svg(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="120" height="60" viewBox="0 0 60 30">
            <g fill="blue" transform="translate(5,5)">
                <rect width="10" height="10" style="fill: red"/>
                <ellipse cx="30" cy="10" rx="5"/>
                <line x2="20" stroke="black"/>
            </g>
            <text x="1" y="28">caption</text>
        </svg>"##,
    )
    .unwrap();
    let shapes = shapes(&tree);
    assert_eq!(shapes.len(), 3);
    assert_eq!(shapes[0].fill.paint, Paint::Color(Color::rgba8(255, 0, 0, 255)));
    assert_eq!(shapes[1].fill.paint, Paint::Color(Color::rgba8(0, 0, 255, 255)));
    assert_eq!(shapes[2].fill.paint, Paint::None);
    assert_eq!(shapes[0].transform, Transform::new(2.0, 0.0, 0.0, 2.0, 10.0, 10.0));
    let texts = texts(&tree);
    assert_eq!(texts[0].text, "caption");
    assert_eq!(texts[0].transform, Transform::scaling(2.0, 2.0));
}

#[test]
fn test_layout_svg_rejects_empty_markup() {
    assert!(matches!(layout_svg(""), Err(VellumError::Markup(_))));
}

#[test]
fn test_serialized_layout_shape() {
    let tree = layout_default(make_svg(
        50.0,
        50.0,
        vec![make_group(vec![make_rect("0", "0", "5", "5")]), make_text("t", "0", "0")],
    ));
    let json = to_json(&tree).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["width"], 50.0);
    assert_eq!(value["root"][0]["type"], "group");
    assert_eq!(value["root"][0]["children"][0]["type"], "shape");
    assert_eq!(value["root"][0]["children"][0]["fill"]["paint"]["type"], "color");
    assert_eq!(value["root"][1]["type"], "text");
    assert_eq!(value["root"][1]["fontFamily"], "sans-serif");
}

#[test]
fn test_malformed_values_degrade() {
    let tree = layout_default(make_svg(
        100.0,
        100.0,
        vec![
            make_rect("oops", "1", "10", "10").with(PropertyId::Transform, "matrix(1 2"),
            Element::new(ElementKind::Path).with(PropertyId::D, "M 0 0 L 10 10 L bogus"),
            Element::new(ElementKind::Circle).with(PropertyId::R, "-4"),
        ],
    ));
    let shapes = shapes(&tree);
    assert_eq!(shapes.len(), 2);
    assert!(shapes[0].transform.is_identity());
    assert_eq!(
        shapes[0].path.bounding_box(),
        Some(Rect::new(0.0, 1.0, 10.0, 10.0))
    );
    assert_eq!(
        shapes[1].path.commands(),
        &[PathCommand::MoveTo(0.0, 0.0), PathCommand::LineTo(10.0, 10.0)]
    );
}
