//! # Vellum CLI
//!
//! Usage:
//!   vellum input.svg -o layout.json
//!   vellum input.json --width 640 --height 480
//!   echo '<svg>...</svg>' | vellum
//!   vellum --example > badge.json
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::env;
use std::fs;
use std::io::{self, Read};

use tracing_subscriber::EnvFilter;
use vellum::{LayoutOptions, VellumError};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), VellumError> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_document_json());
        return Ok(());
    }

    let input_path = args.get(1).filter(|a| !a.starts_with('-'));
    let input = match input_path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let options = options_from_args(&args);
    let is_json = match input_path {
        Some(path) => path.ends_with(".json"),
        None => input.trim_start().starts_with('{'),
    };
    let tree = if is_json {
        vellum::layout_json_with(&input, &options)?
    } else {
        vellum::layout_svg_with(&input, &options)?
    };
    let json = vellum::to_json(&tree)?;

    match flag_value(&args, "-o") {
        Some(output_path) => {
            fs::write(output_path, &json)?;
            eprintln!(
                "✓ Written {} primitives to {}",
                tree.primitives().len(),
                output_path
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

/// `--width`/`--height` request an output size; one alone keeps the default
/// for the other.
fn options_from_args(args: &[String]) -> LayoutOptions {
    let width = flag_value(args, "--width").and_then(|v| v.parse::<f64>().ok());
    let height = flag_value(args, "--height").and_then(|v| v.parse::<f64>().ok());
    let options = LayoutOptions::default();
    match (width, height) {
        (None, None) => options,
        (w, h) => options.with_viewport(w.unwrap_or(300.0), h.unwrap_or(150.0)),
    }
}

fn example_document_json() -> &'static str {
    r##"{
  "root": {
    "kind": "svg",
    "properties": { "width": "240", "height": "80", "viewBox": "0 0 120 40" },
    "children": [
      {
        "type": "element",
        "kind": "defs",
        "children": [
          {
            "type": "element",
            "kind": "symbol",
            "properties": { "id": "dot", "viewBox": "0 0 10 10" },
            "children": [
              { "type": "element", "kind": "circle", "properties": { "cx": "5", "cy": "5", "r": "5" } }
            ]
          }
        ]
      },
      {
        "type": "element",
        "kind": "rect",
        "properties": {
          "width": "100%", "height": "100%", "ry": "6",
          "fill": "#1e1e2e", "stroke": "#89b4fa", "stroke-width": "1"
        }
      },
      {
        "type": "element",
        "kind": "g",
        "properties": { "fill": "#a6e3a1", "transform": "translate(8 15)" },
        "children": [
          {
            "type": "element",
            "kind": "use",
            "properties": { "href": "#dot", "width": "10", "height": "10" }
          }
        ]
      },
      {
        "type": "element",
        "kind": "text",
        "properties": { "x": "24", "y": "25", "font-size": "12", "fill": "white" },
        "children": [ { "type": "text", "content": "build passing" } ]
      }
    ]
  }
}"##
}
