// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Print a tree as XML-like tags.
//!
//! ```bash
//! RUST_LOG=tugwalk=trace cargo run -p tugwalk --example xml_printer
//! ```

use tracing_subscriber::EnvFilter;
use tugwalk::{visitor, Accept, Visitable, WalkError, WalkOptions, Walker};

#[derive(Visitable)]
struct Element {
    name: String,
    #[child]
    children: Vec<Element>,
    #[child]
    attributes: Attributes,
}

/// Never printed.
#[derive(Default, Visitable)]
struct Attributes;

impl Element {
    fn new(name: &str, children: Vec<Element>) -> Self {
        Element {
            name: name.to_string(),
            children,
            attributes: Attributes,
        }
    }
}

#[derive(Default)]
struct XmlPrinter {
    out: String,
}

#[visitor]
impl XmlPrinter {
    #[prefix]
    fn open(&mut self, node: &Element) {
        if node.children.is_empty() {
            self.out.push_str(&format!("<{}/>", node.name));
        } else {
            self.out.push_str(&format!("<{}>", node.name));
        }
    }

    #[infix]
    fn between(&mut self, _node: &Element) {}

    #[suffix]
    fn close(&mut self, node: &Element) {
        if !node.children.is_empty() {
            self.out.push_str(&format!("</{}>", node.name));
        }
    }

    #[traverse(prefix, infix, suffix)]
    fn skip(&mut self, _node: &Attributes) {}
}

fn main() -> Result<(), WalkError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let root = Element::new(
        "A",
        vec![
            Element::new("B", vec![Element::new("C", vec![]), Element::new("D", vec![])]),
            Element::new("E", vec![]),
            Element::new("F", vec![Element::new("G", vec![])]),
            Element::new("H", vec![]),
        ],
    );

    let mut printer = XmlPrinter::default();
    root.accept(&mut printer)?;
    println!("{}", printer.out);

    // The same walk, bounded by TUGWALK_MAX_DEPTH if it is set.
    let mut printer = XmlPrinter::default();
    Walker::new(WalkOptions::from_env()).walk(&root, &mut printer)?;
    println!("{}", printer.out);

    Ok(())
}
