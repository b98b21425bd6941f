// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! End-to-end walks over the sample trees with `#[visitor]` visitors.

mod support;

use support::init_tracing;
use support::trees::{
    assert_mirrors, sample_expr, sample_tree, Branch, Expr, Labeled, Marker, Twig,
};
use tugwalk::{
    visitor, Accept, Context, Node, Phase, RegistrationError, Visited, Visitor, WalkError,
};

// =============================================================================
// Visitors
// =============================================================================

/// Renders a bracketed outline of the tree.
#[derive(Default)]
struct PrettyPrinter {
    indent: String,
    out: String,
}

#[visitor]
impl PrettyPrinter {
    #[prefix]
    fn open(&mut self, node: &Branch) {
        self.out.push_str(&self.indent);
        self.out.push('<');
        self.out.push_str(&node.name);
        if !node.children.is_empty() {
            self.out.push('\n');
        }
        self.indent.push_str("  ");
    }

    #[infix]
    fn separate(&mut self, _node: &Branch) {
        self.out.push_str(",\n");
    }

    #[suffix]
    fn close(&mut self, node: &Branch) {
        self.indent.truncate(self.indent.len().saturating_sub(2));
        if !node.children.is_empty() {
            self.out.push('\n');
            self.out.push_str(&self.indent);
        }
        self.out.push('>');
    }

    #[traverse(prefix, infix, suffix)]
    fn skip(&mut self, _node: &Marker) {}
}

/// Records node names in visiting order and returns each node's depth.
#[derive(Default)]
struct PathVisitor {
    path: Vec<String>,
}

#[visitor(output = usize, mode = "prefix")]
impl PathVisitor {
    #[prefix]
    fn enter(&mut self, node: &Branch, cx: &Context<usize>) -> usize {
        self.path.push(node.name.clone());
        cx.parent_res().map_or(0, |depth| depth + 1)
    }

    #[prefix]
    fn skip(&self, _node: &Marker) {}
}

/// Declares no handlers at all.
struct IncompleteVisitor;

#[visitor]
impl IncompleteVisitor {}

/// Evaluates an expression bottom-up from the children's suffix results.
struct Evaluator;

#[visitor(output = i64, mode = suffix)]
impl Evaluator {
    #[suffix]
    fn eval(&self, node: &Expr, cx: &Context<i64>) -> Option<i64> {
        let visited = cx.visited_attrs()?;
        let value = |field: &str| {
            visited
                .get(field)
                .and_then(Visited::as_child)
                .and_then(|result| result.suffix)
        };

        match node {
            Expr::Num(n) => Some(*n),
            Expr::Neg(_) => value("0").map(|v| -v),
            Expr::Add { .. } => Some(value("left")? + value("right")?),
            Expr::Call { name, .. } => {
                let args = visited
                    .get("args")
                    .and_then(Visited::as_children)
                    .unwrap_or(&[]);
                let values = args.iter().filter_map(|result| result.suffix);
                match name.as_str() {
                    "sum" => Some(values.sum()),
                    "max" => values.max(),
                    _ => None,
                }
            }
        }
    }
}

/// Counts nodes by kind: additions first, then any other expression.
#[derive(Default)]
struct KindCounter {
    adds: usize,
    literals: usize,
    others: usize,
}

#[visitor(mode = prefix)]
impl KindCounter {
    #[prefix(kind = "Add")]
    fn add(&mut self, _node: &dyn Node) {
        self.adds += 1;
    }

    #[prefix(kind = "Literal")]
    fn literal(&mut self, _node: &dyn Node) {
        self.literals += 1;
    }

    #[prefix(kind = "Expr")]
    fn other(&mut self, _node: &dyn Node) {
        self.others += 1;
    }
}

/// Handles branches by type and everything else through a fallback.
#[derive(Default)]
struct Fallback {
    seen: Vec<&'static str>,
}

#[visitor(output = String)]
impl Fallback {
    #[traverse(prefix, suffix)]
    fn branch(&mut self, node: &Branch) -> String {
        node.name.clone()
    }

    #[traverse(prefix, infix, suffix)]
    fn anything(&mut self, node: &dyn Node, cx: &Context<String>) {
        if cx.phase() == Phase::Prefix {
            self.seen.push(node.type_name());
        }
    }
}

/// Records what each infix call on a branch was given.
#[derive(Default)]
struct InfixContexts {
    seen: Vec<(String, Option<String>, Option<String>)>,
}

#[visitor(output = String)]
impl InfixContexts {
    #[prefix]
    fn enter(&mut self, node: &Branch) -> String {
        node.name.clone()
    }

    #[infix]
    fn between(&mut self, node: &Branch, cx: &Context<String>) {
        self.seen.push((
            node.name.clone(),
            cx.parent_res().cloned(),
            cx.prefix_res().cloned(),
        ));
    }

    #[suffix]
    fn leave(&mut self, _node: &Branch) {}

    #[traverse(prefix, infix, suffix)]
    fn marker(&mut self, _node: &Marker) {}
}

/// Names labels and branches in visiting order.
#[derive(Default)]
struct Outline {
    names: Vec<String>,
}

#[visitor(mode = prefix)]
impl Outline {
    #[prefix]
    fn labeled(&mut self, node: &Labeled<Branch>) {
        self.names.push(node.label.to_string());
    }

    #[prefix]
    fn branch(&mut self, node: &Branch) {
        self.names.push(node.name.clone());
    }

    #[prefix]
    fn marker(&self, _node: &Marker) {}
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn test_prefix_path_visits_in_document_order() {
    init_tracing();
    let mut visitor = PathVisitor::default();
    let result = sample_tree().accept(&mut visitor).unwrap();

    assert_eq!(visitor.path, ["A", "B", "C", "D", "E", "F", "G", "H"]);
    assert_eq!(result.prefix, Some(0));
    assert_eq!(result.suffix, None);

    let children = result
        .visited
        .get("children")
        .and_then(Visited::as_children)
        .unwrap();
    assert_eq!(children[0].prefix, Some(1));
    let grandchildren = children[0]
        .visited
        .get("children")
        .and_then(Visited::as_children)
        .unwrap();
    assert_eq!(grandchildren[1].prefix, Some(2));
}

#[test]
fn test_pretty_printer_output() {
    init_tracing();
    let mut printer = PrettyPrinter::default();
    sample_tree().accept(&mut printer).unwrap();
    assert_eq!(
        printer.out,
        "<A\n  <B\n    <C>,\n    <D>\n  >,\n  <E>,\n  <F\n    <G>\n  >,\n  <H>\n>"
    );
    assert!(printer.indent.is_empty());
}

#[test]
fn test_pretty_printer_single_leaf() {
    let mut printer = PrettyPrinter::default();
    Branch::leaf("X").accept(&mut printer).unwrap();
    assert_eq!(printer.out, "<X>");
}

#[test]
fn test_incomplete_visitor_fails_on_root_prefix() {
    init_tracing();
    let err = sample_tree().accept(&mut IncompleteVisitor).unwrap_err();
    let dispatch = err.as_dispatch().unwrap();
    assert_eq!(dispatch.phase, Phase::Prefix);
    assert!(dispatch.node_type.ends_with("Branch"));
    assert!(dispatch.visitor.ends_with("IncompleteVisitor"));
    assert!(err
        .to_string()
        .starts_with("no suitable prefix handler found for node type"));
}

#[test]
fn test_missing_handler_deeper_in_tree() {
    #[derive(Default)]
    struct BranchesOnly;

    #[visitor(mode = prefix)]
    impl BranchesOnly {
        #[prefix]
        fn branch(&mut self, _node: &Branch) {}
    }

    let err = sample_tree().accept(&mut BranchesOnly).unwrap_err();
    match err {
        WalkError::Dispatch(err) => assert!(err.node_type.ends_with("Marker")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_infix_sees_parent_and_own_prefix_results() {
    // A(B(C, D), E): one infix on B between C and D, one on A between B and E.
    let tree = Branch::new(
        "A",
        vec![
            Branch::new("B", vec![Branch::leaf("C"), Branch::leaf("D")]),
            Branch::leaf("E"),
        ],
    );
    let mut visitor = InfixContexts::default();
    tree.accept(&mut visitor).unwrap();

    let some = |name: &str| Some(name.to_string());
    assert_eq!(
        visitor.seen,
        [
            ("B".to_string(), some("A"), some("B")),
            ("A".to_string(), None, some("A")),
        ]
    );
}

#[test]
fn test_aliased_duplicate_fails_walk_instead_of_panicking() {
    struct Aliased;

    #[visitor(mode = prefix)]
    impl Aliased {
        #[prefix]
        fn first(&mut self, _node: &Branch) {}

        #[prefix]
        fn second(&mut self, _node: &Twig) {}
    }

    let err = sample_tree().accept(&mut Aliased).unwrap_err();
    assert!(matches!(
        err.as_registration(),
        Some(RegistrationError::DuplicateHandler {
            phase: Phase::Prefix,
            existing: "first",
            handler: "second",
            ..
        })
    ));
    assert!(err.to_string().starts_with("duplicate prefix handler for"));
    assert!(Aliased::registry().is_err());
}

#[test]
fn test_generic_node_type() {
    let node = Labeled {
        label: "wrap",
        inner: Branch::new("X", vec![Branch::leaf("Y")]),
        extras: vec![Branch::leaf("Z")],
    };
    let mut outline = Outline::default();
    let result = node.accept(&mut outline).unwrap();
    assert_eq!(outline.names, ["wrap", "X", "Y", "Z"]);
    assert_mirrors(&node, &result);

    // Another instantiation is another node type.
    let other = Labeled {
        label: "expr",
        inner: Expr::Num(1),
        extras: Vec::new(),
    };
    let err = other.accept(&mut Outline::default()).unwrap_err();
    assert!(err.as_dispatch().unwrap().node_type.contains("Labeled"));
}

#[test]
fn test_result_shape_mirrors_tree() {
    let tree = sample_tree();
    let result = tree.accept(&mut PrettyPrinter::default()).unwrap();
    assert_mirrors(&tree, &result);

    let expr = sample_expr();
    let result = expr.accept(&mut Evaluator).unwrap();
    assert_mirrors(&expr, &result);
}

#[test]
fn test_walks_are_idempotent() {
    let tree = sample_tree();
    let first = tree.accept(&mut Fallback::default()).unwrap();
    let second = tree.accept(&mut Fallback::default()).unwrap();
    assert_eq!(first, second);

    let expr = sample_expr();
    assert_eq!(
        expr.accept(&mut Evaluator).unwrap(),
        expr.accept(&mut Evaluator).unwrap()
    );
}

#[test]
fn test_suffix_results_flow_up() {
    let result = sample_expr().accept(&mut Evaluator).unwrap();
    assert_eq!(result.prefix, None);
    assert_eq!(result.suffix, Some(3));

    let max = Expr::call("max", vec![Expr::Num(7), Expr::neg(Expr::Num(-9))]);
    assert_eq!(max.accept(&mut Evaluator).unwrap().suffix, Some(9));
}

#[test]
fn test_kind_handlers_follow_registration_order() {
    let mut counter = KindCounter::default();
    sample_expr().accept(&mut counter).unwrap();
    // sum(4, 2 + -3): one addition, three literals, the call and the negation
    assert_eq!(counter.adds, 1);
    assert_eq!(counter.literals, 3);
    assert_eq!(counter.others, 2);
}

#[test]
fn test_type_handler_before_fallback() {
    let mut fallback = Fallback::default();
    let result = sample_tree().accept(&mut fallback).unwrap();

    assert_eq!(result.prefix.as_deref(), Some("A"));
    assert_eq!(result.suffix.as_deref(), Some("A"));
    // Branch infix goes to the fallback, which returns nothing.
    assert_eq!(fallback.seen.len(), 8);
    assert!(fallback.seen.iter().all(|name| name.ends_with("Marker")));
}

#[test]
fn test_macro_registry_contents() {
    let registry = PrettyPrinter::registry().unwrap();
    assert_eq!(registry.mode(), None);
    assert_eq!(registry.len(), 6);
    let prefix: Vec<_> = registry
        .handlers(Phase::Prefix)
        .iter()
        .map(|entry| entry.name())
        .collect();
    assert_eq!(prefix, ["open", "skip"]);

    let registry = PathVisitor::registry().unwrap();
    assert_eq!(registry.mode(), Some(Phase::Prefix));
    assert!(!registry.serves(Phase::Suffix));
    assert_eq!(registry.len(), 2);

    assert!(IncompleteVisitor::registry().unwrap().is_empty());
}
