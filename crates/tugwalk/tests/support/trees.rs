//! Node types and sample trees.

use tugwalk::{Field, Node, TraversalResult, Visitable, Visited};

/// Carried by every [`Branch`] and never interesting to a visitor.
#[derive(Debug, Default, Visitable)]
pub struct Marker;

/// A named node with an ordered list of children.
#[derive(Debug, Visitable)]
#[visitable(kind = "Named")]
pub struct Branch {
    pub name: String,
    #[child]
    pub children: Vec<Branch>,
    #[child]
    pub ignored: Marker,
}

impl Branch {
    pub fn leaf(name: &str) -> Self {
        Branch::new(name, Vec::new())
    }

    pub fn new(name: &str, children: Vec<Branch>) -> Self {
        Branch {
            name: name.to_string(),
            children,
            ignored: Marker,
        }
    }
}

/// Another name for [`Branch`].
pub type Twig = Branch;

/// Any node type with a label attached.
#[derive(Debug, Visitable)]
pub struct Labeled<T> {
    pub label: &'static str,
    #[child]
    pub inner: T,
    #[child]
    pub extras: Vec<T>,
}

/// `A(B(C, D), E, F(G), H)`
pub fn sample_tree() -> Branch {
    Branch::new(
        "A",
        vec![
            Branch::new("B", vec![Branch::leaf("C"), Branch::leaf("D")]),
            Branch::leaf("E"),
            Branch::new("F", vec![Branch::leaf("G")]),
            Branch::leaf("H"),
        ],
    )
}

/// A small arithmetic tree.
#[derive(Debug, Visitable)]
#[visitable(kind = "Expr")]
pub enum Expr {
    #[visitable(kind = "Literal")]
    Num(i64),
    Neg(#[child] Box<Expr>),
    Add {
        #[child]
        left: Box<Expr>,
        #[child]
        right: Box<Expr>,
    },
    Call {
        name: String,
        #[child]
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn add(left: Expr, right: Expr) -> Self {
        Expr::Add {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn neg(inner: Expr) -> Self {
        Expr::Neg(Box::new(inner))
    }

    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: name.to_string(),
            args,
        }
    }
}

/// `sum(4, 2 + -3)`
pub fn sample_expr() -> Expr {
    Expr::call(
        "sum",
        vec![Expr::Num(4), Expr::add(Expr::Num(2), Expr::neg(Expr::Num(3)))],
    )
}

/// Assert that `result` has exactly the shape of `node`'s child-bearing
/// fields, recursively.
pub fn assert_mirrors<R>(node: &dyn Node, result: &TraversalResult<R>) {
    let mut expected_keys = Vec::new();
    for (name, field) in node.fields() {
        match field {
            Field::Scalar => assert!(!result.visited.contains(name), "scalar {name} visited"),
            Field::Child(child) => {
                expected_keys.push(name);
                let visited = result
                    .visited
                    .get(name)
                    .and_then(Visited::as_child)
                    .unwrap_or_else(|| panic!("missing child result for {name}"));
                assert_mirrors(child, visited);
            }
            Field::Children(children) if children.is_empty() => {
                assert!(!result.visited.contains(name), "empty {name} recorded");
            }
            Field::Children(children) => {
                expected_keys.push(name);
                let visited = result
                    .visited
                    .get(name)
                    .and_then(Visited::as_children)
                    .unwrap_or_else(|| panic!("missing children results for {name}"));
                assert_eq!(visited.len(), children.len());
                for (child, visited) in children.into_iter().zip(visited) {
                    assert_mirrors(child, visited);
                }
            }
        }
    }
    let keys: Vec<_> = result.visited.keys().collect();
    assert_eq!(keys, expected_keys, "visited keys of {}", node.type_name());
}
