//! The four XPath 1.0 value kinds and their coercion/comparison rules (§4.5).

use crate::tree::{NodeId, Tree};
use crate::xpath::ast::BinaryOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    NodeSet(Vec<NodeId>),
}

impl Value {
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::NodeSet(ns) => !ns.is_empty(),
        }
    }

    pub fn to_number(&self, tree: &Tree) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::String(s) => parse_xpath_number(s),
            Value::NodeSet(ns) => parse_xpath_number(&first_string_value(tree, ns)),
        }
    }

    pub fn to_string_value(&self, tree: &Tree) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_xpath_number(*n),
            Value::NodeSet(ns) => first_string_value(tree, ns),
        }
    }
}

fn first_string_value(tree: &Tree, nodes: &[NodeId]) -> String {
    nodes.first().map(|&n| tree.string_value(n)).unwrap_or_default()
}

/// §4.5: leading/trailing whitespace tolerated, anything else unparsable yields `NaN`.
pub fn parse_xpath_number(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// §4.5: integral values print without a fractional part; special values use their XPath spellings.
pub fn format_xpath_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// The full §4.5 comparison matrix for `=`, `!=`, `<`, `<=`, `>`, `>=`.
pub fn compare(tree: &Tree, op: BinaryOp, lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::NodeSet(a), Value::NodeSet(b)) => a
            .iter()
            .any(|&n1| b.iter().any(|&n2| compare_strings(op, &tree.string_value(n1), &tree.string_value(n2)))),
        (Value::NodeSet(ns), other) => ns.iter().any(|&n| compare_nodeset_member(tree, op, n, other)),
        (other, Value::NodeSet(ns)) => ns.iter().any(|&n| compare_nodeset_member(tree, flip(op), n, other)),
        _ => compare_primitives(tree, op, lhs, rhs),
    }
}

fn flip(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::Le => BinaryOp::Ge,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::Ge => BinaryOp::Le,
        other => other,
    }
}

fn compare_nodeset_member(tree: &Tree, op: BinaryOp, node: NodeId, other: &Value) -> bool {
    let node_str = tree.string_value(node);
    match other {
        Value::Number(n) => compare_numbers(op, parse_xpath_number(&node_str), *n),
        Value::Boolean(_) => compare_booleans(op, Value::String(node_str).to_boolean(), other.to_boolean()),
        Value::String(s) => compare_strings(op, &node_str, s),
        Value::NodeSet(_) => unreachable!("handled by the NodeSet/NodeSet arm"),
    }
}

fn compare_primitives(tree: &Tree, op: BinaryOp, lhs: &Value, rhs: &Value) -> bool {
    if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
        if matches!(lhs, Value::Boolean(_)) || matches!(rhs, Value::Boolean(_)) {
            return compare_booleans(op, lhs.to_boolean(), rhs.to_boolean());
        }
        if matches!(lhs, Value::Number(_)) || matches!(rhs, Value::Number(_)) {
            return compare_numbers(op, lhs.to_number(tree), rhs.to_number(tree));
        }
        return compare_strings(op, &lhs.to_string_value(tree), &rhs.to_string_value(tree));
    }
    compare_numbers(op, lhs.to_number(tree), rhs.to_number(tree))
}

fn compare_numbers(op: BinaryOp, a: f64, b: f64) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::Ge => a >= b,
        _ => unreachable!("not a comparison operator"),
    }
}

fn compare_strings(op: BinaryOp, a: &str, b: &str) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        _ => compare_numbers(op, parse_xpath_number(a), parse_xpath_number(b)),
    }
}

fn compare_booleans(op: BinaryOp, a: bool, b: bool) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Ne => a != b,
        _ => compare_numbers(op, a as i32 as f64, b as i32 as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dummy_tree() -> Tree {
        Tree::new("Document")
    }

    #[rstest]
    #[case(0.0, "0")]
    #[case(-0.0, "0")]
    #[case(42.0, "42")]
    #[case(-3.0, "-3")]
    #[case(1.5, "1.5")]
    #[case(f64::NAN, "NaN")]
    #[case(f64::INFINITY, "Infinity")]
    #[case(f64::NEG_INFINITY, "-Infinity")]
    fn number_formatting_matches_xpath_spellings(#[case] n: f64, #[case] expected: &str) {
        assert_eq!(format_xpath_number(n), expected);
    }

    #[test]
    fn number_parsing_of_garbage_is_nan() {
        assert!(parse_xpath_number("not a number").is_nan());
        assert_eq!(parse_xpath_number("  12.5  "), 12.5);
    }

    #[test]
    fn boolean_beats_number_beats_string_for_equality() {
        let tree = dummy_tree();
        assert!(compare(&tree, BinaryOp::Eq, &Value::Boolean(true), &Value::Number(0.0)));
        assert!(compare(&tree, BinaryOp::Eq, &Value::Number(1.0), &Value::String("1".to_string())));
        assert!(compare(&tree, BinaryOp::Eq, &Value::Number(1.0), &Value::String("1.0".to_string())));
    }

    #[test]
    fn ordering_comparisons_are_always_numeric() {
        let tree = dummy_tree();
        assert!(compare(&tree, BinaryOp::Lt, &Value::String("2".to_string()), &Value::String("10".to_string())));
    }
}
