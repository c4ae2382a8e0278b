//! The XPath 1.0 engine: query lexer, query parser, AST, and tree-walking evaluator (§4).

pub mod ast;
pub mod axes;
pub mod error;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

use crate::tree::{NodeId, Tree};
use error::QueryError;
use eval::{Context, Evaluator};
use log::debug;
pub use value::Value;

/// Evaluates `query_string` against `root`, returning a scalar or a node-set in document order
/// (§6.1, §8.1 "a returned node-set is free of duplicates and sorted into document order").
pub fn query(tree: &Tree, root: NodeId, query_string: &str) -> Result<Value, QueryError> {
    let ast = parser::parse(query_string)?;
    debug!("query {query_string:?} parsed to {ast:?}");
    let ctx = Context { node: root, position: 1, size: 1 };
    let evaluator = Evaluator::new(tree);
    let value = evaluator.eval(&ast, &ctx)?;
    match value {
        Value::NodeSet(ns) => Ok(Value::NodeSet(eval::sort_dedup_doc_order(tree, ns))),
        other => Ok(other),
    }
}

/// A pure wrapper over [`query`]: the first node in document order for a `NodeSet`, or the
/// scalar unchanged — there is no "node" to extract from a scalar (§B.4).
pub fn query_one(tree: &Tree, root: NodeId, query_string: &str) -> Result<Value, QueryError> {
    match query(tree, root, query_string)? {
        Value::NodeSet(ns) => Ok(Value::NodeSet(ns.into_iter().take(1).collect())),
        other => Ok(other),
    }
}

/// A pure wrapper over [`query`]: the full node-set in document order, or a single-element
/// sequence wrapping a scalar (§B.4).
pub fn query_all(tree: &Tree, root: NodeId, query_string: &str) -> Result<Vec<Value>, QueryError> {
    match query(tree, root, query_string)? {
        Value::NodeSet(ns) => Ok(ns.into_iter().map(|n| Value::NodeSet(vec![n])).collect()),
        other => Ok(vec![other]),
    }
}
