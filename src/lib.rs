//! A non-validating XML/HTML parser paired with an XPath 1.0 evaluator (spec §1).
//!
//! [`parse`] turns a markup string into a [`Tree`]; [`query`]/[`query_one`]/[`query_all`]
//! evaluate an XPath 1.0 query string against a tree without copying any node data.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod position;
pub mod token;
pub mod tree;
pub mod xpath;

pub use error::Error;
pub use parser::Config;
pub use tree::node::Mode;
pub use tree::{NodeId, Tree};
pub use xpath::Value;

/// Parses `markup` under `mode`, using `config` (or its documented defaults when `None`).
pub fn parse(markup: &str, mode: Mode, config: Option<Config>) -> Result<Tree, Error> {
    Ok(parser::parse(markup, mode, config)?)
}

/// Evaluates an XPath 1.0 query against `root` within `tree` (§6.1).
pub fn query(tree: &Tree, root: NodeId, query_string: &str) -> Result<Value, Error> {
    Ok(xpath::query(tree, root, query_string)?)
}

/// The first node (in document order) of a node-set result, or the scalar unchanged (§B.4).
pub fn query_one(tree: &Tree, root: NodeId, query_string: &str) -> Result<Value, Error> {
    Ok(xpath::query_one(tree, root, query_string)?)
}

/// The full result as a sequence of single-value items (§B.4).
pub fn query_all(tree: &Tree, root: NodeId, query_string: &str) -> Result<Vec<Value>, Error> {
    Ok(xpath::query_all(tree, root, query_string)?)
}
