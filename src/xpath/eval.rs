//! The expression evaluator (§4.6): a direct-recursive tree-walker carrying an explicit
//! [`Context`] value rather than literal push/pop data and context stacks — the same semantics,
//! expressed the way a tree-walking interpreter is naturally written in Rust.

use crate::tree::{NodeId, Tree};
use crate::xpath::ast::{BinaryOp, Expr, PathSpec, Step, UnaryOp};
use crate::xpath::axes::{candidates, is_reverse_axis, matches_test};
use crate::xpath::error::EvalError;
use crate::xpath::functions;
use crate::xpath::value::{compare, Value};

#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub node: NodeId,
    pub position: usize,
    pub size: usize,
}

pub struct Evaluator<'a> {
    pub tree: &'a Tree,
}

impl<'a> Evaluator<'a> {
    pub fn new(tree: &'a Tree) -> Self {
        Evaluator { tree }
    }

    pub fn eval(&self, expr: &Expr, ctx: &Context) -> Result<Value, EvalError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Literal(s) => Ok(Value::String(s.clone())),
            Expr::Call(name, arg_exprs) => {
                let mut args = Vec::with_capacity(arg_exprs.len());
                for a in arg_exprs {
                    args.push(self.eval(a, ctx)?);
                }
                functions::call(self.tree, ctx, name, args)
            }
            Expr::Unary(UnaryOp::Neg, inner) => Ok(Value::Number(-self.eval(inner, ctx)?.to_number(self.tree))),
            Expr::Unary(UnaryOp::Plus, inner) => Ok(Value::Number(self.eval(inner, ctx)?.to_number(self.tree))),
            Expr::Binary(op, lhs, rhs) => self.eval_binary(*op, lhs, rhs, ctx),
            Expr::Union(lhs, rhs) => {
                let l = self.eval(lhs, ctx)?;
                let r = self.eval(rhs, ctx)?;
                match (l, r) {
                    (Value::NodeSet(mut a), Value::NodeSet(b)) => {
                        a.extend(b);
                        Ok(Value::NodeSet(sort_dedup_doc_order(self.tree, a)))
                    }
                    _ => Err(EvalError::UnionOfNonNodeSets),
                }
            }
            Expr::Predicate(base, preds) => {
                let base_val = self.eval(base, ctx)?;
                let nodes = match base_val {
                    Value::NodeSet(ns) => ns,
                    _ => return Err(EvalError::PredicateNonNodeSet),
                };
                self.apply_predicates(nodes, preds, false)
            }
            Expr::Path(steps) => {
                let start = if steps.first().is_some_and(|s| s.path_spec != PathSpec::Nil) {
                    vec![self.tree.root()]
                } else {
                    vec![ctx.node]
                };
                let result = self.eval_steps(start, steps)?;
                Ok(Value::NodeSet(result))
            }
            Expr::FilteredPath(base, steps) => {
                let base_val = self.eval(base, ctx)?;
                let nodes = match base_val {
                    Value::NodeSet(ns) => ns,
                    _ => return Err(EvalError::PredicateNonNodeSet),
                };
                let result = self.eval_steps(nodes, steps)?;
                Ok(Value::NodeSet(result))
            }
        }
    }

    fn eval_binary(&self, op: BinaryOp, lhs: &Expr, rhs: &Expr, ctx: &Context) -> Result<Value, EvalError> {
        match op {
            BinaryOp::Or => {
                let l = self.eval(lhs, ctx)?;
                if l.to_boolean() {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.eval(rhs, ctx)?.to_boolean()))
            }
            BinaryOp::And => {
                let l = self.eval(lhs, ctx)?;
                if !l.to_boolean() {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.eval(rhs, ctx)?.to_boolean()))
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let l = self.eval(lhs, ctx)?;
                let r = self.eval(rhs, ctx)?;
                Ok(Value::Boolean(compare(self.tree, op, &l, &r)))
            }
            BinaryOp::Add => Ok(Value::Number(self.eval(lhs, ctx)?.to_number(self.tree) + self.eval(rhs, ctx)?.to_number(self.tree))),
            BinaryOp::Sub => Ok(Value::Number(self.eval(lhs, ctx)?.to_number(self.tree) - self.eval(rhs, ctx)?.to_number(self.tree))),
            BinaryOp::Mul => Ok(Value::Number(self.eval(lhs, ctx)?.to_number(self.tree) * self.eval(rhs, ctx)?.to_number(self.tree))),
            BinaryOp::Div => Ok(Value::Number(self.eval(lhs, ctx)?.to_number(self.tree) / self.eval(rhs, ctx)?.to_number(self.tree))),
            BinaryOp::Mod => {
                let l = self.eval(lhs, ctx)?.to_number(self.tree);
                let r = self.eval(rhs, ctx)?.to_number(self.tree);
                Ok(Value::Number(l % r))
            }
        }
    }

    /// Runs a whole path (sequence of steps) from a starting node-set, re-partitioning by
    /// input node at every step so each step's predicates see the right per-node context.
    fn eval_steps(&self, inputs: Vec<NodeId>, steps: &[Step]) -> Result<Vec<NodeId>, EvalError> {
        let mut current = inputs;
        for step in steps {
            let mut collected = Vec::new();
            for &input in &current {
                let origin = if step.path_spec == PathSpec::Double {
                    candidates(self.tree, crate::xpath::ast::Axis::DescendantOrSelf, input)
                } else {
                    vec![input]
                };
                for node in origin {
                    let raw = candidates(self.tree, step.axis, node);
                    let matched: Vec<NodeId> = raw.into_iter().filter(|&n| matches_test(self.tree, step.axis, n, &step.test)).collect();
                    let filtered = self.apply_predicate_exprs(matched, &step.axis, &step.predicates)?;
                    collected.extend(filtered);
                }
            }
            current = sort_dedup_doc_order(self.tree, collected);
        }
        Ok(current)
    }

    fn apply_predicate_exprs(
        &self,
        nodes: Vec<NodeId>,
        axis: &crate::xpath::ast::Axis,
        predicates: &[Expr],
    ) -> Result<Vec<NodeId>, EvalError> {
        let reverse = is_reverse_axis(*axis);
        let mut nodes = nodes;
        for pred in predicates {
            let size = nodes.len();
            let mut kept = Vec::new();
            for (i, &node) in nodes.iter().enumerate() {
                let position = if reverse { size - i } else { i + 1 };
                let ctx = Context { node, position, size };
                let val = self.eval(pred, &ctx)?;
                let keep = match val {
                    Value::Number(n) => n == position as f64,
                    other => other.to_boolean(),
                };
                if keep {
                    kept.push(node);
                }
            }
            nodes = kept;
        }
        Ok(nodes)
    }

    /// `(...)`-predicate form applied to an already-evaluated node-set (§4.6 filter expression):
    /// position always counts forward regardless of how the base set was produced.
    fn apply_predicates(&self, nodes: Vec<NodeId>, predicates: &[Expr], _reverse: bool) -> Result<Value, EvalError> {
        let mut nodes = nodes;
        for pred in predicates {
            let size = nodes.len();
            let mut kept = Vec::new();
            for (i, &node) in nodes.iter().enumerate() {
                let ctx = Context { node, position: i + 1, size };
                let val = self.eval(pred, &ctx)?;
                let keep = match val {
                    Value::Number(n) => n == (i + 1) as f64,
                    other => other.to_boolean(),
                };
                if keep {
                    kept.push(node);
                }
            }
            nodes = kept;
        }
        Ok(Value::NodeSet(nodes))
    }
}

pub fn sort_dedup_doc_order(tree: &Tree, mut nodes: Vec<NodeId>) -> Vec<NodeId> {
    nodes.sort_by_key(|&n| tree.document_order(n));
    nodes.dedup();
    nodes
}
