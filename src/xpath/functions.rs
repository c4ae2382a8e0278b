//! The XPath 1.0 core function library (§4.8).

use crate::tree::node::NodeData;
use crate::tree::qname;
use crate::tree::{Tree, XML_NS_URI};
use crate::xpath::error::EvalError;
use crate::xpath::eval::Context;
use crate::xpath::value::{parse_xpath_number, Value};

fn check_argc(name: &str, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(EvalError::ArgumentCount { function: name.to_string(), expected: expected.to_string(), found: args.len() });
    }
    Ok(())
}

fn check_argc_range(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvalError> {
    if args.len() < min || args.len() > max {
        return Err(EvalError::ArgumentCount {
            function: name.to_string(),
            expected: format!("{min}-{max}"),
            found: args.len(),
        });
    }
    Ok(())
}

fn nodeset_arg<'a>(name: &str, args: &'a [Value], idx: usize) -> Result<&'a [crate::tree::NodeId], EvalError> {
    match &args[idx] {
        Value::NodeSet(ns) => Ok(ns),
        _ => Err(EvalError::TypeError(format!("{name}() requires a node-set argument"))),
    }
}

/// Ties round toward positive infinity (§4.8 `round`, `substring`): `floor(n + 0.5)`, with
/// non-finite inputs passed through unchanged.
pub fn round_half_up(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}

pub fn call(tree: &Tree, ctx: &Context, name: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    match name {
        "last" => {
            check_argc(name, &args, 0)?;
            Ok(Value::Number(ctx.size as f64))
        }
        "position" => {
            check_argc(name, &args, 0)?;
            Ok(Value::Number(ctx.position as f64))
        }
        "count" => {
            check_argc(name, &args, 1)?;
            Ok(Value::Number(nodeset_arg(name, &args, 0)?.len() as f64))
        }
        "local-name" => {
            check_argc_range(name, &args, 0, 1)?;
            let node = optional_node_arg(&args, ctx)?;
            Ok(Value::String(node.and_then(|n| qname::expand(tree.arena(), n)).map(|e| e.local).unwrap_or_default()))
        }
        "namespace-uri" => {
            check_argc_range(name, &args, 0, 1)?;
            let node = optional_node_arg(&args, ctx)?;
            Ok(Value::String(
                node.and_then(|n| qname::expand(tree.arena(), n)).and_then(|e| e.uri).unwrap_or_default(),
            ))
        }
        "name" => {
            check_argc_range(name, &args, 0, 1)?;
            let node = optional_node_arg(&args, ctx)?;
            let qualified = node.and_then(|n| match tree.data(n) {
                NodeData::Element(e) => Some(e.name.qualified.clone()),
                NodeData::Attribute(a) => Some(a.name.qualified.clone()),
                NodeData::Namespace(ns) => Some(ns.prefix.clone()),
                NodeData::ProcessingInstruction(p) => Some(p.target.clone()),
                _ => None,
            });
            Ok(Value::String(qualified.unwrap_or_default()))
        }
        "boolean" => {
            check_argc(name, &args, 1)?;
            Ok(Value::Boolean(args[0].to_boolean()))
        }
        "not" => {
            check_argc(name, &args, 1)?;
            Ok(Value::Boolean(!args[0].to_boolean()))
        }
        "true" => {
            check_argc(name, &args, 0)?;
            Ok(Value::Boolean(true))
        }
        "false" => {
            check_argc(name, &args, 0)?;
            Ok(Value::Boolean(false))
        }
        "lang" => {
            check_argc(name, &args, 1)?;
            let wanted = args[0].to_string_value(tree).to_lowercase();
            let mut cur = Some(ctx.node);
            while let Some(node) = cur {
                if let NodeData::Element(e) = tree.data(node) {
                    if let Some(attr_id) = e.attribute_by_qualified(tree.arena(), "xml:lang") {
                        if let NodeData::Attribute(a) = tree.data(attr_id) {
                            let value = a.value.to_lowercase();
                            return Ok(Value::Boolean(value == wanted || value.starts_with(&format!("{wanted}-"))));
                        }
                    }
                    if let Some(expanded_attr) = e
                        .attributes
                        .iter()
                        .find(|&&a| qname::expand(tree.arena(), a).is_some_and(|exp| exp.uri.as_deref() == Some(XML_NS_URI) && exp.local == "lang"))
                    {
                        if let NodeData::Attribute(a) = tree.data(*expanded_attr) {
                            let value = a.value.to_lowercase();
                            return Ok(Value::Boolean(value == wanted || value.starts_with(&format!("{wanted}-"))));
                        }
                    }
                }
                cur = tree.parent(node);
            }
            Ok(Value::Boolean(false))
        }
        "number" => {
            check_argc_range(name, &args, 0, 1)?;
            let v = args.into_iter().next().unwrap_or_else(|| Value::NodeSet(vec![ctx.node]));
            Ok(Value::Number(v.to_number(tree)))
        }
        "sum" => {
            check_argc(name, &args, 1)?;
            let ns = nodeset_arg(name, &args, 0)?;
            Ok(Value::Number(ns.iter().map(|&n| parse_xpath_number(&tree.string_value(n))).sum()))
        }
        "floor" => {
            check_argc(name, &args, 1)?;
            Ok(Value::Number(args[0].to_number(tree).floor()))
        }
        "ceiling" => {
            check_argc(name, &args, 1)?;
            Ok(Value::Number(args[0].to_number(tree).ceil()))
        }
        "round" => {
            check_argc(name, &args, 1)?;
            Ok(Value::Number(round_half_up(args[0].to_number(tree))))
        }
        "string" => {
            check_argc_range(name, &args, 0, 1)?;
            let v = args.into_iter().next().unwrap_or_else(|| Value::NodeSet(vec![ctx.node]));
            Ok(Value::String(v.to_string_value(tree)))
        }
        "concat" => {
            if args.len() < 2 {
                return Err(EvalError::ArgumentCount { function: name.to_string(), expected: "2+".to_string(), found: args.len() });
            }
            Ok(Value::String(args.iter().map(|a| a.to_string_value(tree)).collect()))
        }
        "starts-with" => {
            check_argc(name, &args, 2)?;
            Ok(Value::Boolean(args[0].to_string_value(tree).starts_with(&args[1].to_string_value(tree))))
        }
        "contains" => {
            check_argc(name, &args, 2)?;
            Ok(Value::Boolean(args[0].to_string_value(tree).contains(&args[1].to_string_value(tree))))
        }
        "substring-before" => {
            check_argc(name, &args, 2)?;
            let haystack = args[0].to_string_value(tree);
            let needle = args[1].to_string_value(tree);
            Ok(Value::String(haystack.find(&needle).map(|i| haystack[..i].to_string()).unwrap_or_default()))
        }
        "substring-after" => {
            check_argc(name, &args, 2)?;
            let haystack = args[0].to_string_value(tree);
            let needle = args[1].to_string_value(tree);
            Ok(Value::String(
                haystack.find(&needle).map(|i| haystack[i + needle.len()..].to_string()).unwrap_or_default(),
            ))
        }
        "substring" => {
            check_argc_range(name, &args, 2, 3)?;
            let s = args[0].to_string_value(tree);
            let chars: Vec<char> = s.chars().collect();
            let n = chars.len() as f64;
            let first = round_half_up(args[1].to_number(tree));
            let last = if args.len() == 3 {
                first + round_half_up(args[2].to_number(tree))
            } else {
                f64::INFINITY
            };
            if first.is_nan() {
                return Ok(Value::String(String::new()));
            }
            let lo = first.max(1.0);
            let hi = last.min(n + 1.0);
            if hi <= lo {
                return Ok(Value::String(String::new()));
            }
            let lo = lo as usize;
            let hi = hi as usize;
            Ok(Value::String(chars[(lo - 1)..(hi - 1)].iter().collect()))
        }
        "string-length" => {
            check_argc_range(name, &args, 0, 1)?;
            let v = args.into_iter().next().unwrap_or_else(|| Value::NodeSet(vec![ctx.node]));
            Ok(Value::Number(v.to_string_value(tree).chars().count() as f64))
        }
        "normalize-space" => {
            check_argc_range(name, &args, 0, 1)?;
            let v = args.into_iter().next().unwrap_or_else(|| Value::NodeSet(vec![ctx.node]));
            let s = v.to_string_value(tree);
            Ok(Value::String(s.split_whitespace().collect::<Vec<_>>().join(" ")))
        }
        "translate" => {
            check_argc(name, &args, 3)?;
            let s = args[0].to_string_value(tree);
            let from: Vec<char> = args[1].to_string_value(tree).chars().collect();
            let to: Vec<char> = args[2].to_string_value(tree).chars().collect();
            let mut map = std::collections::HashMap::new();
            for (i, &c) in from.iter().enumerate() {
                map.entry(c).or_insert_with(|| to.get(i).copied());
            }
            Ok(Value::String(
                s.chars().filter_map(|c| match map.get(&c) {
                    Some(Some(replacement)) => Some(*replacement),
                    Some(None) => None,
                    None => Some(c),
                }).collect(),
            ))
        }
        other => Err(EvalError::UnknownFunction(other.to_string())),
    }
}

fn optional_node_arg(args: &[Value], ctx: &Context) -> Result<Option<crate::tree::NodeId>, EvalError> {
    if args.is_empty() {
        Ok(Some(ctx.node))
    } else {
        match &args[0] {
            Value::NodeSet(ns) => Ok(ns.first().copied()),
            _ => Err(EvalError::TypeError("expected a node-set argument".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(2.4, 2.0)]
    #[case(2.5, 3.0)]
    #[case(-2.5, -2.0)]
    #[case(-2.6, -3.0)]
    fn round_half_up_ties_toward_positive_infinity(#[case] n: f64, #[case] expected: f64) {
        assert_eq!(round_half_up(n), expected);
    }

    #[test]
    fn round_half_up_passes_non_finite_through() {
        assert!(round_half_up(f64::NAN).is_nan());
        assert_eq!(round_half_up(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn wrong_argument_count_is_an_eval_error() {
        let tree = Tree::new("Document");
        let ctx = Context { node: tree.root(), position: 1, size: 1 };
        let err = call(&tree, &ctx, "not", vec![]).unwrap_err();
        assert!(matches!(err, EvalError::ArgumentCount { .. }));
    }

    #[test]
    fn unknown_function_is_reported_by_name() {
        let tree = Tree::new("Document");
        let ctx = Context { node: tree.root(), position: 1, size: 1 };
        let err = call(&tree, &ctx, "frobnicate", vec![]).unwrap_err();
        assert!(matches!(err, EvalError::UnknownFunction(name) if name == "frobnicate"));
    }
}
