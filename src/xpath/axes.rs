//! Axis candidate enumeration and node-test matching (§4.7).

use crate::tree::node::NodeData;
use crate::tree::qname;
use crate::tree::{NodeId, Tree};
use crate::xpath::ast::{Axis, KindTest, NodeTest};
use log::trace;

pub fn is_reverse_axis(axis: Axis) -> bool {
    matches!(axis, Axis::Ancestor | Axis::AncestorOrSelf | Axis::PrecedingSibling | Axis::Preceding | Axis::Parent)
}

pub fn is_attr_or_ns(tree: &Tree, node: NodeId) -> bool {
    matches!(tree.data(node), NodeData::Attribute(_) | NodeData::Namespace(_))
}

fn all_node_ids(tree: &Tree) -> Vec<NodeId> {
    (0..tree.arena().len() as u32).map(NodeId).collect()
}

/// Enumerates the axis's candidate nodes, in the order the axis defines (forward axes ascend
/// document order, reverse axes start from the node nearest the context) — §4.7's ordering
/// column, which governs `position()`/`last()` inside a step's predicates.
pub fn candidates(tree: &Tree, axis: Axis, context: NodeId) -> Vec<NodeId> {
    let result = candidates_for(tree, axis, context);
    trace!("axis {axis:?} from {context:?} yields {} candidate(s)", result.len());
    result
}

fn candidates_for(tree: &Tree, axis: Axis, context: NodeId) -> Vec<NodeId> {
    match axis {
        Axis::SelfAxis => vec![context],
        Axis::Parent => tree.parent(context).into_iter().collect(),
        Axis::Child => tree.children(context).to_vec(),
        Axis::Descendant => descendants(tree, context),
        Axis::DescendantOrSelf => {
            let mut v = vec![context];
            v.extend(descendants(tree, context));
            v
        }
        Axis::Ancestor => ancestors(tree, context),
        Axis::AncestorOrSelf => {
            let mut v = vec![context];
            v.extend(ancestors(tree, context));
            v
        }
        Axis::FollowingSibling => following_siblings(tree, context),
        Axis::PrecedingSibling => preceding_siblings(tree, context),
        Axis::Following => following(tree, context),
        Axis::Preceding => preceding(tree, context),
        Axis::Attribute => tree.attributes(context).to_vec(),
        Axis::Namespace => tree.in_scope_namespaces(context),
    }
}

fn descendants(tree: &Tree, context: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    collect_descendants(tree, context, &mut out);
    out
}

fn collect_descendants(tree: &Tree, node: NodeId, out: &mut Vec<NodeId>) {
    for &child in tree.children(node) {
        out.push(child);
        collect_descendants(tree, child, out);
    }
}

fn ancestors(tree: &Tree, context: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut cur = tree.parent(context);
    while let Some(node) = cur {
        out.push(node);
        cur = tree.parent(node);
    }
    out
}

fn following_siblings(tree: &Tree, context: NodeId) -> Vec<NodeId> {
    match tree.parent(context) {
        Some(parent) => tree.children(parent)[tree.index(context) + 1..].to_vec(),
        None => Vec::new(),
    }
}

fn preceding_siblings(tree: &Tree, context: NodeId) -> Vec<NodeId> {
    match tree.parent(context) {
        Some(parent) => {
            let mut v = tree.children(parent)[..tree.index(context)].to_vec();
            v.reverse();
            v
        }
        None => Vec::new(),
    }
}

/// All nodes after `context` in document order, excluding its own descendants and any
/// attribute/namespace node (§4.7, §8.2 axis laws).
fn following(tree: &Tree, context: NodeId) -> Vec<NodeId> {
    let order = tree.document_order(context);
    all_node_ids(tree)
        .into_iter()
        .filter(|&n| tree.document_order(n) > order && !tree.is_descendant_of(n, context) && !is_attr_or_ns(tree, n))
        .collect()
}

/// All nodes before `context` in document order, excluding its ancestors and any
/// attribute/namespace node, nearest node first.
fn preceding(tree: &Tree, context: NodeId) -> Vec<NodeId> {
    let order = tree.document_order(context);
    let mut out: Vec<NodeId> = all_node_ids(tree)
        .into_iter()
        .filter(|&n| tree.document_order(n) < order && !tree.is_descendant_of(context, n) && !is_attr_or_ns(tree, n))
        .collect();
    out.sort_by_key(|&n| std::cmp::Reverse(tree.document_order(n)));
    out
}

fn principal_node_kind_matches(tree: &Tree, axis: Axis, node: NodeId) -> bool {
    match axis {
        Axis::Attribute => matches!(tree.data(node), NodeData::Attribute(_)),
        Axis::Namespace => matches!(tree.data(node), NodeData::Namespace(_)),
        _ => matches!(tree.data(node), NodeData::Element(_)),
    }
}

fn qualified_name_of(tree: &Tree, node: NodeId) -> Option<String> {
    match tree.data(node) {
        NodeData::Element(e) => Some(e.name.qualified.clone()),
        NodeData::Attribute(a) => Some(a.name.qualified.clone()),
        NodeData::Namespace(n) => Some(n.prefix.clone()),
        _ => None,
    }
}

/// The element whose in-scope namespace bindings should resolve a prefix found in a node test
/// applied to `node` — `node` itself for an element, its owner element for an attribute/namespace.
fn namespace_scope_node(tree: &Tree, node: NodeId) -> NodeId {
    match tree.data(node) {
        NodeData::Element(_) => node,
        _ => tree.parent(node).unwrap_or(node),
    }
}

fn matches_kind(tree: &Tree, node: NodeId, kind: KindTest) -> bool {
    match kind {
        KindTest::Node => true,
        KindTest::Text => matches!(tree.data(node), NodeData::Text(_)),
        KindTest::Comment => matches!(tree.data(node), NodeData::Comment(_)),
    }
}

fn matches_name(tree: &Tree, node: NodeId, test: &NodeTest) -> bool {
    match test {
        NodeTest::Wildcard => true,
        NodeTest::PrefixWildcard(prefix) => {
            let expanded = qname::expand(tree.arena(), node);
            let scope = namespace_scope_node(tree, node);
            let resolved = tree.resolve_prefix(scope, prefix);
            match (expanded, resolved) {
                (Some(exp), Some(ns_id)) => match tree.data(ns_id) {
                    NodeData::Namespace(n) => exp.uri.as_deref() == Some(n.uri.as_str()),
                    _ => false,
                },
                _ => false,
            }
        }
        NodeTest::Name(raw) => qualified_name_of(tree, node).as_deref() == Some(raw.as_str()),
        NodeTest::PrefixLocal(prefix, local) => {
            let expanded = qname::expand(tree.arena(), node);
            let scope = namespace_scope_node(tree, node);
            let resolved = tree.resolve_prefix(scope, prefix);
            match (expanded, resolved) {
                (Some(exp), Some(ns_id)) => match tree.data(ns_id) {
                    NodeData::Namespace(n) => exp.uri.as_deref() == Some(n.uri.as_str()) && exp.local == *local,
                    _ => false,
                },
                _ => false,
            }
        }
        NodeTest::Kind(_) | NodeTest::ProcessingInstruction(_) => unreachable!("handled by matches_test directly"),
    }
}

/// Whether `node`, reached via `axis`, satisfies `test` (§4.7: name tests are filtered to the
/// axis's principal node type; kind tests are not).
pub fn matches_test(tree: &Tree, axis: Axis, node: NodeId, test: &NodeTest) -> bool {
    match test {
        NodeTest::Kind(kind) => matches_kind(tree, node, *kind),
        NodeTest::ProcessingInstruction(target) => match tree.data(node) {
            NodeData::ProcessingInstruction(p) => target.as_deref().map_or(true, |t| t == p.target),
            _ => false,
        },
        _ => principal_node_kind_matches(tree, axis, node) && matches_name(tree, node, test),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::tree::node::Mode;

    #[test]
    fn reverse_axes_are_named_explicitly() {
        assert!(is_reverse_axis(Axis::Ancestor));
        assert!(is_reverse_axis(Axis::Preceding));
        assert!(!is_reverse_axis(Axis::Child));
        assert!(!is_reverse_axis(Axis::Following));
    }

    #[test]
    fn attribute_axis_candidates_exclude_children() {
        let tree = parse("<a x='1' y='2'><b/></a>", Mode::Xml, None).unwrap();
        let root_element = tree.children(tree.root())[0];
        let attrs = candidates(&tree, Axis::Attribute, root_element);
        assert_eq!(attrs.len(), 2);
        let children = candidates(&tree, Axis::Child, root_element);
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn descendant_axis_is_preorder() {
        let tree = parse("<a><b><c/></b><d/></a>", Mode::Xml, None).unwrap();
        let a = tree.children(tree.root())[0];
        let desc = candidates(&tree, Axis::Descendant, a);
        assert_eq!(desc.len(), 3);
        assert!(tree.document_order(desc[0]) < tree.document_order(desc[1]));
        assert!(tree.document_order(desc[1]) < tree.document_order(desc[2]));
    }

    #[test]
    fn preceding_axis_excludes_ancestors_and_is_nearest_first() {
        let tree = parse("<a><b/><c><d/></c></a>", Mode::Xml, None).unwrap();
        let a = tree.children(tree.root())[0];
        let c = tree.children(a)[1];
        let d = tree.children(c)[0];
        let preceding = candidates(&tree, Axis::Preceding, d);
        // b precedes d; c and a are ancestors of d and must not appear.
        assert!(!preceding.contains(&a));
        assert!(!preceding.contains(&c));
        assert!(preceding.contains(&tree.children(a)[0]));
    }

    #[test]
    fn kind_test_ignores_axis_principal_type() {
        let tree = parse("<a x='1'/>", Mode::Xml, None).unwrap();
        let a = tree.children(tree.root())[0];
        let attr = tree.attributes(a)[0];
        assert!(matches_test(&tree, Axis::Attribute, attr, &NodeTest::Kind(KindTest::Node)));
    }
}
