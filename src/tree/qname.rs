//! Expanded-name equality, shared by the namespace resolver (§4.2) and the XPath axis engine's
//! name tests (§4.7) — both need "expanded name = (namespace URI, local name)" (SPEC_FULL B.2).

use crate::tree::arena::{Arena, NodeId};
use crate::tree::node::NodeData;

/// The (URI, local) pair used for namespace-aware equality (GLOSSARY: "Expanded name").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub uri: Option<String>,
    pub local: String,
}

/// Expands a node's qualified name using its `bound_namespace` back-reference, if any.
pub fn expand(arena: &Arena, node: NodeId) -> Option<ExpandedName> {
    match &arena.get(node).data {
        NodeData::Element(e) => Some(ExpandedName {
            uri: e
                .bound_namespace
                .map(|ns| namespace_uri(arena, ns).to_string()),
            local: e.name.local.clone(),
        }),
        NodeData::Attribute(a) => Some(ExpandedName {
            uri: a
                .bound_namespace
                .map(|ns| namespace_uri(arena, ns).to_string()),
            local: a.name.local.clone(),
        }),
        _ => None,
    }
}

fn namespace_uri(arena: &Arena, ns: NodeId) -> &str {
    match &arena.get(ns).data {
        NodeData::Namespace(n) => n.uri.as_str(),
        _ => "",
    }
}
