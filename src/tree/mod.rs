//! The document tree data model shared by the markup parser and the XPath evaluator (§3).

pub mod arena;
pub mod node;
pub mod qname;

use std::fmt::Write as _;

pub use arena::{Arena, NodeId};
pub use node::{
    AttributeData, CommentData, DtdData, ElementData, Mode, NamespaceData, NodeData, PiData,
    QName, RootData, TextData, XmlDeclData,
};

/// The XML namespace URI, bound to prefix `xml` (§6.3).
pub const XML_NS_URI: &str = "http://www.w3.org/XML/1998/namespace";
/// The XMLNS namespace URI, bound to prefix `xmlns` (§6.3).
pub const XMLNS_NS_URI: &str = "http://www.w3.org/2000/xmlns/";
/// The only namespace URI HTML mode will accept as a default namespace (§6.3).
pub const XHTML_NS_URI: &str = "http://www.w3.org/1999/xhtml";

pub const ROOT_ID: NodeId = NodeId(0);

/// The parsed document: an arena of nodes plus the root's convenience pointers.
#[derive(Debug)]
pub struct Tree {
    arena: Arena,
}

impl Tree {
    /// Creates a tree containing only the root node (index 0).
    pub fn new(document_name: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let id = arena.push(
            None,
            0,
            NodeData::Root(RootData {
                name: document_name.into(),
                ..Default::default()
            }),
        );
        debug_assert_eq!(id, ROOT_ID);
        Tree { arena }
    }

    pub fn root(&self) -> NodeId {
        ROOT_ID
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn node(&self, id: NodeId) -> &node::Node {
        self.arena.get(id)
    }

    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.arena.get(id).data
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.arena.get(id).parent
    }

    pub fn index(&self, id: NodeId) -> usize {
        self.arena.get(id).index
    }

    pub fn document_order(&self, id: NodeId) -> u32 {
        self.arena.get(id).position
    }

    pub fn is_well_formed(&self) -> bool {
        match self.data(ROOT_ID) {
            NodeData::Root(r) => r.is_well_formed,
            _ => unreachable!("node 0 is always Root"),
        }
    }

    pub fn root_data(&self) -> &RootData {
        match self.data(ROOT_ID) {
            NodeData::Root(r) => r,
            _ => unreachable!("node 0 is always Root"),
        }
    }

    pub fn root_data_mut(&mut self) -> &mut RootData {
        match self.arena.get_mut(ROOT_ID).data {
            NodeData::Root(ref mut r) => r,
            _ => unreachable!("node 0 is always Root"),
        }
    }

    /// The ordered child nodes of `id` — empty for anything but Root/Element.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::Root(r) => &r.children,
            NodeData::Element(e) => &e.children,
            _ => &[],
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::Element(e) => &e.attributes,
            _ => &[],
        }
    }

    /// Namespace declarations made directly on `id` (not inherited) — empty except for
    /// Root (reserved globals) and Element.
    pub fn declared_namespaces(&self, id: NodeId) -> &[NodeId] {
        match self.data(id) {
            NodeData::Root(r) => &r.namespaces,
            NodeData::Element(e) => &e.namespaces,
            _ => &[],
        }
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let idx = self.index(id);
        siblings.get(idx + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let idx = self.index(id);
        if idx == 0 {
            return None;
        }
        self.children(parent).get(idx - 1).copied()
    }

    /// Namespaces in scope at `context`, nearest declaration first, deduplicated by prefix.
    /// Used by the namespace axis and by `p:*` / `p:local` name-test resolution (§4.7).
    pub fn in_scope_namespaces(&self, context: NodeId) -> Vec<NodeId> {
        let mut seen = std::collections::HashSet::new();
        let mut result = Vec::new();
        let mut cur = Some(context);
        while let Some(node) = cur {
            for &ns in self.declared_namespaces(node) {
                if let NodeData::Namespace(n) = self.data(ns) {
                    if seen.insert(n.prefix.clone()) {
                        result.push(ns);
                    }
                }
            }
            cur = self.parent(node);
        }
        result
    }

    /// Resolves `prefix` to its in-scope namespace node from `context`, nearest wins.
    pub fn resolve_prefix(&self, context: NodeId, prefix: &str) -> Option<NodeId> {
        self.in_scope_namespaces(context)
            .into_iter()
            .find(|&ns| matches!(self.data(ns), NodeData::Namespace(n) if n.prefix == prefix))
    }

    /// The XPath 1.0 `string-value` of a node (§4.5): own text for leaf kinds, the
    /// concatenation (in document order) of descendant text for Root/Element.
    pub fn string_value(&self, id: NodeId) -> String {
        match self.data(id) {
            NodeData::Text(t) => t.value.clone(),
            NodeData::Comment(c) => c.value.clone(),
            NodeData::ProcessingInstruction(p) => p.value.clone(),
            NodeData::Dtd(d) => d.value.clone(),
            NodeData::Attribute(a) => a.value.clone(),
            NodeData::Namespace(n) => n.uri.clone(),
            NodeData::Root(_) | NodeData::Element(_) => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
            NodeData::XmlDecl(_) => String::new(),
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in self.children(id) {
            match self.data(child) {
                NodeData::Text(t) => {
                    let _ = out.write_str(&t.value);
                }
                NodeData::Element(_) | NodeData::Root(_) => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// Whether `descendant` is a proper descendant of `ancestor`.
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        let mut cur = self.parent(descendant);
        while let Some(node) = cur {
            if node == ancestor {
                return true;
            }
            cur = self.parent(node);
        }
        false
    }
}

/// The serialization hook every node exposes (§1: the renderer itself is an external
/// collaborator, but the contract that nodes can render themselves lives in the core).
pub trait Render {
    fn write_to(&self, tree: &Tree, out: &mut String);
}

impl Render for NodeId {
    fn write_to(&self, tree: &Tree, out: &mut String) {
        match tree.data(*self) {
            NodeData::Root(r) => {
                for &child in &r.children {
                    child.write_to(tree, out);
                }
            }
            NodeData::Element(e) => {
                let _ = write!(out, "<{}", e.name.qualified);
                for &ns in &e.namespaces {
                    if let NodeData::Namespace(n) = tree.data(ns) {
                        if n.prefix.is_empty() {
                            let _ = write!(out, " xmlns=\"{}\"", n.uri);
                        } else {
                            let _ = write!(out, " xmlns:{}=\"{}\"", n.prefix, n.uri);
                        }
                    }
                }
                for &attr in &e.attributes {
                    if let NodeData::Attribute(a) = tree.data(attr) {
                        let _ = write!(out, " {}=\"{}\"", a.name.qualified, a.value);
                    }
                }
                if e.children.is_empty() && (e.is_self_enclosing || e.is_void) {
                    let _ = write!(out, "/>");
                } else {
                    let _ = write!(out, ">");
                    for &child in &e.children {
                        child.write_to(tree, out);
                    }
                    let _ = write!(out, "</{}>", e.name.qualified);
                }
            }
            NodeData::Text(t) => {
                if t.is_cdata {
                    let _ = write!(out, "<![CDATA[{}]]>", t.value);
                } else {
                    let _ = out.write_str(&t.value);
                }
            }
            NodeData::Comment(c) => {
                let _ = write!(out, "<!--{}-->", c.value);
            }
            NodeData::ProcessingInstruction(p) => {
                let _ = write!(out, "<?{} {}?>", p.target, p.value);
            }
            NodeData::Dtd(d) => {
                let _ = write!(out, "<!DOCTYPE {}>", d.value);
            }
            NodeData::XmlDecl(decl) => {
                let _ = write!(out, "<?xml");
                for &attr in &decl.attributes {
                    if let NodeData::Attribute(a) = tree.data(attr) {
                        let _ = write!(out, " {}=\"{}\"", a.name.qualified, a.value);
                    }
                }
                let _ = write!(out, "?>");
            }
            NodeData::Attribute(_) | NodeData::Namespace(_) => {}
        }
    }
}
