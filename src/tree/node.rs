//! The nine node variants of the document tree (spec §3.1).

use crate::tree::arena::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Xml,
    Html,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Root(RootData),
    Element(ElementData),
    Attribute(AttributeData),
    Namespace(NamespaceData),
    Text(TextData),
    Comment(CommentData),
    ProcessingInstruction(PiData),
    Dtd(DtdData),
    XmlDecl(XmlDeclData),
}

impl NodeData {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeData::Root(_) => "root",
            NodeData::Element(_) => "element",
            NodeData::Attribute(_) => "attribute",
            NodeData::Namespace(_) => "namespace",
            NodeData::Text(_) => "text",
            NodeData::Comment(_) => "comment",
            NodeData::ProcessingInstruction(_) => "processing-instruction",
            NodeData::Dtd(_) => "dtd",
            NodeData::XmlDecl(_) => "xml-decl",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RootData {
    pub name: String,
    pub children: Vec<NodeId>,
    pub root_element: Option<NodeId>,
    pub xml_decl: Option<NodeId>,
    pub dtd: Option<NodeId>,
    /// Reserved global namespace declarations (`xml`, `xmlns`); empty in HTML mode where the
    /// namespace scope is disabled entirely (§4.2).
    pub namespaces: Vec<NodeId>,
    pub is_well_formed: bool,
    pub warnings: Vec<crate::error::Warning>,
}

/// A qualified name split into its prefix and local parts (GLOSSARY: "Qualified name").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
    pub qualified: String,
}

impl QName {
    pub fn parse(raw: &str) -> QName {
        match raw.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() => QName {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
                qualified: raw.to_string(),
            },
            _ => QName {
                prefix: None,
                local: raw.to_string(),
                qualified: raw.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ElementData {
    pub name: QName,
    pub children: Vec<NodeId>,
    /// Attribute nodes in insertion order; qualified names are unique (enforced at parse time).
    pub attributes: Vec<NodeId>,
    /// Namespace declarations in scope *on this element* (not inherited ones), insertion order.
    pub namespaces: Vec<NodeId>,
    pub bound_namespace: Option<NodeId>,
    pub mode: Mode,
    pub has_child: bool,
    pub has_text: bool,
    pub has_comment: bool,
    pub has_attribute: bool,
    pub is_self_enclosing: bool,
    pub is_void: bool,
    pub is_namespaced: bool,
}

impl ElementData {
    pub fn attribute_by_qualified<'a>(
        &self,
        arena: &'a crate::tree::arena::Arena,
        qualified: &str,
    ) -> Option<NodeId> {
        self.attributes.iter().copied().find(|&id| {
            matches!(&arena.get(id).data, NodeData::Attribute(a) if a.name.qualified == qualified)
        })
    }
}

#[derive(Debug, Clone)]
pub struct AttributeData {
    pub name: QName,
    pub value: String,
    pub bound_namespace: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct NamespaceData {
    pub prefix: String,
    pub uri: String,
    pub is_default: bool,
    pub is_global: bool,
}

#[derive(Debug, Clone)]
pub struct TextData {
    pub value: String,
    pub is_cdata: bool,
    pub has_entity: bool,
}

#[derive(Debug, Clone)]
pub struct CommentData {
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct PiData {
    pub target: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct DtdData {
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct XmlDeclData {
    pub attributes: Vec<NodeId>,
}
