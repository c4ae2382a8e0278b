//! The shared parsing driver: turns a token stream from [`crate::lexer::Lexer`] into a
//! [`Tree`] (§4.2 "Parser"). One driver handles both dialects; [`xml`] and [`html`] hold the
//! handful of rules that differ between them.

pub mod html;
pub mod xml;

use crate::error::{ParseError, Warning};
use crate::lexer::Lexer;
use crate::position::Position;
use crate::token::{Token, TokenKind};
use crate::tree::{
    AttributeData, CommentData, DtdData, ElementData, Mode, NamespaceData, NodeData, PiData,
    QName, TextData, Tree, XmlDeclData, ROOT_ID, XML_NS_URI, XMLNS_NS_URI,
};
use crate::tree::arena::NodeId;
use log::{debug, warn};

/// Parsing knobs (§6.2). Defaults match what a caller gets from `parse(markup, mode, None)`.
#[derive(Debug, Clone)]
pub struct Config {
    pub preserve_space: bool,
    pub preserve_comment: bool,
    pub preserve_cdata: bool,
    pub preserve_dtd_structure: bool,
    pub document_name: String,
    /// XML only: when `false`, an element or attribute prefix with no in-scope declaration is a
    /// hard error instead of being left unbound.
    pub allow_missing_namespaces: bool,
    pub show_warnings: bool,
    /// XML only: when `false`, a default (`xmlns="..."`) namespace in scope is never bound to
    /// unprefixed element names.
    pub allow_default_namespace_bindings: bool,
    /// XML only: when `true`, two attributes on the same element that expand to the same
    /// (namespace URI, local name) pair after resolution are rejected.
    pub ensure_unique_namespaced_attributes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            preserve_space: true,
            preserve_comment: true,
            preserve_cdata: true,
            preserve_dtd_structure: false,
            document_name: "Document".to_string(),
            allow_missing_namespaces: false,
            show_warnings: true,
            allow_default_namespace_bindings: true,
            ensure_unique_namespaced_attributes: true,
        }
    }
}

/// Parses `markup` in the given dialect, returning the built tree or the first fatal error.
/// Non-fatal findings (§7 `Warning`s) are collected on [`Tree::root_data`] rather than returned.
pub fn parse(markup: &str, mode: Mode, config: Option<Config>) -> Result<Tree, ParseError> {
    let config = config.unwrap_or_default();
    let mut tree = Tree::new(config.document_name.clone());
    if mode == Mode::Xml {
        let xml_ns = tree.arena_mut().push(
            Some(ROOT_ID),
            0,
            NodeData::Namespace(NamespaceData {
                prefix: "xml".to_string(),
                uri: XML_NS_URI.to_string(),
                is_default: false,
                is_global: true,
            }),
        );
        let xmlns_ns = tree.arena_mut().push(
            Some(ROOT_ID),
            1,
            NodeData::Namespace(NamespaceData {
                prefix: "xmlns".to_string(),
                uri: XMLNS_NS_URI.to_string(),
                is_default: false,
                is_global: true,
            }),
        );
        tree.root_data_mut().namespaces.push(xml_ns);
        tree.root_data_mut().namespaces.push(xmlns_ns);
    }

    let lexer = Lexer::new(markup, mode, config.preserve_space, config.preserve_dtd_structure);
    let mut parser = Parser {
        lexer,
        cur: Token::new(TokenKind::Eof, Position::START),
        mode,
        config,
        tree,
    };
    parser.bump()?;
    parser.run()?;
    Ok(parser.tree)
}

struct Parser {
    lexer: Lexer,
    cur: Token,
    mode: Mode,
    config: Config,
    tree: Tree,
}

impl Parser {
    fn bump(&mut self) -> Result<(), ParseError> {
        self.cur = self.lexer.next_token()?;
        Ok(())
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{warning}");
        if self.config.show_warnings {
            self.tree.root_data_mut().warnings.push(warning);
        }
    }

    /// Prolog, root element, and epilog in one loop: both "misc before" and "misc after" accept
    /// the same set of tokens (whitespace text, comments, PIs, at most one DOCTYPE), only the
    /// root element itself is a one-shot transition (§4.2 "Document structure").
    fn run(&mut self) -> Result<(), ParseError> {
        let mut root_seen = false;
        loop {
            match self.cur.kind.clone() {
                TokenKind::Eof => break,
                TokenKind::Text { value, .. } => {
                    if !value.trim().is_empty() {
                        self.warn(Warning::UnexpectedNonWhitespaceText { position: self.cur.position });
                        if self.config.preserve_space {
                            self.attach_child(
                                ROOT_ID,
                                NodeData::Text(TextData {
                                    value: value.clone(),
                                    is_cdata: false,
                                    has_entity: false,
                                }),
                            );
                        }
                    }
                    self.bump()?;
                }
                TokenKind::CommentBody(s) => {
                    if self.config.preserve_comment {
                        self.attach_child(ROOT_ID, NodeData::Comment(CommentData { value: s }));
                    }
                    self.bump()?;
                }
                TokenKind::Doctype { name, full } => {
                    if root_seen {
                        return Err(ParseError::MalformedProlog {
                            position: self.cur.position,
                            message: "DOCTYPE may not appear after the root element".into(),
                        });
                    }
                    if self.tree.root_data().dtd.is_some() {
                        return Err(ParseError::MalformedProlog {
                            position: self.cur.position,
                            message: "multiple DOCTYPE declarations".into(),
                        });
                    }
                    let value = full.unwrap_or(name);
                    let id = self.attach_child(ROOT_ID, NodeData::Dtd(DtdData { value }));
                    self.tree.root_data_mut().dtd = Some(id);
                    self.bump()?;
                }
                TokenKind::Lt => {
                    self.bump()?;
                    match self.cur.kind.clone() {
                        TokenKind::Question => {
                            self.bump()?;
                            self.parse_processing_instruction(ROOT_ID, !root_seen)?;
                        }
                        TokenKind::Name(_) => {
                            if root_seen {
                                return Err(ParseError::MultipleRoots(self.cur.position));
                            }
                            let root_element = self.parse_element(ROOT_ID)?;
                            self.tree.root_data_mut().root_element = Some(root_element);
                            root_seen = true;
                        }
                        _ => {
                            return Err(ParseError::MalformedProlog {
                                position: self.cur.position,
                                message: "unexpected token after '<'".into(),
                            })
                        }
                    }
                }
                _ => {
                    return Err(ParseError::MalformedProlog {
                        position: self.cur.position,
                        message: "unexpected token outside the root element".into(),
                    })
                }
            }
        }
        if !root_seen {
            return Err(ParseError::UnexpectedEof {
                position: self.cur.position,
                expected: "root element".into(),
            });
        }
        self.finalize();
        Ok(())
    }

    fn finalize(&mut self) {
        let well_formed = self.tree.root_data().warnings.is_empty();
        self.tree.root_data_mut().is_well_formed = well_formed;
    }

    /// `cur` is the PI/XML-decl target name, right after `<?`. When `allow_xmldecl` and the
    /// target is `xml` and none has been seen yet, this is the XML declaration — its body is
    /// ordinary `name="value"` attribute pairs, not free text (§3.1 "XmlDecl").
    fn parse_processing_instruction(
        &mut self,
        owner: NodeId,
        allow_xmldecl: bool,
    ) -> Result<(), ParseError> {
        let target = match self.cur.kind.clone() {
            TokenKind::Name(n) => n,
            _ => {
                return Err(ParseError::MalformedProlog {
                    position: self.cur.position,
                    message: "expected a processing-instruction target".into(),
                })
            }
        };
        let is_xmldecl =
            allow_xmldecl && target.eq_ignore_ascii_case("xml") && self.tree.root_data().xml_decl.is_none();

        if is_xmldecl {
            self.bump()?;
            let decl_id = self.push_orphan(owner, NodeData::XmlDecl(XmlDeclData::default()));
            let mut attrs = Vec::new();
            while let TokenKind::Name(_) = self.cur.kind {
                let (qname, value, _) = self.parse_one_attribute()?;
                let aid = self.push_orphan(
                    decl_id,
                    NodeData::Attribute(AttributeData {
                        name: qname,
                        value,
                        bound_namespace: None,
                    }),
                );
                attrs.push(aid);
            }
            if let NodeData::XmlDecl(d) = &mut self.tree.arena_mut().get_mut(decl_id).data {
                d.attributes = attrs;
            }
            self.tree.root_data_mut().xml_decl = Some(decl_id);
            self.expect_question_gt()
        } else {
            let data = self.lexer.scan_pi_data()?;
            let value = match data.kind {
                TokenKind::Text { value, .. } => value.trim_start().to_string(),
                _ => String::new(),
            };
            self.attach_child(owner, NodeData::ProcessingInstruction(PiData { target, value }));
            self.bump()
        }
    }

    fn expect_gt(&mut self) -> Result<(), ParseError> {
        match self.cur.kind {
            TokenKind::Gt => self.bump(),
            _ => Err(ParseError::UnexpectedEof {
                position: self.cur.position,
                expected: "'>'".into(),
            }),
        }
    }

    fn expect_question_gt(&mut self) -> Result<(), ParseError> {
        match self.cur.kind {
            TokenKind::Question => {
                self.bump()?;
                self.expect_gt()
            }
            _ => Err(ParseError::MalformedProlog {
                position: self.cur.position,
                message: "expected '?>' closing the XML declaration".into(),
            }),
        }
    }

    fn expect_name(&mut self) -> Result<String, ParseError> {
        match self.cur.kind.clone() {
            TokenKind::Name(n) => {
                self.bump()?;
                Ok(n)
            }
            _ => Err(ParseError::MalformedProlog {
                position: self.cur.position,
                message: "expected a name".into(),
            }),
        }
    }

    /// Reads a (possibly prefixed, in XML mode) name. HTML names may contain embedded colons
    /// that the lexer already folded into one `Name` lexeme, so no `Colon` token ever appears
    /// there (§4.2 "HTML specifics").
    fn parse_qname(&mut self) -> Result<QName, ParseError> {
        let base = self.expect_name()?;
        if self.mode == Mode::Xml && matches!(self.cur.kind, TokenKind::Colon) {
            self.bump()?;
            let local = self.expect_name()?;
            return Ok(QName {
                qualified: format!("{}:{}", base, local),
                prefix: Some(base),
                local,
            });
        }
        Ok(QName {
            prefix: None,
            local: base.clone(),
            qualified: base,
        })
    }

    fn parse_attribute_value(&mut self) -> Result<String, ParseError> {
        if matches!(self.cur.kind, TokenKind::Equals) {
            self.bump()?;
            match self.cur.kind.clone() {
                TokenKind::QuotedString(s) => {
                    self.bump()?;
                    Ok(s)
                }
                TokenKind::Name(s) | TokenKind::Number(s) if self.mode == Mode::Html => {
                    let pos = self.cur.position;
                    self.bump()?;
                    self.warn(Warning::TolerableHtmlRecovery {
                        position: pos,
                        message: "unquoted attribute value was tolerated".into(),
                    });
                    Ok(s)
                }
                _ => Err(ParseError::MalformedProlog {
                    position: self.cur.position,
                    message: "expected a quoted attribute value".into(),
                }),
            }
        } else if self.mode == Mode::Html {
            self.warn(Warning::TolerableHtmlRecovery {
                position: self.cur.position,
                message: "attribute without '=value' was tolerated, value defaulted to empty".into(),
            });
            Ok(String::new())
        } else {
            Err(ParseError::MalformedProlog {
                position: self.cur.position,
                message: "expected '=' after attribute name".into(),
            })
        }
    }

    fn parse_one_attribute(&mut self) -> Result<(QName, String, Position), ParseError> {
        let pos = self.cur.position;
        let qname = self.parse_qname()?;
        let value = self.parse_attribute_value()?;
        Ok((qname, value, pos))
    }

    fn parse_element(&mut self, parent: NodeId) -> Result<NodeId, ParseError> {
        let name_pos = self.cur.position;
        let qname = self.parse_qname()?;
        debug!("open <{}> at {name_pos}", qname.qualified);

        if self.mode == Mode::Xml {
            xml::validate_element_prefix(qname.prefix.as_deref(), name_pos)?;
            let misuse = xml::is_reserved_prefix_misuse(&qname.local)
                || qname
                    .prefix
                    .as_deref()
                    .map(xml::is_reserved_prefix_misuse)
                    .unwrap_or(false);
            if misuse {
                self.warn(Warning::ReservedPrefix {
                    position: name_pos,
                    name: qname.qualified.clone(),
                });
            }
        }

        let is_void = self.mode == Mode::Html && html::is_void_element(&qname.local);
        let element_id = self.attach_child(
            parent,
            NodeData::Element(ElementData {
                name: qname.clone(),
                children: Vec::new(),
                attributes: Vec::new(),
                namespaces: Vec::new(),
                bound_namespace: None,
                mode: self.mode,
                has_child: false,
                has_text: false,
                has_comment: false,
                has_attribute: false,
                is_self_enclosing: false,
                is_void,
                is_namespaced: false,
            }),
        );

        let mut deferred: Vec<(NodeId, String, Position)> = Vec::new();
        while let TokenKind::Name(_) = self.cur.kind {
            let attr_pos = self.cur.position;
            let aqname = self.parse_qname()?;
            let value = self.parse_attribute_value()?;

            let is_ns_decl = self.mode == Mode::Xml
                && (aqname.qualified == "xmlns" || aqname.prefix.as_deref() == Some("xmlns"));
            if is_ns_decl {
                let decl_prefix = if aqname.qualified == "xmlns" {
                    String::new()
                } else {
                    aqname.local.clone()
                };
                xml::validate_namespace_declaration(&decl_prefix, &value, attr_pos)?;
                let dup = self.tree.declared_namespaces(element_id).iter().any(|&n| {
                    matches!(self.tree.data(n), NodeData::Namespace(nd) if nd.prefix == decl_prefix)
                });
                if dup {
                    return Err(ParseError::NamespaceConstraint {
                        position: attr_pos,
                        message: format!("duplicate namespace declaration for prefix {:?}", decl_prefix),
                    });
                }
                let is_default = decl_prefix.is_empty();
                self.push_namespace(
                    element_id,
                    NamespaceData {
                        prefix: decl_prefix,
                        uri: value,
                        is_default,
                        is_global: false,
                    },
                );
            } else {
                let dup = self.tree.attributes(element_id).iter().any(|&a| {
                    matches!(self.tree.data(a), NodeData::Attribute(ad) if ad.name.qualified == aqname.qualified)
                });
                if dup {
                    return Err(ParseError::DuplicateAttribute {
                        position: attr_pos,
                        name: aqname.qualified.clone(),
                    });
                }
                let prefix = aqname.prefix.clone();
                let attr_id = self.push_attribute(
                    element_id,
                    AttributeData {
                        name: aqname,
                        value,
                        bound_namespace: None,
                    },
                );
                if self.mode == Mode::Xml {
                    if let Some(prefix) = prefix {
                        deferred.push((attr_id, prefix, attr_pos));
                    }
                }
            }
        }

        if self.mode == Mode::Xml {
            if let Some(prefix) = qname.prefix.clone() {
                match self.tree.resolve_prefix(element_id, &prefix) {
                    Some(ns) => self.set_element_namespace(element_id, Some(ns)),
                    None if self.config.allow_missing_namespaces => {}
                    None => {
                        return Err(ParseError::UnresolvedNamespace {
                            position: name_pos,
                            prefix,
                        })
                    }
                }
            } else if self.config.allow_default_namespace_bindings {
                if let Some(ns) = self
                    .tree
                    .in_scope_namespaces(element_id)
                    .into_iter()
                    .find(|&n| matches!(self.tree.data(n), NodeData::Namespace(nd) if nd.is_default))
                {
                    self.set_element_namespace(element_id, Some(ns));
                }
            }
            for (attr_id, prefix, pos) in deferred {
                match self.tree.resolve_prefix(element_id, &prefix) {
                    Some(ns) => self.set_attribute_namespace(attr_id, ns),
                    None if self.config.allow_missing_namespaces => {}
                    None => return Err(ParseError::UnresolvedNamespace { position: pos, prefix }),
                }
            }
            if self.config.ensure_unique_namespaced_attributes {
                self.check_unique_expanded_attributes(element_id, name_pos)?;
            }
        }

        self.update_element_flags(element_id);

        match self.cur.kind.clone() {
            TokenKind::Slash => {
                self.bump()?;
                self.expect_gt()?;
                self.set_self_enclosing(element_id);
            }
            TokenKind::Gt => {
                self.bump()?;
                if is_void {
                    // void elements never have content or a closing tag (§4.2 HTML specifics)
                } else if self.mode == Mode::Html && html::is_script_element(&qname.local) {
                    self.parse_script_body(element_id, &qname)?;
                } else {
                    self.parse_content(element_id, &qname)?;
                }
            }
            _ => {
                return Err(ParseError::UnexpectedEof {
                    position: self.cur.position,
                    expected: "'>' or '/>'".into(),
                })
            }
        }

        debug!("close </{}>", qname.qualified);
        Ok(element_id)
    }

    fn parse_content(&mut self, element: NodeId, qname: &QName) -> Result<(), ParseError> {
        loop {
            match self.cur.kind.clone() {
                TokenKind::Text { value, is_cdata, has_entity, has_stray_lt } => {
                    if has_stray_lt {
                        self.warn(Warning::TolerableHtmlRecovery {
                            position: self.cur.position,
                            message: "stray '<' not starting recognized markup was kept as text".into(),
                        });
                    }
                    if !is_cdata || self.config.preserve_cdata {
                        self.attach_child(
                            element,
                            NodeData::Text(TextData {
                                value,
                                is_cdata,
                                has_entity,
                            }),
                        );
                    }
                    self.bump()?;
                }
                TokenKind::CommentBody(s) => {
                    if self.config.preserve_comment {
                        self.attach_child(element, NodeData::Comment(CommentData { value: s }));
                    }
                    self.bump()?;
                }
                TokenKind::Doctype { .. } => {
                    return Err(ParseError::MalformedProlog {
                        position: self.cur.position,
                        message: "unexpected DOCTYPE inside element content".into(),
                    })
                }
                TokenKind::Lt => {
                    self.bump()?;
                    match self.cur.kind.clone() {
                        TokenKind::Slash => {
                            self.bump()?;
                            self.consume_closing_tag(qname)?;
                            self.update_element_content_flags(element);
                            return Ok(());
                        }
                        TokenKind::Question => {
                            self.bump()?;
                            self.parse_processing_instruction(element, false)?;
                        }
                        TokenKind::Name(_) => {
                            self.parse_element(element)?;
                        }
                        _ => {
                            return Err(ParseError::UnexpectedEof {
                                position: self.cur.position,
                                expected: format!("closing tag for <{}>", qname.qualified),
                            })
                        }
                    }
                }
                _ => {
                    return Err(ParseError::UnexpectedEof {
                        position: self.cur.position,
                        expected: format!("closing tag for <{}>", qname.qualified),
                    })
                }
            }
        }
    }

    fn consume_closing_tag(&mut self, qname: &QName) -> Result<(), ParseError> {
        let close_pos = self.cur.position;
        let close = self.parse_qname()?;
        let matches_open = if self.mode == Mode::Html {
            close.qualified.eq_ignore_ascii_case(&qname.qualified)
        } else {
            close.qualified == qname.qualified
        };
        if !matches_open {
            return Err(ParseError::MismatchedClose {
                position: close_pos,
                expected: qname.qualified.clone(),
                found: close.qualified,
            });
        }
        self.expect_gt()
    }

    /// HTML `<script>`: the body is captured opaquely up to the first literal `</` (§4.2, §9.2 —
    /// deliberately not HTML5-conformant: a `</` inside a script string literal still ends it).
    fn parse_script_body(&mut self, element: NodeId, qname: &QName) -> Result<(), ParseError> {
        let body = self.lexer.create_synthetic_token("</")?;
        if let TokenKind::Text { value, .. } = body.kind {
            if !value.is_empty() {
                self.attach_child(
                    element,
                    NodeData::Text(TextData {
                        value,
                        is_cdata: false,
                        has_entity: false,
                    }),
                );
            }
        }
        self.bump()?;
        match self.cur.kind.clone() {
            TokenKind::Lt => {
                self.bump()?;
                match self.cur.kind.clone() {
                    TokenKind::Slash => {
                        self.bump()?;
                        self.consume_closing_tag(qname)?;
                    }
                    _ => {
                        return Err(ParseError::UnexpectedEof {
                            position: self.cur.position,
                            expected: format!("closing tag for <{}>", qname.qualified),
                        })
                    }
                }
            }
            _ => {
                return Err(ParseError::UnexpectedEof {
                    position: self.cur.position,
                    expected: format!("closing tag for <{}>", qname.qualified),
                })
            }
        }
        self.update_element_content_flags(element);
        Ok(())
    }

    fn check_unique_expanded_attributes(&self, element: NodeId, pos: Position) -> Result<(), ParseError> {
        use crate::tree::qname::expand;
        let mut seen = std::collections::HashSet::new();
        for &attr in self.tree.attributes(element) {
            if let Some(expanded) = expand(self.tree.arena(), attr) {
                if !seen.insert((expanded.uri.clone(), expanded.local.clone())) {
                    return Err(ParseError::NamespaceConstraint {
                        position: pos,
                        message: format!(
                            "duplicate attribute after namespace resolution: {{{}}}{}",
                            expanded.uri.as_deref().unwrap_or(""),
                            expanded.local
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    // --- arena plumbing ------------------------------------------------------

    fn attach_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let idx = self.tree.children(parent).len();
        let id = self.tree.arena_mut().push(Some(parent), idx, data);
        match &mut self.tree.arena_mut().get_mut(parent).data {
            NodeData::Root(r) => r.children.push(id),
            NodeData::Element(e) => e.children.push(id),
            _ => unreachable!("attach_child called on a non-container parent"),
        }
        id
    }

    fn push_attribute(&mut self, element: NodeId, data: AttributeData) -> NodeId {
        let idx = self.tree.attributes(element).len();
        let id = self.tree.arena_mut().push(Some(element), idx, NodeData::Attribute(data));
        if let NodeData::Element(e) = &mut self.tree.arena_mut().get_mut(element).data {
            e.attributes.push(id);
        }
        id
    }

    fn push_namespace(&mut self, element: NodeId, data: NamespaceData) -> NodeId {
        debug!("namespace scope: bind prefix {:?} to {:?}", data.prefix, data.uri);
        let idx = self.tree.declared_namespaces(element).len();
        let id = self.tree.arena_mut().push(Some(element), idx, NodeData::Namespace(data));
        if let NodeData::Element(e) = &mut self.tree.arena_mut().get_mut(element).data {
            e.namespaces.push(id);
        }
        id
    }

    /// Pushes a node that is not tracked in any container's ordered child/attribute/namespace
    /// list — currently only `XmlDecl` and its attributes (§9.1: "XmlDecl sits outside `children`").
    fn push_orphan(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        self.tree.arena_mut().push(Some(parent), 0, data)
    }

    fn set_element_namespace(&mut self, element: NodeId, ns: Option<NodeId>) {
        if let NodeData::Element(e) = &mut self.tree.arena_mut().get_mut(element).data {
            e.bound_namespace = ns;
        }
    }

    fn set_attribute_namespace(&mut self, attr: NodeId, ns: NodeId) {
        if let NodeData::Attribute(a) = &mut self.tree.arena_mut().get_mut(attr).data {
            a.bound_namespace = Some(ns);
        }
    }

    fn set_self_enclosing(&mut self, element: NodeId) {
        if let NodeData::Element(e) = &mut self.tree.arena_mut().get_mut(element).data {
            e.is_self_enclosing = true;
        }
    }

    fn update_element_flags(&mut self, element: NodeId) {
        let (has_attribute, is_namespaced) = match self.tree.data(element) {
            NodeData::Element(e) => (!e.attributes.is_empty(), e.bound_namespace.is_some()),
            _ => (false, false),
        };
        if let NodeData::Element(e) = &mut self.tree.arena_mut().get_mut(element).data {
            e.has_attribute = has_attribute;
            e.is_namespaced = is_namespaced;
        }
    }

    fn update_element_content_flags(&mut self, element: NodeId) {
        let children: Vec<NodeId> = self.tree.children(element).to_vec();
        let mut has_child = false;
        let mut has_text = false;
        let mut has_comment = false;
        for child in children {
            match self.tree.data(child) {
                NodeData::Element(_) => has_child = true,
                NodeData::Text(_) => has_text = true,
                NodeData::Comment(_) => has_comment = true,
                _ => {}
            }
        }
        if let NodeData::Element(e) = &mut self.tree.arena_mut().get_mut(element).data {
            e.has_child = has_child;
            e.has_text = has_text;
            e.has_comment = has_comment;
        }
    }
}
