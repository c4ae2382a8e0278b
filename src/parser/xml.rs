//! XML-dialect specifics: the namespace well-formedness constraints (§4.2 "Namespace constraints").

use crate::error::ParseError;
use crate::position::Position;
use crate::tree::{XML_NS_URI, XMLNS_NS_URI};

/// Validates a single `xmlns[:prefix]="uri"` declaration against constraints (a)-(c).
pub fn validate_namespace_declaration(
    prefix: &str,
    uri: &str,
    position: Position,
) -> Result<(), ParseError> {
    let is_default = prefix.is_empty();

    if prefix == "xmlns" {
        return Err(ParseError::NamespaceConstraint {
            position,
            message: "the 'xmlns' prefix may not be declared".into(),
        });
    }
    if is_default && uri == XMLNS_NS_URI {
        return Err(ParseError::NamespaceConstraint {
            position,
            message: "the XMLNS namespace URI may not be a default namespace".into(),
        });
    }
    if prefix == "xml" && uri != XML_NS_URI {
        return Err(ParseError::NamespaceConstraint {
            position,
            message: "the 'xml' prefix may only bind to the XML namespace URI".into(),
        });
    }
    if uri == XML_NS_URI && prefix != "xml" {
        return Err(ParseError::NamespaceConstraint {
            position,
            message: "the XML namespace URI may only bind to the 'xml' prefix".into(),
        });
    }
    if !prefix.is_empty() && uri.is_empty() {
        return Err(ParseError::NamespaceConstraint {
            position,
            message: "a prefixed namespace declaration may not have an empty URI".into(),
        });
    }
    Ok(())
}

/// Constraint (d): the qualified element name may not carry the `xmlns` prefix.
pub fn validate_element_prefix(prefix: Option<&str>, position: Position) -> Result<(), ParseError> {
    if prefix == Some("xmlns") {
        return Err(ParseError::NamespaceConstraint {
            position,
            message: "an element name may not use the 'xmlns' prefix".into(),
        });
    }
    Ok(())
}

/// True when `name` begins (case-insensitively) with `xml` but is not exactly `xml`/`xmlns` —
/// the reserved-prefix misuse warning (§7).
pub fn is_reserved_prefix_misuse(name: &str) -> bool {
    name.len() > 3
        && name[..3].eq_ignore_ascii_case("xml")
        && !name.eq_ignore_ascii_case("xml")
        && !name.eq_ignore_ascii_case("xmlns")
}
