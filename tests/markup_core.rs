//! Black-box markup-parsing scenarios (self-closing/void elements, namespace resolution, DTD
//! capture under both `preserveDtdStructure` settings).

use rstest::rstest;
use xdom::error::Warning;
use xdom::tree::node::{Mode, NodeData};
use xdom::{parse, Config};

fn root_element(tree: &xdom::Tree) -> xdom::NodeId {
    tree.root_data().root_element.expect("a parsed document has a root element")
}

#[test]
fn self_closing_element_has_no_children() {
    let tree = parse("<doc><br/></doc>", Mode::Xml, None).unwrap();
    let doc = root_element(&tree);
    let child = tree.children(doc)[0];
    match tree.data(child) {
        NodeData::Element(e) => {
            assert!(e.is_self_enclosing);
            assert!(e.children.is_empty());
        }
        _ => panic!("expected an element"),
    }
}

#[rstest]
#[case("area")]
#[case("br")]
#[case("img")]
#[case("input")]
fn html_void_elements_take_no_closing_tag(#[case] tag: &str) {
    let markup = format!("<html><body><{tag}></body></html>");
    let tree = parse(&markup, Mode::Html, None).unwrap();
    assert!(tree.is_well_formed());
    let html = root_element(&tree);
    let body = tree.children(html)[0];
    let void_el = tree.children(body)[0];
    match tree.data(void_el) {
        NodeData::Element(e) => assert!(e.is_void),
        _ => panic!("expected an element"),
    }
}

#[test]
fn namespace_resolution_binds_element_and_attribute() {
    let markup = r#"<a:root xmlns:a="urn:a" xmlns:b="urn:b"><a:child b:x="1"/></a:root>"#;
    let tree = parse(markup, Mode::Xml, None).unwrap();
    assert!(tree.is_well_formed());
    let root = root_element(&tree);
    let child = tree.children(root)[0];
    let expanded = xdom::tree::qname::expand(tree.arena(), child).unwrap();
    assert_eq!(expanded.uri.as_deref(), Some("urn:a"));
    assert_eq!(expanded.local, "child");

    let attr = tree.attributes(child)[0];
    let expanded_attr = xdom::tree::qname::expand(tree.arena(), attr).unwrap();
    assert_eq!(expanded_attr.uri.as_deref(), Some("urn:b"));
    assert_eq!(expanded_attr.local, "x");
}

#[test]
fn duplicate_expanded_attribute_name_is_a_parse_error() {
    let markup = r#"<root xmlns:a="urn:same" xmlns:b="urn:same"><e a:x="1" b:x="2"/></root>"#;
    let err = parse(markup, Mode::Xml, None).unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn dtd_name_only_is_captured_by_default() {
    let markup = "<!DOCTYPE html><root/>";
    let tree = parse(markup, Mode::Xml, None).unwrap();
    let dtd_id = tree.root_data().dtd.expect("a DOCTYPE was present");
    match tree.data(dtd_id) {
        NodeData::Dtd(d) => assert_eq!(d.value, "html"),
        _ => panic!("expected a Dtd node"),
    }
}

#[test]
fn stray_lt_in_html_text_degrades_well_formedness() {
    let markup = "<p>5 < 10 and 10 > 5</p>";
    let tree = parse(markup, Mode::Html, None).unwrap();
    assert!(!tree.is_well_formed());
    assert!(tree
        .root_data()
        .warnings
        .iter()
        .any(|w| matches!(w, Warning::TolerableHtmlRecovery { .. })));
}

#[test]
fn unquoted_html_attribute_value_is_tolerated_with_a_warning() {
    let markup = "<input type=text disabled>";
    let tree = parse(markup, Mode::Html, None).unwrap();
    assert!(!tree.is_well_formed());
    let warnings = &tree.root_data().warnings;
    assert!(warnings.len() >= 2);
    assert!(warnings.iter().all(|w| matches!(w, Warning::TolerableHtmlRecovery { .. })));
}

#[test]
fn dtd_full_text_is_captured_when_configured() {
    let markup = r#"<!DOCTYPE root SYSTEM "root.dtd"><root/>"#;
    let config = Config { preserve_dtd_structure: true, ..Config::default() };
    let tree = parse(markup, Mode::Xml, Some(config)).unwrap();
    let dtd_id = tree.root_data().dtd.expect("a DOCTYPE was present");
    match tree.data(dtd_id) {
        NodeData::Dtd(d) => {
            assert!(d.value.contains("SYSTEM"));
            assert!(d.value.contains("root.dtd"));
        }
        _ => panic!("expected a Dtd node"),
    }
}
