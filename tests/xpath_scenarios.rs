//! Black-box XPath scenarios taken from the concrete test vectors of spec §8.3.

use xdom::tree::node::{Mode, NodeData};
use xdom::xpath::Value;
use xdom::{parse, query};

fn attr_value(tree: &xdom::Tree, element: xdom::NodeId, name: &str) -> String {
    match tree.data(element) {
        NodeData::Element(e) => {
            let attr = e.attribute_by_qualified(tree.arena(), name).expect("attribute present");
            match tree.data(attr) {
                NodeData::Attribute(a) => a.value.clone(),
                _ => unreachable!(),
            }
        }
        _ => panic!("expected an element"),
    }
}

#[test]
fn basic_path_and_scalar_coercions() {
    let tree = parse("<tag id='1'>some value<data id='2'>123456</data></tag>", Mode::Xml, None).unwrap();
    let root = tree.root();

    let result = query(&tree, root, "/tag/data").unwrap();
    match result {
        Value::NodeSet(ns) => assert_eq!(ns.len(), 1),
        _ => panic!("expected a node-set"),
    }

    let number = query(&tree, root, "number((//data)[1])").unwrap();
    assert_eq!(number, Value::Number(123456.0));

    let length = query(&tree, root, "string-length(normalize-space(//data))").unwrap();
    assert_eq!(length, Value::Number(6.0));
}

#[test]
fn axes_and_predicates_over_sibling_tools() {
    let markup = "<tools><tool id='1'/><tool id='2'/><tool id='3'/><tool id='4'/></tools>";
    let tree = parse(markup, Mode::Xml, None).unwrap();
    let root = tree.root();

    let last = query(&tree, root, "//tool[last()]").unwrap();
    match last {
        Value::NodeSet(ns) => {
            assert_eq!(ns.len(), 1);
            assert_eq!(attr_value(&tree, ns[0], "id"), "4");
        }
        _ => panic!("expected a node-set"),
    }

    let beyond = query(&tree, root, "//tool[position()>4]").unwrap();
    match beyond {
        Value::NodeSet(ns) => assert!(ns.is_empty()),
        _ => panic!("expected a node-set"),
    }

    let rest = query(&tree, root, "(//tool)[1]/following-sibling::tool").unwrap();
    match rest {
        Value::NodeSet(ns) => {
            let ids: Vec<String> = ns.iter().map(|&n| attr_value(&tree, n, "id")).collect();
            assert_eq!(ids, vec!["2", "3", "4"]);
        }
        _ => panic!("expected a node-set"),
    }
}

#[test]
fn function_library_corner_cases() {
    let tree = parse("<doc/>", Mode::Xml, None).unwrap();
    let root = tree.root();

    assert_eq!(query(&tree, root, "substring('12345', 1.5, 2.6)").unwrap(), Value::String("234".to_string()));
    assert_eq!(query(&tree, root, "substring('12345', 0 div 0, 3)").unwrap(), Value::String(String::new()));
    assert_eq!(query(&tree, root, "substring('12345', -42, 1 div 0)").unwrap(), Value::String("12345".to_string()));
    assert_eq!(
        query(&tree, root, "translate('--aaa--', 'abc-', 'ABC')").unwrap(),
        Value::String("AAA".to_string())
    );
    assert_eq!(
        query(&tree, root, "concat('a', 'b', 'c')").unwrap(),
        Value::String("abc".to_string())
    );

    let tree2 = parse("<totals><n>1</n><n>2</n><n>3.5</n></totals>", Mode::Xml, None).unwrap();
    let root2 = tree2.root();
    assert_eq!(query(&tree2, root2, "sum(//n)").unwrap(), Value::Number(6.5));
    assert!(query(&tree2, root2, "sum('3')").is_err());
}

#[test]
fn tolerated_unary_plus_is_numeric_identity() {
    let tree = parse("<doc/>", Mode::Xml, None).unwrap();
    let root = tree.root();

    assert_eq!(query(&tree, root, "+1").unwrap(), Value::Number(1.0));
    assert_eq!(query(&tree, root, "1 + +2").unwrap(), Value::Number(3.0));
    assert_eq!(query(&tree, root, "-+3").unwrap(), Value::Number(-3.0));
}
