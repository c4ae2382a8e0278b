//! HTML-dialect specifics: the void element set and the XHTML-only default namespace rule (§4.2).

/// Elements that close without a matching end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_element(local_name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|v| v.eq_ignore_ascii_case(local_name))
}

pub const SCRIPT_ELEMENT: &str = "script";

pub fn is_script_element(local_name: &str) -> bool {
    local_name.eq_ignore_ascii_case(SCRIPT_ELEMENT)
}
