//! Resource-limit tests.
//!
//! These tests verify that the parser rejects pathological inputs through
//! the limits in `ParseOptions` instead of consuming unbounded resources.

#![allow(clippy::unwrap_used)]

use std::fmt::Write;

use smallxml::parser::{parse_str_with_options, ParseOptions};
use smallxml::{Document, ErrorKind};

fn nested(depth: usize) -> String {
    let open: String = (0..depth).map(|_| "<a>").collect();
    let close: String = (0..depth).map(|_| "</a>").collect();
    format!("{open}{close}")
}

// ---------------------------------------------------------------------------
// Depth limit tests
// ---------------------------------------------------------------------------

#[test]
fn test_deeply_nested_elements_rejected() {
    // Root is depth 0, so 300 levels reach depth 299, past the default 256.
    let err = Document::parse_str(&nested(300)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::LimitExceeded);
    assert!(
        err.message.contains("depth"),
        "error should mention depth: {}",
        err.message
    );
}

#[test]
fn test_depth_limit_configurable() {
    let xml = "<a><b><c><d><e/></d></c></b></a>";
    let opts = ParseOptions::default().max_depth(10);
    let doc = parse_str_with_options(xml, &opts).unwrap();
    assert_eq!(doc.walk(doc.root_node()).map(|id| doc.depth(id)).max(), Some(4));
}

#[test]
fn test_depth_limit_exact_boundary() {
    // Four levels have depths 0..=3.
    let opts = ParseOptions::default().max_depth(3);
    assert!(parse_str_with_options(&nested(4), &opts).is_ok());

    let err = parse_str_with_options(&nested(5), &opts).unwrap_err();
    assert_eq!(err.kind, ErrorKind::LimitExceeded);
    // The fifth <a> starts at character 12.
    assert_eq!(err.offset(), 12);
}

#[test]
fn test_text_does_not_count_toward_depth() {
    let opts = ParseOptions::default().max_depth(0);
    let doc = parse_str_with_options("<a>text<!--c--></a>", &opts).unwrap();
    assert_eq!(doc.children(doc.root_node()).count(), 2);
}

#[test]
fn test_wide_document_accepted() {
    let mut xml = String::from("<root>");
    for i in 0..10_000 {
        let _ = write!(xml, "<item n=\"{i}\"/>");
    }
    xml.push_str("</root>");
    let doc = Document::parse_str(&xml).unwrap();
    assert_eq!(doc.children(doc.root_node()).count(), 10_000);
    assert_eq!(doc.node_count(), 10_001);
}

// ---------------------------------------------------------------------------
// Attribute and name limits
// ---------------------------------------------------------------------------

#[test]
fn test_attribute_count_limit() {
    let mut xml = String::from("<a");
    for i in 0..20 {
        let _ = write!(xml, " k{i}=\"v\"");
    }
    xml.push_str("/>");

    let opts = ParseOptions::default().max_attributes(20);
    assert!(parse_str_with_options(&xml, &opts).is_ok());

    let opts = ParseOptions::default().max_attributes(19);
    let err = parse_str_with_options(&xml, &opts).unwrap_err();
    assert_eq!(err.kind, ErrorKind::LimitExceeded);
}

#[test]
fn test_name_length_limit() {
    let name = "n".repeat(100);
    let xml = format!("<{name}/>");

    let opts = ParseOptions::default().max_name_length(100);
    assert!(parse_str_with_options(&xml, &opts).is_ok());

    let opts = ParseOptions::default().max_name_length(99);
    let err = parse_str_with_options(&xml, &opts).unwrap_err();
    assert_eq!(err.kind, ErrorKind::LimitExceeded);
}

#[test]
fn test_attribute_name_length_limit() {
    let xml = format!("<a {}=\"1\"/>", "x".repeat(64));
    let opts = ParseOptions::default().max_name_length(32);
    let err = parse_str_with_options(&xml, &opts).unwrap_err();
    assert_eq!(err.kind, ErrorKind::LimitExceeded);
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_entities_are_not_expanded() {
    let xml = "<!DOCTYPE a [<!ENTITY x \"boom\"]><a>&x;&x;</a>";
    let doc = Document::parse_str(xml).unwrap();
    assert_eq!(doc.text_content(doc.root_node()), "&x;&x;");
    assert_eq!(
        doc.text(doc.prolog_nodes()[0]),
        Some(" a [<!ENTITY x \"boom\"]")
    );
}

#[test]
fn test_large_character_reference_kept_literally() {
    let doc = Document::parse_str("<a>&#x110000;&#99999999999;</a>").unwrap();
    assert_eq!(doc.text_content(doc.root_node()), "&#x110000;&#99999999999;");
}
