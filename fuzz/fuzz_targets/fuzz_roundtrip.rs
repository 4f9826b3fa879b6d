#![no_main]
use libfuzzer_sys::fuzz_target;
use smallxml::parser::{parse_str_with_options, ParseOptions};
use smallxml::serial::render;
use smallxml::{Document, NodeId, NodeKind};

/// `(depth, kind)` pairs in document order without whitespace-only text.
/// Top-level text is trimmed because each top-level node renders on its
/// own line.
fn shape(doc: &Document) -> Vec<(u32, NodeKind)> {
    let top_level = |id: NodeId| {
        let kind = match doc.kind(id) {
            NodeKind::Text { content } => NodeKind::Text {
                content: content
                    .trim_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'))
                    .to_string(),
            },
            other => other.clone(),
        };
        (doc.depth(id), kind)
    };
    let mut out: Vec<(u32, NodeKind)> =
        doc.prolog_nodes().iter().map(|&id| top_level(id)).collect();
    out.extend(
        doc.walk(doc.root_node())
            .map(|id| (doc.depth(id), doc.kind(id).clone())),
    );
    out.extend(doc.trailing_nodes().iter().map(|&id| top_level(id)));
    out.retain(|(_, kind)| !kind.is_blank_text());
    out
}

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let opts = ParseOptions::default().max_depth(64);
        // A well-formed document must render to text that parses back to
        // the same tree.
        if let Ok(doc) = parse_str_with_options(s, &opts) {
            let output = render(&doc);
            let again = match parse_str_with_options(&output, &opts) {
                Ok(again) => again,
                Err(e) => panic!("rendered output failed to parse ({e}): {output:?}"),
            };
            assert_eq!(shape(&doc), shape(&again), "tree changed: {output:?}");
        }
    }
});
