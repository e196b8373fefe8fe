use super::api::ConfigNodeParser;
use super::api::Rule;
use super::parse_document;

use pest::consumes_to;
use pest::parses_to;
use pest::Parser;

#[test]
fn test_bare_pair() {
    parses_to! {
        parser: ConfigNodeParser,
        input: "capacity = 10000",
        rule: Rule::pair,
        tokens: [
            pair(0, 16, [
                key(0, 8),
                bare(11, 16)
            ])
        ]
    };
}

#[test]
fn test_quoted_pair() {
    parses_to! {
        parser: ConfigNodeParser,
        input: "name = \"boot.ks\"",
        rule: Rule::pair,
        tokens: [
            pair(0, 16, [
                key(0, 4),
                quoted(7, 16, [
                    string_inner(8, 15)
                ])
            ])
        ]
    };
}

#[test]
fn test_scoped_key() {
    parses_to! {
        parser: ConfigNodeParser,
        input: "config:ipu = 150",
        rule: Rule::pair,
        tokens: [
            pair(0, 16, [
                key(0, 10),
                bare(13, 16)
            ])
        ]
    };
}

#[test]
fn test_empty_node() {
    parses_to! {
        parser: ConfigNodeParser,
        input: "harddisk { }",
        rule: Rule::node,
        tokens: [
            node(0, 12, [
                key(0, 8)
            ])
        ]
    };
}

#[test]
fn test_nested_node() {
    parses_to! {
        parser: ConfigNodeParser,
        input: "a { b = 1 c { } }",
        rule: Rule::node,
        tokens: [
            node(0, 17, [
                key(0, 1),
                pair(4, 9, [
                    key(4, 5),
                    bare(8, 9)
                ]),
                node(10, 15, [
                    key(10, 11)
                ])
            ])
        ]
    };
}

#[test]
fn test_comments_are_skipped() {
    let text = "// saved state\nunitID = 3 // trailing\nharddisk\n{\n    // nothing yet\n}\n";
    let root = parse_document(text).unwrap();
    assert_eq!(root.get_value("unitID"), Some("3"));
    assert!(root.get_node("harddisk").unwrap().is_empty());
}

#[test]
fn test_unterminated_node_fails() {
    assert!(ConfigNodeParser::parse(Rule::document, "harddisk {").is_err());
    assert!(parse_document("harddisk {").is_err());
}

#[test]
fn test_missing_value_fails() {
    assert!(parse_document("a = ").is_err());
    assert!(parse_document("a = \"open").is_err());
}

#[test]
fn test_empty_document() {
    let root = parse_document("   \n").unwrap();
    assert!(root.is_empty());
}
