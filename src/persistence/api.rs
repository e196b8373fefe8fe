use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::node::ConfigNode;
use crate::runner::ds::error::{KosError, KosResult};

#[derive(Parser)]
#[grammar = "persistence/config_node.pest"] // relative to src
pub struct ConfigNodeParser;

const TAB_WIDTH: usize = 4;

/// Parse a persisted document into an unnamed root node holding its
/// top-level entries.
pub fn parse_document(text: &str) -> KosResult<ConfigNode> {
    let mut pairs = ConfigNodeParser::parse(Rule::document, text)
        .map_err(|e| KosError::Parse(e.to_string()))?;
    let mut root = ConfigNode::new("");
    if let Some(document) = pairs.next() {
        for pair in document.into_inner() {
            build_entry(&mut root, pair)?;
        }
    }
    Ok(root)
}

fn build_entry(parent: &mut ConfigNode, pair: Pair<Rule>) -> KosResult<()> {
    match pair.as_rule() {
        Rule::pair => {
            let (key, value) = build_pair(pair)?;
            parent.add_value(key, value);
        }
        Rule::node => {
            let node = build_node(pair)?;
            parent.add_node(node);
        }
        Rule::EOI => {}
        _ => return Err(get_unexpected_error(&pair)),
    }
    Ok(())
}

fn build_pair(pair: Pair<Rule>) -> KosResult<(String, String)> {
    let mut inner = pair.into_inner();
    let key = match inner.next() {
        Some(p) if p.as_rule() == Rule::key => p.as_str().to_string(),
        _ => return Err(KosError::Parse("value without a key".to_string())),
    };
    let value = match inner.next() {
        Some(p) => match p.as_rule() {
            Rule::quoted => {
                let text = p.into_inner().next().map(|s| s.as_str()).unwrap_or("");
                unescape(text)
            }
            Rule::bare => p.as_str().to_string(),
            _ => return Err(get_unexpected_error(&p)),
        },
        None => return Err(KosError::Parse(format!("`{}` has no value", key))),
    };
    Ok((key, value))
}

fn build_node(pair: Pair<Rule>) -> KosResult<ConfigNode> {
    let mut inner = pair.into_inner();
    let mut node = match inner.next() {
        Some(p) if p.as_rule() == Rule::key => ConfigNode::new(p.as_str()),
        _ => return Err(KosError::Parse("node without a name".to_string())),
    };
    for child in inner {
        build_entry(&mut node, child)?;
    }
    Ok(node)
}

fn get_unexpected_error(pair: &Pair<Rule>) -> KosError {
    let (line, col) = pair.as_span().start_pos().line_col();
    KosError::Parse(format!(
        "unexpected {:?} at {}:{}",
        pair.as_rule(),
        line,
        col
    ))
}

/// Write the entries of `root` as a document. The root's own name is not
/// written, so `parse_document(&write_document(&n))` gives back `n` when `n`
/// is unnamed.
pub fn write_document(root: &ConfigNode) -> String {
    let mut out = String::new();
    write_entries(root, 0, &mut out);
    out
}

fn write_entries(node: &ConfigNode, level: usize, out: &mut String) {
    let pad = " ".repeat(level * TAB_WIDTH);
    for (key, value) in node.values() {
        out.push_str(&format!("{}{} = \"{}\"\n", pad, key, escape(value)));
    }
    for child in node.nodes() {
        out.push_str(&format!("{}{}\n{}{{\n", pad, child.name(), pad));
        write_entries(child, level + 1, out);
        out.push_str(&format!("{}}}\n", pad));
    }
}

fn escape(value: &str) -> String {
    let mut s = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => s.push_str("\\\\"),
            '"' => s.push_str("\\\""),
            '\n' => s.push_str("\\n"),
            '\t' => s.push_str("\\t"),
            '\r' => s.push_str("\\r"),
            _ => s.push(c),
        }
    }
    s
}

fn unescape(text: &str) -> String {
    let mut s = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            s.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => s.push('\n'),
            Some('t') => s.push('\t'),
            Some('r') => s.push('\r'),
            Some(other) => s.push(other),
            None => s.push('\\'),
        }
    }
    s
}
