use std::str::FromStr;

use crate::runner::ds::error::{KosError, KosResult};

/// A named node of persisted state.
///
/// Values keep their insertion order and keys may repeat, as may child node
/// names; readers decide whether the first or the last occurrence counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigNode {
    name: String,
    values: Vec<(String, String)>,
    nodes: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn new(name: impl Into<String>) -> Self {
        ConfigNode {
            name: name.into(),
            values: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a value, keeping any earlier value under the same key.
    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    /// Replace the first value stored under `key`, or append it.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.values.push((key.to_string(), value)),
        }
    }

    /// First value stored under `key`.
    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }

    /// Like [`get_value`](Self::get_value) but a missing key is an error.
    pub fn required_value(&self, key: &str) -> KosResult<&str> {
        self.get_value(key).ok_or_else(|| KosError::MissingValue {
            node: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// Parse the first value under `key`. `Ok(None)` when the key is absent.
    pub fn parse_value<T: FromStr>(&self, key: &str) -> KosResult<Option<T>> {
        match self.get_value(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|_| KosError::InvalidValue {
                    key: key.to_string(),
                    value: raw.to_string(),
                }),
            None => Ok(None),
        }
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append a child node and return it for further filling.
    pub fn add_node(&mut self, node: ConfigNode) -> &mut ConfigNode {
        self.nodes.push(node);
        let last = self.nodes.len() - 1;
        &mut self.nodes[last]
    }

    /// First child node named `name`.
    pub fn get_node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Every child node named `name`, in document order.
    pub fn get_nodes<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a ConfigNode> + 'a {
        self.nodes.iter().filter(move |n| n.name == name)
    }

    pub fn nodes(&self) -> &[ConfigNode] {
        &self.nodes
    }

    /// Drop every child node named `name`, returning how many were removed.
    pub fn remove_nodes(&mut self, name: &str) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.name != name);
        before - self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{parse_document, write_document};

    #[test]
    fn test_set_value_replaces_first() {
        let mut node = ConfigNode::new("n");
        node.add_value("a", "1");
        node.add_value("a", "2");
        node.set_value("a", "3");
        assert_eq!(node.get_value("a"), Some("3"));
        assert_eq!(node.values().filter(|(k, _)| *k == "a").count(), 2);
    }

    #[test]
    fn test_parse_value() {
        let mut node = ConfigNode::new("n");
        node.add_value("capacity", "10000");
        node.add_value("broken", "ten");
        assert_eq!(node.parse_value::<usize>("capacity").unwrap(), Some(10000));
        assert_eq!(node.parse_value::<usize>("absent").unwrap(), None);
        assert!(node.parse_value::<usize>("broken").is_err());
        assert!(node.required_value("absent").is_err());
    }

    #[test]
    fn test_text_round_trip_keeps_awkward_content() {
        let mut root = ConfigNode::new("");
        root.add_value("unitID", "4");
        let disk = root.add_node(ConfigNode::new("harddisk"));
        disk.add_value("capacity", "10000");
        let file = disk.add_node(ConfigNode::new("file"));
        file.add_value("name", "boot.ks");
        file.add_value("content", "print \"hi\".\n{ } = \\ // not a comment\t");
        file.add_value("empty", "");

        let text = write_document(&root);
        let parsed = parse_document(&text).unwrap();
        assert_eq!(parsed, root);
    }

    #[test]
    fn test_remove_nodes() {
        let mut node = ConfigNode::new("n");
        node.add_node(ConfigNode::new("harddisk"));
        node.add_node(ConfigNode::new("other"));
        node.add_node(ConfigNode::new("harddisk"));
        assert_eq!(node.remove_nodes("harddisk"), 2);
        assert_eq!(node.nodes().len(), 1);
    }
}
