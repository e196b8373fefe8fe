//! Storage volumes.
//!
//! A volume is owned by one processor unit (or, for the archive, by one CPU)
//! and shared by handle with every CPU that mounts it.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use uuid::Uuid;

use crate::persistence::ConfigNode;
use crate::runner::ds::error::{KosError, KosResult};

pub type SharedVolume = Rc<RefCell<Volume>>;

pub const FILE_NODE: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeKind {
    Archive,
    Harddisk,
}

/// A bounded store of named text files.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    id: Uuid,
    name: String,
    kind: VolumeKind,
    /// `None` means unbounded.
    capacity: Option<usize>,
    files: BTreeMap<String, String>,
}

impl Volume {
    pub fn harddisk(capacity: usize) -> Self {
        Volume {
            id: Uuid::new_v4(),
            name: String::new(),
            kind: VolumeKind::Harddisk,
            capacity: Some(capacity),
            files: BTreeMap::new(),
        }
    }

    pub fn archive(name: impl Into<String>) -> Self {
        Volume {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: VolumeKind::Archive,
            capacity: None,
            files: BTreeMap::new(),
        }
    }

    pub fn into_shared(self) -> SharedVolume {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> VolumeKind {
        self.kind
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn used_space(&self) -> usize {
        self.files.iter().map(|(n, c)| file_size(n, c)).sum()
    }

    pub fn free_space(&self) -> Option<usize> {
        self.capacity
            .map(|cap| cap.saturating_sub(self.used_space()))
    }

    /// Create or overwrite a file. Fails without writing when the volume
    /// cannot hold the new contents.
    pub fn save_file(&mut self, name: &str, content: &str) -> KosResult<()> {
        if let Some(capacity) = self.capacity {
            let replaced = self.files.get(name).map(|c| file_size(name, c)).unwrap_or(0);
            let used = self.used_space() - replaced;
            let requested = file_size(name, content);
            if used + requested > capacity {
                return Err(KosError::VolumeFull {
                    volume: self.label(),
                    requested,
                    free: capacity.saturating_sub(used),
                });
            }
        }
        self.files.insert(name.to_string(), content.to_string());
        Ok(())
    }

    pub fn read_file(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(|c| c.as_str())
    }

    pub fn delete_file(&mut self, name: &str) -> bool {
        self.files.remove(name).is_some()
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Name for messages: the volume name, or its id when unnamed.
    pub fn label(&self) -> String {
        if self.name.is_empty() {
            self.id.to_hyphenated().to_string()
        } else {
            self.name.clone()
        }
    }

    /// Serialize into a node named `node_name`.
    pub fn save(&self, node_name: &str) -> ConfigNode {
        let mut node = ConfigNode::new(node_name);
        node.add_value("uid", self.id.to_hyphenated().to_string());
        if !self.name.is_empty() {
            node.add_value("volumeName", self.name.as_str());
        }
        if let Some(capacity) = self.capacity {
            node.add_value("capacity", capacity.to_string());
        }
        for (name, content) in &self.files {
            let file = node.add_node(ConfigNode::new(FILE_NODE));
            file.add_value("name", name.as_str());
            file.add_value("content", content.as_str());
        }
        node
    }

    /// Rebuild a harddisk from a node written by [`save`](Self::save). A
    /// node without a `uid` gets a fresh identity; one without `capacity` is
    /// unbounded.
    pub fn from_node(node: &ConfigNode) -> KosResult<Self> {
        let id = match node.get_value("uid") {
            Some(raw) => Uuid::parse_str(raw).map_err(|_| KosError::InvalidValue {
                key: "uid".to_string(),
                value: raw.to_string(),
            })?,
            None => Uuid::new_v4(),
        };
        let mut volume = Volume {
            id,
            name: node.get_value("volumeName").unwrap_or("").to_string(),
            kind: VolumeKind::Harddisk,
            capacity: node.parse_value::<usize>("capacity")?,
            files: BTreeMap::new(),
        };
        for file in node.get_nodes(FILE_NODE) {
            let name = file.required_value("name")?;
            let content = file.get_value("content").unwrap_or("");
            volume.files.insert(name.to_string(), content.to_string());
        }
        Ok(volume)
    }
}

fn file_size(name: &str, content: &str) -> usize {
    name.len() + content.len()
}
