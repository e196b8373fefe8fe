//! Runtime configuration file parsing.

use std::fs;
use std::path::Path;

use crate::persistence::{parse_document, ConfigNode};
use crate::runner::ds::error::KosResult;

/// Node holding the settings inside a configuration document.
pub const CONFIG_NODE: &str = "KOS";

/// Settings shared by every processor unit created from them.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Context the CPU's binding manager is built for.
    pub context: String,
    /// Capacity in bytes of a freshly allocated local volume.
    pub harddisk_capacity: usize,
    /// Name given to each CPU's archive volume.
    pub archive_name: String,
    /// Electric charge a powered CPU draws per second of simulation time.
    pub power_draw_per_second: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            context: "ksp".to_string(),
            harddisk_capacity: 10000,
            archive_name: "Archive".to_string(),
            power_draw_per_second: 0.05,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a persisted node file.
    ///
    /// Expected format:
    /// ```text
    /// KOS
    /// {
    ///     context = ksp
    ///     harddiskCapacity = 10000
    ///     archiveName = Archive
    ///     powerDrawPerSecond = 0.05
    /// }
    /// ```
    pub fn load(path: &Path) -> KosResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration text. Settings may sit inside a `KOS` node or at
    /// the top level; anything missing keeps its default.
    pub fn parse(content: &str) -> KosResult<Self> {
        let root = parse_document(content)?;
        let node = root.get_node(CONFIG_NODE).unwrap_or(&root);
        Self::from_node(node)
    }

    pub fn from_node(node: &ConfigNode) -> KosResult<Self> {
        let mut config = RuntimeConfig::default();
        if let Some(context) = node.get_value("context") {
            config.context = context.to_string();
        }
        if let Some(capacity) = node.parse_value::<usize>("harddiskCapacity")? {
            config.harddisk_capacity = capacity;
        }
        if let Some(name) = node.get_value("archiveName") {
            config.archive_name = name.to_string();
        }
        if let Some(draw) = node.parse_value::<f64>("powerDrawPerSecond")? {
            config.power_draw_per_second = draw;
        }
        Ok(config)
    }
}
