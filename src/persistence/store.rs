//! Key-value storage for values that outlive any single save file, such as
//! the counter processor unit IDs are allocated from.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;

use super::api::{parse_document, write_document};
use super::node::ConfigNode;
use crate::runner::ds::error::KosResult;

/// Key under which the highest allocated unit ID is kept.
pub const CPU_ID_KEY: &str = "CpuIDMax";

/// A store shared by every processor unit allocating from it.
pub type SharedStore = Rc<RefCell<dyn KeyValueStore>>;

/// An external store of integer settings.
///
/// `load` and `save` bracket every read-modify-write so that several
/// processes sharing one backing file see each other's allocations.
pub trait KeyValueStore {
    fn load(&mut self) -> KosResult<()>;
    /// A value that is present but not an integer is an error, never
    /// `None`.
    fn get_int(&self, key: &str) -> KosResult<Option<i64>>;
    fn set_int(&mut self, key: &str, value: i64);
    fn save(&mut self) -> KosResult<()>;
}

/// Allocate the next unit ID: read the persisted maximum, bump it, persist it
/// and hand it out. IDs start at 1.
pub fn assign_new_id(store: &mut dyn KeyValueStore) -> KosResult<i64> {
    store.load()?;
    let id = store.get_int(CPU_ID_KEY)?.unwrap_or(0) + 1;
    store.set_int(CPU_ID_KEY, id);
    store.save()?;
    debug!("assigned processor unit id {}", id);
    Ok(id)
}

/// Volatile store, for tests and hosts without a settings directory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, i64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn into_shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&mut self) -> KosResult<()> {
        Ok(())
    }

    fn get_int(&self, key: &str) -> KosResult<Option<i64>> {
        Ok(self.values.get(key).copied())
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }

    fn save(&mut self) -> KosResult<()> {
        Ok(())
    }
}

/// Store backed by a persisted node document on disk. A missing file reads
/// as an empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    root: ConfigNode,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            root: ConfigNode::new(""),
        }
    }

    /// Store for one settings owner, kept as `<dir>/<owner>.cfg`.
    pub fn for_owner(dir: &Path, owner: &str) -> Self {
        FileStore::new(dir.join(format!("{}.cfg", owner)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn into_shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }
}

impl KeyValueStore for FileStore {
    fn load(&mut self) -> KosResult<()> {
        self.root = if self.path.exists() {
            parse_document(&fs::read_to_string(&self.path)?)?
        } else {
            ConfigNode::new("")
        };
        Ok(())
    }

    fn get_int(&self, key: &str) -> KosResult<Option<i64>> {
        self.root.parse_value::<i64>(key)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.root.set_value(key, value.to_string());
    }

    fn save(&mut self) -> KosResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.path, write_document(&self.root))?;
        Ok(())
    }
}
