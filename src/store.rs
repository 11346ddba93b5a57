//! Unit file store.
//!
//! Group unit files live as `<group>/<file>` entries. The store is a
//! read-only enumeration consumed by the request builder; everything else
//! goes through the fleet.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::unit::Unit;

/// Read-only enumeration of a group's unit files.
pub trait UnitStore: Send + Sync {
    /// All unit files of the given group, sorted by name.
    fn list_group(&self, group: &str) -> Result<Vec<Unit>>;
}

/// Filesystem-backed store reading `<root>/<group>/<file>`.
#[derive(Debug, Clone)]
pub struct FsUnitStore {
    root: PathBuf,
}

impl FsUnitStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl UnitStore for FsUnitStore {
    fn list_group(&self, group: &str) -> Result<Vec<Unit>> {
        let dir = self.root.join(group);
        let mut units = Vec::new();

        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let content = fs::read_to_string(entry.path())?;
            units.push(Unit::new(name, content));
        }

        units.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(units)
    }
}

/// In-memory store for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryUnitStore {
    // group -> unit name -> content; BTreeMap keeps listing order stable.
    groups: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemoryUnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: &str, name: &str, content: &str) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(name.to_string(), content.to_string());
    }
}

impl UnitStore for MemoryUnitStore {
    fn list_group(&self, group: &str) -> Result<Vec<Unit>> {
        let files = self.groups.get(group).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no unit files for group '{}'", group),
            )
        })?;

        Ok(files
            .iter()
            .map(|(name, content)| Unit::new(name.clone(), content.clone()))
            .collect())
    }
}
