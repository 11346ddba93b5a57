//! Request model and slice expansion.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{FlotillaError, Result};
use crate::store::UnitStore;
use crate::unit::{self, Unit};

/// Construction parameters for a [`Request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    pub group: String,
    pub slice_ids: Option<Vec<String>>,
    pub desired_slices: usize,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            group: String::new(),
            slice_ids: None,
            desired_slices: 1,
        }
    }
}

/// A group-level operation request.
///
/// `slice_ids` carries the three-way targeting intent: `None` addresses the
/// group as a single non-scaled entity, `Some([])` addresses all existing
/// slices, and a populated list addresses exactly those slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub group: String,
    pub units: Vec<Unit>,
    pub desired_slices: usize,
    pub slice_ids: Option<Vec<String>>,
}

impl Request {
    pub fn new(config: RequestConfig) -> Self {
        Self {
            group: config.group,
            units: Vec::new(),
            desired_slices: config.desired_slices,
            slice_ids: config.slice_ids,
        }
    }

    /// Build a submit request for a group from its unit files.
    ///
    /// A group is scalable iff any of its unit files is a slice template.
    /// Unscalable groups only accept a scale of 1.
    pub fn from_unit_store(store: &dyn UnitStore, group: &str, scale: usize) -> Result<Self> {
        let units = store.list_group(group)?;
        let scalable = units.iter().any(|u| unit::is_slice_template(&u.name));

        if !scalable && scale != 1 {
            return Err(FlotillaError::InvalidArgument(format!(
                "group '{}' is not scalable, requested scale {}",
                group, scale
            )));
        }

        Ok(Self {
            group: group.to_string(),
            units,
            desired_slices: if scalable { scale } else { 1 },
            slice_ids: if scalable { Some(Vec::new()) } else { None },
        })
    }

    pub fn is_scalable(&self) -> bool {
        self.units.iter().any(|u| unit::is_slice_template(&u.name))
    }

    /// True if the given unit name falls into this request's target set.
    pub fn selects(&self, name: &str) -> bool {
        match &self.slice_ids {
            None => true,
            Some(ids) if ids.is_empty() => true,
            Some(ids) => match unit::slice_id(name) {
                Ok(Some(slice)) => ids.contains(&slice),
                _ => false,
            },
        }
    }
}

/// Generate `count` slice identifiers: random lowercase 3-hex strings,
/// unique within one request.
pub fn generate_slice_ids(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(count);

    while ids.len() < count {
        let id = format!("{:03x}", rng.gen_range(0..0x1000));
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }

    ids
}
