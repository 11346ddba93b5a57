//! Group-level status collapsing.
//!
//! A status listing spans several units, each on several machines, across
//! several slices. Slices that behave identically collapse into one display
//! row whose unit name is `*`; any divergence keeps every row visible.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fleet::UnitStatus;
use crate::unit;

/// Per-unit, per-slice status rows as returned by the fleet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitStatusList(pub Vec<UnitStatus>);

impl UnitStatusList {
    pub fn new(statuses: Vec<UnitStatus>) -> Self {
        Self(statuses)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnitStatus> {
        self.0.iter()
    }

    /// Collapse identically-behaving slice cohorts into single `*` rows.
    ///
    /// A cohort is the set of rows sharing one slice ID. It collapses iff
    /// unit hashes agree across every same-base pair of the whole input and
    /// current/desired/systemd-active agree within the cohort. Rolling
    /// upgrades therefore render uncollapsed until all slices converge.
    pub fn group(&self) -> Result<UnitStatusList> {
        // Slice keys are derived from the unit names; parse them up front
        // so a malformed name fails the whole call.
        let mut keys = Vec::with_capacity(self.0.len());
        for us in &self.0 {
            keys.push(unit::slice_id(&us.name)?.unwrap_or_default());
        }

        let hashes_equal = self.hashes_equal_across_same_base();

        let mut emitted: HashSet<&str> = HashSet::new();
        let mut grouped = Vec::new();

        for key in &keys {
            if !emitted.insert(key.as_str()) {
                continue;
            }

            let cohort: Vec<&UnitStatus> = self
                .0
                .iter()
                .enumerate()
                .filter(|(idx, _)| keys[*idx] == *key)
                .map(|(_, us)| us)
                .collect();

            if hashes_equal && states_equal(&cohort) {
                let mut collapsed = cohort[0].clone();
                collapsed.name = "*".to_string();
                grouped.push(collapsed);
            } else {
                grouped.extend(cohort.into_iter().cloned());
            }
        }

        Ok(UnitStatusList(grouped))
    }

    /// Unit hashes must agree across all rows sharing a unit base,
    /// including rows of different slices.
    fn hashes_equal_across_same_base(&self) -> bool {
        let mut seen: HashMap<&str, &str> = HashMap::new();

        for us in &self.0 {
            let base = unit::unit_base(&us.name);
            for machine in &us.machines {
                match seen.get(base) {
                    Some(hash) if *hash != machine.unit_hash => return false,
                    Some(_) => {}
                    None => {
                        seen.insert(base, machine.unit_hash.as_str());
                    }
                }
            }
        }

        true
    }
}

impl From<Vec<UnitStatus>> for UnitStatusList {
    fn from(statuses: Vec<UnitStatus>) -> Self {
        Self(statuses)
    }
}

impl IntoIterator for UnitStatusList {
    type Item = UnitStatus;
    type IntoIter = std::vec::IntoIter<UnitStatus>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Current, desired and every machine's systemd-active state must agree
/// across the cohort. Unit hashes are not compared here.
fn states_equal(cohort: &[&UnitStatus]) -> bool {
    let first = match cohort.first() {
        Some(us) => us,
        None => return true,
    };

    if !cohort
        .iter()
        .all(|us| us.current == first.current && us.desired == first.desired)
    {
        return false;
    }

    let mut machines = cohort.iter().flat_map(|us| &us.machines);
    match machines.next() {
        Some(lead) => machines.all(|m| m.systemd_active == lead.systemd_active),
        None => true,
    }
}
