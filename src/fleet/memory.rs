use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{FlotillaError, Result};
use crate::fleet::{Fleet, MachineStatus, UnitStatus};
use crate::unit;

/// In-memory fleet backend.
///
/// Models per-unit fleet current/desired state and one synthetic machine
/// per unit. Unit operations can be forced to fail for specific names,
/// which the tests use to exercise failure recording on tasks.
#[derive(Debug, Default)]
pub struct MemoryFleet {
    units: RwLock<HashMap<String, MemoryUnit>>,
    failing: RwLock<HashSet<String>>,
}

#[derive(Debug, Clone)]
struct MemoryUnit {
    current: String,
    desired: String,
    systemd_active: String,
    systemd_sub: String,
    unit_hash: String,
}

impl MemoryFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation on the given unit name fail.
    pub async fn fail_unit(&self, name: &str) {
        self.failing.write().await.insert(name.to_string());
    }

    async fn check_failing(&self, name: &str) -> Result<()> {
        if self.failing.read().await.contains(name) {
            return Err(FlotillaError::Fleet(format!(
                "unit '{}' is unreachable",
                name
            )));
        }
        Ok(())
    }

    fn content_hash(content: &str) -> String {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    fn machine_for(name: &str, hash: &str, systemd_active: &str, systemd_sub: &str) -> MachineStatus {
        // One synthetic machine per unit, derived from the unit name so
        // repeated status calls stay stable.
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        let octet = (hasher.finish() % 250 + 2) as u8;

        MachineStatus {
            id: format!("machine-{:02x}", octet),
            ip: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, octet))),
            systemd_active: systemd_active.to_string(),
            systemd_sub: systemd_sub.to_string(),
            unit_hash: hash.to_string(),
        }
    }
}

#[async_trait]
impl Fleet for MemoryFleet {
    async fn submit(&self, name: &str, content: &str) -> Result<()> {
        self.check_failing(name).await?;
        self.units.write().await.insert(
            name.to_string(),
            MemoryUnit {
                current: "loaded".to_string(),
                desired: "loaded".to_string(),
                systemd_active: "inactive".to_string(),
                systemd_sub: "dead".to_string(),
                unit_hash: Self::content_hash(content),
            },
        );
        tracing::debug!(unit = name, "Unit submitted");
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<()> {
        self.check_failing(name).await?;
        let mut units = self.units.write().await;
        let entry = units
            .get_mut(name)
            .ok_or_else(|| FlotillaError::Fleet(format!("unit '{}' not submitted", name)))?;
        entry.current = "launched".to_string();
        entry.desired = "launched".to_string();
        entry.systemd_active = "active".to_string();
        entry.systemd_sub = "running".to_string();
        tracing::debug!(unit = name, "Unit started");
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<()> {
        self.check_failing(name).await?;
        let mut units = self.units.write().await;
        let entry = units
            .get_mut(name)
            .ok_or_else(|| FlotillaError::Fleet(format!("unit '{}' not submitted", name)))?;
        entry.current = "loaded".to_string();
        entry.desired = "loaded".to_string();
        entry.systemd_active = "inactive".to_string();
        entry.systemd_sub = "dead".to_string();
        tracing::debug!(unit = name, "Unit stopped");
        Ok(())
    }

    async fn destroy(&self, name: &str) -> Result<()> {
        self.check_failing(name).await?;
        if self.units.write().await.remove(name).is_none() {
            return Err(FlotillaError::Fleet(format!(
                "unit '{}' not submitted",
                name
            )));
        }
        tracing::debug!(unit = name, "Unit destroyed");
        Ok(())
    }

    async fn get_status(&self, pattern: &str) -> Result<Vec<UnitStatus>> {
        let units = self.units.read().await;
        let mut statuses: Vec<UnitStatus> = units
            .iter()
            .filter(|(name, _)| unit::belongs_to_group(name, pattern))
            .map(|(name, entry)| UnitStatus {
                name: name.clone(),
                slice_id: unit::slice_id(name).ok().flatten(),
                current: entry.current.clone(),
                desired: entry.desired.clone(),
                machines: vec![Self::machine_for(
                    name,
                    &entry.unit_hash,
                    &entry.systemd_active,
                    &entry.systemd_sub,
                )],
            })
            .collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(statuses)
    }

    async fn get_units(&self, pattern: &str) -> Result<Vec<String>> {
        let units = self.units.read().await;
        let mut names: Vec<String> = units
            .keys()
            .filter(|name| unit::belongs_to_group(name, pattern))
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}
