//! Fleet transport interface.
//!
//! The fleet is the external cluster scheduler that places units on
//! machines. The controller only consumes the small capability set below;
//! the wire transport behind it is interchangeable. [`MemoryFleet`] is the
//! in-process implementation used by the tests and the CLI.

use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod memory;

pub use memory::MemoryFleet;

/// Capability set the controller consumes from the cluster scheduler.
#[async_trait]
pub trait Fleet: Send + Sync {
    /// Submit a unit file under the given name.
    async fn submit(&self, name: &str, content: &str) -> Result<()>;

    /// Start a submitted unit.
    async fn start(&self, name: &str) -> Result<()>;

    /// Stop a running unit.
    async fn stop(&self, name: &str) -> Result<()>;

    /// Remove a unit definition from the fleet.
    async fn destroy(&self, name: &str) -> Result<()>;

    /// Status of every unit belonging to the given group.
    async fn get_status(&self, pattern: &str) -> Result<Vec<UnitStatus>>;

    /// Names of currently submitted units belonging to the given group.
    async fn get_units(&self, pattern: &str) -> Result<Vec<String>>;
}

/// A unit's condition as reported by the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStatus {
    pub name: String,
    pub slice_id: Option<String>,
    pub current: String,
    pub desired: String,
    pub machines: Vec<MachineStatus>,
}

/// Per-machine state of a unit, one entry per host the unit is placed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineStatus {
    pub id: String,
    pub ip: Option<IpAddr>,
    pub systemd_active: String,
    pub systemd_sub: String,
    pub unit_hash: String,
}
