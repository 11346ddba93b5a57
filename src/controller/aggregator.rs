//! Status aggregation.
//!
//! Four independent state variables describe a unit on one machine: fleet
//! current (`fc`), fleet desired (`fd`), systemd active (`sa`) and systemd
//! sub (`ss`). [`STATUS_INDEX`] maps observed tuples onto one semantic
//! [`Status`]; earlier rows take precedence when several match.

use serde::{Deserialize, Serialize};

use crate::error::{FlotillaError, Result};
use crate::fleet::UnitStatus;

/// Semantic unit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Failed,
    NotFound,
    Running,
    Starting,
    Stopped,
    Stopping,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Failed => write!(f, "failed"),
            Status::NotFound => write!(f, "not-found"),
            Status::Running => write!(f, "running"),
            Status::Starting => write!(f, "starting"),
            Status::Stopped => write!(f, "stopped"),
            Status::Stopping => write!(f, "stopping"),
        }
    }
}

/// Pattern over one observed state variable: anything, or one of a fixed
/// set of literal tokens.
#[derive(Debug, Clone, Copy)]
pub enum StatePattern {
    Any,
    OneOf(&'static [&'static str]),
}

impl StatePattern {
    fn matches(&self, observed: &str) -> bool {
        match self {
            StatePattern::Any => true,
            StatePattern::OneOf(tokens) => tokens.contains(&observed),
        }
    }
}

/// One row of the aggregation rule table.
#[derive(Debug, Clone, Copy)]
pub struct StatusContext {
    pub fleet_current: StatePattern,
    pub fleet_desired: StatePattern,
    pub systemd_active: StatePattern,
    pub systemd_sub: StatePattern,
    pub aggregated: Status,
}

/// The aggregation rule table. Order is significant.
pub const STATUS_INDEX: &[StatusContext] = &[
    StatusContext {
        fleet_current: StatePattern::OneOf(&["inactive"]),
        fleet_desired: StatePattern::OneOf(&["launched"]),
        systemd_active: StatePattern::OneOf(&["active"]),
        systemd_sub: StatePattern::OneOf(&["running"]),
        aggregated: Status::Running,
    },
    StatusContext {
        fleet_current: StatePattern::OneOf(&["inactive"]),
        fleet_desired: StatePattern::Any,
        systemd_active: StatePattern::Any,
        systemd_sub: StatePattern::Any,
        aggregated: Status::Stopped,
    },
    StatusContext {
        fleet_current: StatePattern::OneOf(&["loaded", "launched"]),
        fleet_desired: StatePattern::Any,
        systemd_active: StatePattern::OneOf(&["inactive"]),
        systemd_sub: StatePattern::Any,
        aggregated: Status::Stopped,
    },
    StatusContext {
        fleet_current: StatePattern::OneOf(&["loaded", "launched"]),
        fleet_desired: StatePattern::Any,
        systemd_active: StatePattern::OneOf(&["failed"]),
        systemd_sub: StatePattern::Any,
        aggregated: Status::Failed,
    },
    StatusContext {
        fleet_current: StatePattern::OneOf(&["loaded", "launched"]),
        fleet_desired: StatePattern::Any,
        systemd_active: StatePattern::OneOf(&["activating"]),
        systemd_sub: StatePattern::Any,
        aggregated: Status::Starting,
    },
    StatusContext {
        fleet_current: StatePattern::OneOf(&["loaded", "launched"]),
        fleet_desired: StatePattern::Any,
        systemd_active: StatePattern::OneOf(&["deactivating"]),
        systemd_sub: StatePattern::Any,
        aggregated: Status::Stopping,
    },
    StatusContext {
        fleet_current: StatePattern::OneOf(&["loaded", "launched"]),
        fleet_desired: StatePattern::Any,
        systemd_active: StatePattern::OneOf(&["active", "reloading"]),
        systemd_sub: StatePattern::OneOf(&["stop-sigterm", "stop-post", "stop"]),
        aggregated: Status::Stopping,
    },
    StatusContext {
        fleet_current: StatePattern::OneOf(&["loaded", "launched"]),
        fleet_desired: StatePattern::Any,
        systemd_active: StatePattern::OneOf(&["active", "reloading"]),
        systemd_sub: StatePattern::OneOf(&[
            "auto-restart",
            "launched",
            "start-pre",
            "start-post",
            "start",
            "dead",
        ]),
        aggregated: Status::Starting,
    },
    StatusContext {
        fleet_current: StatePattern::OneOf(&["loaded", "launched"]),
        fleet_desired: StatePattern::Any,
        systemd_active: StatePattern::OneOf(&["active", "reloading"]),
        systemd_sub: StatePattern::OneOf(&["exited", "running"]),
        aggregated: Status::Running,
    },
];

/// Map an observed (fc, fd, sa, ss) tuple onto a semantic status.
///
/// The table is scanned in order and every matching row collected. No match
/// is an error; several matches emit a warning and the first row wins.
pub fn aggregate_status(fc: &str, fd: &str, sa: &str, ss: &str) -> Result<Status> {
    let matched: Vec<Status> = STATUS_INDEX
        .iter()
        .filter(|ctx| {
            ctx.fleet_current.matches(fc)
                && ctx.fleet_desired.matches(fd)
                && ctx.systemd_active.matches(sa)
                && ctx.systemd_sub.matches(ss)
        })
        .map(|ctx| ctx.aggregated)
        .collect();

    match matched.first() {
        None => Err(FlotillaError::InvalidUnitStatus(format!(
            "fc: {}, fd: {}, sa: {}, ss: {}",
            fc, fd, sa, ss
        ))),
        Some(first) => {
            if matched.len() > 1 {
                tracing::warn!(fc, fd, sa, ss, "Multiple statuses found");
            }
            Ok(*first)
        }
    }
}

/// True iff any machine row of the unit aggregates into the queried set.
pub fn unit_has_status(us: &UnitStatus, statuses: &[Status]) -> Result<bool> {
    if statuses.is_empty() {
        return Err(FlotillaError::InvalidArgument(
            "no statuses to compare against".to_string(),
        ));
    }

    for machine in &us.machines {
        let aggregated = aggregate_status(
            &us.current,
            &us.desired,
            &machine.systemd_active,
            &machine.systemd_sub,
        )?;
        if statuses.contains(&aggregated) {
            return Ok(true);
        }
    }

    Ok(false)
}
