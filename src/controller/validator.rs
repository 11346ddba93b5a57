//! Request validation.
//!
//! Rules are checked in a fixed order and the first violation wins, so a
//! request failing several rules always reports the same kind.

use std::collections::HashSet;

use crate::controller::request::Request;
use crate::error::{FlotillaError, Result};
use crate::unit;

/// Validate a single request.
pub fn validate_request(request: &Request) -> Result<()> {
    if request.units.is_empty() {
        return Err(FlotillaError::NoUnitsInGroup(request.group.clone()));
    }

    if request.group.contains('@') {
        return Err(FlotillaError::AtInGroupName(request.group.clone()));
    }

    for u in &request.units {
        if !has_group_prefix(&u.name, &request.group) {
            return Err(FlotillaError::BadUnitPrefix {
                unit: u.name.clone(),
                group: request.group.clone(),
            });
        }
    }

    for u in &request.units {
        if u.name.matches('@').count() > 1 {
            return Err(FlotillaError::MultipleAtInUnitName(u.name.clone()));
        }
    }

    let mut seen = HashSet::new();
    for u in &request.units {
        if !seen.insert(u.name.as_str()) {
            return Err(FlotillaError::UnitsSameName(u.name.clone()));
        }
    }

    let scalable = request.units.iter().filter(|u| u.name.contains('@')).count();
    if scalable != 0 && scalable != request.units.len() {
        return Err(FlotillaError::MixedSliceInstance(request.group.clone()));
    }

    Ok(())
}

/// Validate a set of requests against each other.
pub fn validate_multiple_request(requests: &[Request]) -> Result<()> {
    for (i, a) in requests.iter().enumerate() {
        for b in &requests[i + 1..] {
            if a.group == b.group {
                return Err(FlotillaError::GroupsSameName(a.group.clone()));
            }
        }
    }

    // A plain character-level prefix test: "bat" conflicts with "batman",
    // while "batwoman" and "batman" coexist.
    for a in requests {
        for b in requests {
            if a.group != b.group && b.group.starts_with(&a.group) {
                return Err(FlotillaError::GroupsArePrefix(
                    a.group.clone(),
                    b.group.clone(),
                ));
            }
        }
    }

    Ok(())
}

/// The unit base (extension and slice segment stripped) must be the group
/// name itself or the group name followed by `-` and a nonempty remainder.
fn has_group_prefix(unit_name: &str, group: &str) -> bool {
    let base = unit::unit_base(unit_name);
    if base == group {
        return true;
    }
    match base.strip_prefix(group) {
        Some(rest) => rest.starts_with('-') && rest.len() > 1,
        None => false,
    }
}
