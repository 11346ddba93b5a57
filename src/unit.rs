//! Unit name grammar.
//!
//! Unit names have the form `<base>[@<slice>].<ext>`. The base must carry
//! the group name as prefix, the optional slice segment between `@` and the
//! extension identifies one replica of a scalable group, and an empty slice
//! segment (`@.`) marks a unit file as a scalable template.

use serde::{Deserialize, Serialize};

use crate::error::{FlotillaError, Result};

/// One schedulable unit file: its fleet-visible name and raw content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub content: String,
}

impl Unit {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// Returns the unit name with its file extension stripped.
///
/// The extension is everything from the last `.` on. A name without a dot is
/// returned unchanged.
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Returns the base of a unit name: the name without its extension and
/// without any `@<slice>` segment. `foo-worker@1.service` yields
/// `foo-worker`.
pub fn unit_base(name: &str) -> &str {
    let stripped = strip_extension(name);
    match stripped.find('@') {
        Some(idx) => &stripped[..idx],
        None => stripped,
    }
}

/// Extracts the slice identifier from a unit name.
///
/// Returns `None` for unscalable names, `Some("")` for scalable templates
/// (`foo@.service`) and `Some(id)` for concrete slice instances. Names
/// containing more than one `@` cannot be parsed.
pub fn slice_id(name: &str) -> Result<Option<String>> {
    if name.matches('@').count() > 1 {
        return Err(FlotillaError::InvalidUnitStatus(format!(
            "cannot parse slice ID from unit name '{}'",
            name
        )));
    }

    match name.find('@') {
        Some(idx) => {
            let rest = &name[idx + 1..];
            let id = match rest.find('.') {
                Some(dot) => &rest[..dot],
                None => rest,
            };
            Ok(Some(id.to_string()))
        }
        None => Ok(None),
    }
}

/// A unit file is a scalable template iff it carries an empty slice segment.
pub fn is_slice_template(name: &str) -> bool {
    matches!(slice_id(name), Ok(Some(ref id)) if id.is_empty())
}

/// True if the unit name belongs to the given group: the name is the group
/// itself or continues it at a `-`, `@` or `.` boundary. `foobar-1.service`
/// does not belong to group `foo`.
pub fn belongs_to_group(name: &str, group: &str) -> bool {
    match name.strip_prefix(group) {
        Some(rest) => {
            rest.is_empty()
                || rest.starts_with('-')
                || rest.starts_with('@')
                || rest.starts_with('.')
        }
        None => false,
    }
}

/// Substitutes a concrete slice identifier into a scalable template name.
/// Unscalable names are returned unchanged.
pub fn instantiate(name: &str, slice: &str) -> String {
    if is_slice_template(name) {
        name.replacen("@.", &format!("@{}.", slice), 1)
    } else {
        name.to_string()
    }
}
