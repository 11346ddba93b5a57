//! Status table rendering for the CLI.

use crate::controller::UnitStatusList;
use crate::fleet::MachineStatus;

/// Render a status listing as `" | "`-separated rows, one per machine.
///
/// The group cell carries a trailing `@<sliceID>` iff the row's slice ID is
/// nonempty; verbose mode adds the unit hash column. Units the fleet has
/// not placed anywhere render a single placeholder machine row.
pub fn status_table(group: &str, usl: &UnitStatusList, verbose: bool) -> Vec<String> {
    let mut rows = Vec::new();

    if verbose {
        rows.push("Group | Units | FDState | FCState | SAState | Hash | IP | Machine".to_string());
    } else {
        rows.push("Group | Units | FDState | FCState | SAState | IP | Machine".to_string());
    }
    rows.push(String::new());

    let placeholder = MachineStatus {
        id: "-".to_string(),
        ip: None,
        systemd_active: "-".to_string(),
        systemd_sub: "-".to_string(),
        unit_hash: "-".to_string(),
    };

    for us in usl.iter() {
        let group_cell = match &us.slice_id {
            Some(id) if !id.is_empty() => format!("{}@{}", group, id),
            _ => group.to_string(),
        };

        let machines: Vec<&MachineStatus> = if us.machines.is_empty() {
            vec![&placeholder]
        } else {
            us.machines.iter().collect()
        };

        for machine in machines {
            let ip = machine
                .ip
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "-".to_string());

            let row = if verbose {
                format!(
                    "{} | {} | {} | {} | {} | {} | {} | {}",
                    group_cell,
                    us.name,
                    us.desired,
                    us.current,
                    machine.systemd_active,
                    machine.unit_hash,
                    ip,
                    machine.id
                )
            } else {
                format!(
                    "{} | {} | {} | {} | {} | {} | {}",
                    group_cell, us.name, us.desired, us.current, machine.systemd_active, ip, machine.id
                )
            };
            rows.push(row);
        }
    }

    rows
}
