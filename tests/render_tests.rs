//! Status table rendering contract.


use flotilla::controller::UnitStatusList;
use flotilla::render::status_table;
use test_harness::single_unit_status;

#[test]
fn test_table_header_and_rows() {
    let list = UnitStatusList::new(vec![single_unit_status("main", "1")]);

    let rows = status_table("app", &list, false);

    assert_eq!(rows[0], "Group | Units | FDState | FCState | SAState | IP | Machine");
    assert_eq!(rows[1], "");
    assert_eq!(
        rows[2],
        "app@1 | unit-main@1 | loaded | loaded | dead | 10.0.0.101 | machine1"
    );
}

#[test]
fn test_table_verbose_adds_hash_column() {
    let list = UnitStatusList::new(vec![single_unit_status("main", "1")]);

    let rows = status_table("app", &list, true);

    assert_eq!(
        rows[0],
        "Group | Units | FDState | FCState | SAState | Hash | IP | Machine"
    );
    assert_eq!(
        rows[2],
        "app@1 | unit-main@1 | loaded | loaded | dead | 1234 | 10.0.0.101 | machine1"
    );
}

#[test]
fn test_table_group_cell_without_slice_suffix() {
    let mut status = single_unit_status("main", "1");
    status.name = "app-main.service".to_string();
    status.slice_id = None;
    let list = UnitStatusList::new(vec![status]);

    let rows = status_table("app", &list, false);

    assert!(rows[2].starts_with("app | app-main.service |"));
}

#[test]
fn test_table_placeholder_for_unplaced_units() {
    let mut status = single_unit_status("main", "1");
    status.machines.clear();
    let list = UnitStatusList::new(vec![status]);

    let rows = status_table("app", &list, false);

    assert_eq!(rows[2], "app@1 | unit-main@1 | loaded | loaded | - | - | -");
}
