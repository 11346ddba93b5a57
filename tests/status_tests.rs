//! Status grouping: collapsing identically-behaving slices.


use std::net::{IpAddr, Ipv4Addr};

use flotilla::controller::UnitStatusList;
use flotilla::fleet::{MachineStatus, UnitStatus};
use test_harness::{grouped_status, single_unit_status};

/// A one-machine status named `name-<i>@<slice>.service` whose state
/// fields are all derived from the given state tag.
fn tagged_status(i: usize, slice: &str, state: &str) -> UnitStatus {
    let octet: u8 = slice.parse().expect("numeric slice ID");
    UnitStatus {
        name: format!("name-{}@{}.service", i, slice),
        slice_id: Some(slice.to_string()),
        current: format!("current-state-{}", state),
        desired: format!("desired-state-{}", state),
        machines: vec![MachineStatus {
            id: format!("machine-ID-{}", slice),
            ip: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, octet))),
            systemd_active: format!("systemd-active-state-{}", state),
            systemd_sub: "running".to_string(),
            unit_hash: "1234".to_string(),
        }],
    }
}

#[test]
fn test_group_collapses_equal_slices() {
    let input = UnitStatusList::new(vec![
        single_unit_status("main", "1"),
        single_unit_status("sidekick", "1"),
        single_unit_status("main", "2"),
        single_unit_status("sidekick", "2"),
    ]);

    let output = input.group().unwrap();

    assert_eq!(output.0.len(), 2);
    assert!(output.0.contains(&grouped_status("1")));
    assert!(output.0.contains(&grouped_status("2")));
}

#[test]
fn test_group_keeps_rows_on_unit_hash_diff() {
    let input1 = single_unit_status("main", "1");
    let input2 = single_unit_status("sidekick", "1");
    let mut input3 = single_unit_status("main", "2");
    let input4 = single_unit_status("sidekick", "2");
    input3.machines[0].unit_hash = "something-else".to_string();

    let input = UnitStatusList::new(vec![
        input1.clone(),
        input2.clone(),
        input3.clone(),
        input4.clone(),
    ]);

    let output = input.group().unwrap();

    assert_eq!(output.0.len(), 4);
    assert!(output.0.contains(&input1));
    assert!(output.0.contains(&input2));
    assert!(output.0.contains(&input3));
    assert!(output.0.contains(&input4));
}

#[test]
fn test_group_expands_on_state_diff() {
    // Slice 1 disagrees with itself, slice 2 is uniform: the first cohort
    // passes through verbatim while the second still collapses.
    let input = UnitStatusList::new(vec![
        tagged_status(1, "1", "1"),
        tagged_status(2, "1", "2"),
        tagged_status(3, "2", "2"),
        tagged_status(4, "2", "2"),
    ]);

    let output = input.group().unwrap();

    let mut collapsed = tagged_status(3, "2", "2");
    collapsed.name = "*".to_string();
    let expected = vec![
        tagged_status(1, "1", "1"),
        tagged_status(2, "1", "2"),
        collapsed,
    ];
    assert_eq!(output.0, expected);
}

#[test]
fn test_group_uniform_slices_collapse_to_one_row_each() {
    let input = UnitStatusList::new(vec![
        tagged_status(1, "1", "1"),
        tagged_status(2, "1", "1"),
        tagged_status(3, "2", "2"),
        tagged_status(4, "2", "2"),
    ]);

    let output = input.group().unwrap();

    let mut first = tagged_status(1, "1", "1");
    first.name = "*".to_string();
    let mut second = tagged_status(3, "2", "2");
    second.name = "*".to_string();
    assert_eq!(output.0, vec![first, second]);
}

#[test]
fn test_group_unscalable_units_form_one_cohort() {
    let mut a = single_unit_status("main", "1");
    a.name = "unit-main.service".to_string();
    a.slice_id = None;
    let mut b = single_unit_status("sidekick", "1");
    b.name = "unit-sidekick.service".to_string();
    b.slice_id = None;

    let output = UnitStatusList::new(vec![a.clone(), b]).group().unwrap();

    let mut expected = a;
    expected.name = "*".to_string();
    assert_eq!(output.0, vec![expected]);
}

#[test]
fn test_group_rejects_unparseable_names() {
    let mut status = single_unit_status("main", "1");
    status.name = "unit-ma@in@1.service".to_string();

    let err = UnitStatusList::new(vec![status])
        .group()
        .expect_err("names with two @ cannot be grouped");
    assert!(err.is_invalid_unit_status());
}
