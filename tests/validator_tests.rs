//! Validation rules for single and multiple group requests.

use flotilla::controller::{validate_multiple_request, validate_request, Request, RequestConfig};
use flotilla::unit::Unit;
use flotilla::FlotillaError;

fn request(group: &str, unit_names: &[&str]) -> Request {
    let mut request = Request::new(RequestConfig {
        group: group.to_string(),
        ..RequestConfig::default()
    });
    request.units = unit_names
        .iter()
        .map(|name| Unit::new(*name, "some content"))
        .collect();
    request
}

#[test]
fn test_validate_request() {
    struct Case {
        request: Request,
        valid: bool,
        check: Option<fn(&FlotillaError) -> bool>,
    }

    let cases = [
        // A group with no units in it is not valid.
        Case {
            request: request("empty", &[]),
            valid: false,
            check: Some(FlotillaError::is_no_units_in_group),
        },
        // A group with one well-named unit is valid.
        Case {
            request: request("single", &["single-unit.service"]),
            valid: true,
            check: None,
        },
        // A group with two well-named units is valid.
        Case {
            request: request("single", &["single-unit.service", "single-unit2.timer"]),
            valid: true,
            check: None,
        },
        // A group with a scalable unit is valid.
        Case {
            request: request("scalable", &["scalable-unit@.service"]),
            valid: true,
            check: None,
        },
        // A group with two scalable units is valid.
        Case {
            request: request("scalable", &["scalable-unit@.service", "scalable-unit2@.timer"]),
            valid: true,
            check: None,
        },
        // A group mixing scalable and unscalable units is not valid.
        Case {
            request: request("mix", &["mix-unit1.service", "mix-unit2@.service"]),
            valid: false,
            check: Some(FlotillaError::is_mixed_slice_instance),
        },
        // Units must be prefixed with their group name.
        Case {
            request: request("single", &["bad-prefix.service"]),
            valid: false,
            check: Some(FlotillaError::is_bad_unit_prefix),
        },
        // The group prefix must sit on a hyphen boundary.
        Case {
            request: request("single", &["singleunit.service"]),
            valid: false,
            check: Some(FlotillaError::is_bad_unit_prefix),
        },
        // A unit named exactly like its group is valid.
        Case {
            request: request("exact", &["exact.service"]),
            valid: true,
            check: None,
        },
        // Group names cannot contain @ symbols.
        Case {
            request: request("bad@groupname@", &["bad@groupname@.service"]),
            valid: false,
            check: Some(FlotillaError::is_at_in_group_name),
        },
        // Unit names cannot contain multiple @ symbols.
        Case {
            request: request("group", &["group-un@it@.service"]),
            valid: false,
            check: Some(FlotillaError::is_multiple_at_in_unit_name),
        },
        // A group cannot have multiple units with the same name.
        Case {
            request: request(
                "group",
                &[
                    "group-unit1@.service",
                    "group-unit@.service",
                    "group-unit2@.service",
                    "group-unit@.service",
                ],
            ),
            valid: false,
            check: Some(FlotillaError::is_units_same_name),
        },
    ];

    for (index, case) in cases.iter().enumerate() {
        let result = validate_request(&case.request);
        match (&result, case.valid) {
            (Ok(()), true) => {}
            (Ok(()), false) => panic!("case {}: request should be invalid", index),
            (Err(err), true) => panic!("case {}: request should be valid, got '{}'", index, err),
            (Err(err), false) => {
                let check = case.check.expect("invalid case needs an error check");
                assert!(check(err), "case {}: wrong error kind '{}'", index, err);
            }
        }
    }
}

#[test]
fn test_validate_multiple_request() {
    struct Case {
        groups: &'static [&'static str],
        valid: bool,
        check: Option<fn(&FlotillaError) -> bool>,
    }

    let cases = [
        // Two differently named groups are valid.
        Case {
            groups: &["a", "b"],
            valid: true,
            check: None,
        },
        // Groups which are prefixes of another are invalid.
        Case {
            groups: &["bat", "batman"],
            valid: false,
            check: Some(FlotillaError::is_groups_are_prefix),
        },
        // The prefix rule applies to the entire group name.
        Case {
            groups: &["batwoman", "batman"],
            valid: true,
            check: None,
        },
        // Group names must be unique.
        Case {
            groups: &["joker", "joker"],
            valid: false,
            check: Some(FlotillaError::is_groups_same_name),
        },
    ];

    for (index, case) in cases.iter().enumerate() {
        let requests: Vec<Request> = case.groups.iter().map(|g| request(g, &[])).collect();
        let result = validate_multiple_request(&requests);
        match (&result, case.valid) {
            (Ok(()), true) => {}
            (Ok(()), false) => panic!("case {}: requests should be invalid", index),
            (Err(err), true) => panic!("case {}: requests should be valid, got '{}'", index, err),
            (Err(err), false) => {
                let check = case.check.expect("invalid case needs an error check");
                assert!(check(err), "case {}: wrong error kind '{}'", index, err);
            }
        }
    }
}
