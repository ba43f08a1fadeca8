use console_gate::{
    access::AccessQuery,
    permission::{PermissionSet, is_granted, normalize},
    route_table::{ROUTE_PERMISSIONS, pathname, requirement_for},
};
use serde_json::json;
use std::collections::HashMap;

// --- Helper Functions ---

fn list(keys: &[&str]) -> PermissionSet {
    PermissionSet::List(keys.iter().map(|k| k.to_string()).collect())
}

fn map(entries: &[(&str, bool)]) -> PermissionSet {
    PermissionSet::Map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<HashMap<_, _>>(),
    )
}

// --- Normalizer ---

#[test]
fn test_normalize_converts_first_dot_only() {
    assert_eq!(normalize("contacts.view"), "contacts:view");
    assert_eq!(normalize("contacts:view"), "contacts:view");
    // Later dots survive: a known ambiguity for multi-segment keys.
    assert_eq!(normalize("inbox.reply.bulk"), "inbox:reply.bulk");
    assert_eq!(normalize(""), "");
}

// --- Evaluator ---

#[test]
fn test_dot_and_colon_forms_are_equivalent() {
    let sets = vec![
        Some(list(&["contacts:view"])),
        Some(list(&["campaigns:view"])),
        Some(map(&[("contacts:view", true)])),
        Some(map(&[("contacts:view", false)])),
        Some(list(&[])),
        None,
    ];

    for held in &sets {
        assert_eq!(
            is_granted(Some("contacts.view"), held.as_ref()),
            is_granted(Some("contacts:view"), held.as_ref()),
            "forms disagree for {:?}",
            held
        );
    }
}

#[test]
fn test_broader_held_key_grants_by_prefix() {
    let held = list(&["campaigns:view:all"]);
    assert!(is_granted(Some("campaigns:view"), Some(&held)));
    assert!(is_granted(Some("campaigns.view"), Some(&held)));
    assert!(!is_granted(Some("campaigns:edit"), Some(&held)));
}

#[test]
fn test_map_form_requires_truthy_flag() {
    let denied = map(&[("contacts:view", false)]);
    let granted = map(&[("contacts:view", true)]);

    assert!(!is_granted(Some("contacts.view"), Some(&denied)));
    assert!(is_granted(Some("contacts.view"), Some(&granted)));
}

#[test]
fn test_map_form_any_truthy_prefixed_key_grants() {
    let held = map(&[("contacts:view", false), ("contacts:view:team", true)]);
    assert!(is_granted(Some("contacts:view"), Some(&held)));
}

#[test]
fn test_no_requirement_always_granted() {
    assert!(is_granted(None, None));
    assert!(is_granted(Some(""), None));
    assert!(is_granted(None, Some(&list(&[]))));
    assert!(is_granted(None, Some(&map(&[("x:y", false)]))));
}

#[test]
fn test_absent_session_is_denied() {
    assert!(!is_granted(Some("contacts.view"), None));
}

#[test]
fn test_held_keys_are_not_normalized() {
    // Only the requirement is canonicalized; a held key stored in dot form does not match.
    let held = list(&["contacts.view"]);
    assert!(!is_granted(Some("contacts:view"), Some(&held)));
}

// --- Shape Detection ---

#[test]
fn test_from_json_detects_list_form() {
    let set = PermissionSet::from_json(&json!(["team:view", 42, "inbox:view"]));
    assert_eq!(set, Some(list(&["team:view", "inbox:view"])));
}

#[test]
fn test_from_json_detects_map_form_with_truthiness() {
    let set = PermissionSet::from_json(&json!({
        "team:view": true,
        "inbox:view": 1,
        "billing:view": 0,
        "settings:view": "",
        "contacts:view": null,
    }))
    .expect("object should be read as map form");

    assert!(is_granted(Some("team.view"), Some(&set)));
    assert!(is_granted(Some("inbox.view"), Some(&set)));
    assert!(!is_granted(Some("billing.view"), Some(&set)));
    assert!(!is_granted(Some("settings.view"), Some(&set)));
    assert!(!is_granted(Some("contacts.view"), Some(&set)));
}

#[test]
fn test_from_json_malformed_shape_is_zero_permissions() {
    assert_eq!(PermissionSet::from_json(&json!("team:view")), None);
    assert_eq!(PermissionSet::from_json(&json!(7)), None);
    assert_eq!(PermissionSet::from_json(&json!(null)), None);
}

// --- Route Permission Table ---

#[test]
fn test_route_table_exact_match_only() {
    assert_eq!(requirement_for("/campaigns"), Some("campaigns.view"));
    assert_eq!(requirement_for("/campaigns/"), None);
    assert_eq!(requirement_for("/campaigns/42"), None);
    assert_eq!(requirement_for("/does-not-exist"), None);
}

#[test]
fn test_pathname_drops_query_fragment_and_trailing_slash() {
    assert_eq!(pathname("/campaigns?page=2"), "/campaigns");
    assert_eq!(pathname("/campaigns#top"), "/campaigns");
    assert_eq!(pathname("/campaigns/"), "/campaigns");
    assert_eq!(pathname("/campaigns/42"), "/campaigns/42");
    assert_eq!(pathname("/"), "/");
    assert_eq!(pathname("/?next=x"), "/");
}

#[test]
fn test_landing_route_has_no_requirement() {
    assert_eq!(requirement_for("/dashboard"), None);
}

#[test]
fn test_route_table_has_no_duplicate_paths() {
    let mut paths: Vec<_> = ROUTE_PERMISSIONS.iter().map(|(path, _)| *path).collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total);
}

// --- Access Query ---

#[test]
fn test_access_query_answers_permission_and_route() {
    let held = list(&["team:view"]);
    let access = AccessQuery::new(Some(&held));

    assert!(access.has_permission("team.view"));
    assert!(!access.has_permission("campaigns.view"));
    assert!(access.can_access_route("/team"));
    assert!(!access.can_access_route("/campaigns"));
    assert!(!access.can_access_route("/campaigns?page=2"));
    assert!(!access.can_access_route("/campaigns/"));
    // Unknown and parameterized routes are unguarded.
    assert!(access.can_access_route("/campaigns/42"));
}

#[test]
fn test_access_query_without_permissions() {
    let access = AccessQuery::new(None);
    assert!(!access.can_access_route("/contacts"));
    assert!(access.can_access_route("/dashboard"));
}
