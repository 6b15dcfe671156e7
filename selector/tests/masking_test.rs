//! Identity masking contract tests
//!
//! Run with: cargo test -p selector --test masking_test

use selector::masking::{FieldCategory, FieldRules, IdentityMapper, ReverseLists};

fn mapper() -> IdentityMapper {
    IdentityMapper::new(FieldRules::standard().expect("standard rules compile"))
}

const AGENT_PROFILE: &str = r#"[
  {"name": "Alice", "phone": "555-1234", "role": "backend"},
  {"name": "Bob", "phone": "555-9876", "role": "frontend"},
  {"name": "Alice", "phone": "555-1234", "role": "backend (duplicate entry)"}
]"#;

// ============================================================================
// Forward masking
// ============================================================================

#[test]
fn test_round_trip_example() {
    let mut m = mapper();
    let masked = m
        .mask(r#"{"name": "Alice", "phone": "555-1234", "x": 1}"#)
        .unwrap();
    assert_eq!(masked, r#"{"name": "ID_1", "phone": "ID_1", "x": 1}"#);

    let lists = m.build_reverse_lists();
    assert_eq!(
        lists.unmask("Contact ID_1 now").unwrap(),
        "Contact Alice (Phone: 555-1234) now"
    );
}

#[test]
fn test_same_value_gets_same_token() {
    let mut m = mapper();
    let masked = m.mask(AGENT_PROFILE).unwrap();

    assert_eq!(masked.matches(r#""name": "ID_1","#).count(), 2);
    assert_eq!(masked.matches(r#""name": "ID_2","#).count(), 1);
    assert_eq!(masked.matches(r#""phone": "ID_1","#).count(), 2);
    assert_eq!(masked.matches(r#""phone": "ID_2","#).count(), 1);
    assert_eq!(m.names().len(), 2);
    assert_eq!(m.phones().len(), 2);
}

#[test]
fn test_stability_across_calls_in_one_session() {
    let mut m = mapper();
    let first = m.mask(r#""name": "Zoe","#).unwrap();
    m.mask(r#""name": "Yan","#).unwrap();
    let again = m.mask(r#""name": "Zoe","#).unwrap();
    assert_eq!(first, again);
    assert_eq!(m.names().get("Yan").unwrap().serial(), 2);
}

#[test]
fn test_distinct_values_get_distinct_tokens() {
    let mut m = mapper();
    let doc: String = (0..50)
        .map(|i| format!("\"name\": \"agent-{i}\",\n\"phone\": \"555-{i:04}\",\n"))
        .collect();
    m.mask(&doc).unwrap();

    for registry in [m.names(), m.phones()] {
        let mut serials: Vec<u64> = registry.entries().iter().map(|(t, _)| t.serial()).collect();
        serials.sort_unstable();
        serials.dedup();
        assert_eq!(serials.len(), 50);
        assert_eq!(serials, (1..=50).collect::<Vec<u64>>());
    }
}

#[test]
fn test_sessions_are_independent() {
    let mut first = mapper();
    first.mask(r#""name": "Alice", "name": "Bob","#).unwrap();

    let mut second = mapper();
    let masked = second.mask(r#""name": "Bob","#).unwrap();
    assert_eq!(masked, r#""name": "ID_1","#);
}

#[test]
fn test_no_fields_means_no_change() {
    let mut m = mapper();
    let doc = "Agent roster\n- Alice, backend, call 555-1234\n{\"role\": \"ops\",}";
    assert_eq!(m.mask(doc).unwrap(), doc);
    assert!(m.names().is_empty());
    assert!(m.phones().is_empty());
}

#[test]
fn test_unrelated_text_is_preserved() {
    let mut m = mapper();
    let doc = "header ☃\n{\"name\": \"Łukasz\", \"team\": \"infra\"}\ntrailer \"phone\" ID_7";
    let masked = m.mask(doc).unwrap();
    assert_eq!(
        masked,
        "header ☃\n{\"name\": \"ID_1\", \"team\": \"infra\"}\ntrailer \"phone\" ID_7"
    );
}

#[test]
fn test_pass_order_does_not_matter() {
    let rules = FieldRules::standard().unwrap();

    let mut name_first = IdentityMapper::new(rules.clone());
    let a = name_first
        .mask_field(FieldCategory::Name, AGENT_PROFILE)
        .unwrap();
    let a = name_first.mask_field(FieldCategory::Phone, &a).unwrap();

    let mut phone_first = IdentityMapper::new(rules);
    let b = phone_first
        .mask_field(FieldCategory::Phone, AGENT_PROFILE)
        .unwrap();
    let b = phone_first.mask_field(FieldCategory::Name, &b).unwrap();

    assert_eq!(a, b);
    assert_eq!(a, mapper().mask(AGENT_PROFILE).unwrap());
}

#[test]
fn test_mask_is_pure_with_respect_to_input() {
    let mut m = mapper();
    let original = AGENT_PROFILE.to_string();
    let _ = m.mask(&original).unwrap();
    assert_eq!(original, AGENT_PROFILE);
}

// ============================================================================
// Reverse lists and unmasking
// ============================================================================

fn lists_for(doc: &str) -> ReverseLists {
    let mut m = mapper();
    m.mask(doc).unwrap();
    m.build_reverse_lists()
}

#[test]
fn test_reverse_lists_follow_insertion_order() {
    let lists = lists_for(AGENT_PROFILE);
    let names: Vec<(String, &str)> = lists
        .names()
        .entries()
        .iter()
        .map(|(t, v)| (t.to_string(), v.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![("ID_1".to_string(), "Alice"), ("ID_2".to_string(), "Bob")]
    );
    assert_eq!(lists.phones().entries()[1].1, "555-9876");
}

#[test]
fn test_unknown_token_degrades_gracefully() {
    let lists = lists_for(AGENT_PROFILE);
    assert_eq!(lists.unmask("ID_99").unwrap(), "Unknown (Phone: N/A)");
}

#[test]
fn test_unmask_with_empty_registries() {
    let lists = mapper().build_reverse_lists();
    assert_eq!(
        lists.unmask("Try ID_1 or ID_2.").unwrap(),
        "Try Unknown (Phone: N/A) or Unknown (Phone: N/A)."
    );
}

#[test]
fn test_unmask_replaces_every_occurrence() {
    let lists = lists_for(AGENT_PROFILE);
    let answer = "1. ID_1 for the API\n2. ID_2 for the UI\nBackup: ID_1";
    assert_eq!(
        lists.unmask(answer).unwrap(),
        "1. Alice (Phone: 555-1234) for the API\n\
         2. Bob (Phone: 555-9876) for the UI\n\
         Backup: Alice (Phone: 555-1234)"
    );
}

#[test]
fn test_unmask_leaves_other_text_alone() {
    let lists = lists_for(AGENT_PROFILE);
    let answer = "No tokens here: id_1, ID-1, IDENT_1 and ☃.";
    assert_eq!(lists.unmask(answer).unwrap(), answer);
}

#[test]
fn test_token_embedded_in_word_is_still_replaced() {
    let lists = lists_for(AGENT_PROFILE);
    assert_eq!(
        lists.unmask("agentID_2x").unwrap(),
        "agentBob (Phone: 555-9876)x"
    );
}

#[test]
fn test_name_takes_precedence_on_colliding_serials() {
    // Phone registry gets more entries than the name registry, so ID_2 exists
    // only as a phone.
    let lists = lists_for(r#""name": "Ann", "phone": "111", "phone": "222","#);
    assert_eq!(lists.unmask("ID_1").unwrap(), "Ann (Phone: 111)");
    assert_eq!(lists.unmask("ID_2").unwrap(), "Unknown (Phone: 222)");
}
