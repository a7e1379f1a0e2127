// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_profile_matches_synthesized_user() {
    let p = UserProfile::default();
    assert_eq!(p.id, "1");
    assert_eq!(p.name, "User");
    assert_eq!(p.email, "user@stms.ai");
    assert_eq!(p.role, "user");
}

#[test]
fn partial_profile_fills_missing_and_empty_fields() -> anyhow::Result<()> {
    let value = serde_json::from_str(r#"{"name":"Ada","email":"","role":null}"#)?;
    let p = PartialProfile::from_json(&value).unwrap_or_default().complete();
    assert_eq!(p.id, DEFAULT_USER_ID);
    assert_eq!(p.name, "Ada");
    assert_eq!(p.email, DEFAULT_USER_EMAIL);
    assert_eq!(p.role, DEFAULT_USER_ROLE);
    Ok(())
}

#[yare::parameterized(
    mongo_style = { r#"{"_id":"64af"}"#, "64af" },
    numeric     = { r#"{"id":42}"#, "42" },
    both_ids    = { r#"{"id":"u-1","_id":"64af"}"#, "u-1" },
    empty_id    = { r#"{"id":"","_id":"64af"}"#, "64af" },
    object_id   = { r#"{"id":{"$oid":"x"}}"#, DEFAULT_USER_ID },
)]
fn partial_profile_id_sources(raw: &str, expected: &str) {
    let value: serde_json::Value = serde_json::from_str(raw).unwrap_or_default();
    let p = PartialProfile::from_json(&value).unwrap_or_default().complete();
    assert_eq!(p.id, expected);
}

#[test]
fn mistyped_fields_read_as_absent() -> anyhow::Result<()> {
    let value = serde_json::from_str(r#"{"id":"7","name":7,"role":["admin"],"email":"a@b.c"}"#)?;
    let p = PartialProfile::from_json(&value).unwrap_or_default().complete();
    assert_eq!(p, UserProfile { id: "7".into(), email: "a@b.c".into(), ..UserProfile::default() });
    Ok(())
}

#[yare::parameterized(
    array  = { r#"["Ada"]"# },
    number = { "42" },
    string = { r#""Ada""# },
    null   = { "null" },
)]
fn non_object_is_not_a_profile(raw: &str) {
    let value: serde_json::Value = serde_json::from_str(raw).unwrap_or_default();
    assert_eq!(PartialProfile::from_json(&value), None);
}

#[test]
fn state_dir_prefers_xdg_then_home() {
    assert_eq!(
        state_dir_from(Some("/x".into()), Some("/home/u".into())),
        PathBuf::from("/x/stms/relay")
    );
    assert_eq!(
        state_dir_from(Some(String::new()), Some("/home/u".into())),
        PathBuf::from("/home/u/.local/state/stms/relay")
    );
    assert_eq!(state_dir_from(None, None), PathBuf::from(".stms/relay"));
}

#[test]
fn profile_serializes_all_four_fields() -> anyhow::Result<()> {
    let json = serde_json::to_value(UserProfile::default())?;
    assert_eq!(
        json,
        serde_json::json!({"id":"1","name":"User","email":"user@stms.ai","role":"user"})
    );
    Ok(())
}
