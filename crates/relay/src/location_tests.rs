// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn inbound_reads_and_decodes_params() -> anyhow::Result<()> {
    let loc = PageLocation::parse(
        "http://localhost:3001/?token=abc&userName=Jane%20Doe&userEmail=jane%40x.com&userRole=admin",
    )?;
    let p = loc.inbound();
    assert_eq!(p.token.as_deref(), Some("abc"));
    assert_eq!(p.user_name.as_deref(), Some("Jane Doe"));
    assert_eq!(p.user_email.as_deref(), Some("jane@x.com"));
    assert_eq!(p.user_role.as_deref(), Some("admin"));
    assert_eq!(p.user_id, None);
    Ok(())
}

#[test]
fn empty_param_reads_as_absent() -> anyhow::Result<()> {
    let loc = PageLocation::parse("http://localhost:3001/?token=&userId=5")?;
    assert!(loc.has_param("token"));
    assert_eq!(loc.param("token"), None);
    assert_eq!(loc.param("userId").as_deref(), Some("5"));
    Ok(())
}

#[test]
fn first_value_wins_for_repeated_params() -> anyhow::Result<()> {
    let loc = PageLocation::parse("http://h/?token=one&token=two")?;
    assert_eq!(loc.param("token").as_deref(), Some("one"));
    Ok(())
}

#[test]
fn strip_params_keeps_unrelated_query() -> anyhow::Result<()> {
    let mut loc = PageLocation::parse("http://h/map?token=abc&tab=alerts&userId=3")?;
    loc.strip_params(&RELAY_PARAMS);
    assert_eq!(loc.as_str(), "http://h/map?tab=alerts");
    Ok(())
}

#[test]
fn strip_params_drops_empty_query() -> anyhow::Result<()> {
    let mut loc = PageLocation::parse("http://h/?token=abc&token=def")?;
    loc.strip_params(&[PARAM_TOKEN]);
    assert_eq!(loc.as_str(), "http://h/");
    assert!(!loc.has_param(PARAM_TOKEN));
    Ok(())
}
