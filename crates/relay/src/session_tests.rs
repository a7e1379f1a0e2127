// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use proptest::prelude::*;

use super::*;
use crate::backend::{BackendError, LoginSuccess};
use crate::credential::{UserProfile, SESSION_TOKEN_KEY, TOKEN_KEY, USER_KEY};
use crate::location::PARAM_TOKEN;
use crate::redirect::dispatcher::{DispatchError, RedirectDispatcher};
use crate::redirect::RedirectIntent;
use crate::test_support::{RecordingNavigator, StubBackend};

fn page(url: &str) -> anyhow::Result<PageLocation> {
    PageLocation::parse(url)
}

#[test]
fn url_arrival_persists_and_strips() -> anyhow::Result<()> {
    let store = CredentialStore::in_memory();
    let mut loc = page(
        "http://localhost:3001/?token=abc&userId=7&userName=Ada%2520L&userEmail=ada%2540x.io&userRole=admin&tab=map",
    )?;

    let auth = bootstrap(&mut loc, &store)?;
    assert_eq!(auth.token, "abc");
    assert_eq!(auth.token_source, TokenSource::Url);
    assert_eq!(auth.profile_source, ProfileSource::Url);
    assert_eq!(
        auth.profile,
        UserProfile {
            id: "7".into(),
            name: "Ada L".into(),
            email: "ada@x.io".into(),
            role: "admin".into(),
        }
    );

    assert_eq!(loc.as_str(), "http://localhost:3001/?tab=map");
    assert_eq!(store.durable_token().as_deref(), Some("abc"));
    assert_eq!(store.session_token().as_deref(), Some("abc"));
    assert!(store.stored_profile().is_some());
    Ok(())
}

#[test]
fn stored_session_leaves_url_alone() -> anyhow::Result<()> {
    let store = CredentialStore::in_memory();
    store.save_token("kept");
    let mut loc = page("http://localhost:3001/?userName=Spoof&userEmail=s%40x.io")?;

    let auth = bootstrap(&mut loc, &store)?;
    assert_eq!(auth.token_source, TokenSource::Durable);
    // Profile fields still come from the URL; only a URL token triggers stripping.
    assert_eq!(auth.profile.name, "Spoof");
    assert!(loc.has_param("userName"));
    Ok(())
}

#[test]
fn nothing_resolvable_is_unauthenticated() -> anyhow::Result<()> {
    let store = CredentialStore::in_memory();
    let mut loc = page("http://localhost:3001/?tab=map")?;
    let err = match bootstrap(&mut loc, &store) {
        Ok(auth) => anyhow::bail!("unexpected auth: {auth:?}"),
        Err(e) => e,
    };
    assert_eq!(err.code, ErrorCode::Unauthenticated);
    assert_eq!(loc.as_str(), "http://localhost:3001/?tab=map");
    assert!(store.stored_profile().is_none(), "no profile written without a token");
    Ok(())
}

#[tokio::test]
async fn unauthenticated_page_never_dispatches() -> anyhow::Result<()> {
    let store = CredentialStore::in_memory();
    let backend = Arc::new(StubBackend::issuing("dash"));
    let navigator = Arc::new(RecordingNavigator::new());
    let dispatcher = RedirectDispatcher::new(
        Arc::clone(&backend) as _,
        Arc::clone(&navigator) as _,
        Url::parse("http://localhost:3001")?,
        "test",
    );

    let mut loc = page("http://localhost:3000/relay")?;
    let auth = bootstrap(&mut loc, &store).ok();
    let result = dispatcher.dispatch(auth.as_ref()).await;
    assert!(matches!(result, Err(DispatchError::Precondition(_))));
    assert_eq!(backend.exchange_calls(), 0);
    assert!(navigator.history().is_empty());
    Ok(())
}

#[test]
fn current_reads_storage_only() -> anyhow::Result<()> {
    let store = CredentialStore::in_memory();
    store.session().set(SESSION_TOKEN_KEY, "from-session")?;

    let auth = current(&store)?;
    assert_eq!(auth.token, "from-session");
    assert_eq!(auth.token_source, TokenSource::Session);
    assert_eq!(auth.profile, UserProfile::default());
    assert_eq!(store.durable().get(TOKEN_KEY).as_deref(), Some("from-session"));
    Ok(())
}

#[tokio::test]
async fn login_persists_token_and_completed_profile() -> anyhow::Result<()> {
    let store = CredentialStore::in_memory();
    let user = PartialProfile { id: Some("9".into()), email: Some("op@x.io".into()), ..Default::default() };
    let backend = StubBackend::issuing("dash")
        .with_login(Ok(LoginSuccess { token: "bearer".into(), user: Some(user) }));

    let auth = login(&backend, &store, "op@x.io", "pw").await?;
    assert_eq!(auth.token, "bearer");
    assert_eq!(auth.profile.id, "9");
    assert_eq!(auth.profile.name, "User");
    assert_eq!(auth.profile.role, "user");
    assert_eq!(backend.login_calls(), 1);

    assert_eq!(store.durable_token().as_deref(), Some("bearer"));
    assert_eq!(store.session_token().as_deref(), Some("bearer"));
    let stored: UserProfile = serde_json::from_str(&store.stored_profile().unwrap_or_default())?;
    assert_eq!(stored, auth.profile);
    Ok(())
}

#[tokio::test]
async fn rejected_login_keeps_backend_message() -> anyhow::Result<()> {
    let store = CredentialStore::in_memory();
    let backend = StubBackend::issuing("dash")
        .with_login(Err(BackendError::status(401, "Invalid credentials")));

    let err = match login(&backend, &store, "a@b.c", "nope").await {
        Ok(auth) => anyhow::bail!("unexpected auth: {auth:?}"),
        Err(e) => e,
    };
    assert_eq!(err.code, ErrorCode::Unauthenticated);
    assert_eq!(err.message, "Invalid credentials");
    assert!(store.durable_token().is_none());
    Ok(())
}

#[tokio::test]
async fn logout_clears_and_navigates() -> anyhow::Result<()> {
    let store = CredentialStore::in_memory();
    store.save_token("t");
    store.save_profile(&UserProfile::default());
    store.durable().set("theme", "dark")?;
    let navigator = RecordingNavigator::new();

    let url = logout(&store, &navigator, &Url::parse("http://localhost:3000")?).await?;
    assert_eq!(url.as_str(), "http://localhost:3000/logout");
    assert_eq!(navigator.history(), vec![Navigation::Assign(url)]);
    assert!(store.durable().get(TOKEN_KEY).is_none());
    assert!(store.durable().get(USER_KEY).is_none());
    assert!(store.session_token().is_none());
    assert_eq!(store.durable().get("theme").as_deref(), Some("dark"));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn login_redirect_waits_for_delay() -> anyhow::Result<()> {
    let navigator = RecordingNavigator::new();
    let started = tokio::time::Instant::now();
    let url = redirect_to_login(
        &navigator,
        &Url::parse("http://localhost:3000")?,
        Duration::from_millis(1500),
    )
    .await?;
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert_eq!(url.as_str(), "http://localhost:3000/login");
    assert_eq!(navigator.history().len(), 1);
    Ok(())
}

#[yare::parameterized(
    plain = { "Jane Doe", "jane@x.com" },
    literal_escape = { "Ann 100%25 Lee", "ann%40@x.io" },
    plus_and_ampersand = { "R&D + Ops", "ops+relay@x.io" },
    non_ascii = { "Zoë Ångström", "zoë@x.io" },
)]
fn fallback_url_bootstraps_same_profile(name: &str, email: &str) -> anyhow::Result<()> {
    let profile = UserProfile { id: "64af".into(), name: name.into(), email: email.into(), role: "admin".into() };
    let intent = RedirectIntent {
        target: Url::parse("http://localhost:3001/")?,
        token: "bearer".into(),
        profile: profile.clone(),
    };

    let mut loc = PageLocation::new(intent.fallback_url(1));
    let auth = bootstrap(&mut loc, &CredentialStore::in_memory())?;
    assert_eq!(auth.token, "bearer");
    assert_eq!(auth.profile_source, ProfileSource::Url);
    assert_eq!(auth.profile, profile);
    Ok(())
}

proptest! {
    #[test]
    fn fallback_profile_survives_the_hop(name in "\\PC{1,24}", email in "\\PC{1,24}") {
        let profile = UserProfile { id: "7".into(), name, email, role: "user".into() };
        let target = Url::parse("http://localhost:3001/").map_err(|e| TestCaseError::fail(e.to_string()))?;
        let intent = RedirectIntent { target, token: "t".into(), profile: profile.clone() };

        let mut loc = PageLocation::new(intent.fallback_url(1));
        let auth = bootstrap(&mut loc, &CredentialStore::in_memory()).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(auth.profile, profile);
    }

    #[test]
    fn url_token_always_lands_in_both_scopes_and_leaves_the_url(
        token in "[A-Za-z0-9._~-]{1,48}",
        extra in proptest::option::of("[a-z]{1,8}"),
    ) {
        let store = CredentialStore::in_memory();
        let mut url = Url::parse("http://localhost:3001/dashboard").map_err(|e| TestCaseError::fail(e.to_string()))?;
        url.query_pairs_mut().append_pair(PARAM_TOKEN, &token);
        if let Some(extra) = &extra {
            url.query_pairs_mut().append_pair("view", extra);
        }
        let mut loc = PageLocation::new(url);

        let auth = bootstrap(&mut loc, &store).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(&auth.token, &token);
        prop_assert_eq!(store.durable_token(), Some(token.clone()));
        prop_assert_eq!(store.session_token(), Some(token.clone()));
        prop_assert!(!loc.has_param(PARAM_TOKEN));
        prop_assert_eq!(loc.param("view"), extra);
    }
}
