// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    unauthenticated = { ErrorCode::Unauthenticated, "UNAUTHENTICATED" },
    malformed_profile = { ErrorCode::MalformedProfile, "MALFORMED_PROFILE" },
    exchange_failed = { ErrorCode::ExchangeFailed, "EXCHANGE_FAILED" },
    precondition = { ErrorCode::Precondition, "PRECONDITION" },
    bad_request = { ErrorCode::BadRequest, "BAD_REQUEST" },
    internal = { ErrorCode::Internal, "INTERNAL" },
)]
fn code_strings(code: ErrorCode, expected: &str) {
    assert_eq!(code.as_str(), expected);
    assert_eq!(code.to_string(), expected);
}

#[test]
fn relay_error_display_includes_code() -> anyhow::Result<()> {
    let err = ErrorCode::ExchangeFailed.to_error("backend returned 503");
    assert_eq!(err.to_string(), "EXCHANGE_FAILED: backend returned 503");

    let wrapped: anyhow::Error = err.clone().into();
    let back = wrapped.downcast_ref::<RelayError>().ok_or_else(|| anyhow::anyhow!("lost type"))?;
    assert_eq!(back, &err);
    Ok(())
}

#[test]
fn unauthenticated_has_code() {
    assert_eq!(RelayError::unauthenticated().code, ErrorCode::Unauthenticated);
}
