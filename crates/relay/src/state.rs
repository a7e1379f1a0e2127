// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use crate::credential::persist::FileStore;
use crate::credential::store::CredentialStore;
use crate::credential::StorageScope;

/// File backing a storage scope under the state directory.
pub fn scope_file(scope: StorageScope) -> &'static str {
    match scope {
        StorageScope::Durable => "durable.json",
        StorageScope::Session => "session.json",
    }
}

/// Credential store persisted under `dir`.
pub fn open_store(dir: &Path) -> CredentialStore {
    let durable = FileStore::open(dir.join(scope_file(StorageScope::Durable)));
    let session = FileStore::open(dir.join(scope_file(StorageScope::Session)));
    CredentialStore::new(Arc::new(durable), Arc::new(session))
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
