//! Single source of truth for the current access token and user snapshot.
//!
//! Anyone may read. Only the session client (`crate::net`) writes, which is why the
//! mutators are crate-private.

use crate::models::account::{Credential, UserSnapshot};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default)]
struct Slot {
    cred: Credential,
    /// Bumped whenever a session ends or a new one starts. Refreshes compare against it.
    epoch: u64,
}

#[derive(Debug, Default)]
pub struct CredentialStore {
    slot: RwLock<Slot>,
    mirror: Option<PathBuf>,
    /// Serialises mirror writes. Never held together with `slot`'s write lock.
    io: Mutex<()>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that mirrors every change into `path`. Starts empty.
    pub fn with_mirror(path: impl Into<PathBuf>) -> Self {
        Self {
            slot: RwLock::new(Slot::default()),
            mirror: Some(path.into()),
            io: Mutex::new(()),
        }
    }

    /// Store seeded from a previously written mirror file, so a restart does not force a new
    /// login. A missing or unreadable file yields an empty store.
    pub fn restore(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cred = std::fs::read(&path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Credential>(&bytes).ok())
            .unwrap_or_default();
        debug!(path = %path.display(), authenticated = cred.is_authenticated(), "restored credentials");

        Self {
            slot: RwLock::new(Slot { cred, epoch: 0 }),
            mirror: Some(path),
            io: Mutex::new(()),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.slot.read().cred.access_token.clone()
    }

    pub fn user(&self) -> Option<UserSnapshot> {
        self.slot.read().cred.user.clone()
    }

    pub fn snapshot(&self) -> Credential {
        self.slot.read().cred.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.slot.read().cred.is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.slot.read().cred.is_admin()
    }

    pub fn epoch(&self) -> u64 {
        self.slot.read().epoch
    }

    pub fn mirror_path(&self) -> Option<&Path> {
        self.mirror.as_deref()
    }

    pub(crate) fn set_user(&self, user: Option<UserSnapshot>) {
        self.slot.write().cred.user = user;
        self.sync_mirror();
    }

    /// Replace the whole credential for a freshly authenticated session.
    pub(crate) fn begin_session(&self, token: Option<String>, user: Option<UserSnapshot>) {
        {
            let mut s = self.slot.write();
            s.epoch += 1;
            s.cred = Credential { access_token: token, user };
        }
        self.sync_mirror();
    }

    /// Null token and user together.
    pub(crate) fn clear(&self) {
        {
            let mut s = self.slot.write();
            s.epoch += 1;
            s.cred = Credential::default();
        }
        self.sync_mirror();
    }

    /// Install a refreshed token unless the session changed since `epoch` was read.
    pub(crate) fn set_token_if_current(&self, epoch: u64, token: String) -> bool {
        {
            let mut s = self.slot.write();
            if s.epoch != epoch {
                return false;
            }
            s.cred.access_token = Some(token);
        }
        self.sync_mirror();
        true
    }

    /// Clear after a failed refresh unless the session already changed since `epoch`.
    pub(crate) fn clear_if_current(&self, epoch: u64) -> bool {
        {
            let mut s = self.slot.write();
            if s.epoch != epoch {
                return false;
            }
            s.epoch += 1;
            s.cred = Credential::default();
        }
        self.sync_mirror();
        true
    }

    /// Write the current credential to the mirror file, outside the slot lock so readers never
    /// wait on disk. The snapshot is taken under `io`, so the last writer always leaves the
    /// newest state behind.
    fn sync_mirror(&self) {
        let Some(path) = &self.mirror else {
            return;
        };

        let _io = self.io.lock();
        let cred = self.snapshot();

        let result = if cred.is_authenticated() {
            serde_json::to_vec(&cred)
                .map_err(std::io::Error::other)
                .and_then(|bytes| std::fs::write(path, bytes))
        } else {
            match std::fs::remove_file(path) {
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            }
        };

        if let Err(e) = result {
            debug!(path = %path.display(), error = %e, "could not mirror credentials");
        }
    }
}
