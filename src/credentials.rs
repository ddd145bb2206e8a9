use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::models::Role;

/// A fixed-format bcrypt hash used when the username does not exist, so that
/// lookup misses and password mismatches run the same verification work and
/// stay indistinguishable to the caller.
const DUMMY_HASH: &str = "$2b$12$abcdefghijklmnopqrstuvabcdefghijklmnopqrstuvwxyz12345";

/// SeedUser
///
/// One record of the read-only credential store. Users are created via seed
/// data only and are immutable at runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    pub id: Uuid,
    pub username: String,
    /// bcrypt hash; plain passwords never appear in the seed file.
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// CredentialStore
///
/// Static username -> user mapping loaded once at startup. Lookups are
/// case-insensitive on the username; there is no write path.
pub struct CredentialStore {
    users: HashMap<String, SeedUser>,
}

/// CredentialState
///
/// The concrete type used to share the credential store across the application state.
pub type CredentialState = Arc<CredentialStore>;

impl CredentialStore {
    /// Loads the seed file (a JSON array of SeedUser records).
    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let users: Vec<SeedUser> = serde_json::from_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self::from_users(users))
    }

    /// Builds a store from in-memory records. Duplicate usernames (after
    /// lowercasing) keep the last record.
    pub fn from_users(users: Vec<SeedUser>) -> Self {
        let users = users
            .into_iter()
            .map(|u| (u.username.to_lowercase(), u))
            .collect();
        Self { users }
    }

    /// Case-insensitive lookup by username.
    pub fn lookup(&self, username: &str) -> Option<&SeedUser> {
        self.users.get(&username.to_lowercase())
    }

    /// Verifies a credential pair. Exactly one bcrypt verification runs whether
    /// or not the username exists (unknown users are checked against a dummy
    /// hash), keeping the two failure causes indistinguishable.
    pub fn verify(&self, username: &str, password: &str) -> Option<&SeedUser> {
        let user = self.users.get(&username.to_lowercase());
        let hash = user.map_or(DUMMY_HASH, |u| u.password_hash.as_str());
        match bcrypt::verify(password, hash) {
            Ok(true) => user,
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
