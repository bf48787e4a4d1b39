use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

pub const SERVICE: &str = "branch-pr-status";
pub const ACCOUNT: &str = "github-api-credentials";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }

    fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored entry, accepting the legacy `username:token` form
    fn decode(raw: &str) -> Result<Self> {
        if raw.trim_start().starts_with('{') {
            return Ok(serde_json::from_str(raw)?);
        }

        let (username, token) = raw
            .split_once(':')
            .ok_or_else(|| AppError::SecretStore("stored credentials are malformed".to_string()))?;
        Ok(Self::new(username, token))
    }
}

// Never print the token
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"***")
            .finish()
    }
}

/// Raw access to a platform secret store entry
pub trait SecretStore {
    fn get(&self) -> Result<Option<String>>;
    fn set(&self, secret: &str) -> Result<()>;
    fn delete(&self) -> Result<()>;
}

pub struct KeyringStore {
    entry: keyring::Entry,
}

impl KeyringStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            entry: keyring::Entry::new(SERVICE, ACCOUNT)?,
        })
    }
}

impl SecretStore for KeyringStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, secret: &str) -> Result<()> {
        self.entry.set_password(secret)?;
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        match self.entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Credential lifecycle on top of a secret store
///
/// Writes and deletions only happen when the given confirmation callback
/// answers yes.
pub struct CredentialStore<S: SecretStore> {
    pub store: S,
}

impl<S: SecretStore> CredentialStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Option<Credentials>> {
        match self.store.get()? {
            Some(raw) => Ok(Some(Credentials::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Returns whether the credentials were stored
    pub fn save<F>(&self, credentials: &Credentials, confirm: F) -> Result<bool>
    where
        F: FnOnce() -> Result<bool>,
    {
        if !confirm()? {
            return Ok(false);
        }

        self.store.set(&credentials.encode()?)?;
        log::info!("Stored credentials for {} in {}", credentials.username, SERVICE);
        Ok(true)
    }

    /// Returns whether the credentials were removed
    pub fn remove<F>(&self, confirm: F) -> Result<bool>
    where
        F: FnOnce() -> Result<bool>,
    {
        if !confirm()? {
            return Ok(false);
        }

        self.store.delete()?;
        log::info!("Removed credentials from {}", SERVICE);
        Ok(true)
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemorySecretStore {
    pub secret: std::cell::RefCell<Option<String>>,
}

#[cfg(test)]
impl MemorySecretStore {
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: std::cell::RefCell::new(Some(secret.to_string())),
        }
    }
}

#[cfg(test)]
impl SecretStore for MemorySecretStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.secret.borrow().clone())
    }

    fn set(&self, secret: &str) -> Result<()> {
        *self.secret.borrow_mut() = Some(secret.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<()> {
        *self.secret.borrow_mut() = None;
        Ok(())
    }
}
