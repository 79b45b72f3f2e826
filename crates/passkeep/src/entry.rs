//! Credential entries

use serde::{Deserialize, Serialize};

/// A stored credential
///
/// Field names match the export format: `name`, `username`, `password`,
/// `totp`. The `totp` field holds a base32 secret or an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub totp: String,
}

impl Entry {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        totp: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
            totp: totp.into(),
        }
    }

    /// The TOTP secret, or `None` when the entry has no TOTP configured
    pub fn totp_secret(&self) -> Option<&str> {
        let secret = self.totp.trim();
        if secret.is_empty() {
            None
        } else {
            Some(secret)
        }
    }

    pub fn has_totp(&self) -> bool {
        self.totp_secret().is_some()
    }

    /// Exact name match
    pub fn matches(&self, name: &str) -> bool {
        self.name == name
    }
}
