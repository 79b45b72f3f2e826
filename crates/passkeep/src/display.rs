//! Display model - what a screen shows for each entry at a given moment
//!
//! Rebuilt from scratch on every refresh tick. Entries without a secret
//! never reach the TOTP engine; entries with a broken secret show as
//! invalid instead of showing a code.

use crate::entry::Entry;
use crate::store::EntryStore;
use crate::totp::{self, Code, TotpError, TotpParams};

/// TOTP column state for one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TotpState {
    /// No secret configured
    Absent,
    /// Current code and seconds until it changes
    Active { code: Code, remaining: u64 },
    /// The secret could not be used
    Invalid(String),
}

impl TotpState {
    pub fn code(&self) -> Option<&Code> {
        match self {
            Self::Active { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn remaining(&self) -> Option<u64> {
        match self {
            Self::Active { remaining, .. } => Some(*remaining),
            _ => None,
        }
    }
}

/// Compute the TOTP state for a raw secret string
pub fn totp_state(secret: &str, now: u64, params: &TotpParams) -> TotpState {
    if secret.trim().is_empty() {
        return TotpState::Absent;
    }
    match totp::current_code(secret, now, params) {
        Ok(code) => TotpState::Active {
            code,
            remaining: totp::remaining_seconds(now, params.interval),
        },
        Err(TotpError::EmptySecret) => TotpState::Absent,
        Err(e) => TotpState::Invalid(e.to_string()),
    }
}

/// One line of the entry table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    /// 1-based position, usable as a selector
    pub position: usize,
    pub name: String,
    pub username: String,
    pub password: String,
    pub secret: String,
    pub totp: TotpState,
}

impl EntryRow {
    fn from_entry(position: usize, entry: &Entry, now: u64, params: &TotpParams) -> Self {
        let totp = match entry.totp_secret() {
            Some(secret) => totp_state(secret, now, params),
            None => TotpState::Absent,
        };
        if let TotpState::Invalid(reason) = &totp {
            tracing::warn!(entry = %entry.name, %reason, "entry has an unusable TOTP secret");
        }
        Self {
            position,
            name: entry.name.clone(),
            username: entry.username.clone(),
            password: entry.password.clone(),
            secret: entry.totp.clone(),
            totp,
        }
    }
}

/// Rows for every entry plus the time they were computed for
#[derive(Debug, Clone)]
pub struct DisplayModel {
    pub params: TotpParams,
    pub rows: Vec<EntryRow>,
    pub refreshed_at: u64,
}

impl DisplayModel {
    pub fn build(store: &EntryStore, now: u64, params: TotpParams) -> Self {
        let mut model = Self {
            params,
            rows: Vec::new(),
            refreshed_at: now,
        };
        model.refresh(store, now);
        model
    }

    /// Recompute every row for `now`
    pub fn refresh(&mut self, store: &EntryStore, now: u64) {
        self.rows = store
            .iter()
            .enumerate()
            .map(|(i, entry)| EntryRow::from_entry(i + 1, entry, now, &self.params))
            .collect();
        self.refreshed_at = now;
        tracing::trace!(rows = self.rows.len(), now, "refreshed display model");
    }

    /// Seconds left in the current time step
    pub fn remaining(&self) -> u64 {
        totp::remaining_seconds(self.refreshed_at, self.params.interval)
    }
}

/// Code preview for a secret that has not been saved yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub code: Code,
    pub remaining: u64,
}

impl Preview {
    /// `Ok(None)` for a blank secret, an error for a malformed one
    pub fn for_secret(secret: &str, now: u64, params: &TotpParams) -> Result<Option<Self>, TotpError> {
        if secret.trim().is_empty() {
            return Ok(None);
        }
        let code = totp::current_code(secret, now, params)?;
        Ok(Some(Self {
            code,
            remaining: totp::remaining_seconds(now, params.interval),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EntryStore {
        EntryStore::from_entries(vec![
            Entry::new("mail", "alice", "pw1", "JBSWY3DPEHPK3PXP"),
            Entry::new("bank", "alice", "pw2", ""),
            Entry::new("broken", "bob", "pw3", "not-base32!!"),
        ])
    }

    #[test]
    fn test_build_rows() {
        let model = DisplayModel::build(&store(), 59, TotpParams::default());
        assert_eq!(model.rows.len(), 3);

        let mail = &model.rows[0];
        assert_eq!(mail.position, 1);
        assert_eq!(mail.totp.code().unwrap(), &"996554");
        assert_eq!(mail.totp.remaining(), Some(1));

        assert_eq!(model.rows[1].totp, TotpState::Absent);
        assert!(matches!(model.rows[2].totp, TotpState::Invalid(_)));
        assert_eq!(model.rows[2].totp.code(), None);
    }

    #[test]
    fn test_refresh_moves_to_next_step() {
        let store = store();
        let mut model = DisplayModel::build(&store, 1, TotpParams::default());
        assert_eq!(model.rows[0].totp.code().unwrap(), &"282760");
        assert_eq!(model.remaining(), 29);

        model.refresh(&store, 59);
        assert_eq!(model.rows[0].totp.code().unwrap(), &"996554");
        assert_eq!(model.refreshed_at, 59);
        assert_eq!(model.remaining(), 1);
    }

    #[test]
    fn test_blank_secret_never_reaches_engine() {
        // current_code would report EmptySecret; the display layer must not
        // surface that as an error row
        assert_eq!(totp_state("", 59, &TotpParams::default()), TotpState::Absent);
        assert_eq!(totp_state("  ", 59, &TotpParams::default()), TotpState::Absent);
        assert_eq!(Preview::for_secret("", 59, &TotpParams::default()), Ok(None));
    }

    #[test]
    fn test_preview() {
        let preview = Preview::for_secret("jbswy3dpehpk3pxp", 45, &TotpParams::default())
            .unwrap()
            .unwrap();
        assert_eq!(preview.code, "996554");
        assert_eq!(preview.remaining, 15);

        let err = Preview::for_secret("not-base32!!", 45, &TotpParams::default()).unwrap_err();
        assert!(matches!(err, TotpError::InvalidSecret(_)));
    }
}
