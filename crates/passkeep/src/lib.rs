//! passkeep - Local credential keeper
//!
//! Entries hold a name, username, password and an optional TOTP secret.
//! The store is a plain JSON list; nothing is encrypted at rest.
//!
//! The interesting part is [`totp`]: RFC 6238 codes and their countdown,
//! computed as pure functions of (secret, time) so any caller can poll them.

pub mod display;
pub mod entry;
pub mod generator;
pub mod store;
pub mod totp;

pub use display::{DisplayModel, EntryRow, Preview, TotpState};
pub use entry::Entry;
pub use generator::{generate_password, GeneratorError};
pub use store::{EntryStore, ImportMode, StoreError};
pub use totp::{Code, Secret, TotpError, TotpParams};
