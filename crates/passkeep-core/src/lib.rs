//! passkeep core - Shared functionality for the passkeep tools
//!
//! Where things live on disk, how the config file looks, and the small
//! text helpers used by both the CLI and the dashboard.

pub mod config;
pub mod format;
pub mod paths;

pub use config::Config;
pub use paths::Paths;
