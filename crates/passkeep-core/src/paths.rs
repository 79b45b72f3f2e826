//! Standard paths used by passkeep

use std::path::PathBuf;

/// Standard passkeep paths
pub struct Paths {
    /// Data directory (~/.local/share/passkeep)
    pub data: PathBuf,
    /// Config directory (~/.config/passkeep)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("passkeep");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("passkeep");

        Self { data, config }
    }

    /// Build paths rooted somewhere other than the user directories
    pub fn rooted(root: &std::path::Path) -> Self {
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Default location of the entry store
    pub fn store(&self) -> PathBuf {
        self.data.join("entries.json")
    }

    /// Location of the config file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }
}
