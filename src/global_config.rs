//! Access to the shared `~/.yo-rc-global.json` file.
//!
//! Generators write their per-user settings there (keyed by
//! `<namespace>:<version>`); the launcher only lists and removes entries.

use anyhow::{Result, anyhow};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const GLOBAL_CONFIG_FILE: &str = ".yo-rc-global.json";

#[derive(Debug, Clone)]
pub struct GlobalConfig {
    path: PathBuf,
}

impl GlobalConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The global file in the user's home directory.
    pub fn in_home() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(Self::new(home.join(GLOBAL_CONFIG_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns every entry. A missing file is the same as an empty one.
    pub fn get_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        let entries = serde_json::from_str(&content)
            .map_err(|e| anyhow!("{} is not a JSON object: {}", self.path.display(), e))?;
        Ok(entries)
    }

    /// Removes a single entry.
    pub fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.get_all()?;
        entries.remove(key);
        self.write(&entries)?;
        info!("Removed '{}' from {}", key, self.path.display());
        Ok(())
    }

    pub fn remove_all(&self) -> Result<()> {
        self.write(&Map::new())?;
        info!("Cleared {}", self.path.display());
        Ok(())
    }

    /// Whether the file holds at least one entry. Unreadable files count as empty.
    pub fn has_content(&self) -> bool {
        self.get_all().map(|entries| !entries.is_empty()).unwrap_or(false)
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<()> {
        // serde_json's pretty printer indents with two spaces.
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
