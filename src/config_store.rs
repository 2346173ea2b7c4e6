//! Key/value settings file for the launcher itself.
//!
//! Lives in the platform config directory and currently holds one
//! well-known key, the per-generator run counts used to rank the home menu.

use anyhow::{Result, anyhow};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Key under which the run-count map is stored.
pub const RUN_COUNT_KEY: &str = "generatorRunCount";

pub struct ConfigStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl ConfigStore {
    /// Opens the store at its default location (`<config_dir>/yoyo/store.json`).
    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not find config directory"))?;
        Ok(config_dir.join("yoyo").join("store.json"))
    }

    /// Opens the store at `path`, seeding defaults for missing keys.
    ///
    /// A corrupt file is treated as empty rather than failing the session; it
    /// gets rewritten on the next `set`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring unreadable config store {:?}: {}", path, e);
                    Map::new()
                }
            }
        } else {
            Map::new()
        };

        values
            .entry(RUN_COUNT_KEY.to_string())
            .or_insert_with(|| json!({}));

        debug!("Config store opened at {:?} with {} keys", path, values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }

    /// Run counts keyed by generator base name. Non-numeric entries are ignored.
    pub fn run_counts(&self) -> BTreeMap<String, u64> {
        self.get(RUN_COUNT_KEY)
            .and_then(Value::as_object)
            .map(|counts| {
                counts
                    .iter()
                    .filter_map(|(name, count)| count.as_u64().map(|c| (name.clone(), c)))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn run_count(&self, base_name: &str) -> u64 {
        self.get(RUN_COUNT_KEY)
            .and_then(|counts| counts.get(base_name))
            .and_then(Value::as_u64)
            .unwrap_or(0)
    }

    /// Bumps the run count for `base_name` and persists the store.
    pub fn increment_run_count(&mut self, base_name: &str) -> Result<u64> {
        let next = self.run_count(base_name) + 1;

        let mut counts = match self.values.remove(RUN_COUNT_KEY) {
            Some(Value::Object(counts)) => counts,
            _ => Map::new(),
        };
        counts.insert(base_name.to_string(), json!(next));
        self.set(RUN_COUNT_KEY, Value::Object(counts))?;

        info!("Run count for '{}' is now {}", base_name, next);
        Ok(next)
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
