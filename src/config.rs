use anyhow::{Result, anyhow};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";
pub const DEFAULT_KEYWORD: &str = "yeoman-generator";

/// Packages that are never offered for installation: the old built-in menu
/// generator duplicates this launcher.
pub const DEFAULT_DENY_LIST: &[&str] = &["generator-yoyo"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registry_url: String,
    /// Registry keyword every generator package is tagged with.
    pub keyword: String,
    pub search_size: u32,
    pub package_manager: String,
    /// Program (plus leading arguments) that actually runs a generator.
    pub engine_command: Vec<String>,
    pub check_updates: bool,
    pub deny_list: Vec<String>,
    /// Optional remote JSON array merged into `deny_list`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_list_url: Option<String>,
    /// Extra `node_modules` roots scanned for generators.
    pub lookup_paths: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            keyword: DEFAULT_KEYWORD.to_string(),
            search_size: 250,
            package_manager: "npm".to_string(),
            engine_command: vec!["npx".to_string(), "--yes".to_string(), "yo".to_string()],
            check_updates: true,
            deny_list: DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect(),
            deny_list_url: None,
            lookup_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment variables, or create default
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file().unwrap_or_else(|_| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Environment variables override the config file.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("YOYO_REGISTRY_URL") {
            self.registry_url = url;
        }
        if let Some(pm) = var("YOYO_PACKAGE_MANAGER") {
            self.package_manager = pm;
        }
        if var("YOYO_NO_UPDATE_CHECK").is_some() {
            self.check_updates = false;
        }
    }

    fn load_from_file() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)?;
            info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            Err(anyhow!("Config file not found"))
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        info!("Saved config to: {}", config_path.display());
        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        Ok(home.join(".yoyo"))
    }

    /// Set the registry URL and save config
    pub fn set_registry_url(&mut self, url: String) -> Result<()> {
        self.registry_url = url.trim_end_matches('/').to_string();
        self.save()?;
        info!("Registry URL saved to config file");
        Ok(())
    }

    pub fn show_config_info() -> Result<()> {
        let config_path = Self::get_config_path()?;
        println!("Configuration file: {}", config_path.display());

        let config = if config_path.exists() {
            println!("Status: Found");
            Self::load_from_file()?
        } else {
            println!("Status: Not found (using defaults)");
            Self::default()
        };

        println!("Registry: {}", config.registry_url);
        println!("Keyword: {}", config.keyword);
        println!("Package manager: {}", config.package_manager);
        println!("Generator engine: {}", config.engine_command.join(" "));
        println!("Update checks: {}", if config.check_updates { "on" } else { "off" });
        println!("Deny-listed packages: {}", config.deny_list.len());

        println!("\nTo point at another registry:");
        println!("  yoyo --set-registry <url>");
        println!("\nOr set environment variable:");
        println!("  export YOYO_REGISTRY_URL=<url>");

        Ok(())
    }
}
