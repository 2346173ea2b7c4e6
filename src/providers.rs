//! Shared provider traits for dependency injection.
//!
//! Route handlers reach the desktop (browser, user identity) only through
//! these traits, so they can be tested without side effects.

use crate::error::LauncherError;
use crate::installer::resolve_program;
use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Trait for opening a URL in the user's browser.
pub trait LinkOpener: Send + Sync {
    /// Starts the opener and returns without waiting for the browser.
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens links with the platform's default handler.
pub struct SystemLinkOpener;

impl SystemLinkOpener {
    /// Program and leading arguments for the current platform.
    fn command() -> (&'static str, &'static [&'static str]) {
        if cfg!(target_os = "macos") {
            ("open", &[])
        } else if cfg!(windows) {
            ("cmd", &["/C", "start", ""])
        } else {
            ("xdg-open", &[])
        }
    }
}

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &str) -> Result<()> {
        let (program, leading) = Self::command();
        info!("Opening {} with {}", url, program);

        Command::new(resolve_program(program))
            .args(leading)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| LauncherError::subprocess(program, e))?;
        Ok(())
    }
}

/// Trait for looking up the user's display name.
///
/// This abstraction keeps the greeting deterministic in tests.
#[async_trait]
pub trait UserNameProvider: Send + Sync {
    /// The user's full name, or `None` when it cannot be determined.
    async fn full_name(&self) -> Option<String>;
}

/// First word of a full name.
///
/// # Example
///
/// ```
/// use yoyo::providers::first_name;
///
/// assert_eq!(first_name("Ada Lovelace"), Some("Ada"));
/// assert_eq!(first_name("   "), None);
/// ```
pub fn first_name(full_name: &str) -> Option<&str> {
    full_name.split_whitespace().next()
}

/// Reads `git config user.name`, falling back to the login name.
pub struct GitUserName;

impl GitUserName {
    async fn from_git() -> Option<String> {
        let git = which::which("git").ok()?;
        let output = Command::new(git)
            .args(["config", "--get", "user.name"])
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            return None;
        }
        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (!name.is_empty()).then_some(name)
    }
}

#[async_trait]
impl UserNameProvider for GitUserName {
    async fn full_name(&self) -> Option<String> {
        if let Some(name) = Self::from_git().await {
            return Some(name);
        }
        debug!("No git user.name; falling back to login name");
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .ok()
            .filter(|name| !name.trim().is_empty())
    }
}
