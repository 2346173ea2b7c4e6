//! Package-manager subprocess used to install and update generators.
//!
//! The child process inherits the terminal so its progress output streams
//! live instead of being captured.

use crate::error::LauncherError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

/// How a finished install process exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallOutcome {
    pub success: bool,
    pub code: Option<i32>,
}

/// Trait for running global package installs.
///
/// This abstraction enables testing without spawning real processes.
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Program name shown to the user (e.g. `npm`).
    fn program(&self) -> &str;

    /// Runs `<program> install --global <packages...>` and waits for it to close.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Subprocess`] when the process cannot be spawned.
    /// A process that starts and exits non-zero is reported through the outcome.
    async fn install_global(&self, packages: &[String]) -> Result<InstallOutcome, LauncherError>;
}

/// Arguments for a global install of `packages`.
pub fn install_args(packages: &[String]) -> Vec<String> {
    let mut args = vec!["install".to_string(), "--global".to_string()];
    args.extend(packages.iter().cloned());
    args
}

/// The short form of the install command, as we tell users to type it.
pub fn display_command(program: &str, packages: &[String]) -> String {
    format!("{} install -g {}", program, packages.join(" "))
}

/// Resolves a program through `PATH` (handles `npm.cmd` on Windows), falling
/// back to the bare name so the spawn error names what was attempted.
pub fn resolve_program(program: &str) -> PathBuf {
    which::which(program).unwrap_or_else(|_| PathBuf::from(program))
}

/// Default package manager: any npm-compatible CLI.
pub struct NpmPackageManager {
    program: String,
}

impl NpmPackageManager {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl PackageManager for NpmPackageManager {
    fn program(&self) -> &str {
        &self.program
    }

    async fn install_global(&self, packages: &[String]) -> Result<InstallOutcome, LauncherError> {
        let args = install_args(packages);
        info!("Spawning {} {:?}", self.program, args);

        let status = Command::new(resolve_program(&self.program))
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| LauncherError::subprocess(&self.program, e))?;

        if !status.success() {
            warn!("{} exited with {}", self.program, status);
        }

        Ok(InstallOutcome {
            success: status.success(),
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_install_args_are_global_and_keep_order() {
        assert_eq!(
            install_args(&names(&["generator-cat", "generator-unicorn"])),
            names(&["install", "--global", "generator-cat", "generator-unicorn"])
        );
    }

    #[test]
    fn test_display_command() {
        assert_eq!(
            display_command("npm", &names(&["generator-webapp"])),
            "npm install -g generator-webapp"
        );
    }

    #[test]
    fn test_resolve_program_falls_back_to_bare_name() {
        let program = "definitely-not-an-installed-package-manager";
        assert_eq!(resolve_program(program), PathBuf::from(program));
    }

    #[tokio::test]
    async fn test_spawn_failure_is_a_subprocess_error() {
        let pm = NpmPackageManager::new("definitely-not-an-installed-package-manager");
        let err = pm.install_global(&names(&["generator-node"])).await.unwrap_err();

        match err {
            LauncherError::Subprocess { program, .. } => {
                assert_eq!(program, "definitely-not-an-installed-package-manager")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
