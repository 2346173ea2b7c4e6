//! Generator lookup and execution.
//!
//! [`GeneratorEnvironment`] is what the navigator knows about installed
//! generators: which namespaces exist, where their entry points live, and how
//! to run one. [`NodeEnvironment`] finds them in `node_modules` trees and
//! hands execution to an external engine command.

use crate::config::Config;
use crate::error::LauncherError;
use crate::installer::resolve_program;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;
use tracing::{debug, info, warn};

const GENERATOR_PREFIX: &str = "generator-";
const ENTRY_POINTS: &[&str] = &["index.js", "index.cjs", "index.mjs"];

/// A generator namespace and the entry point it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorMeta {
    pub namespace: String,
    pub resolved: PathBuf,
}

impl GeneratorMeta {
    pub fn new(namespace: impl Into<String>, resolved: impl Into<PathBuf>) -> Self {
        Self {
            namespace: namespace.into(),
            resolved: resolved.into(),
        }
    }
}

#[async_trait]
pub trait GeneratorEnvironment: Send + Sync {
    /// Re-scans for installed generators.
    async fn lookup(&self) -> Result<()>;

    /// Every known namespace, in discovery order, sub-generators included.
    fn generators_meta(&self) -> Vec<GeneratorMeta>;

    /// Runs the generator registered under `namespace`.
    async fn run(&self, namespace: &str, args: &[String]) -> Result<()>;
}

/// Namespace base for a generator package: `generator-foo` → `foo`,
/// `@scope/generator-foo` → `@scope/foo`.
pub fn package_to_namespace(package: &str) -> String {
    match package.split_once('/') {
        Some((scope, name)) if scope.starts_with('@') => {
            format!("{}/{}", scope, name.trim_start_matches(GENERATOR_PREFIX))
        }
        _ => package.trim_start_matches(GENERATOR_PREFIX).to_string(),
    }
}

/// Scans `roots` (each a `node_modules` directory) for generator packages.
///
/// Earlier roots win when two of them provide the same namespace.
pub fn scan_roots(roots: &[PathBuf]) -> Vec<GeneratorMeta> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for root in roots {
        for meta in scan_root(root) {
            if seen.insert(meta.namespace.clone()) {
                found.push(meta);
            } else {
                debug!("Shadowed generator {} at {:?}", meta.namespace, meta.resolved);
            }
        }
    }

    found
}

fn sorted_dirs(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            Some((name, entry.path()))
        })
        .collect();
    dirs.sort();
    dirs
}

fn scan_root(root: &Path) -> Vec<GeneratorMeta> {
    let mut found = Vec::new();

    for (name, path) in sorted_dirs(root) {
        if name.starts_with(GENERATOR_PREFIX) {
            found.extend(scan_package(&path, &name));
        } else if name.starts_with('@') {
            for (scoped, scoped_path) in sorted_dirs(&path) {
                if scoped.starts_with(GENERATOR_PREFIX) {
                    found.extend(scan_package(&scoped_path, &format!("{}/{}", name, scoped)));
                }
            }
        }
    }

    found
}

fn scan_package(package_dir: &Path, package: &str) -> Vec<GeneratorMeta> {
    let generators_dir = package_dir.join("generators");
    let base = if generators_dir.is_dir() {
        generators_dir
    } else {
        package_dir.to_path_buf()
    };
    let namespace = package_to_namespace(package);

    sorted_dirs(&base)
        .into_iter()
        .filter(|(sub, _)| sub != "node_modules")
        .filter_map(|(sub, sub_dir)| {
            let entry = ENTRY_POINTS
                .iter()
                .map(|file| sub_dir.join(file))
                .find(|candidate| candidate.is_file())?;
            Some(GeneratorMeta::new(format!("{}:{}", namespace, sub), entry))
        })
        .collect()
}

/// `node_modules` directories from `start` up to the filesystem root.
pub fn local_roots(start: &Path) -> Vec<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join("node_modules"))
        .filter(|dir| dir.is_dir())
        .collect()
}

/// Environment backed by `node_modules` directories on disk.
pub struct NodeEnvironment {
    lookup_paths: Vec<PathBuf>,
    local_only: bool,
    package_manager: String,
    engine_command: Vec<String>,
    meta: Mutex<Vec<GeneratorMeta>>,
}

impl NodeEnvironment {
    pub fn new(config: &Config, local_only: bool) -> Self {
        Self {
            lookup_paths: config.lookup_paths.clone(),
            local_only,
            package_manager: config.package_manager.clone(),
            engine_command: config.engine_command.clone(),
            meta: Mutex::new(Vec::new()),
        }
    }

    async fn global_root(&self) -> Option<PathBuf> {
        let output = Command::new(resolve_program(&self.package_manager))
            .args(["root", "--global"])
            .stderr(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
                (!root.is_empty()).then(|| PathBuf::from(root))
            }
            Ok(output) => {
                warn!("`{} root --global` exited with {}", self.package_manager, output.status);
                None
            }
            Err(e) => {
                warn!("Could not ask {} for its global root: {}", self.package_manager, e);
                None
            }
        }
    }

    async fn roots(&self) -> Result<Vec<PathBuf>> {
        let mut roots = local_roots(&std::env::current_dir()?);
        roots.extend(self.lookup_paths.iter().cloned());
        if !self.local_only {
            if let Some(global) = self.global_root().await {
                roots.push(global);
            }
        }
        Ok(roots)
    }
}

#[async_trait]
impl GeneratorEnvironment for NodeEnvironment {
    async fn lookup(&self) -> Result<()> {
        let roots = self.roots().await?;
        let found = scan_roots(&roots);
        info!("Found {} generators in {} lookup roots", found.len(), roots.len());

        let mut meta = self
            .meta
            .lock()
            .map_err(|_| anyhow!("generator list lock poisoned"))?;
        *meta = found;
        Ok(())
    }

    fn generators_meta(&self) -> Vec<GeneratorMeta> {
        self.meta.lock().map(|meta| meta.clone()).unwrap_or_default()
    }

    async fn run(&self, namespace: &str, args: &[String]) -> Result<()> {
        let (program, leading) = self
            .engine_command
            .split_first()
            .ok_or_else(|| anyhow!("engine_command is empty; cannot run {}", namespace))?;

        info!("Running generator {} via {}", namespace, program);
        let status = Command::new(resolve_program(program))
            .args(leading)
            .arg(namespace)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| LauncherError::subprocess(program, e))?;

        if !status.success() {
            return Err(anyhow!("generator {} exited with {}", namespace, status));
        }
        Ok(())
    }
}
