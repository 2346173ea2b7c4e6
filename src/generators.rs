//! The set of installed, user-runnable generators.

use crate::environment::{GeneratorEnvironment, GeneratorMeta};
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Base name of a namespace: `unicorn:app` → `unicorn`.
pub fn namespace_to_name(namespace: &str) -> &str {
    namespace
        .split_once(':')
        .map(|(base, _)| base)
        .unwrap_or(namespace)
}

/// Only `:app` and `:all` generators show up in the menu.
pub fn is_top_level(namespace: &str) -> bool {
    namespace.ends_with(":app") || namespace.ends_with(":all")
}

pub fn pretty_name(namespace: &str) -> String {
    let base = namespace_to_name(namespace);
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The parts of an installed `package.json` we care about.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Install spec recorded by the package manager (`_from`).
    #[serde(rename = "_from", default)]
    pub from: Option<String>,
}

/// Nearest `package.json` at or above `start`.
///
/// Returns `None` when there is none, or when the nearest one cannot be parsed.
pub fn find_manifest(start: &Path) -> Option<(PathBuf, Manifest)> {
    let path = start
        .ancestors()
        .map(|dir| dir.join("package.json"))
        .find(|candidate| candidate.is_file())?;

    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Could not read {:?}: {}", path, e);
            return None;
        }
    };
    match serde_json::from_str::<Manifest>(&content) {
        Ok(manifest) => Some((path, manifest)),
        Err(e) => {
            warn!("Skipping unparsable manifest {:?}: {}", path, e);
            None
        }
    }
}

/// Install specs that point somewhere other than the registry (git, tarball
/// URL, local path). Plain `name@range` specs return `None`.
pub fn alternate_source(spec: &str) -> Option<String> {
    const PREFIXES: &[&str] = &[
        "git+", "git://", "github:", "gitlab:", "bitbucket:", "http://", "https://", "file:",
    ];
    PREFIXES
        .iter()
        .any(|prefix| spec.starts_with(prefix))
        .then(|| spec.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorRecord {
    pub name: String,
    pub namespace: String,
    pub version: String,
    pub pretty_name: String,
    pub app_generator: bool,
    pub update_available: bool,
    pub latest_version: Option<String>,
    /// Where the package was installed from, when that is not the registry.
    pub install_source: Option<String>,
}

impl GeneratorRecord {
    pub fn new(name: &str, namespace: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            version: version.to_string(),
            pretty_name: pretty_name(namespace),
            app_generator: true,
            update_available: false,
            latest_version: None,
            install_source: None,
        }
    }

    pub fn base_name(&self) -> &str {
        namespace_to_name(&self.namespace)
    }

    /// What to hand the package manager when updating this generator.
    pub fn install_target(&self) -> &str {
        self.install_source.as_deref().unwrap_or(&self.name)
    }
}

/// Reports the latest published version of a package.
#[async_trait]
pub trait UpdateChecker: Send + Sync {
    /// `None` when unknown; failures are not errors here.
    async fn latest_version(&self, package: &str) -> Option<String>;
}

/// Used when update checks are turned off.
pub struct NoUpdateCheck;

#[async_trait]
impl UpdateChecker for NoUpdateCheck {
    async fn latest_version(&self, _package: &str) -> Option<String> {
        None
    }
}

/// Installed top-level generators, in discovery order.
#[derive(Debug, Default)]
pub struct GeneratorDirectory {
    records: Vec<GeneratorRecord>,
}

impl GeneratorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<GeneratorRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[GeneratorRecord] {
        &self.records
    }

    /// Looks a record up by package name.
    pub fn get(&self, name: &str) -> Option<&GeneratorRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn names(&self) -> HashSet<String> {
        self.records.iter().map(|record| record.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Rebuilds the records from the environment's current generator list.
    pub async fn refresh(&mut self, env: &dyn GeneratorEnvironment, checker: &dyn UpdateChecker) {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();

        for meta in env.generators_meta() {
            if !is_top_level(&meta.namespace) {
                continue;
            }
            let start = meta.resolved.parent().unwrap_or(&meta.resolved);
            let Some((path, manifest)) = find_manifest(start) else {
                debug!("No manifest for {}; skipping", meta.namespace);
                continue;
            };
            if !seen.insert(manifest.name.clone()) {
                debug!("{} already provided by {:?}", meta.namespace, path);
                continue;
            }
            resolved.push((meta.namespace, manifest));
        }

        let latest = join_all(
            resolved
                .iter()
                .map(|(_, manifest)| checker.latest_version(&manifest.name)),
        )
        .await;

        self.records = resolved
            .into_iter()
            .zip(latest)
            .map(|((namespace, manifest), latest_version)| {
                let update_available = latest_version
                    .as_deref()
                    .is_some_and(|latest| latest != manifest.version);
                let mut record = GeneratorRecord::new(&manifest.name, &namespace, &manifest.version);
                record.update_available = update_available;
                record.latest_version = latest_version;
                record.install_source = manifest.from.as_deref().and_then(alternate_source);
                record
            })
            .collect();

        info!("Generator directory holds {} generators", self.records.len());
    }
}

/// Text for `--generators`: each package followed by its sub-generators.
pub fn format_generator_list(meta: &[GeneratorMeta]) -> String {
    let mut packages: Vec<(&str, Vec<&str>)> = Vec::new();

    for entry in meta {
        let (package, sub) = entry
            .namespace
            .split_once(':')
            .unwrap_or((entry.namespace.as_str(), "app"));
        let index = match packages.iter().position(|(name, _)| *name == package) {
            Some(index) => index,
            None => {
                packages.push((package, Vec::new()));
                packages.len() - 1
            }
        };
        if sub != "app" {
            packages[index].1.push(sub);
        }
    }

    if packages.is_empty() {
        return "  Couldn't find any generators, did you install any? Find some by running\n\n  $ yoyo"
            .to_string();
    }

    packages
        .iter()
        .map(|(package, subs)| {
            let mut block = format!("  {}", package);
            for sub in subs {
                block.push_str(&format!("\n    {}", sub));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeEnvironment, FixedUpdates};
    use tempfile::TempDir;

    fn write_package(root: &Path, dir: &str, json: &str) -> PathBuf {
        let package = root.join(dir);
        fs::create_dir_all(package.join("generators/app")).unwrap();
        fs::write(package.join("package.json"), json).unwrap();
        package
    }

    fn entry(package: &Path, sub: &str) -> PathBuf {
        package.join("generators").join(sub).join("index.js")
    }

    #[test]
    fn test_namespace_helpers() {
        assert_eq!(namespace_to_name("unicorn:app"), "unicorn");
        assert_eq!(namespace_to_name("foo-bar:all"), "foo-bar");
        assert_eq!(namespace_to_name("plain"), "plain");
        assert_eq!(pretty_name("phoenix:app"), "Phoenix");
        assert_eq!(pretty_name("@acme/service:app"), "@acme/service");
        assert!(is_top_level("xanadu:all"));
        assert!(is_top_level("phoenix:app"));
        assert!(!is_top_level("phoenix:sub-app-helper"));
        assert!(!is_top_level("phoenix:misc"));
    }

    #[test]
    fn test_alternate_source_only_for_non_registry_specs() {
        assert_eq!(
            alternate_source("github:acme/generator-thing"),
            Some("github:acme/generator-thing".to_string())
        );
        assert!(alternate_source("git+https://example.com/g.git").is_some());
        assert_eq!(alternate_source("generator-thing@latest"), None);
        assert_eq!(alternate_source("generator-thing"), None);
    }

    #[test]
    fn test_find_manifest_walks_up() {
        let dir = TempDir::new().unwrap();
        let package = write_package(
            dir.path(),
            "generator-phoenix",
            r#"{"name": "generator-phoenix", "version": "0.1.0"}"#,
        );

        let (path, manifest) = find_manifest(&package.join("generators/app")).unwrap();

        assert_eq!(path, package.join("package.json"));
        assert_eq!(manifest.name, "generator-phoenix");
        assert_eq!(manifest.version, "0.1.0");
    }

    #[tokio::test]
    async fn test_refresh_keeps_top_level_generators_only() {
        let dir = TempDir::new().unwrap();
        let phoenix = write_package(
            dir.path(),
            "generator-phoenix",
            r#"{"name": "generator-phoenix", "version": "0.1.0"}"#,
        );
        let xanadu = write_package(
            dir.path(),
            "generator-xanadu",
            r#"{"name": "generator-xanadu", "version": "2.0.0"}"#,
        );
        let env = FakeEnvironment::new(vec![
            GeneratorMeta::new("xanadu:all", entry(&xanadu, "all")),
            GeneratorMeta::new("phoenix:app", entry(&phoenix, "app")),
            GeneratorMeta::new("phoenix:misc", entry(&phoenix, "misc")),
            GeneratorMeta::new("phoenix:sub-app", entry(&phoenix, "sub-app")),
        ]);

        let mut directory = GeneratorDirectory::new();
        directory.refresh(&env, &NoUpdateCheck).await;

        let names: Vec<&str> = directory.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["generator-xanadu", "generator-phoenix"]);
        let phoenix = directory.get("generator-phoenix").unwrap();
        assert_eq!(phoenix.namespace, "phoenix:app");
        assert_eq!(phoenix.pretty_name, "Phoenix");
        assert!(phoenix.app_generator);
        assert!(!phoenix.update_available);
    }

    #[tokio::test]
    async fn test_refresh_skips_generators_without_manifest() {
        let dir = TempDir::new().unwrap();
        let env = FakeEnvironment::new(vec![GeneratorMeta::new(
            "ghost:app",
            dir.path().join("nowhere/generators/app/index.js"),
        )]);

        let mut directory = GeneratorDirectory::from_records(vec![GeneratorRecord::new(
            "generator-stale",
            "stale:app",
            "1.0.0",
        )]);
        directory.refresh(&env, &NoUpdateCheck).await;

        assert!(directory.get("generator-stale").is_none());
        assert!(directory.get("generator-ghost").is_none());
    }

    #[tokio::test]
    async fn test_refresh_flags_updates_and_alternate_sources() {
        let dir = TempDir::new().unwrap();
        let unicorn = write_package(
            dir.path(),
            "generator-unicorn",
            r#"{"name": "generator-unicorn", "version": "1.0.0", "_from": "github:acme/generator-unicorn"}"#,
        );
        let cat = write_package(
            dir.path(),
            "generator-cat",
            r#"{"name": "generator-cat", "version": "3.1.0"}"#,
        );
        let env = FakeEnvironment::new(vec![
            GeneratorMeta::new("unicorn:app", entry(&unicorn, "app")),
            GeneratorMeta::new("cat:app", entry(&cat, "app")),
        ]);
        let updates = FixedUpdates::new(&[("generator-unicorn", "1.2.0"), ("generator-cat", "3.1.0")]);

        let mut directory = GeneratorDirectory::new();
        directory.refresh(&env, &updates).await;

        let unicorn = directory.get("generator-unicorn").unwrap();
        assert!(unicorn.update_available);
        assert_eq!(unicorn.latest_version.as_deref(), Some("1.2.0"));
        assert_eq!(unicorn.install_target(), "github:acme/generator-unicorn");

        let cat = directory.get("generator-cat").unwrap();
        assert!(!cat.update_available);
        assert_eq!(cat.install_target(), "generator-cat");
    }

    #[test]
    fn test_format_generator_list_groups_sub_generators() {
        let meta = vec![
            GeneratorMeta::new("phoenix:app", "/x/index.js"),
            GeneratorMeta::new("phoenix:misc", "/y/index.js"),
            GeneratorMeta::new("xanadu:all", "/z/index.js"),
        ];

        assert_eq!(
            format_generator_list(&meta),
            "  phoenix\n    misc\n  xanadu\n    all"
        );
        assert!(format_generator_list(&[]).contains("Couldn't find any generators"));
    }
}
