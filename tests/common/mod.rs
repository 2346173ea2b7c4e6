//! Disk-backed fakes for driving a full navigator through the public API.
//!
//! Prompts, registry, links and output come from `yoyo::test_support`.
#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use yoyo::config::Config;
use yoyo::config_store::ConfigStore;
use yoyo::environment::{GeneratorEnvironment, GeneratorMeta, scan_roots};
use yoyo::error::LauncherError;
use yoyo::generators::NoUpdateCheck;
use yoyo::global_config::GlobalConfig;
use yoyo::installer::{InstallOutcome, PackageManager};
use yoyo::registry::RegistryClient;
use yoyo::router::{Navigator, Services};
use yoyo::routes;
use yoyo::test_support::{
    Answer, FakeHttp, FakeOpener, FixedUserName, SharedBuffer, ScriptedPrompt, TEST_REGISTRY,
    packument_json, search_json,
};

/// Scans a temporary `node_modules` tree on every lookup.
pub struct DiskEnvironment {
    root: PathBuf,
    meta: Mutex<Vec<GeneratorMeta>>,
    pub lookups: AtomicUsize,
    pub runs: Mutex<Vec<String>>,
}

impl DiskEnvironment {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            meta: Mutex::new(Vec::new()),
            lookups: AtomicUsize::new(0),
            runs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl GeneratorEnvironment for DiskEnvironment {
    async fn lookup(&self) -> Result<()> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        *self.meta.lock().unwrap() = scan_roots(&[self.root.clone()]);
        Ok(())
    }

    fn generators_meta(&self) -> Vec<GeneratorMeta> {
        self.meta.lock().unwrap().clone()
    }

    async fn run(&self, namespace: &str, _args: &[String]) -> Result<()> {
        self.runs.lock().unwrap().push(namespace.to_string());
        Ok(())
    }
}

/// Writes an installed generator package under `root`.
pub fn install_package(root: &Path, package: &str, version: &str) {
    let dir = root.join(package);
    fs::create_dir_all(dir.join("generators/app")).unwrap();
    fs::write(dir.join("generators/app/index.js"), "module.exports = {};").unwrap();
    fs::write(
        dir.join("package.json"),
        json!({"name": package, "version": version}).to_string(),
    )
    .unwrap();
}

/// "Installs" packages by writing them to disk, like a real package manager.
pub struct DiskPackageManager {
    root: PathBuf,
    pub installs: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl PackageManager for DiskPackageManager {
    fn program(&self) -> &str {
        "npm"
    }

    async fn install_global(&self, packages: &[String]) -> Result<InstallOutcome, LauncherError> {
        for package in packages {
            install_package(&self.root, package, "1.0.0");
        }
        self.installs.lock().unwrap().push(packages.to_vec());
        Ok(InstallOutcome {
            success: true,
            code: Some(0),
        })
    }
}

/// A fully routed navigator over a temporary `node_modules` tree.
pub struct App {
    pub dir: TempDir,
    pub prompt: Arc<ScriptedPrompt>,
    pub env: Arc<DiskEnvironment>,
    pub http: Arc<FakeHttp>,
    pub registry: Arc<RegistryClient>,
    pub package_manager: Arc<DiskPackageManager>,
    pub opener: Arc<FakeOpener>,
    pub output: SharedBuffer,
    pub nav: Navigator,
}

impl App {
    pub async fn new(installed: &[&str], answers: Vec<Answer>) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("node_modules");
        fs::create_dir_all(&root).unwrap();
        for package in installed {
            install_package(&root, package, "1.0.0");
        }

        let prompt = Arc::new(ScriptedPrompt::new(answers));
        let env = Arc::new(DiskEnvironment::new(&root));
        let http = Arc::new(FakeHttp::new());
        let package_manager = Arc::new(DiskPackageManager {
            root: root.clone(),
            installs: Mutex::new(Vec::new()),
        });
        let opener = Arc::new(FakeOpener::default());
        let output = SharedBuffer::default();

        let config = Config {
            registry_url: TEST_REGISTRY.to_string(),
            ..Config::default()
        };
        let registry = Arc::new(RegistryClient::from_config(http.clone(), &config));

        let mut nav = Navigator::new(Services {
            env: env.clone(),
            prompt: prompt.clone(),
            store: ConfigStore::open(dir.path().join("store.json")).unwrap(),
            global_config: GlobalConfig::new(dir.path().join(".yo-rc-global.json")),
            registry: registry.clone(),
            update_checker: Arc::new(NoUpdateCheck),
            package_manager: package_manager.clone(),
            opener: opener.clone(),
            user_name: Arc::new(FixedUserName(None)),
            out: Box::new(output.clone()),
        });
        routes::register_all(&mut nav);

        env.lookup().await.unwrap();
        nav.update_available_generators().await;

        Self {
            dir,
            prompt,
            env,
            http,
            registry,
            package_manager,
            opener,
            output,
            nav,
        }
    }

    /// Serves the keyword listing plus a packument for every package.
    pub fn serve(&self, packages: &[(&str, &str)]) {
        self.http
            .respond(&self.registry.keyword_url(), &search_json(packages));
        for (name, description) in packages {
            self.http.respond(
                &self.registry.package_url(name),
                &packument_json(name, description, "1.0.0"),
            );
        }
    }

    /// Every prompt message asked so far.
    pub fn asked(&self) -> Vec<String> {
        self.prompt.calls().into_iter().map(|call| call.message).collect()
    }
}
