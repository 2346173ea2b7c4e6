//! Fakes shared by the unit and integration tests.

use crate::config::Config;
use crate::config_store::ConfigStore;
use crate::environment::{GeneratorEnvironment, GeneratorMeta};
use crate::error::{LauncherError, RegistryError};
use crate::generators::UpdateChecker;
use crate::global_config::GlobalConfig;
use crate::http_client::HttpClient;
use crate::installer::{InstallOutcome, PackageManager};
use crate::prompt::{MenuItem, Prompt, SelectionValidator};
use crate::providers::{LinkOpener, UserNameProvider};
use crate::registry::RegistryClient;
use crate::router::{Navigator, Services};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================
// Prompt
// ============================================================

/// A scripted answer to the next prompt.
#[derive(Debug, Clone)]
pub enum Answer {
    /// Picks the choice whose label equals, or else contains, the text.
    Choose(String),
    Index(usize),
    Input(String),
    Multi(Vec<usize>),
    Interrupt,
}

pub fn choose(label: &str) -> Answer {
    Answer::Choose(label.to_string())
}

#[derive(Debug, Clone)]
pub struct PromptCall {
    pub message: String,
    pub items: Vec<String>,
    pub checked: Vec<bool>,
}

#[derive(Default)]
pub struct ScriptedPrompt {
    answers: Mutex<VecDeque<Answer>>,
    calls: Mutex<Vec<PromptCall>>,
    rejections: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PromptCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Messages the multi-select validator answered with.
    pub fn rejections(&self) -> Vec<String> {
        self.rejections.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn record(&self, message: &str, items: Vec<String>, checked: Vec<bool>) {
        self.calls.lock().unwrap().push(PromptCall {
            message: message.to_string(),
            items,
            checked,
        });
    }

    fn next(&self, message: &str) -> Answer {
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted answer left for prompt {message:?}"))
    }
}

impl Prompt for ScriptedPrompt {
    fn select(&self, message: &str, items: &[MenuItem]) -> Result<usize> {
        self.record(
            message,
            items.iter().map(|item| item.label().to_string()).collect(),
            Vec::new(),
        );

        match self.next(message) {
            Answer::Choose(label) => {
                let exact = items
                    .iter()
                    .position(|item| item.is_choice() && item.label() == label);
                let index = exact.or_else(|| {
                    items
                        .iter()
                        .position(|item| item.is_choice() && item.label().contains(&label))
                });
                Ok(index.unwrap_or_else(|| panic!("no choice {label:?} in {message:?}")))
            }
            Answer::Index(index) => Ok(index),
            Answer::Interrupt => Err(LauncherError::PromptInterrupted.into()),
            other => panic!("expected a selection for {message:?}, got {other:?}"),
        }
    }

    fn input(&self, message: &str) -> Result<String> {
        self.record(message, Vec::new(), Vec::new());

        match self.next(message) {
            Answer::Input(text) => Ok(text),
            Answer::Interrupt => Err(LauncherError::PromptInterrupted.into()),
            other => panic!("expected text input for {message:?}, got {other:?}"),
        }
    }

    fn multi_select(
        &self,
        message: &str,
        items: &[String],
        checked: &[bool],
        validate: SelectionValidator<'_>,
    ) -> Result<Vec<usize>> {
        self.record(message, items.to_vec(), checked.to_vec());

        loop {
            match self.next(message) {
                Answer::Multi(selection) => match validate(&selection) {
                    Ok(()) => return Ok(selection),
                    Err(rejection) => self.rejections.lock().unwrap().push(rejection),
                },
                Answer::Interrupt => return Err(LauncherError::PromptInterrupted.into()),
                other => panic!("expected a multi-selection for {message:?}, got {other:?}"),
            }
        }
    }
}

// ============================================================
// Environment and update checks
// ============================================================

#[derive(Default)]
pub struct FakeEnvironment {
    meta: Mutex<Vec<GeneratorMeta>>,
    lookups: AtomicUsize,
    runs: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeEnvironment {
    pub fn new(meta: Vec<GeneratorMeta>) -> Self {
        Self {
            meta: Mutex::new(meta),
            ..Self::default()
        }
    }

    pub fn set_meta(&self, meta: Vec<GeneratorMeta>) {
        *self.meta.lock().unwrap() = meta;
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> Vec<(String, Vec<String>)> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl GeneratorEnvironment for FakeEnvironment {
    async fn lookup(&self) -> Result<()> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn generators_meta(&self) -> Vec<GeneratorMeta> {
        self.meta.lock().unwrap().clone()
    }

    async fn run(&self, namespace: &str, args: &[String]) -> Result<()> {
        self.runs
            .lock()
            .unwrap()
            .push((namespace.to_string(), args.to_vec()));
        Ok(())
    }
}

/// Reports fixed latest versions per package.
#[derive(Default)]
pub struct FixedUpdates {
    latest: HashMap<String, String>,
}

impl FixedUpdates {
    pub fn new(latest: &[(&str, &str)]) -> Self {
        Self {
            latest: latest
                .iter()
                .map(|(name, version)| (name.to_string(), version.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl UpdateChecker for FixedUpdates {
    async fn latest_version(&self, package: &str) -> Option<String> {
        self.latest.get(package).cloned()
    }
}

// ============================================================
// Registry
// ============================================================

/// Serves canned bodies by URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct FakeHttp {
    responses: Mutex<HashMap<String, Result<String, u16>>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(body.to_string()));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(status));
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn get_text(&self, url: &str, _headers: &[(&str, &str)]) -> Result<String, RegistryError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;

        match self.responses.lock().unwrap().get(url).cloned() {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => Err(RegistryError::Status {
                url: url.to_string(),
                status,
            }),
            None => Err(RegistryError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Body of a keyword search listing the given `(name, description)` pairs.
pub fn search_json(packages: &[(&str, &str)]) -> String {
    let objects: Vec<_> = packages
        .iter()
        .map(|(name, description)| json!({"package": {"name": name, "description": description}}))
        .collect();
    json!({ "objects": objects }).to_string()
}

pub fn packument_json(name: &str, description: &str, version: &str) -> String {
    json!({
        "name": name,
        "description": description,
        "dist-tags": {"latest": version},
        "versions": {version: {"name": name, "version": version, "description": description}}
    })
    .to_string()
}

// ============================================================
// Package manager and desktop
// ============================================================

pub struct FakePackageManager {
    installs: Mutex<Vec<Vec<String>>>,
    outcome: InstallOutcome,
    spawn_fails: bool,
}

impl FakePackageManager {
    pub fn succeeding() -> Self {
        Self::with_outcome(InstallOutcome {
            success: true,
            code: Some(0),
        })
    }

    pub fn with_outcome(outcome: InstallOutcome) -> Self {
        Self {
            installs: Mutex::new(Vec::new()),
            outcome,
            spawn_fails: false,
        }
    }

    pub fn unspawnable() -> Self {
        Self {
            spawn_fails: true,
            ..Self::succeeding()
        }
    }

    pub fn installs(&self) -> Vec<Vec<String>> {
        self.installs.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageManager for FakePackageManager {
    fn program(&self) -> &str {
        "npm"
    }

    async fn install_global(&self, packages: &[String]) -> Result<InstallOutcome, LauncherError> {
        if self.spawn_fails {
            return Err(LauncherError::subprocess(
                "npm",
                io::Error::new(io::ErrorKind::NotFound, "npm not found"),
            ));
        }
        self.installs.lock().unwrap().push(packages.to_vec());
        Ok(self.outcome)
    }
}

#[derive(Default)]
pub struct FakeOpener {
    opened: Mutex<Vec<String>>,
}

impl FakeOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl LinkOpener for FakeOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub struct FixedUserName(pub Option<String>);

#[async_trait]
impl UserNameProvider for FixedUserName {
    async fn full_name(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A `Write` sink whose contents the test can read afterwards.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================
// Navigator harness
// ============================================================

pub const TEST_REGISTRY: &str = "http://registry.test";

/// A navigator wired to fakes, with its files in a temporary directory.
pub struct Harness {
    pub dir: TempDir,
    pub prompt: Arc<ScriptedPrompt>,
    pub env: Arc<FakeEnvironment>,
    pub http: Arc<FakeHttp>,
    pub package_manager: Arc<FakePackageManager>,
    pub opener: Arc<FakeOpener>,
    pub output: SharedBuffer,
    pub navigator: Navigator,
}

impl Harness {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self::with_package_manager(answers, FakePackageManager::succeeding())
    }

    pub fn with_package_manager(answers: Vec<Answer>, package_manager: FakePackageManager) -> Self {
        let dir = TempDir::new().unwrap();
        let prompt = Arc::new(ScriptedPrompt::new(answers));
        let env = Arc::new(FakeEnvironment::default());
        let http = Arc::new(FakeHttp::new());
        let package_manager = Arc::new(package_manager);
        let opener = Arc::new(FakeOpener::default());
        let output = SharedBuffer::default();

        let config = Config {
            registry_url: TEST_REGISTRY.to_string(),
            deny_list: Vec::new(),
            ..Config::default()
        };

        let navigator = Navigator::new(Services {
            env: env.clone(),
            prompt: prompt.clone(),
            store: ConfigStore::open(dir.path().join("store.json")).unwrap(),
            global_config: GlobalConfig::new(dir.path().join(".yo-rc-global.json")),
            registry: Arc::new(RegistryClient::from_config(http.clone(), &config)),
            update_checker: Arc::new(FixedUpdates::default()),
            package_manager: package_manager.clone(),
            opener: opener.clone(),
            user_name: Arc::new(FixedUserName(Some("Ada Lovelace".to_string()))),
            out: Box::new(output.clone()),
        });

        Self {
            dir,
            prompt,
            env,
            http,
            package_manager,
            opener,
            output,
            navigator,
        }
    }

    /// Writes an installed generator package and returns its `:app` entry.
    pub fn install_fixture(&self, package: &str, version: &str) -> GeneratorMeta {
        let root = self.dir.path().join("node_modules").join(package);
        let app = root.join("generators").join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("index.js"), "module.exports = {};").unwrap();
        fs::write(
            root.join("package.json"),
            json!({"name": package, "version": version}).to_string(),
        )
        .unwrap();

        let base = package.trim_start_matches("generator-");
        GeneratorMeta::new(format!("{}:app", base), app.join("index.js"))
    }

    /// Installs fixtures for `packages` and refreshes the directory from them.
    pub async fn with_generators(&mut self, packages: &[(&str, &str)]) {
        let meta = packages
            .iter()
            .map(|(package, version)| self.install_fixture(package, version))
            .collect();
        self.env.set_meta(meta);
        self.navigator.update_available_generators().await;
    }

    pub fn global_config_path(&self) -> PathBuf {
        self.dir.path().join(".yo-rc-global.json")
    }

    pub fn write_global_config(&self, value: serde_json::Value) {
        fs::write(
            self.global_config_path(),
            serde_json::to_string_pretty(&value).unwrap(),
        )
        .unwrap();
    }

    pub fn output(&self) -> String {
        self.output.contents()
    }
}
