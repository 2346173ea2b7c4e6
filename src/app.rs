//! Production wiring used by the binary.

use crate::config::Config;
use crate::config_store::ConfigStore;
use crate::environment::{GeneratorEnvironment, package_to_namespace};
use crate::generators::{NoUpdateCheck, UpdateChecker, namespace_to_name};
use crate::global_config::GlobalConfig;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::installer::NpmPackageManager;
use crate::prompt::TerminalPrompt;
use crate::providers::{GitUserName, SystemLinkOpener};
use crate::registry::RegistryClient;
use crate::router::{Navigator, Services};
use crate::routes;
use anyhow::{Result, anyhow};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;

/// A navigator with every route registered, talking to the real terminal,
/// registry, and package manager.
pub fn production_navigator(config: &Config, env: Arc<dyn GeneratorEnvironment>) -> Result<Navigator> {
    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let registry = Arc::new(RegistryClient::from_config(http, config));
    let update_checker: Arc<dyn UpdateChecker> = if config.check_updates {
        registry.clone()
    } else {
        Arc::new(NoUpdateCheck)
    };

    let mut nav = Navigator::new(Services {
        env,
        prompt: Arc::new(TerminalPrompt::new()),
        store: ConfigStore::open_default()?,
        global_config: GlobalConfig::in_home()?,
        registry,
        update_checker,
        package_manager: Arc::new(NpmPackageManager::new(config.package_manager.clone())),
        opener: Arc::new(SystemLinkOpener),
        user_name: Arc::new(GitUserName),
        out: Box::new(io::stdout()),
    });
    routes::register_all(&mut nav);
    Ok(nav)
}

/// Namespace for `yoyo <name>`: `generator-node` → `node:app`,
/// `node:setup` stays as is.
pub fn direct_namespace(name: &str) -> String {
    let namespace = package_to_namespace(name);
    if namespace.contains(':') {
        namespace
    } else {
        format!("{}:app", namespace)
    }
}

/// Runs an installed generator without going through the menus.
pub async fn run_direct(
    env: &dyn GeneratorEnvironment,
    out: &mut (dyn Write + Send),
    name: &str,
    args: &[String],
) -> Result<()> {
    let namespace = direct_namespace(name);
    if namespace_to_name(&namespace) != namespace_to_name(name) {
        writeln!(
            out,
            "{}",
            "Installed generators don't need the \"generator-\" prefix.".yellow()
        )?;
        writeln!(
            out,
            "In the future, run {} instead!\n",
            format!("yoyo {}", namespace_to_name(&namespace)).blue()
        )?;
    }

    let installed = env
        .generators_meta()
        .iter()
        .any(|meta| meta.namespace == namespace);
    if !installed {
        return Err(anyhow!(
            "You don't seem to have a generator with the name \"{}\" installed. \
             Run `yoyo` and choose \"Install a generator\" to find one.",
            namespace_to_name(&namespace)
        ));
    }

    info!("Running {} directly with {:?}", namespace, args);
    env.run(&namespace, args).await
}
