//! The navigator: a table of screens and the loop that moves between them.
//!
//! Handlers never call each other. Each one returns a [`Transition`] naming
//! its successor and [`Navigator::navigate`] keeps dispatching until a
//! handler returns [`Transition::Done`], so a long session never grows the
//! stack.

use crate::config_store::ConfigStore;
use crate::environment::GeneratorEnvironment;
use crate::error::LauncherError;
use crate::generators::{GeneratorDirectory, UpdateChecker};
use crate::global_config::GlobalConfig;
use crate::installer::PackageManager;
use crate::prompt::Prompt;
use crate::providers::{LinkOpener, UserNameProvider};
use crate::registry::RegistryClient;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Every screen the launcher can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Run,
    Install,
    Update,
    ClearConfig,
    Help,
    Exit,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Run,
        Route::Install,
        Route::Update,
        Route::ClearConfig,
        Route::Help,
        Route::Exit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Route::Home => "home",
            Route::Run => "run",
            Route::Install => "install",
            Route::Update => "update",
            Route::ClearConfig => "clearConfig",
            Route::Help => "help",
            Route::Exit => "exit",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Route {
    type Err = LauncherError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Route::ALL
            .into_iter()
            .find(|route| route.name() == name)
            .ok_or_else(|| LauncherError::RouteNotFound(name.to_string()))
    }
}

/// What a handler wants to happen next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    To(Route, Option<String>),
    Done,
}

impl Transition {
    pub fn to(route: Route) -> Self {
        Transition::To(route, None)
    }
}

#[async_trait]
pub trait RouteHandler: Send + Sync {
    async fn handle(&self, nav: &mut Navigator, arg: Option<String>) -> Result<Transition>;
}

/// Collaborators handed to the navigator at construction.
pub struct Services {
    pub env: Arc<dyn GeneratorEnvironment>,
    pub prompt: Arc<dyn Prompt>,
    pub store: ConfigStore,
    pub global_config: GlobalConfig,
    pub registry: Arc<RegistryClient>,
    pub update_checker: Arc<dyn UpdateChecker>,
    pub package_manager: Arc<dyn PackageManager>,
    pub opener: Arc<dyn LinkOpener>,
    pub user_name: Arc<dyn UserNameProvider>,
    pub out: Box<dyn Write + Send>,
}

pub struct Navigator {
    routes: HashMap<Route, Arc<dyn RouteHandler>>,
    pub env: Arc<dyn GeneratorEnvironment>,
    pub prompt: Arc<dyn Prompt>,
    pub store: ConfigStore,
    pub global_config: GlobalConfig,
    pub generators: GeneratorDirectory,
    pub registry: Arc<RegistryClient>,
    pub update_checker: Arc<dyn UpdateChecker>,
    pub package_manager: Arc<dyn PackageManager>,
    pub opener: Arc<dyn LinkOpener>,
    pub user_name: Arc<dyn UserNameProvider>,
    out: Box<dyn Write + Send>,
}

impl Navigator {
    /// A navigator with no routes and an empty generator directory.
    pub fn new(services: Services) -> Self {
        Self {
            routes: HashMap::new(),
            env: services.env,
            prompt: services.prompt,
            store: services.store,
            global_config: services.global_config,
            generators: GeneratorDirectory::new(),
            registry: services.registry,
            update_checker: services.update_checker,
            package_manager: services.package_manager,
            opener: services.opener,
            user_name: services.user_name,
            out: services.out,
        }
    }

    /// Registers `handler` for `route`, replacing any previous one.
    pub fn register_route(
        &mut self,
        route: Route,
        handler: impl RouteHandler + 'static,
    ) -> &mut Self {
        self.routes.insert(route, Arc::new(handler));
        self
    }

    pub fn has_route(&self, route: Route) -> bool {
        self.routes.contains_key(&route)
    }

    /// Runs `route` and every route it leads to, until one is terminal.
    ///
    /// # Errors
    ///
    /// [`LauncherError::RouteNotFound`] when a route in the chain has no
    /// handler (checked before dispatching to it), or whatever a handler fails
    /// with.
    pub async fn navigate(&mut self, route: Route, arg: Option<String>) -> Result<()> {
        let mut next = Transition::To(route, arg);

        while let Transition::To(route, arg) = next {
            let handler = self
                .routes
                .get(&route)
                .cloned()
                .ok_or_else(|| LauncherError::RouteNotFound(route.to_string()))?;

            debug!("Navigating to {} with {:?}", route, arg);
            next = handler.handle(self, arg).await?;
        }

        Ok(())
    }

    /// Like [`navigate`](Self::navigate), for a route given by name.
    pub async fn navigate_named(&mut self, name: &str, arg: Option<String>) -> Result<()> {
        let route: Route = name.parse()?;
        self.navigate(route, arg).await
    }

    /// An interactive session starting at `home`. Any failure still passes
    /// through `exit`; an interrupted prompt is not reported as an error.
    pub async fn run_session(&mut self) -> Result<()> {
        let Err(e) = self.navigate(Route::Home, None).await else {
            return Ok(());
        };

        if is_interrupt(&e) {
            info!("Prompt interrupted; leaving");
            return self.navigate(Route::Exit, None).await;
        }

        if let Err(exit_err) = self.navigate(Route::Exit, None).await {
            warn!("Exit route failed after session error: {}", exit_err);
        }
        Err(e)
    }

    /// Rebuilds the generator directory, including update checks.
    pub async fn update_available_generators(&mut self) {
        self.generators
            .refresh(self.env.as_ref(), self.update_checker.as_ref())
            .await;
    }

    /// Re-scans the environment, then refreshes the directory.
    pub async fn relookup(&mut self) -> Result<()> {
        self.env.lookup().await?;
        self.update_available_generators().await;
        Ok(())
    }

    /// Where handlers write their messages.
    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }
}

fn is_interrupt(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<LauncherError>(),
        Some(LauncherError::PromptInterrupted)
    )
}
