//! yoyo - an interactive launcher for scaffolding generators.
//!
//! This library provides the menus and plumbing behind the `yoyo` binary:
//!
//! - **Running** installed generators, ranked by how often you use them
//! - **Searching** the package registry for new generators and installing them
//! - **Updating** installed generators in one go
//! - **Clearing** per-generator entries from the shared global config file
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`router`] - The navigator: route table and dispatch loop
//! - [`routes`] - One handler per screen (home, run, install, update, ...)
//! - [`generators`] - Directory of installed top-level generators
//! - [`environment`] - Generator lookup and execution
//! - [`registry`] - Registry search pipeline
//! - [`installer`] - Package-manager subprocess
//! - [`prompt`] - Interactive prompt abstraction
//! - [`config_store`] - Launcher state (run counts)
//! - [`global_config`] - The shared `~/.yo-rc-global.json` file
//! - [`config`] - User configuration (registry, package manager, engine)
//! - [`providers`] - Shared dependency injection traits
//! - [`http_client`] - HTTP client abstraction
//!
//! The `test_support` module holds scripted fakes for every collaborator.
//! Enable the `test-util` feature to use it from integration tests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use yoyo::app::production_navigator;
//! use yoyo::config::Config;
//! use yoyo::environment::{GeneratorEnvironment, NodeEnvironment};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let env = Arc::new(NodeEnvironment::new(&config, false));
//!     env.lookup().await?;
//!
//!     let mut nav = production_navigator(&config, env)?;
//!     nav.update_available_generators().await;
//!     nav.run_session().await
//! }
//! ```

pub mod app;
pub mod config;
pub mod config_store;
pub mod environment;
pub mod error;
pub mod generators;
pub mod global_config;
pub mod http_client;
pub mod installer;
pub mod logging;
pub mod prompt;
pub mod providers;
pub mod registry;
pub mod router;
pub mod routes;

#[cfg(any(test, feature = "test-util"))]
pub mod test_support;
