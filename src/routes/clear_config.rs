//! Removes generator entries from the global config file.

use crate::generators::namespace_to_name;
use crate::prompt::Menu;
use crate::router::{Navigator, Route, RouteHandler, Transition};
use anyhow::Result;
use async_trait::async_trait;
use owo_colors::OwoColorize;
use std::cmp::Reverse;
use std::io::Write;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClearChoice {
    Key(String),
    All,
    Home,
}

pub struct ClearConfigRoute;

impl ClearConfigRoute {
    /// One `(label, rank, key)` per global-config entry, most-run first.
    ///
    /// Keys look like `<package>:<version>`. Entries whose package is no
    /// longer installed rank last and say so.
    fn entries(nav: &Navigator) -> Result<Vec<(String, u64, String)>> {
        let mut entries: Vec<(String, u64, String)> = nav
            .global_config
            .get_all()?
            .keys()
            .map(|key| {
                let name = namespace_to_name(key);
                match nav.generators.get(name) {
                    Some(generator) => (
                        generator.pretty_name.clone(),
                        nav.store.run_count(namespace_to_name(&generator.namespace)),
                        key.clone(),
                    ),
                    None => (
                        format!(
                            "{}{}",
                            name.trim_start_matches("generator-"),
                            " (not installed anymore)".red()
                        ),
                        0,
                        key.clone(),
                    ),
                }
            })
            .collect();

        entries.sort_by_key(|(_, runs, _)| Reverse(*runs));
        Ok(entries)
    }
}

#[async_trait]
impl RouteHandler for ClearConfigRoute {
    async fn handle(&self, nav: &mut Navigator, _arg: Option<String>) -> Result<Transition> {
        let entries = Self::entries(nav)?;

        let mut menu = Menu::new();
        for (label, _, key) in &entries {
            menu.push_choice(label.clone(), ClearChoice::Key(key.clone()));
        }
        if !entries.is_empty() {
            menu.push_separator();
            menu.push_choice("Clear all", ClearChoice::All);
        }
        menu.push_choice("Take me back home, Yo!", ClearChoice::Home);

        match menu.ask(nav.prompt.as_ref(), "Which store would you like to clear?")? {
            ClearChoice::Home => return Ok(Transition::to(Route::Home)),
            ClearChoice::Key(key) => nav.global_config.remove(&key)?,
            ClearChoice::All => nav.global_config.remove_all()?,
        }

        info!("Global config cleared");
        writeln!(nav.out(), "Global config has been successfully cleared")?;
        Ok(Transition::to(Route::Home))
    }
}
