//! The main menu.

use crate::generators::{GeneratorRecord, namespace_to_name};
use crate::prompt::Menu;
use crate::providers::{UserNameProvider, first_name};
use crate::router::{Navigator, Route, RouteHandler, Transition};
use anyhow::Result;
use async_trait::async_trait;
use owo_colors::OwoColorize;
use std::cmp::Reverse;

#[derive(Debug, Clone, PartialEq, Eq)]
enum HomeChoice {
    Run(String),
    Go(Route),
}

pub struct HomeRoute;

impl HomeRoute {
    async fn greeting(user_name: &dyn UserNameProvider) -> String {
        let full_name = user_name.full_name().await;
        match full_name.as_deref().and_then(first_name) {
            Some(first) => format!("'Allo {}! What would you like to do?", first),
            None => "'Allo! What would you like to do?".to_string(),
        }
    }

    fn label(record: &GeneratorRecord) -> String {
        if record.update_available {
            format!("{}{}", record.pretty_name, " ♥ Update Available!".dimmed().yellow())
        } else {
            record.pretty_name.clone()
        }
    }

    fn menu(nav: &Navigator) -> Menu<HomeChoice> {
        // Most-run first; ties keep discovery order.
        let mut apps: Vec<&GeneratorRecord> = nav
            .generators
            .records()
            .iter()
            .filter(|record| record.app_generator)
            .collect();
        apps.sort_by_key(|record| Reverse(nav.store.run_count(namespace_to_name(&record.namespace))));

        let mut menu = Menu::new().titled_separator("Run a generator");
        for record in &apps {
            menu.push_choice(Self::label(record), HomeChoice::Run(record.namespace.clone()));
        }
        menu.push_separator();

        if !nav.generators.is_empty() {
            menu.push_choice("Update your generators", HomeChoice::Go(Route::Update));
        }
        menu.push_choice("Install a generator", HomeChoice::Go(Route::Install));
        menu.push_choice("Find some help", HomeChoice::Go(Route::Help));
        if nav.global_config.has_content() {
            menu.push_choice("Clear global config", HomeChoice::Go(Route::ClearConfig));
        }
        menu.push_choice("Get me out of here!", HomeChoice::Go(Route::Exit));
        menu.separator()
    }
}

#[async_trait]
impl RouteHandler for HomeRoute {
    async fn handle(&self, nav: &mut Navigator, _arg: Option<String>) -> Result<Transition> {
        let message = Self::greeting(nav.user_name.as_ref()).await;
        let choice = Self::menu(nav).ask(nav.prompt.as_ref(), &message)?;

        Ok(match choice {
            HomeChoice::Run(namespace) => Transition::To(Route::Run, Some(namespace)),
            HomeChoice::Go(route) => Transition::to(route),
        })
    }
}
