//! Search the registry and install a generator globally.

use crate::installer::display_command;
use crate::prompt::Menu;
use crate::registry::{Candidate, InstallChoice, SearchResults};
use crate::router::{Navigator, Route, RouteHandler, Transition};
use anyhow::Result;
use async_trait::async_trait;
use owo_colors::OwoColorize;
use std::io::Write;
use tracing::{info, warn};

/// Marks official generators in the results list.
pub const OFFICIAL_MARK: &str = "෴";

fn candidate_label(candidate: &Candidate) -> String {
    let mark = if candidate.official {
        format!(" {} ", OFFICIAL_MARK).green().to_string()
    } else {
        String::new()
    };
    format!(
        "{}{} {}",
        candidate.display_name(),
        mark,
        candidate.description.dimmed()
    )
}

fn results_message(results: &SearchResults) -> String {
    if results.is_empty() {
        return "Sorry, no results matches your search term".to_string();
    }
    let legend = format!("Official generator → {}", OFFICIAL_MARK.green());
    format!("Here's what I found. {}\n  Install one?", legend.dimmed())
}

fn results_menu(results: &SearchResults) -> Menu<InstallChoice> {
    let mut menu = Menu::new();
    for choice in results.choices() {
        let label = match &choice {
            InstallChoice::Package(candidate) => candidate_label(candidate),
            InstallChoice::SearchAgain => "Search again".to_string(),
            InstallChoice::Home => "Return home".to_string(),
        };
        menu.push_choice(label, choice);
    }
    menu
}

/// Installs `package` globally, then re-scans and goes home.
///
/// The package manager's exit status does not change where we go next; a
/// failed install simply leaves the directory as it was.
pub async fn install_package(nav: &mut Navigator, package: &str) -> Result<Transition> {
    let packages = vec![package.to_string()];
    let outcome = nav.package_manager.install_global(&packages).await?;
    if !outcome.success {
        warn!("Installing {} exited with {:?}", package, outcome.code);
    }

    let command = display_command(nav.package_manager.program(), &packages);
    writeln!(
        nav.out(),
        "\nI just installed a generator by running:\n{}\n",
        format!("\n    {}", command).blue().bold()
    )?;

    nav.relookup().await?;
    Ok(Transition::to(Route::Home))
}

pub struct InstallRoute;

#[async_trait]
impl RouteHandler for InstallRoute {
    async fn handle(&self, nav: &mut Navigator, _arg: Option<String>) -> Result<Transition> {
        let term = nav.prompt.input("Search npm for generators:")?;
        let installed = nav.generators.names();

        let results = nav.registry.search(&term, &installed).await?;
        info!("Search for {:?} found {} generators", term, results.candidates.len());

        let choice = results_menu(&results).ask(nav.prompt.as_ref(), &results_message(&results))?;
        match choice {
            InstallChoice::SearchAgain => Ok(Transition::to(Route::Install)),
            InstallChoice::Home => Ok(Transition::to(Route::Home)),
            InstallChoice::Package(candidate) => install_package(nav, &candidate.name).await,
        }
    }
}
