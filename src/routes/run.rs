use crate::generators::namespace_to_name;
use crate::router::{Navigator, Route, RouteHandler, Transition};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use owo_colors::OwoColorize;
use std::io::Write;
use tracing::info;

/// Runs the generator named by the route argument, then ends the session.
pub struct RunRoute;

#[async_trait]
impl RouteHandler for RunRoute {
    async fn handle(&self, nav: &mut Navigator, arg: Option<String>) -> Result<Transition> {
        let namespace = arg.ok_or_else(|| anyhow!("the run route needs a generator namespace"))?;
        let base = namespace_to_name(&namespace).to_string();

        writeln!(
            nav.out(),
            "\n{}\n{}{}\n",
            "Make sure you are in the directory you want to scaffold into.".yellow(),
            "This generator can also be run with: ".dimmed(),
            format!("yoyo {}", base).blue()
        )?;

        let runs = nav.store.increment_run_count(&base)?;
        info!("Running {} (run #{})", namespace, runs);

        nav.env.run(&namespace, &[]).await?;
        Ok(Transition::to(Route::Exit))
    }
}
