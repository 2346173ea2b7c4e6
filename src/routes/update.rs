use crate::router::{Navigator, Route, RouteHandler, Transition};
use anyhow::Result;
use async_trait::async_trait;
use owo_colors::OwoColorize;
use std::io::Write;
use tracing::warn;

pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one generator to update.";

const SUCCESS_MESSAGE: &str = "I've just updated your generators. Remember, you can update\na specific generator with npm by running:\n";

fn require_selection(selection: &[usize]) -> Result<(), String> {
    if selection.is_empty() {
        Err(EMPTY_SELECTION_MESSAGE.to_string())
    } else {
        Ok(())
    }
}

/// Reinstalls the generators the user picks, all of them by default.
pub struct UpdateRoute;

#[async_trait]
impl RouteHandler for UpdateRoute {
    async fn handle(&self, nav: &mut Navigator, _arg: Option<String>) -> Result<Transition> {
        let records = nav.generators.records().to_vec();
        if records.is_empty() {
            writeln!(nav.out(), "You don't have any generators to update.")?;
            return Ok(Transition::to(Route::Home));
        }

        let names: Vec<String> = records.iter().map(|record| record.name.clone()).collect();
        let checked = vec![true; names.len()];
        let selection = nav.prompt.multi_select(
            "Generators to update",
            &names,
            &checked,
            &require_selection,
        )?;

        let packages: Vec<String> = selection
            .iter()
            .filter_map(|&index| records.get(index))
            .map(|record| record.install_target().to_string())
            .collect();

        let outcome = nav.package_manager.install_global(&packages).await?;
        if !outcome.success {
            warn!("Updating {:?} exited with {:?}", packages, outcome.code);
        }

        writeln!(
            nav.out(),
            "\n{}{}\n",
            SUCCESS_MESSAGE.cyan(),
            "\n    npm install -g generator-_______".magenta()
        )?;

        nav.relookup().await?;
        Ok(Transition::to(Route::Home))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::{GeneratorDirectory, GeneratorRecord};
    use crate::test_support::{Answer, Harness};

    fn records() -> GeneratorDirectory {
        let mut unicorn = GeneratorRecord::new("generator-unicorn", "unicorn:app", "1.0.0");
        unicorn.install_source = Some("github:acme/generator-unicorn".to_string());
        GeneratorDirectory::from_records(vec![
            GeneratorRecord::new("generator-cat", "cat:app", "1.0.0"),
            unicorn,
            GeneratorRecord::new("generator-dog", "dog:app", "1.0.0"),
        ])
    }

    #[test]
    fn test_require_selection() {
        assert_eq!(require_selection(&[]), Err(EMPTY_SELECTION_MESSAGE.to_string()));
        assert_eq!(require_selection(&[0]), Ok(()));
    }

    #[tokio::test]
    async fn test_all_generators_offered_and_checked() {
        let mut h = Harness::new(vec![Answer::Multi(vec![0, 2])]);
        h.navigator.generators = records();

        let next = UpdateRoute.handle(&mut h.navigator, None).await.unwrap();

        assert_eq!(next, Transition::to(Route::Home));
        let call = &h.prompt.calls()[0];
        assert_eq!(call.message, "Generators to update");
        assert_eq!(call.items, vec!["generator-cat", "generator-unicorn", "generator-dog"]);
        assert_eq!(call.checked, vec![true, true, true]);
        assert_eq!(
            h.package_manager.installs(),
            vec![vec!["generator-cat".to_string(), "generator-dog".to_string()]]
        );
        assert_eq!(h.env.lookups(), 1);
        assert!(h.output().contains("I've just updated your generators."));
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected_without_spawning() {
        let mut h = Harness::new(vec![Answer::Multi(vec![]), Answer::Multi(vec![1])]);
        h.navigator.generators = records();

        UpdateRoute.handle(&mut h.navigator, None).await.unwrap();

        assert_eq!(h.prompt.rejections(), vec![EMPTY_SELECTION_MESSAGE]);
        assert_eq!(h.package_manager.installs().len(), 1);
    }

    #[tokio::test]
    async fn test_alternate_source_is_reinstalled_from_its_origin() {
        let mut h = Harness::new(vec![Answer::Multi(vec![1])]);
        h.navigator.generators = records();

        UpdateRoute.handle(&mut h.navigator, None).await.unwrap();

        assert_eq!(
            h.package_manager.installs(),
            vec![vec!["github:acme/generator-unicorn".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_nothing_installed_goes_home_without_prompting() {
        let mut h = Harness::new(vec![]);

        let next = UpdateRoute.handle(&mut h.navigator, None).await.unwrap();

        assert_eq!(next, Transition::to(Route::Home));
        assert!(h.prompt.calls().is_empty());
    }
}
