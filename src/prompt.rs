//! Interactive prompts used by the route handlers.
//!
//! Handlers talk to the [`Prompt`] trait; [`TerminalPrompt`] renders it with
//! `dialoguer`, and tests plug in scripted answers. [`Menu`] adds typed values
//! on top of the index-based `select`.

use crate::error::LauncherError;
use anyhow::Result;
use dialoguer::{Input, MultiSelect, Select};
use owo_colors::OwoColorize;
use tracing::debug;

/// One line of a list prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Choice(String),
    /// Non-selectable divider, optionally titled.
    Separator(Option<String>),
}

impl MenuItem {
    pub fn label(&self) -> &str {
        match self {
            MenuItem::Choice(label) => label,
            MenuItem::Separator(Some(title)) => title,
            MenuItem::Separator(None) => "",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, MenuItem::Choice(_))
    }
}

/// Validator for multi-select answers; `Err` carries the message shown
/// before asking again.
pub type SelectionValidator<'a> = &'a (dyn Fn(&[usize]) -> Result<(), String> + Sync);

/// The interactive-prompt collaborator.
pub trait Prompt: Send + Sync {
    /// Shows a list and returns the index of the chosen item. The returned
    /// index always points at a [`MenuItem::Choice`].
    fn select(&self, message: &str, items: &[MenuItem]) -> Result<usize>;

    /// Free text input. Empty answers are allowed.
    fn input(&self, message: &str) -> Result<String>;

    /// Checkbox list. Keeps asking until `validate` accepts the selection.
    fn multi_select(
        &self,
        message: &str,
        items: &[String],
        checked: &[bool],
        validate: SelectionValidator<'_>,
    ) -> Result<Vec<usize>>;
}

enum Entry<T> {
    Choice { label: String, value: T },
    Separator(Option<String>),
}

/// A list prompt whose choices carry typed values.
pub struct Menu<T> {
    entries: Vec<Entry<T>>,
}

impl<T: Clone> Menu<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn choice(mut self, label: impl Into<String>, value: T) -> Self {
        self.push_choice(label, value);
        self
    }

    pub fn separator(mut self) -> Self {
        self.entries.push(Entry::Separator(None));
        self
    }

    pub fn titled_separator(mut self, title: impl Into<String>) -> Self {
        self.entries.push(Entry::Separator(Some(title.into())));
        self
    }

    pub fn push_choice(&mut self, label: impl Into<String>, value: T) {
        self.entries.push(Entry::Choice {
            label: label.into(),
            value,
        });
    }

    pub fn push_separator(&mut self) {
        self.entries.push(Entry::Separator(None));
    }

    pub fn items(&self) -> Vec<MenuItem> {
        self.entries
            .iter()
            .map(|entry| match entry {
                Entry::Choice { label, .. } => MenuItem::Choice(label.clone()),
                Entry::Separator(title) => MenuItem::Separator(title.clone()),
            })
            .collect()
    }

    /// Values of the selectable entries, in display order.
    pub fn values(&self) -> Vec<&T> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Choice { value, .. } => Some(value),
                Entry::Separator(_) => None,
            })
            .collect()
    }

    /// Asks the user and returns the value behind their choice.
    pub fn ask(&self, prompt: &dyn Prompt, message: &str) -> Result<T> {
        let index = prompt.select(message, &self.items())?;
        match self.entries.get(index) {
            Some(Entry::Choice { value, .. }) => Ok(value.clone()),
            _ => Err(LauncherError::Prompt(format!("selection {} is not a choice", index)).into()),
        }
    }
}

impl<T: Clone> Default for Menu<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders prompts on the terminal with `dialoguer`.
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }

    fn separator_label(title: Option<&str>) -> String {
        match title {
            Some(title) => title.dimmed().to_string(),
            None => "──────────────".dimmed().to_string(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for TerminalPrompt {
    fn select(&self, message: &str, items: &[MenuItem]) -> Result<usize> {
        let first_choice = items
            .iter()
            .position(MenuItem::is_choice)
            .ok_or_else(|| LauncherError::Prompt("menu has no choices".to_string()))?;

        let labels: Vec<String> = items
            .iter()
            .map(|item| match item {
                MenuItem::Choice(label) => label.clone(),
                MenuItem::Separator(title) => Self::separator_label(title.as_deref()),
            })
            .collect();

        // dialoguer cannot disable rows, so separators are shown and a
        // selection that lands on one simply asks again.
        loop {
            let index = Select::new()
                .with_prompt(message)
                .items(&labels)
                .default(first_choice)
                .interact()
                .map_err(LauncherError::from)?;

            if items[index].is_choice() {
                return Ok(index);
            }
            debug!("Ignoring selection of separator at {}", index);
        }
    }

    fn input(&self, message: &str) -> Result<String> {
        let answer = Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map_err(LauncherError::from)?;
        Ok(answer)
    }

    fn multi_select(
        &self,
        message: &str,
        items: &[String],
        checked: &[bool],
        validate: SelectionValidator<'_>,
    ) -> Result<Vec<usize>> {
        loop {
            let selection = MultiSelect::new()
                .with_prompt(message)
                .items(items)
                .defaults(checked)
                .interact()
                .map_err(LauncherError::from)?;

            match validate(&selection) {
                Ok(()) => return Ok(selection),
                Err(message) => eprintln!("{} {}", ">>".red(), message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Answer, ScriptedPrompt};

    #[derive(Debug, Clone, PartialEq)]
    enum Pick {
        Red,
        Blue,
    }

    fn colours() -> Menu<Pick> {
        Menu::new()
            .titled_separator("Colours")
            .choice("Red", Pick::Red)
            .separator()
            .choice("Blue", Pick::Blue)
    }

    #[test]
    fn test_menu_items_keep_separators_in_place() {
        let items = colours().items();
        assert_eq!(
            items,
            vec![
                MenuItem::Separator(Some("Colours".to_string())),
                MenuItem::Choice("Red".to_string()),
                MenuItem::Separator(None),
                MenuItem::Choice("Blue".to_string()),
            ]
        );
        assert_eq!(colours().values(), vec![&Pick::Red, &Pick::Blue]);
    }

    #[test]
    fn test_ask_maps_index_back_to_value() {
        let prompt = ScriptedPrompt::new(vec![Answer::Choose("Blue".to_string())]);
        let picked = colours().ask(&prompt, "Pick one").unwrap();

        assert_eq!(picked, Pick::Blue);
        assert_eq!(prompt.calls()[0].message, "Pick one");
    }

    #[test]
    fn test_ask_rejects_separator_index() {
        let prompt = ScriptedPrompt::new(vec![Answer::Index(2)]);
        let err = colours().ask(&prompt, "Pick one").unwrap_err();

        assert!(matches!(
            err.downcast_ref::<LauncherError>(),
            Some(LauncherError::Prompt(_))
        ));
    }

    #[test]
    fn test_menu_item_labels() {
        assert_eq!(MenuItem::Choice("Run".to_string()).label(), "Run");
        assert_eq!(MenuItem::Separator(Some("Title".to_string())).label(), "Title");
        assert_eq!(MenuItem::Separator(None).label(), "");
        assert!(!MenuItem::Separator(None).is_choice());
    }
}
