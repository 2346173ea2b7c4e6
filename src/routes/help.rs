use crate::prompt::Menu;
use crate::router::{Navigator, Route, RouteHandler, Transition};
use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;

pub const HELP_LINKS: &[(&str, &str)] = &[
    ("Take me to the documentation", "http://yeoman.io/learning/"),
    ("View Frequently Asked Questions", "http://yeoman.io/learning/faq.html"),
    ("File an issue on GitHub", "http://yeoman.io/contributing/opening-issues.html"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum HelpChoice {
    Open(&'static str),
    Home,
}

pub struct HelpRoute;

#[async_trait]
impl RouteHandler for HelpRoute {
    async fn handle(&self, nav: &mut Navigator, _arg: Option<String>) -> Result<Transition> {
        let mut menu = Menu::new();
        for &(label, url) in HELP_LINKS {
            menu.push_choice(label, HelpChoice::Open(url));
        }
        menu.push_choice("Take me back home, Yo!", HelpChoice::Home);

        let choice = menu.ask(
            nav.prompt.as_ref(),
            "Here are a few helpful resources.\n\nI will open the link you select in your browser for you",
        )?;

        match choice {
            HelpChoice::Open(url) => {
                nav.opener.open(url)?;
                Ok(Transition::to(Route::Exit))
            }
            HelpChoice::Home => {
                writeln!(nav.out(), "I get it, you like learning on your own. I respect that.")?;
                Ok(Transition::to(Route::Home))
            }
        }
    }
}
