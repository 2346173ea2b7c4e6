use crate::router::{Navigator, RouteHandler, Transition};
use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;

const FAREWELL: &str = "Bye from us! Chat soon.";
const SIGNATURE: &str = "The Yeoman Team https://github.com/yeoman/yeoman#team";

/// Draws `lines` inside a rounded box.
fn frame(lines: &[&str]) -> String {
    let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let rule = "─".repeat(width + 2);

    let mut framed = format!("╭{}╮\n", rule);
    for line in lines {
        framed.push_str(&format!("│ {:<width$} │\n", line, width = width));
    }
    framed.push_str(&format!("╰{}╯", rule));
    framed
}

pub fn farewell() -> String {
    frame(&[FAREWELL, "", SIGNATURE])
}

/// Terminal route.
pub struct ExitRoute;

#[async_trait]
impl RouteHandler for ExitRoute {
    async fn handle(&self, nav: &mut Navigator, _arg: Option<String>) -> Result<Transition> {
        writeln!(nav.out(), "\n{}", farewell())?;
        nav.out().flush()?;
        Ok(Transition::Done)
    }
}
