use clap::{Arg, ArgAction, Command};
use std::io;
use std::sync::Arc;
use tracing::info;
use yoyo::app::{production_navigator, run_direct};
use yoyo::config::Config;
use yoyo::environment::{GeneratorEnvironment, NodeEnvironment};
use yoyo::generators::format_generator_list;
use yoyo::logging;

fn cli() -> Command {
    Command::new("yoyo")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Interactive launcher for scaffolding generators")
        .long_about(
            "yoyo finds the generators you have installed, runs them, and helps you \
             search the registry for new ones",
        )
        .arg(Arg::new("generator")
            .help("Generator to run directly, followed by its arguments")
            .num_args(1..)
            .trailing_var_arg(true)
            .allow_hyphen_values(true))
        .arg(Arg::new("generators")
            .long("generators")
            .help("Print the installed generators and exit")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("local-only")
            .long("local-only")
            .help("Only look for generators in node_modules above the current directory")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("config")
            .long("config")
            .help("Show configuration information")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("set-registry")
            .long("set-registry")
            .help("Set the package registry URL")
            .value_name("URL")
            .num_args(1))
        .arg(Arg::new("debug")
            .long("debug")
            .help("Enable debug logging")
            .action(ArgAction::SetTrue))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    logging::init(matches.get_flag("debug"));

    // Handle configuration commands
    if let Some(url) = matches.get_one::<String>("set-registry") {
        let mut config = Config::load()?;
        config.set_registry_url(url.clone())?;
        println!("✅ Registry URL saved successfully");
        return Ok(());
    }

    if matches.get_flag("config") {
        Config::show_config_info()?;
        return Ok(());
    }

    let config = Config::load()?;
    let env = Arc::new(NodeEnvironment::new(&config, matches.get_flag("local-only")));
    env.lookup().await?;

    if matches.get_flag("generators") {
        println!("Available Generators:\n\n{}", format_generator_list(&env.generators_meta()));
        return Ok(());
    }

    let generator_args: Vec<String> = matches
        .get_many::<String>("generator")
        .unwrap_or_default()
        .map(|s| s.to_string())
        .collect();

    if let Some((name, args)) = generator_args.split_first() {
        info!("Running generator {} directly", name);
        return run_direct(env.as_ref(), &mut io::stdout(), name, args).await;
    }

    let mut nav = production_navigator(&config, env)?;
    nav.update_available_generators().await;
    nav.run_session().await
}
