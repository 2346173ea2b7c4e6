use anyhow::Result;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Helper to run yoyo with an isolated home directory and working directory
fn run_yoyo(home: &Path, cwd: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_yoyo"));
    cmd.args(args);
    cmd.current_dir(cwd);

    // Keep the user's real settings out of the way
    cmd.env("HOME", home);
    cmd.env("USERPROFILE", home);
    cmd.env_remove("YOYO_REGISTRY_URL");
    cmd.env_remove("YOYO_PACKAGE_MANAGER");
    cmd.env_remove("YOYO_LOG");

    let output = cmd.output()?;
    Ok(output)
}

fn write_generator(project: &Path, package: &str, subs: &[&str]) {
    let root = project.join("node_modules").join(package);
    for sub in subs {
        let dir = root.join("generators").join(sub);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.js"), "module.exports = {};").unwrap();
    }
    fs::write(
        root.join("package.json"),
        format!(r#"{{"name": "{}", "version": "1.0.0"}}"#, package),
    )
    .unwrap();
}

#[test]
fn test_version_flag() -> Result<()> {
    let home = TempDir::new()?;
    let output = run_yoyo(home.path(), home.path(), &["--version"])?;

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));

    Ok(())
}

#[test]
fn test_generators_flag_lists_local_generators() -> Result<()> {
    let home = TempDir::new()?;
    let project = TempDir::new()?;
    write_generator(project.path(), "generator-phoenix", &["app", "misc"]);

    let output = run_yoyo(home.path(), project.path(), &["--local-only", "--generators"])?;

    assert!(output.status.success(), "Listing generators should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Available Generators:"));
    assert!(stdout.contains("  phoenix\n    misc"));

    Ok(())
}

#[test]
fn test_unknown_generator_fails() -> Result<()> {
    let home = TempDir::new()?;
    let project = TempDir::new()?;

    let output = run_yoyo(home.path(), project.path(), &["--local-only", "unicorn"])?;

    assert!(!output.status.success(), "Running a missing generator should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"unicorn\""), "Should name the missing generator");

    Ok(())
}

#[test]
fn test_set_registry_persists_and_config_shows_it() -> Result<()> {
    let home = TempDir::new()?;

    let output = run_yoyo(
        home.path(),
        home.path(),
        &["--set-registry", "https://registry.example.com/"],
    )?;
    assert!(output.status.success());
    assert!(home.path().join(".yoyo/config.toml").exists());

    let output = run_yoyo(home.path(), home.path(), &["--config"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Status: Found"));
    assert!(stdout.contains("Registry: https://registry.example.com"));

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_direct_run_hands_namespace_and_args_to_engine() -> Result<()> {
    let home = TempDir::new()?;
    let project = TempDir::new()?;
    write_generator(project.path(), "generator-phoenix", &["app"]);
    fs::create_dir_all(home.path().join(".yoyo"))?;
    fs::write(
        home.path().join(".yoyo/config.toml"),
        "engine_command = [\"echo\", \"engine\"]\n",
    )?;

    let output = run_yoyo(
        home.path(),
        project.path(),
        &["--local-only", "generator-phoenix", "my-app", "--skip-install"],
    )?;

    assert!(output.status.success(), "Direct run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("don't need the \"generator-\" prefix"));
    assert!(stdout.contains("engine phoenix:app my-app --skip-install"));

    Ok(())
}
