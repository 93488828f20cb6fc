//! Config file discovery, layering, and the `setup` round trip.

use ccsl::config::{self, load_from};
use ccsl::setup;
use ccsl_core::config::{Config, PluginKind};
use std::path::PathBuf;

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_from(&[dir.path().join("nope.toml")], no_env);
    assert_eq!(loaded.source, None);
    assert_eq!(loaded.config, Config::default());
}

#[test]
fn first_parseable_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.toml");
    let good = dir.path().join("good.toml");
    let later = dir.path().join("later.toml");
    std::fs::write(&broken, "[ui\n").unwrap();
    std::fs::write(&good, "[ui]\ntruncate = 40\n").unwrap();
    std::fs::write(&later, "[ui]\ntruncate = 99\n").unwrap();

    let loaded = load_from(&[broken, good.clone(), later], no_env);
    assert_eq!(loaded.source, Some(good));
    assert_eq!(loaded.config.ui.truncate, 40);
    // Untouched sections keep their defaults.
    assert_eq!(loaded.config.limits.total_budget_ms, 220);
    assert_eq!(loaded.config.ui.template, Config::default().ui.template);
}

#[test]
fn file_plugins_extend_the_stock_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[plugin.weather]
type = "exec"
command = "weather-seg"
args = ["--short"]
timeout_ms = 200
only_if = 'eq(workspace.mode, "dev")'

[plugin.git]
untracked = true
"#,
    )
    .unwrap();

    let cfg = load_from(&[path], no_env).config;
    let weather = cfg.plugin("weather");
    assert_eq!(weather.kind, PluginKind::Exec);
    assert_eq!(weather.command, "weather-seg");
    assert_eq!(weather.args, vec!["--short".to_string()]);
    assert_eq!(weather.only_if, r#"eq(workspace.mode, "dev")"#);
    assert!(cfg.plugin("git").untracked);
    assert!(cfg.plugin.contains_key("model"));
    assert!(cfg.plugin.contains_key("prompt"));
}

#[test]
fn env_overrides_apply_after_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[ui]\ntruncate = 40\n[theme]\nansi = true\n").unwrap();

    let loaded = load_from(&[path], |key| match key {
        "CCSL_PROMPT_MAX" => Some("72".to_string()),
        "CCSL_ANSI" => Some("false".to_string()),
        _ => None,
    });
    assert_eq!(loaded.config.ui.truncate, 72);
    assert!(!loaded.config.theme.ansi);
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.ui.truncate = 0;
    cfg.plugin.get_mut("git").unwrap().untracked = true;
    config::save(&cfg, &path).unwrap();

    let loaded = load_from(std::slice::from_ref(&path), no_env);
    assert_eq!(loaded.source, Some(path));
    assert_eq!(loaded.config, cfg);
}

#[test]
fn setup_enables_ccusage_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let mut cfg = Config::default();

    let message = setup::run(&mut cfg, &path, true, Some("max"), "before:prompt").unwrap();
    assert!(message.contains(&path.display().to_string()));

    let reloaded = load_from(std::slice::from_ref(&path), no_env).config;
    let ccusage = reloaded.plugin(setup::CCUSAGE);
    assert_eq!(ccusage.kind, PluginKind::Exec);
    assert_eq!(ccusage.command, "ccsl-ccusage");
    assert_eq!(ccusage.timeout_ms, 250);
    assert_eq!(ccusage.cache_ttl_ms, 1500);
    assert_eq!(ccusage.args, vec!["--token-limit".to_string(), "max".to_string()]);

    let order = reloaded.segment_order();
    let at = order.iter().position(|id| id == "ccusage").unwrap();
    assert_eq!(order.get(at + 1).map(String::as_str), Some("prompt"));
    assert!(reloaded.ui.template.contains("{ccusage?prefix=  }{prompt"));

    // Running again does not duplicate anything.
    let mut again = reloaded.clone();
    setup::run(&mut again, &path, true, Some("max"), "before:prompt").unwrap();
    assert_eq!(again, reloaded);
}
