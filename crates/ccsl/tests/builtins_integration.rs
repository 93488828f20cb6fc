//! Builtin producers running through the real collector.

use ccsl::builtins::git::git_segment;
use ccsl::statusline;
use ccsl_core::prelude::*;
use serde_json::json;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;

fn config(template: &str) -> Config {
    let mut config = Config::new();
    config.ui.template = template.to_string();
    config.plugins.order.clear();
    // Every producer falls back to the generous limit below.
    config.plugin.clear();
    config.theme.ansi = false;
    config.theme.icons = false;
    config.limits.per_plugin_timeout_ms = 1000;
    config.limits.total_budget_ms = 2000;
    config
}

fn write(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

#[tokio::test]
async fn session_fields_render_in_template_order() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path();
    write(&project.join(".claude/state.json"), r#"{"active_agent":"planner"}"#);
    write(&project.join(".claude/last_prompt.txt"), "refactor the   cache\nlayer");

    let payload = json!({
        "model": {"id": "opus", "display_name": "Opus"},
        "workspace": {"current_dir": project.join("src"), "project_dir": project},
        "context_window": {"used_percentage": 12.0},
        "cost": {"total_cost_usd": 0.5, "total_duration_ms": 600000},
    })
    .to_string();

    let cfg = config("{model}|{agent}|{ctx}|{cost}|{duration}|{prompt}");
    let line = statusline::render(Arc::new(cfg), payload.as_bytes()).await;
    assert_eq!(line, "Opus|planner|12%|$0.50|10m|refactor the cache layer");
}

#[tokio::test]
async fn diagnostics_cover_every_template_id() {
    let cfg = config("{model} {cwd} {nosuch}");
    let collector = statusline::collector(Arc::new(cfg));
    let collection = collector
        .collect_with_diagnostics(br#"{"model":{"display_name":"Opus"}}"#)
        .await;

    let ids: Vec<&str> = collection.diagnostics.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["model", "cwd", "nosuch"]);
    let unknown = &collection.diagnostics[2];
    assert_eq!(unknown.kind, DiagnosticKind::Unknown);
    assert!(unknown.skipped);
}

#[tokio::test]
async fn only_if_gates_a_builtin() {
    let mut cfg = config("{model}");
    cfg.plugin.insert(
        "model".into(),
        PluginConfig::builtin(100, 0).with_only_if(r#"eq(workspace.mode, "dev")"#),
    );
    let cfg = Arc::new(cfg);

    let prod = br#"{"model":{"display_name":"Opus"},"workspace":{"mode":"prod"}}"#;
    assert_eq!(statusline::render(cfg.clone(), prod).await, "");

    let dev = br#"{"model":{"display_name":"Opus"},"workspace":{"mode":"dev"}}"#;
    assert_eq!(statusline::render(cfg, dev).await, "Opus");
}

#[tokio::test]
async fn configured_style_overrides_builtin_style() {
    let mut cfg = config("{cost}");
    cfg.theme.ansi = true;
    cfg.plugin
        .insert("cost".into(), PluginConfig::builtin(100, 0).with_style("green"));
    let line = statusline::render(Arc::new(cfg), br#"{"cost":{"total_cost_usd":2}}"#).await;
    assert_eq!(line, "\x1b[32m$2.00\x1b[0m");
}

fn git(dir: &Path, args: &[&str]) -> bool {
    Command::new("git")
        .args(["-c", "user.name=t", "-c", "user.email=t@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn git_segment_in_a_real_repository() {
    let dir = tempfile::tempdir().unwrap();
    let repo = dir.path();
    // Skip where git is unavailable or too old for `init -b`.
    if !git(repo, &["init", "-q", "-b", "trunk"]) {
        return;
    }
    assert!(git(repo, &["commit", "-q", "--allow-empty", "-m", "init"]));

    assert_eq!(git_segment(repo, false).await.text, "trunk");

    std::fs::write(repo.join("notes.txt"), "x").unwrap();
    assert_eq!(git_segment(repo, false).await.text, "trunk");
    assert_eq!(git_segment(repo, true).await.text, "trunk*");

    assert!(git(repo, &["add", "notes.txt"]));
    assert!(git(repo, &["stash", "-q"]));
    assert_eq!(git_segment(repo, false).await.text, "trunk≡");
}
