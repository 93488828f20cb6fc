//! `ccsl setup`: non-interactive config edits.
//!
//! Currently a single change: enabling the `ccusage` segment, an external
//! producer run through the `ccsl-ccusage` binary.

use ccsl_core::config::{Config, PluginConfig, PluginKind};
use ccsl_core::render::template;
use std::path::Path;

pub const CCUSAGE: &str = "ccusage";
pub const CCUSAGE_COMMAND: &str = "ccsl-ccusage";
pub const DEFAULT_POSITION: &str = "after:git";

const CCUSAGE_TIMEOUT_MS: u64 = 250;
const CCUSAGE_TTL_MS: i64 = 1500;

/// Where to place a new id relative to existing ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    After(String),
    Before(String),
    End,
}

impl Position {
    /// `after:X`, `before:X`, or `end`. Anything else means `after:git`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s == "end" {
            Position::End
        } else if let Some(id) = s.strip_prefix("before:") {
            Position::Before(id.to_string())
        } else if let Some(id) = s.strip_prefix("after:") {
            Position::After(id.to_string())
        } else {
            Position::After("git".to_string())
        }
    }
}

/// Replace any `key value` pair already in `args`, then append it.
pub fn set_arg(args: &[String], key: &str, value: &str) -> Vec<String> {
    let mut out = Vec::with_capacity(args.len() + 2);
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == key {
            iter.next();
            continue;
        }
        out.push(arg.clone());
    }
    out.push(key.to_string());
    out.push(value.to_string());
    out
}

/// `order` with `id` moved to `position`, other duplicates dropped. When the
/// anchor is missing, `id` goes last.
pub fn ensure_in_order(order: &[String], id: &str, position: &Position) -> Vec<String> {
    let mut filtered: Vec<String> = Vec::with_capacity(order.len() + 1);
    for s in order {
        if s != id && !filtered.contains(s) {
            filtered.push(s.clone());
        }
    }
    let index = match position {
        Position::End => None,
        Position::Before(anchor) => filtered.iter().position(|s| s == anchor),
        Position::After(anchor) => filtered.iter().position(|s| s == anchor).map(|i| i + 1),
    };
    match index {
        Some(i) => filtered.insert(i, id.to_string()),
        None => filtered.push(id.to_string()),
    }
    filtered
}

/// Insert `placeholder` into `template` next to the anchor's placeholder,
/// or at the end when there is no anchor. Templates that already
/// reference `id` are left alone.
pub fn ensure_in_template(template: &str, id: &str, placeholder: &str, position: &Position) -> String {
    let found = template::placeholders(template);
    if found.iter().any(|(_, ph)| ph.id == id) {
        return template.to_string();
    }

    let at = match position {
        Position::End => None,
        Position::Before(anchor) => found
            .iter()
            .find(|(_, ph)| ph.id == anchor)
            .map(|(range, _)| range.start),
        Position::After(anchor) => found
            .iter()
            .find(|(_, ph)| ph.id == anchor)
            .map(|(range, _)| range.end),
    }
    .unwrap_or(template.len());

    let mut out = template.to_string();
    out.insert_str(at, placeholder);
    out
}

/// Enable the `ccusage` exec producer in `config`.
///
/// Existing timeout and TTL settings are kept; `token_limit` (a number or
/// `max`) replaces any previous `--token-limit`.
pub fn enable_ccusage(config: &mut Config, token_limit: Option<&str>, position: &Position) {
    let mut plugin = config.plugin.remove(CCUSAGE).unwrap_or_default();
    plugin.kind = PluginKind::Exec;
    plugin.command = CCUSAGE_COMMAND.to_string();
    if plugin.timeout_ms == 0 {
        plugin.timeout_ms = CCUSAGE_TIMEOUT_MS;
    }
    if plugin.cache_ttl_ms == 0 {
        plugin.cache_ttl_ms = CCUSAGE_TTL_MS;
    }
    if let Some(limit) = token_limit.map(str::trim).filter(|l| !l.is_empty()) {
        plugin.args = set_arg(&plugin.args, "--token-limit", limit);
    }
    config.plugin.insert(CCUSAGE.to_string(), plugin);

    // An empty order means "follow the template"; pin it down first so the
    // new id does not become the only one.
    let order = config.segment_order();
    config.plugins.order = ensure_in_order(&order, CCUSAGE, position);
    config.ui.template =
        ensure_in_template(&config.ui.template, CCUSAGE, "{ccusage?prefix=  }", position);
}

/// Apply the requested changes and write them to `path`. Returns the
/// message to print.
pub fn run(
    config: &mut Config,
    path: &Path,
    enable: bool,
    token_limit: Option<&str>,
    position: &str,
) -> Result<String, crate::config::ConfigError> {
    if !enable {
        return Ok("No changes made. Pass --enable-ccusage to add the ccusage segment.".to_string());
    }
    enable_ccusage(config, token_limit, &Position::parse(position));
    crate::config::save(config, path)?;
    Ok(format!(
        "Updated {}\nDone. Restart Claude Code to pick up changes.",
        path.display()
    ))
}

/// Descriptor `enable_ccusage` would create on a fresh config.
pub fn ccusage_plugin() -> PluginConfig {
    PluginConfig::exec(CCUSAGE_COMMAND, Vec::new())
        .with_timeout_ms(CCUSAGE_TIMEOUT_MS)
        .with_cache_ttl_ms(CCUSAGE_TTL_MS)
}
