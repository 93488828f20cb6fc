//! Configuration types consumed by the collector and renderer.
//!
//! All sections deserialize with defaults, so a config file only needs the
//! keys it overrides. Loading from disk and environment overrides live in
//! the `ccsl` crate; this module only defines the shape.
//!
//! ```toml
//! [ui]
//! template = "{model}  {cwd}{git?prefix=  }"
//! truncate = 120
//!
//! [plugin.git]
//! type = "builtin"
//! timeout_ms = 90
//! cache_ttl_ms = 300
//!
//! [plugin.ccusage]
//! type = "exec"
//! command = "ccsl-ccusage"
//! only_if = "has(transcript_path)"
//! ```

use crate::render::template;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Full configuration, read-only during collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ui: UiConfig,
    pub theme: ThemeConfig,
    pub plugins: PluginsConfig,
    pub plugin: BTreeMap<String, PluginConfig>,
    pub limits: LimitsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ui: UiConfig::default(),
            theme: ThemeConfig::default(),
            plugins: PluginsConfig::default(),
            plugin: default_plugins(),
            limits: LimitsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub template: String,
    /// Maximum visible width of the line. `0` disables truncation.
    pub truncate: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            template: "{model}  {cwd}  {agent}  {git?prefix=  }{prompt?prefix= — 🗣 }".to_string(),
            truncate: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// `auto` | `light` | `dark`.
    pub mode: String,
    pub icons: bool,
    pub ansi: bool,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: "auto".to_string(),
            icons: true,
            ansi: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Explicit producer order. Empty means "derive from the template".
    pub order: Vec<String>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            order: ["model", "cwd", "agent", "git", "prompt"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// How a producer is invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    #[default]
    Builtin,
    Exec,
}

impl PluginKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PluginKind::Builtin => "builtin",
            PluginKind::Exec => "exec",
        }
    }
}

/// Per-producer descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    #[serde(rename = "type")]
    pub kind: PluginKind,
    /// Program to run for `exec` producers.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub command: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Style override applied to whatever the producer returns.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub style: String,
    /// Per-producer deadline. `0` falls back to `limits.per_plugin_timeout_ms`.
    pub timeout_ms: u64,
    /// Cache lifetime. `<= 0` disables caching unless the producer asks.
    pub cache_ttl_ms: i64,
    /// Condition expression gating the producer (see [`crate::condition`]).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub only_if: String,
    /// Context path whose value scopes the cache key instead of the
    /// workspace directories.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cache_key: String,
    /// git: include untracked files when computing dirtiness.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub untracked: bool,
    /// ctx: percentage at which the segment turns yellow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warn_percent: Option<f64>,
    /// ctx: percentage at which the segment turns red.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_percent: Option<f64>,
    /// Values the producer suppresses instead of rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide: Option<Vec<String>>,
}

impl PluginConfig {
    pub fn builtin(timeout_ms: u64, cache_ttl_ms: i64) -> Self {
        Self {
            kind: PluginKind::Builtin,
            timeout_ms,
            cache_ttl_ms,
            ..Default::default()
        }
    }

    /// `exec` with a non-blank command. An `exec` entry without one is
    /// dispatched like a builtin.
    pub fn runs_command(&self) -> bool {
        self.kind == PluginKind::Exec && !self.command.trim().is_empty()
    }

    pub fn exec(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind: PluginKind::Exec,
            command: command.into(),
            args,
            ..Default::default()
        }
    }

    pub fn with_only_if(mut self, expr: impl Into<String>) -> Self {
        self.only_if = expr.into();
        self
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    pub fn with_cache_ttl_ms(mut self, ms: i64) -> Self {
        self.cache_ttl_ms = ms;
        self
    }

    pub fn with_cache_key(mut self, path: impl Into<String>) -> Self {
        self.cache_key = path.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub per_plugin_timeout_ms: u64,
    pub total_budget_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            per_plugin_timeout_ms: 120,
            total_budget_ms: 220,
        }
    }
}

fn default_plugins() -> BTreeMap<String, PluginConfig> {
    let mut git = PluginConfig::builtin(90, 300);
    git.style = "dim".to_string();
    BTreeMap::from([
        ("git".to_string(), git),
        ("model".to_string(), PluginConfig::builtin(10, 0)),
        ("cwd".to_string(), PluginConfig::builtin(10, 0)),
        ("agent".to_string(), PluginConfig::builtin(20, 100)),
        ("prompt".to_string(), PluginConfig::builtin(30, 50)),
    ])
}

impl Config {
    /// Default configuration with the stock producer table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the stock descriptors for any producer a loaded file left out,
    /// so `[plugin.x]` in a file extends the table instead of replacing it.
    pub fn fill_default_plugins(&mut self) {
        for (id, plugin) in default_plugins() {
            self.plugin.entry(id).or_insert(plugin);
        }
    }

    /// Producer ids in run order: the explicit order, or the template's
    /// placeholders in first-occurrence order.
    pub fn segment_order(&self) -> Vec<String> {
        if self.plugins.order.is_empty() {
            template::placeholder_ids(&self.ui.template)
        } else {
            self.plugins.order.clone()
        }
    }

    /// Descriptor for `id`, or a plain builtin descriptor if none is set.
    pub fn plugin(&self, id: &str) -> PluginConfig {
        self.plugin.get(id).cloned().unwrap_or_default()
    }

    /// The producer's own deadline, falling back to the global default.
    pub fn effective_timeout(&self, plugin: &PluginConfig) -> Duration {
        let ms = if plugin.timeout_ms > 0 {
            plugin.timeout_ms
        } else {
            self.limits.per_plugin_timeout_ms
        };
        Duration::from_millis(ms)
    }

    /// Overall collection deadline.
    pub fn total_budget(&self) -> Duration {
        Duration::from_millis(self.limits.total_budget_ms)
    }
}
