//! `ccsl doctor`: run the pipeline once against a fixture and report what
//! every producer did.

use crate::config::Loaded;
use crate::logging::{self, LogLine};
use crate::statusline;
use ccsl_core::prelude::*;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Longest error text shown in the timings table.
const MAX_STATUS_ERROR: usize = 40;

const RULE_WIDTH: usize = 60;

/// Fixture used when no `--json` file is given.
pub fn default_fixture(cwd: &Path) -> Vec<u8> {
    serde_json::json!({
        "model": {"display_name": "Doctor Test"},
        "workspace": {"current_dir": cwd, "project_dir": cwd},
    })
    .to_string()
    .into_bytes()
}

/// Everything the report prints, gathered so it can be formatted and
/// tested without running producers.
pub struct Report<'a> {
    pub loaded: &'a Loaded,
    pub collection: &'a Collection,
    pub cache: &'a SegmentCache,
    pub logs: &'a [LogLine],
    pub line: &'a str,
}

/// `s` cut to `max` chars, ending in `...` when cut.
fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Left-aligned in exactly `width` chars.
fn pad(s: &str, width: usize) -> String {
    let cut: String = s.chars().take(width).collect();
    format!("{cut:<width$}")
}

pub fn status(diag: &Diagnostic) -> String {
    if let Some(error) = &diag.error {
        format!("error: {}", clip(error, MAX_STATUS_ERROR))
    } else if diag.cache_hit {
        "cache".to_string()
    } else if diag.skipped {
        "skipped".to_string()
    } else {
        "ok".to_string()
    }
}

impl Report<'_> {
    pub fn format(&self) -> String {
        let config = &self.loaded.config;
        let order = config.segment_order();
        let mut out = String::new();

        // ── Config ──
        let _ = writeln!(out, "ccsl doctor");
        let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));
        let source = match &self.loaded.source {
            Some(path) => path.display().to_string(),
            None => "(defaults)".to_string(),
        };
        let _ = writeln!(out, "Config   : {source}");
        let _ = writeln!(out, "Template : {:?}", config.ui.template);
        let _ = writeln!(out, "Truncate : {}", config.ui.truncate);
        let _ = writeln!(
            out,
            "Theme    : mode={} ansi={} icons={}",
            config.theme.mode, config.theme.ansi, config.theme.icons
        );
        let _ = writeln!(out, "Order    : {}", order.join(", "));
        let _ = writeln!(
            out,
            "Limits   : per_plugin={}ms total={}ms",
            config.limits.per_plugin_timeout_ms, config.limits.total_budget_ms
        );

        // ── Plugin table ──
        let _ = writeln!(out, "\nPlugins:");
        let _ = writeln!(out, "  ID            TYPE     TIMEOUT  TTL   ONLY_IF");
        for id in &order {
            let Some(plugin) = config.plugin.get(id) else {
                continue;
            };
            let _ = writeln!(
                out,
                "  {}  {}  {:>7}  {:>4}  {}",
                pad(id, 12),
                pad(plugin.kind.as_str(), 7),
                config.effective_timeout(plugin).as_millis(),
                plugin.cache_ttl_ms,
                plugin.only_if
            );
        }

        // ── Timings ──
        let _ = writeln!(out, "\nPlugin timings:");
        let _ = writeln!(out, "  ID            TYPE     TIME(ms)  TIMEOUT  STATUS");
        for diag in &self.collection.diagnostics {
            let _ = writeln!(
                out,
                "  {} {} {:>8}  {:>7}  {}",
                pad(&diag.id, 12),
                pad(diag.kind.as_str(), 7),
                diag.elapsed.as_millis(),
                diag.timeout.as_millis(),
                status(diag)
            );
        }

        let mut ids: Vec<&str> = self
            .collection
            .segments
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        ids.sort_unstable();
        let _ = writeln!(out, "\nSegments returned: {}", ids.join(", "));

        let _ = writeln!(
            out,
            "Cache    : entries={} hits={} misses={} hit_rate={:.0}%",
            self.cache.len(),
            self.cache.hits(),
            self.cache.misses(),
            self.cache.hit_rate() * 100.0
        );

        // ── Logs ──
        if !self.logs.is_empty() {
            let _ = writeln!(out, "\nLogs:");
            for line in self.logs {
                let _ = writeln!(out, "  {line}");
            }
        }

        let _ = writeln!(out, "\nRendered line:");
        let _ = writeln!(out, "  {}", self.line);
        out
    }
}

/// Run the doctor and return the process exit code.
pub async fn run(json: Option<PathBuf>, no_ansi: bool) -> i32 {
    let logs = logging::init_capture();

    let raw = match &json {
        Some(path) => match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("doctor: cannot read {}: {e}", path.display());
                return 2;
            }
        },
        None => {
            let cwd = std::env::current_dir().unwrap_or_default();
            default_fixture(&cwd)
        }
    };

    let mut loaded = crate::config::load();
    if no_ansi {
        loaded.config.theme.ansi = false;
    }

    let collector = statusline::collector(Arc::new(loaded.config.clone()));
    let collection = collector.collect_with_diagnostics(&raw).await;
    let line = statusline::render_collection(collector.config(), &collection);
    let captured = logs.drain();

    let report = Report {
        loaded: &loaded,
        collection: &collection,
        cache: collector.cache(),
        logs: &captured,
        line: &line,
    };
    print!("{}", report.format());
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccsl_core::runner::DiagnosticKind;
    use std::time::Duration;

    fn diag(id: &str) -> Diagnostic {
        Diagnostic::new(id, DiagnosticKind::Builtin, Duration::from_millis(90))
    }

    #[test]
    fn status_precedence() {
        let mut d = diag("git");
        assert_eq!(status(&d), "ok");
        d.skipped = true;
        assert_eq!(status(&d), "skipped");
        d.cache_hit = true;
        assert_eq!(status(&d), "cache");
        d.error = Some("x".repeat(60));
        let s = status(&d);
        assert!(s.starts_with("error: "));
        assert_eq!(s.chars().count(), "error: ".len() + MAX_STATUS_ERROR);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn default_fixture_names_cwd() {
        let raw = default_fixture(Path::new("/tmp/proj"));
        let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(value["model"]["display_name"], "Doctor Test");
        assert_eq!(value["workspace"]["project_dir"], "/tmp/proj");
    }

    #[test]
    fn report_lists_sections() {
        let loaded = Loaded {
            config: Config::new(),
            source: None,
        };
        let mut git = diag("git");
        git.error = Some("timeout".into());
        let collection = Collection {
            segments: vec![
                Segment {
                    id: "model".into(),
                    text: "Opus".into(),
                    ..Default::default()
                },
                Segment {
                    id: "cwd".into(),
                    text: "proj".into(),
                    ..Default::default()
                },
            ],
            diagnostics: vec![diag("model"), git],
        };
        let cache = SegmentCache::new();
        let logs = vec![LogLine {
            time: "12:00:00.000".into(),
            level: tracing::Level::INFO,
            message: "Producer git timed out".into(),
        }];

        let text = Report {
            loaded: &loaded,
            collection: &collection,
            cache: &cache,
            logs: &logs,
            line: "Opus  proj",
        }
        .format();

        assert!(text.contains("Config   : (defaults)"));
        assert!(text.contains("Order    : model, cwd, agent, git, prompt"));
        assert!(text.contains("error: timeout"));
        assert!(text.contains("Segments returned: cwd, model"));
        assert!(text.contains("hits=0 misses=0"));
        assert!(text.contains("INFO  Producer git timed out"));
        assert!(text.ends_with("Rendered line:\n  Opus  proj\n"));
    }
}
