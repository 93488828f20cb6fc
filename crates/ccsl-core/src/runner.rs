//! The collection scheduler.
//!
//! [`Collector::run`] launches one task per segment id, all at once, and
//! joins them before returning. Each task:
//!
//! 1. checks the id's `only_if` condition,
//! 2. looks the id up in the [`SegmentCache`],
//! 3. on a miss, invokes the producer under
//!    `min(now + per-producer timeout, overall deadline)`,
//! 4. normalizes the segment (id, default priority, style override),
//! 5. caches non-empty results under the refined key and TTL.
//!
//! A failing unit only loses its own segment. Timeouts and errors show up
//! in the [`Diagnostic`] for that id and nowhere else.

use crate::cache::SegmentCache;
use crate::condition;
use crate::config::{Config, PluginConfig};
use crate::context;
use crate::error::ProducerError;
use crate::producer::{ProducerInput, ProducerOptions, ProducerSet};
use crate::segment::{DEFAULT_PRIORITY, Segment};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// How an id was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Builtin,
    Exec,
    /// A builtin id with no registered producer.
    Unknown,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Exec => "exec",
            Self::Unknown => "unknown",
        }
    }
}

/// What happened to one id during a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub id: String,
    pub kind: DiagnosticKind,
    #[serde(rename = "timeout_ms", serialize_with = "millis")]
    pub timeout: Duration,
    pub cache_hit: bool,
    /// Not run: its condition was false or no producer answers for it.
    pub skipped: bool,
    /// The producer was actually invoked.
    pub ran: bool,
    /// Time spent in the producer. Zero for cache hits and skips.
    #[serde(rename = "elapsed_ms", serialize_with = "millis")]
    pub elapsed: Duration,
    /// `"timeout"` or a capped error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl Diagnostic {
    pub fn new(id: &str, kind: DiagnosticKind, timeout: Duration) -> Self {
        Self {
            id: id.to_string(),
            kind,
            timeout,
            cache_hit: false,
            skipped: false,
            ran: false,
            elapsed: Duration::ZERO,
            error: None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.error.as_deref() == Some("timeout")
    }
}

/// Result of one collection.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Non-empty segments. Order is unspecified; the renderer looks them up
    /// by id.
    pub segments: Vec<Segment>,
    /// One entry per distinct id, in the order the ids were given.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs producers for a set of ids against one context payload.
///
/// Cloning is cheap: every field is shared. The cache is injected so that
/// tests (and long-lived hosts) control its lifetime.
#[derive(Debug, Clone)]
pub struct Collector {
    config: Arc<Config>,
    producers: Arc<ProducerSet>,
    cache: Arc<SegmentCache>,
}

impl Collector {
    pub fn new(config: Arc<Config>, producers: Arc<ProducerSet>, cache: Arc<SegmentCache>) -> Self {
        Self {
            config,
            producers,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn producers(&self) -> &ProducerSet {
        &self.producers
    }

    pub fn cache(&self) -> &SegmentCache {
        &self.cache
    }

    /// Overall deadline for a collection starting now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.config.total_budget()
    }

    /// Collect segments only.
    pub async fn collect(&self, raw: &[u8], ids: &[String], deadline: Instant) -> Vec<Segment> {
        self.run(raw, ids, deadline).await.segments
    }

    /// Collect segments for the configured order with the configured budget.
    pub async fn collect_with_diagnostics(&self, raw: &[u8]) -> Collection {
        let ids = self.config.segment_order();
        self.run(raw, &ids, self.deadline()).await
    }

    /// Run every id's producer concurrently and wait for all of them.
    ///
    /// Duplicate ids run once. Never fails: the worst case is an empty
    /// collection.
    pub async fn run(&self, raw: &[u8], ids: &[String], deadline: Instant) -> Collection {
        let context = Arc::new(context::parse(raw));
        let raw: Arc<[u8]> = Arc::from(raw);

        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        let handles = ids.iter().map(|id| {
            let unit = Unit {
                collector: self.clone(),
                context: Arc::clone(&context),
                raw: Arc::clone(&raw),
                id: id.clone(),
            };
            tokio::spawn(unit.run(deadline))
        });
        let joined = futures::future::join_all(handles).await;

        let mut collection = Collection::default();
        for (id, result) in ids.iter().zip(joined) {
            match result {
                Ok((segment, diag)) => {
                    collection.segments.extend(segment);
                    collection.diagnostics.push(diag);
                }
                Err(e) => {
                    warn!("Producer {id} task failed: {e}");
                    let plugin = self.config.plugin(id);
                    let mut diag = Diagnostic::new(
                        id,
                        self.kind_of(id, &plugin),
                        self.config.effective_timeout(&plugin),
                    );
                    diag.ran = true;
                    diag.error = Some(ProducerError::Panicked.summary());
                    collection.diagnostics.push(diag);
                }
            }
        }

        debug!(
            "Collected {} segments from {} producers",
            collection.segments.len(),
            ids.len()
        );
        collection
    }

    fn kind_of(&self, id: &str, plugin: &PluginConfig) -> DiagnosticKind {
        if plugin.runs_command() {
            DiagnosticKind::Exec
        } else if self.producers.contains(id) {
            DiagnosticKind::Builtin
        } else {
            DiagnosticKind::Unknown
        }
    }
}

/// Lookup key: `id|<value at the configured path>` when one is configured
/// and resolves, else `id|projectDir|currentDir`.
pub fn cache_key(id: &str, plugin: &PluginConfig, context: &Value) -> String {
    if !plugin.cache_key.is_empty()
        && let Some(value) = context::lookup(context, &plugin.cache_key)
    {
        return format!("{id}|{}", context::stringify(value));
    }
    format!("{id}|{}", context::workspace_key(context))
}

// ── Per-id unit of work ──────────────────────────────────────────────

struct Unit {
    collector: Collector,
    context: Arc<Value>,
    raw: Arc<[u8]>,
    id: String,
}

impl Unit {
    async fn run(self, deadline: Instant) -> (Option<Segment>, Diagnostic) {
        let Collector {
            config,
            producers,
            cache,
        } = &self.collector;
        let id = self.id.as_str();
        let plugin = config.plugin(id);
        let timeout = config.effective_timeout(&plugin);
        let mut diag = Diagnostic::new(id, self.collector.kind_of(id, &plugin), timeout);

        if !plugin.only_if.trim().is_empty()
            && !condition::evaluate(&self.context, &plugin.only_if)
        {
            trace!("Producer {id} skipped by only_if: {}", plugin.only_if);
            diag.skipped = true;
            return (None, diag);
        }
        if diag.kind == DiagnosticKind::Unknown {
            debug!("No producer registered for {id}");
            diag.skipped = true;
            return (None, diag);
        }

        let key = cache_key(id, &plugin, &self.context);
        if let Some(segment) = cache.get(&key) {
            trace!("Producer {id} cache hit ({key})");
            diag.cache_hit = true;
            return (Some(segment).filter(|s| !s.is_empty()), diag);
        }

        let input = ProducerInput::new(
            Arc::clone(&self.context),
            Arc::clone(&self.raw),
            ProducerOptions {
                icons: config.theme.icons,
                plugin: plugin.clone(),
            },
        );

        let start = Instant::now();
        let unit_deadline = (start + timeout).min(deadline);
        diag.ran = true;
        let result = match tokio::time::timeout_at(unit_deadline, producers.invoke(id, &input)).await
        {
            Ok(r) => r,
            Err(_) => Err(ProducerError::Timeout),
        };
        diag.elapsed = start.elapsed();

        let mut segment = match result {
            Ok(segment) => segment,
            Err(e) => {
                if e.is_timeout() {
                    info!(
                        "Producer {id} timed out after {}ms (limit: {}ms)",
                        diag.elapsed.as_millis(),
                        timeout.as_millis()
                    );
                } else {
                    warn!("Producer {id} failed: {e}");
                }
                diag.error = Some(e.summary());
                return (None, diag);
            }
        };

        segment.id = id.to_string();
        if segment.priority == 0 {
            segment.priority = DEFAULT_PRIORITY;
        }
        if !plugin.style.is_empty() {
            segment.style = plugin.style.clone();
        }

        debug!(
            "Producer {id} completed in {}ms ({} chars)",
            diag.elapsed.as_millis(),
            segment.text.chars().count()
        );

        if segment.is_empty() {
            return (None, diag);
        }

        let store_key = if segment.cache_key.is_empty() {
            key
        } else {
            format!("{id}|{}", segment.cache_key)
        };
        let ttl = if segment.cache_ttl_ms > 0 {
            segment.cache_ttl_ms
        } else {
            plugin.cache_ttl_ms
        };
        cache.put_ms(store_key, segment.clone(), ttl);

        (Some(segment), diag)
    }
}
