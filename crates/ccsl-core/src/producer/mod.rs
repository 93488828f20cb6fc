//! Segment producers and the invoker that runs them.
//!
//! Every in-process segment source is a [`Producer`] implementor. Producers
//! are collected into a [`ProducerSet`], the closed mapping from segment id
//! to implementation that the [`Collector`](crate::runner::Collector)
//! dispatches through. External commands are not registered here; they are
//! described by an `exec` [`PluginConfig`] and run by [`exec::run`].
//!
//! # Defining producers
//!
//! - **[`FnProducer`]**: closure-based, sync or async. Best for producers
//!   that only read the context tree.
//! - **`impl Producer`**: a struct with its own state, for producers that
//!   shell out or read files.

pub mod exec;

use crate::config::PluginConfig;
use crate::error::ProducerError;
use crate::segment::Segment;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by [`Producer::render`].
pub type ProducerFuture<'a> = Pin<Box<dyn Future<Output = Segment> + Send + 'a>>;

/// Explicit per-call options. Cross-cutting settings (icons, the producer's
/// own descriptor) travel here rather than through any ambient lookup.
#[derive(Debug, Clone, Default)]
pub struct ProducerOptions {
    /// Whether producers may prepend icon glyphs.
    pub icons: bool,
    /// This producer's descriptor from the config.
    pub plugin: PluginConfig,
}

/// Everything a producer sees for one collection.
#[derive(Debug, Clone)]
pub struct ProducerInput {
    /// Parsed context tree.
    pub context: Arc<Value>,
    /// The payload exactly as read from stdin.
    pub raw: Arc<[u8]>,
    pub options: ProducerOptions,
}

impl ProducerInput {
    pub fn new(context: Arc<Value>, raw: Arc<[u8]>, options: ProducerOptions) -> Self {
        Self {
            context,
            raw,
            options,
        }
    }

    /// Build an input from a raw payload, parsing the context tree.
    pub fn from_raw(raw: &[u8], options: ProducerOptions) -> Self {
        Self {
            context: Arc::new(crate::context::parse(raw)),
            raw: Arc::from(raw),
            options,
        }
    }

    /// `icon` followed by a space when icons are on, else the empty string.
    pub fn icon(&self, icon: &str) -> String {
        if self.options.icons {
            format!("{icon} ")
        } else {
            String::new()
        }
    }
}

// ── Producer trait ───────────────────────────────────────────────────

/// An in-process segment source.
///
/// `render` must not fail: missing or malformed context fields resolve to
/// an empty [`Segment`]. Blocking work belongs on `tokio::fs` /
/// `tokio::process` so the collector's deadline can interrupt it.
pub trait Producer: Send + Sync {
    /// Segment id this producer answers for.
    fn id(&self) -> &str;

    /// Produce the segment for this collection.
    ///
    /// Uses a boxed future so that the trait is dyn-compatible.
    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a>;
}

// ── ProducerSet ──────────────────────────────────────────────────────

/// Producers dispatched by segment id.
///
/// ```ignore
/// let producers = ProducerSet::new()
///     .with(FnProducer::sync("hello", |_| Segment::text("hi")))
///     .with_if(show_cost, CostProducer);
/// ```
#[derive(Default)]
pub struct ProducerSet {
    producers: HashMap<String, Box<dyn Producer>>,
}

impl fmt::Debug for ProducerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerSet")
            .field("producers", &self.ids())
            .finish()
    }
}

impl ProducerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a producer. Replaces any existing producer with the same id.
    pub fn register(&mut self, producer: impl Producer + 'static) {
        self.producers
            .insert(producer.id().to_string(), Box::new(producer));
    }

    /// Register a producer (builder pattern).
    pub fn with(mut self, producer: impl Producer + 'static) -> Self {
        self.register(producer);
        self
    }

    /// Conditionally register a producer (builder pattern).
    pub fn with_if(self, condition: bool, producer: impl Producer + 'static) -> Self {
        if condition { self.with(producer) } else { self }
    }

    pub fn get(&self, id: &str) -> Option<&dyn Producer> {
        self.producers.get(id).map(|p| p.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.producers.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.producers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }

    /// Run the producer for `id` the way its descriptor asks: an external
    /// command for `exec`, the registered implementation otherwise.
    ///
    /// An unregistered builtin id yields an empty segment. Deadlines are
    /// applied by the caller.
    pub async fn invoke(&self, id: &str, input: &ProducerInput) -> Result<Segment, ProducerError> {
        if input.options.plugin.runs_command() {
            return exec::run(&input.options.plugin, &input.raw).await;
        }
        match self.get(id) {
            Some(producer) => Ok(producer.render(input).await),
            None => Ok(Segment::default()),
        }
    }
}

// ── FnProducer ───────────────────────────────────────────────────────

/// Type-erased async handler for [`FnProducer`].
type ErasedHandler =
    Box<dyn Fn(ProducerInput) -> Pin<Box<dyn Future<Output = Segment> + Send>> + Send + Sync>;

/// A closure-based producer.
///
/// Use [`FnProducer::sync`] for producers that only inspect the context
/// tree and [`FnProducer::new`] when the body needs to await.
pub struct FnProducer {
    id: String,
    handler: ErasedHandler,
}

impl FnProducer {
    /// Create a producer from an async closure. The closure receives an owned
    /// clone of the input (the context and payload are shared `Arc`s).
    pub fn new<F, Fut>(id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ProducerInput) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Segment> + Send + 'static,
    {
        let erased = move |input: ProducerInput| -> Pin<Box<dyn Future<Output = Segment> + Send>> {
            Box::pin(handler(input))
        };
        Self {
            id: id.into(),
            handler: Box::new(erased),
        }
    }

    /// Create a producer from a synchronous closure.
    pub fn sync<F>(id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ProducerInput) -> Segment + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        Self::new(id, move |input: ProducerInput| {
            let handler = Arc::clone(&handler);
            async move { (*handler)(&input) }
        })
    }
}

impl Producer for FnProducer {
    fn id(&self) -> &str {
        &self.id
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        (self.handler)(input.clone())
    }
}

impl fmt::Debug for FnProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProducer").field("id", &self.id).finish()
    }
}
