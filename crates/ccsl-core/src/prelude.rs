//! Convenience re-exports for building a status line binary.
//!
//! ```ignore
//! use ccsl_core::prelude::*;
//! ```

// ── Data ────────────────────────────────────────────────────────────
pub use crate::config::{Config, PluginConfig, PluginKind};
pub use crate::context::{lookup, lookup_f64, lookup_str};
pub use crate::segment::{DEFAULT_PRIORITY, Segment};

// ── Producers ───────────────────────────────────────────────────────
pub use crate::error::ProducerError;
pub use crate::producer::{
    FnProducer, Producer, ProducerFuture, ProducerInput, ProducerOptions, ProducerSet,
};

// ── Collection and rendering ────────────────────────────────────────
pub use crate::cache::SegmentCache;
pub use crate::render::{Palette, render_line};
pub use crate::runner::{Collection, Collector, Diagnostic, DiagnosticKind};
