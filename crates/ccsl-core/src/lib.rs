//! Segment collection and template rendering for a coding-assistant status
//! line.
//!
//! The assistant pipes a JSON context to the process on every refresh. The
//! pipeline turns that payload into one line of text:
//!
//! 1. A [`Collector`](runner::Collector) runs every configured producer at
//!    once, each under its own deadline and one shared overall deadline,
//!    gated by an `only_if` [`condition`] and short-circuited by the
//!    [`SegmentCache`](cache::SegmentCache).
//! 2. [`render_line`](render::render_line) substitutes the resulting
//!    [`Segment`]s into the template, styles them through a
//!    [`Palette`](render::Palette), and fits the line to a visible width by
//!    shrinking the lowest-priority segment first.
//!
//! ```ignore
//! use ccsl_core::prelude::*;
//! use std::sync::Arc;
//!
//! let config = Arc::new(Config::new());
//! let producers = ProducerSet::new()
//!     .with(FnProducer::sync("model", |input| {
//!         lookup_str(&input.context, "model.display_name")
//!             .map(Segment::text)
//!             .unwrap_or_default()
//!     }));
//! let collector = Collector::new(config.clone(), Arc::new(producers), Arc::default());
//!
//! let segments = collector.collect_with_diagnostics(payload).await.segments;
//! let palette = Palette::new(config.theme.ansi);
//! println!("{}", render_line(&config.ui.template, &segments, &palette, config.ui.truncate));
//! ```
//!
//! # Where to find things
//!
//! - **Write a producer:** the [`Producer`](producer::Producer) trait,
//!   [`FnProducer`](producer::FnProducer) for closures, and
//!   [`ProducerSet`](producer::ProducerSet) for dispatch by id.
//! - **Run external commands:** [`producer::exec`].
//! - **Gate producers:** [`condition`].
//! - **Read the context tree:** [`context`].
//! - **Tune layout:** [`render::template`] for placeholder syntax and
//!   [`render::truncate`] for the width policy.

pub mod cache;
pub mod condition;
pub mod config;
pub mod context;
pub mod error;
pub mod prelude;
pub mod producer;
pub mod render;
pub mod runner;
pub mod segment;

pub use segment::{DEFAULT_PRIORITY, PluginResponse, Segment};
