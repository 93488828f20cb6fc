//! The render pipeline shared by the default mode and `doctor`.

use crate::builtins::BuiltinsExt;
use ccsl_core::prelude::*;
use std::sync::Arc;

/// A collector over the builtin producers with a fresh cache.
pub fn collector(config: Arc<Config>) -> Collector {
    Collector::new(
        config,
        Arc::new(ProducerSet::new().with_builtins()),
        Arc::new(SegmentCache::new()),
    )
}

/// Collect every configured segment and render the line.
pub async fn render(config: Arc<Config>, raw: &[u8]) -> String {
    let collector = collector(config);
    let collection = collector.collect_with_diagnostics(raw).await;
    render_collection(collector.config(), &collection)
}

/// Render an existing collection with `config`'s template, theme and width.
pub fn render_collection(config: &Config, collection: &Collection) -> String {
    let palette = Palette::new(config.theme.ansi);
    render_line(
        &config.ui.template,
        &collection.segments,
        &palette,
        config.ui.truncate,
    )
}

/// Whether `raw` is a JSON value the pipeline should render at all.
pub fn is_valid_payload(raw: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(raw).is_ok()
}
