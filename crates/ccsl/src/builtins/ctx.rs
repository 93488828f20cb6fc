use ccsl_core::context::lookup_f64;
use ccsl_core::producer::{Producer, ProducerFuture, ProducerInput};
use ccsl_core::segment::Segment;

pub const DEFAULT_WARN_PERCENT: f64 = 75.0;
pub const DEFAULT_CRITICAL_PERCENT: f64 = 90.0;

/// Context window usage as a percentage.
///
/// Uses `context_window.used_percentage` when present, otherwise derives it
/// from the token totals and window size. Dim below `warn_percent`, yellow
/// from there, red at `critical_percent`.
pub struct ContextProducer;

impl Producer for ContextProducer {
    fn id(&self) -> &str {
        super::CTX
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        Box::pin(async move { ctx_segment(input) })
    }
}

fn used_percent(input: &ProducerInput) -> Option<f64> {
    let ctx = &input.context;
    if let Some(pct) = lookup_f64(ctx, "context_window.used_percentage").filter(|p| *p > 0.0) {
        return Some(pct);
    }
    let size = lookup_f64(ctx, "context_window.context_window_size").filter(|s| *s > 0.0)?;
    let used = lookup_f64(ctx, "context_window.total_input_tokens").unwrap_or(0.0)
        + lookup_f64(ctx, "context_window.total_output_tokens").unwrap_or(0.0);
    Some(used / size * 100.0)
}

pub fn ctx_segment(input: &ProducerInput) -> Segment {
    let Some(pct) = used_percent(input) else {
        return Segment::default();
    };
    let plugin = &input.options.plugin;
    let warn = plugin.warn_percent.unwrap_or(DEFAULT_WARN_PERCENT);
    let critical = plugin.critical_percent.unwrap_or(DEFAULT_CRITICAL_PERCENT);
    let style = if pct >= critical {
        "red"
    } else if pct >= warn {
        "yellow"
    } else {
        "dim"
    };
    Segment::text(format!("{pct:.0}%"))
        .with_style(style)
        .with_priority(45)
}
