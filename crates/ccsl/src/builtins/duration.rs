use ccsl_core::context::lookup_f64;
use ccsl_core::producer::{Producer, ProducerFuture, ProducerInput};
use ccsl_core::segment::Segment;

/// Session wall time from `cost.total_duration_ms` as `1h5m` or `42m`.
/// Sessions shorter than a minute show nothing.
pub struct DurationProducer;

impl Producer for DurationProducer {
    fn id(&self) -> &str {
        super::DURATION
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        Box::pin(async move { duration_segment(input) })
    }
}

/// `XhYm` / `Ym`, or `None` under one minute.
pub fn format_duration(ms: f64) -> Option<String> {
    if !ms.is_finite() || ms < 60_000.0 {
        return None;
    }
    let minutes = (ms / 60_000.0) as u64;
    let (hours, mins) = (minutes / 60, minutes % 60);
    Some(if hours > 0 {
        format!("{hours}h{mins}m")
    } else {
        format!("{mins}m")
    })
}

pub fn duration_segment(input: &ProducerInput) -> Segment {
    lookup_f64(&input.context, "cost.total_duration_ms")
        .and_then(format_duration)
        .map(|text| Segment::text(text).with_style("dim").with_priority(25))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccsl_core::producer::ProducerOptions;

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(format_duration(59_999.0), None);
        assert_eq!(format_duration(60_000.0).as_deref(), Some("1m"));
        assert_eq!(format_duration(42.5 * 60_000.0).as_deref(), Some("42m"));
        assert_eq!(format_duration(65.0 * 60_000.0).as_deref(), Some("1h5m"));
        assert_eq!(format_duration(120.0 * 60_000.0).as_deref(), Some("2h0m"));
    }

    #[test]
    fn segment_from_context() {
        let input = ProducerInput::from_raw(
            br#"{"cost":{"total_duration_ms":3900000}}"#,
            ProducerOptions::default(),
        );
        let seg = duration_segment(&input);
        assert_eq!(seg.text, "1h5m");
        assert_eq!(seg.priority, 25);
    }
}
