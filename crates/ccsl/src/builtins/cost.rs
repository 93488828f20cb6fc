use ccsl_core::context::lookup_f64;
use ccsl_core::producer::{Producer, ProducerFuture, ProducerInput};
use ccsl_core::segment::Segment;

/// Session cost from `cost.total_cost_usd`, e.g. `$1.27`. Hidden at zero.
pub struct CostProducer;

impl Producer for CostProducer {
    fn id(&self) -> &str {
        super::COST
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        Box::pin(async move { cost_segment(input) })
    }
}

pub fn cost_segment(input: &ProducerInput) -> Segment {
    match lookup_f64(&input.context, "cost.total_cost_usd") {
        Some(usd) if usd > 0.0 => Segment::text(format!("${usd:.2}"))
            .with_style("dim")
            .with_priority(40),
        _ => Segment::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccsl_core::producer::ProducerOptions;

    fn render(raw: &str) -> Segment {
        cost_segment(&ProducerInput::from_raw(raw.as_bytes(), ProducerOptions::default()))
    }

    #[test]
    fn formats_two_decimals() {
        let seg = render(r#"{"cost":{"total_cost_usd":1.2681}}"#);
        assert_eq!(seg.text, "$1.27");
        assert_eq!(seg.style, "dim");
        assert_eq!(seg.priority, 40);
    }

    #[test]
    fn zero_or_missing_is_empty() {
        assert!(render(r#"{"cost":{"total_cost_usd":0}}"#).is_empty());
        assert!(render(r#"{"cost":{"total_cost_usd":"1.00"}}"#).is_empty());
        assert!(render("{}").is_empty());
    }
}
