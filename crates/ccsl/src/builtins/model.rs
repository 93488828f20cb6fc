use ccsl_core::context::lookup_str;
use ccsl_core::producer::{Producer, ProducerFuture, ProducerInput};
use ccsl_core::segment::Segment;

/// The active model: `display_name`, with the id appended in parentheses
/// when the name does not already contain it.
pub struct ModelProducer;

impl Producer for ModelProducer {
    fn id(&self) -> &str {
        super::MODEL
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        Box::pin(async move { model_segment(input) })
    }
}

pub fn model_segment(input: &ProducerInput) -> Segment {
    let name = lookup_str(&input.context, "model.display_name").unwrap_or_default();
    let id = lookup_str(&input.context, "model.id").unwrap_or_default();

    let text = match (name.is_empty(), id.is_empty()) {
        (true, true) => return Segment::default(),
        (false, true) => name.to_string(),
        (true, false) => id.to_string(),
        (false, false) if name.to_lowercase().contains(&id.to_lowercase()) => name.to_string(),
        (false, false) => format!("{name} ({id})"),
    };

    Segment::text(format!("{}{text}", input.icon("🤖")))
        .with_style("bold")
        .with_priority(90)
}
