use ccsl_core::producer::{Producer, ProducerFuture, ProducerInput};
use ccsl_core::segment::Segment;
use serde::Deserialize;
use std::path::Path;
use tracing::trace;

/// Agent assumed when no state file names one.
pub const DEFAULT_AGENT: &str = "main";

/// Active agent from `<project>/.claude/state.json`.
///
/// Values listed in the plugin's `hide` (default `["main"]`) render as
/// nothing, so the common case does not clutter the line.
pub struct AgentProducer;

#[derive(Deserialize)]
struct State {
    #[serde(default)]
    active_agent: Option<String>,
}

impl Producer for AgentProducer {
    fn id(&self) -> &str {
        super::AGENT
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        Box::pin(async move {
            let agent = match super::project_dir(&input.context) {
                Some(dir) => read_active_agent(&dir).await,
                None => None,
            };
            agent_segment(input, agent.as_deref().unwrap_or(DEFAULT_AGENT))
        })
    }
}

/// `active_agent` from the project's state file, if present and non-empty.
pub async fn read_active_agent(project: &Path) -> Option<String> {
    let path = project.join(".claude").join("state.json");
    let data = tokio::fs::read(&path).await.ok()?;
    let state: State = match serde_json::from_slice(&data) {
        Ok(state) => state,
        Err(e) => {
            trace!("Ignoring {}: {e}", path.display());
            return None;
        }
    };
    state.active_agent.filter(|a| !a.trim().is_empty())
}

pub fn agent_segment(input: &ProducerInput, agent: &str) -> Segment {
    let hidden = match &input.options.plugin.hide {
        Some(hide) => hide.iter().any(|h| h == agent),
        None => agent == DEFAULT_AGENT,
    };
    if hidden {
        return Segment::default();
    }
    Segment::text(format!("{}{agent}", input.icon("⚙"))).with_priority(70)
}
