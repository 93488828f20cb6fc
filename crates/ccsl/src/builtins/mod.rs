//! In-process segment producers.
//!
//! Each builtin reads the context tree (and sometimes the filesystem or
//! `git`) and returns a [`Segment`](ccsl_core::Segment). None of them fail:
//! missing data means an empty segment. Register them all with
//! [`BuiltinsExt::with_builtins`].
//!
//! | Producer | Id | Shows | Priority |
//! |----------|----|-------|----------|
//! | [`ModelProducer`] | `model` | model display name | 90 |
//! | [`CwdProducer`] | `cwd` | working directory basename | 80 |
//! | [`AgentProducer`] | `agent` | active agent from `.claude/state.json` | 70 |
//! | [`GitProducer`] | `git` | branch, dirty, ahead/behind, stash | 60 |
//! | [`ContextProducer`] | `ctx` | context window usage | 45 |
//! | [`CostProducer`] | `cost` | session cost in USD | 40 |
//! | [`DurationProducer`] | `duration` | session wall time | 25 |
//! | [`PromptProducer`] | `prompt` | last user prompt | 20 |

pub mod agent;
pub mod cost;
pub mod ctx;
pub mod cwd;
pub mod duration;
pub mod git;
pub mod model;
pub mod prompt;

pub use agent::AgentProducer;
pub use cost::CostProducer;
pub use ctx::ContextProducer;
pub use cwd::CwdProducer;
pub use duration::DurationProducer;
pub use git::GitProducer;
pub use model::ModelProducer;
pub use prompt::PromptProducer;

use ccsl_core::context::lookup_str;
use ccsl_core::producer::ProducerSet;
use serde_json::Value;
use std::path::PathBuf;

// ── Producer ids ────────────────────────────────────────────────────

pub const MODEL: &str = "model";
pub const CWD: &str = "cwd";
pub const AGENT: &str = "agent";
pub const GIT: &str = "git";
pub const CTX: &str = "ctx";
pub const COST: &str = "cost";
pub const DURATION: &str = "duration";
pub const PROMPT: &str = "prompt";

/// Every builtin id.
pub const ALL: [&str; 8] = [MODEL, CWD, AGENT, GIT, CTX, COST, DURATION, PROMPT];

// ── Extension trait ─────────────────────────────────────────────────

/// Extension trait for registering the builtin producers on a
/// [`ProducerSet`].
///
/// ```ignore
/// use ccsl::builtins::BuiltinsExt;
/// use ccsl_core::producer::ProducerSet;
///
/// let producers = ProducerSet::new().with_builtins();
/// ```
pub trait BuiltinsExt {
    fn with_builtins(self) -> Self;
}

impl BuiltinsExt for ProducerSet {
    fn with_builtins(self) -> Self {
        self.with(ModelProducer)
            .with(CwdProducer)
            .with(AgentProducer)
            .with(GitProducer)
            .with(ContextProducer)
            .with(CostProducer)
            .with(DurationProducer)
            .with(PromptProducer::from_env())
    }
}

// ── Shared helpers ──────────────────────────────────────────────────

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// `workspace.current_dir`, else the process working directory.
pub(crate) fn current_dir(context: &Value) -> Option<PathBuf> {
    lookup_str(context, "workspace.current_dir")
        .and_then(non_empty)
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
}

/// `workspace.project_dir`, else [`current_dir`].
pub(crate) fn project_dir(context: &Value) -> Option<PathBuf> {
    lookup_str(context, "workspace.project_dir")
        .and_then(non_empty)
        .map(PathBuf::from)
        .or_else(|| current_dir(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn with_builtins_registers_every_id() {
        let set = ProducerSet::new().with_builtins();
        assert_eq!(set.len(), ALL.len());
        for id in ALL {
            assert!(set.contains(id), "missing {id}");
        }
    }

    #[test]
    fn project_dir_prefers_project_then_current() {
        let ctx = json!({"workspace": {"project_dir": "/p", "current_dir": "/p/src"}});
        assert_eq!(project_dir(&ctx), Some(PathBuf::from("/p")));

        let ctx = json!({"workspace": {"project_dir": "  ", "current_dir": "/p/src"}});
        assert_eq!(project_dir(&ctx), Some(PathBuf::from("/p/src")));
    }

    #[test]
    fn current_dir_falls_back_to_process() {
        assert_eq!(current_dir(&json!({})), std::env::current_dir().ok());
    }
}
