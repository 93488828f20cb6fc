//! The last user prompt, squished onto one line.
//!
//! Sources, first hit wins:
//! 1. `<project>/.claude/prompts/<session>.txt`, where `<session>` is the
//!    transcript file stem
//! 2. `<project>/.claude/last_prompt.txt`
//! 3. the newest `"type": "user"` entry in the transcript's JSONL tail
//! 4. the same, treating the whole transcript as a JSON array

use ccsl_core::context::lookup_str;
use ccsl_core::producer::{Producer, ProducerFuture, ProducerInput};
use ccsl_core::segment::Segment;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const PROMPT_MAX_ENV: &str = "STATUSLINE_PROMPT_MAX";
pub const DEFAULT_MAX_LEN: usize = 80;

/// Only this many trailing bytes of a transcript are scanned line by line.
const TRANSCRIPT_TAIL_BYTES: usize = 100_000;

pub struct PromptProducer {
    max_len: usize,
}

impl PromptProducer {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Cap from `STATUSLINE_PROMPT_MAX`, default 80.
    pub fn from_env() -> Self {
        let max_len = std::env::var(PROMPT_MAX_ENV)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_MAX_LEN);
        Self::new(max_len)
    }
}

impl Producer for PromptProducer {
    fn id(&self) -> &str {
        super::PROMPT
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        Box::pin(async move {
            let transcript = lookup_str(&input.context, "transcript_path")
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from);
            let project = super::project_dir(&input.context);

            let mut prompt = None;
            if let Some(project) = &project {
                prompt = read_session_prompt(project, transcript.as_deref()).await;
            }
            if prompt.is_none() {
                if let Some(transcript) = &transcript {
                    prompt = last_prompt_from_transcript(transcript).await;
                }
            }

            match prompt.map(|p| squish(&p, self.max_len)) {
                Some(text) if !text.is_empty() => Segment::text(text).with_priority(20),
                _ => Segment::default(),
            }
        })
    }
}

async fn read_trimmed(path: &Path) -> Option<String> {
    let text = tokio::fs::read_to_string(path).await.ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Prompt files written by a hook under `<project>/.claude`.
pub async fn read_session_prompt(project: &Path, transcript: Option<&Path>) -> Option<String> {
    let claude = project.join(".claude");
    if let Some(session) = transcript.and_then(Path::file_stem) {
        let mut name = session.to_os_string();
        name.push(".txt");
        if let Some(prompt) = read_trimmed(&claude.join("prompts").join(name)).await {
            return Some(prompt);
        }
    }
    read_trimmed(&claude.join("last_prompt.txt")).await
}

/// Text of a user entry: `message.content` as a string, or the joined
/// `text` blocks when it is an array.
fn user_text(entry: &Value) -> Option<String> {
    if entry.get("type").and_then(Value::as_str) != Some("user") {
        return None;
    }
    let text = match entry.get("message")?.get("content")? {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

pub async fn last_prompt_from_transcript(path: &Path) -> Option<String> {
    let data = tokio::fs::read(path).await.ok()?;
    let tail = &data[data.len().saturating_sub(TRANSCRIPT_TAIL_BYTES)..];
    let tail = String::from_utf8_lossy(tail);

    let from_lines = tail
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .find_map(|entry| user_text(&entry));
    if from_lines.is_some() {
        return from_lines;
    }

    match serde_json::from_slice::<Value>(&data).ok()? {
        Value::Array(items) => items.iter().rev().find_map(user_text),
        _ => None,
    }
}

/// Collapse whitespace runs to single spaces and cap at `max_len` chars.
pub fn squish(s: &str, max_len: usize) -> String {
    let joined = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.chars().count() <= max_len {
        return joined;
    }
    let capped: String = joined.chars().take(max_len).collect();
    capped.trim().to_string()
}
