//! Git branch and working-tree state from a single
//! `git status --porcelain=v2 --branch`.
//!
//! Rendered as `branch[*][⇡N][⇣M][≡]`: `*` for uncommitted changes, arrows
//! for commits ahead of / behind upstream, `≡` when a stash exists. A
//! detached HEAD shows the short commit hash. Untracked files only count
//! when the plugin sets `untracked = true`, since scanning them is slow in
//! large trees.

use ccsl_core::producer::{Producer, ProducerFuture, ProducerInput};
use ccsl_core::segment::Segment;
use std::path::Path;
use tokio::process::Command;
use tracing::trace;

/// Parsed `git status --porcelain=v2 --branch` output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitStatus {
    /// Branch name; `None` when detached or unborn.
    pub branch: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub dirty: bool,
}

impl GitStatus {
    pub fn parse(porcelain: &str) -> Self {
        let mut status = GitStatus::default();
        for line in porcelain.lines() {
            if let Some(head) = line.strip_prefix("# branch.head ") {
                let head = head.trim();
                if !head.is_empty() && head != "(detached)" {
                    status.branch = Some(head.to_string());
                }
            } else if let Some(ab) = line.strip_prefix("# branch.ab ") {
                for part in ab.split_whitespace() {
                    if let Some(n) = part.strip_prefix('+') {
                        status.ahead = n.parse().unwrap_or(0);
                    } else if let Some(n) = part.strip_prefix('-') {
                        status.behind = n.parse().unwrap_or(0);
                    }
                }
            } else if !line.is_empty() && !line.starts_with('#') {
                status.dirty = true;
            }
        }
        status
    }

    /// Segment text for this status and a resolved branch label.
    pub fn format(&self, label: &str, has_stash: bool) -> String {
        let mut text = label.to_string();
        if self.dirty {
            text.push('*');
        }
        if self.ahead > 0 {
            text.push_str(&format!("⇡{}", self.ahead));
        }
        if self.behind > 0 {
            text.push_str(&format!("⇣{}", self.behind));
        }
        if has_stash {
            text.push('≡');
        }
        text
    }
}

// ── Helper ──────────────────────────────────────────────────────────

/// Run git in `dir` and return trimmed stdout, or `None` on any failure.
///
/// The child is killed if the caller's deadline drops this future.
async fn run_git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .stdin(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        trace!("git {} failed in {}", args.join(" "), dir.display());
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

async fn has_stash(dir: &Path) -> bool {
    let Some(git_dir) = run_git(dir, &["rev-parse", "--git-dir"]).await else {
        return false;
    };
    // `--git-dir` may be relative to `dir`.
    let stash = dir.join(git_dir).join("refs").join("stash");
    tokio::fs::metadata(stash).await.is_ok()
}

// ── GitProducer ─────────────────────────────────────────────────────

pub struct GitProducer;

impl Producer for GitProducer {
    fn id(&self) -> &str {
        super::GIT
    }

    fn render<'a>(&'a self, input: &'a ProducerInput) -> ProducerFuture<'a> {
        Box::pin(async move {
            let Some(dir) = super::current_dir(&input.context) else {
                return Segment::default();
            };
            git_segment(&dir, input.options.plugin.untracked).await
        })
    }
}

pub async fn git_segment(dir: &Path, untracked: bool) -> Segment {
    let mut args = vec!["status", "--porcelain=v2", "--branch"];
    if !untracked {
        args.push("--untracked-files=no");
    }
    let Some(out) = run_git(dir, &args).await else {
        return Segment::default();
    };
    let status = GitStatus::parse(&out);

    let label = match &status.branch {
        Some(branch) => branch.clone(),
        None => match run_git(dir, &["rev-parse", "--short", "HEAD"]).await {
            Some(hash) if !hash.is_empty() => hash,
            _ => return Segment::default(),
        },
    };

    let stash = has_stash(dir).await;
    Segment::text(status.format(&label, stash))
        .with_style("dim")
        .with_priority(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = "# branch.oid 1234abcd\n# branch.head main\n# branch.upstream origin/main\n# branch.ab +0 -0\n";

    #[test]
    fn parse_clean_branch() {
        let status = GitStatus::parse(CLEAN);
        assert_eq!(status.branch.as_deref(), Some("main"));
        assert!(!status.dirty);
        assert_eq!(status.format("main", false), "main");
    }

    #[test]
    fn parse_dirty_ahead_behind() {
        let out = "# branch.head feature\n# branch.ab +2 -3\n1 .M N... 100644 100644 100644 a b src/lib.rs\n";
        let status = GitStatus::parse(out);
        assert!(status.dirty);
        assert_eq!((status.ahead, status.behind), (2, 3));
        assert_eq!(status.format("feature", true), "feature*⇡2⇣3≡");
    }

    #[test]
    fn untracked_lines_count_as_dirty() {
        let status = GitStatus::parse("# branch.head main\n? notes.txt\n");
        assert!(status.dirty);
    }

    #[test]
    fn detached_head_has_no_branch() {
        let status = GitStatus::parse("# branch.oid abc\n# branch.head (detached)\n");
        assert_eq!(status.branch, None);
    }

    #[tokio::test]
    async fn outside_a_repository_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let seg = git_segment(dir.path(), false).await;
        assert!(seg.is_empty());
    }
}
