//! External producer wrapping `ccusage statusline`.
//!
//! Forwards the context payload on stdin to the first available runner
//! (`bun x ccusage`, `npx -y ccusage`, or a `ccusage` on `PATH`) and prints
//! a plugin response for `ccsl`. Prints nothing on any failure.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `CCSL_CCUSAGE_TIMEOUT_MS` | runner deadline (default 250) |
//! | `CCSL_CCUSAGE_TTL_MS` | `cache_ttl_ms` in the response (default 1500) |
//! | `CCSL_CCUSAGE_ONLINE=1` | do not force `CCUSAGE_OFFLINE=1` |
//! | `CCSL_ANSI=0` | sets `NO_COLOR=1` |
//! | `CCSL_CCUSAGE_COST_SOURCE` | `--cost-source` |
//! | `CCSL_CCUSAGE_BURN` | `--visual-burn-rate` |
//! | `CCSL_CCUSAGE_CTX_LOW` / `_CTX_MED` | context thresholds |
//! | `CCSL_CCUSAGE_TOKEN_LIMIT` | `--token-limit` |
//! | `CCSL_CCUSAGE_FLAGS` | extra whitespace-separated flags |

use ccsl_core::PluginResponse;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

const DEFAULT_TIMEOUT_MS: u64 = 250;
const DEFAULT_TTL_MS: i64 = 1500;
const PRIORITY: i32 = 55;

fn env_num<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_set(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// First executable named `bin` on `PATH`.
fn which(bin: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(bin))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Flags mapped from `CCSL_CCUSAGE_*`.
fn extra_args() -> Vec<String> {
    let mut args = Vec::new();
    for (key, flag) in [
        ("CCSL_CCUSAGE_COST_SOURCE", "--cost-source"),
        ("CCSL_CCUSAGE_BURN", "--visual-burn-rate"),
        ("CCSL_CCUSAGE_CTX_LOW", "--context-low-threshold"),
        ("CCSL_CCUSAGE_CTX_MED", "--context-medium-threshold"),
        ("CCSL_CCUSAGE_TOKEN_LIMIT", "--token-limit"),
    ] {
        if let Some(value) = env_set(key) {
            args.push(flag.to_string());
            args.push(value);
        }
    }
    if let Some(flags) = env_set("CCSL_CCUSAGE_FLAGS") {
        args.extend(flags.split_whitespace().map(str::to_string));
    }
    args
}

/// Runner program and its leading arguments.
fn runner() -> Option<(PathBuf, Vec<&'static str>)> {
    if let Some(bun) = which("bun") {
        return Some((bun, vec!["x", "ccusage", "statusline"]));
    }
    if let Some(npx) = which("npx") {
        return Some((npx, vec!["-y", "ccusage", "statusline"]));
    }
    which("ccusage").map(|bin| (bin, vec!["statusline"]))
}

fn command(program: &Path, lead: &[&str]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(lead).args(extra_args());

    if std::env::var_os("LOG_LEVEL").is_none() {
        cmd.env("LOG_LEVEL", "0");
    }
    if std::env::var("CCSL_CCUSAGE_ONLINE").as_deref() != Ok("1")
        && std::env::var_os("CCUSAGE_OFFLINE").is_none()
    {
        cmd.env("CCUSAGE_OFFLINE", "1");
    }
    let ansi_off = std::env::var("CCSL_ANSI")
        .map(|v| v == "0" || v.eq_ignore_ascii_case("false"))
        .unwrap_or(false);
    if ansi_off && std::env::var_os("NO_COLOR").is_none() {
        cmd.env("NO_COLOR", "1");
    }

    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    cmd
}

async fn run(raw: Vec<u8>) -> Option<String> {
    let (program, lead) = runner()?;
    let mut child = command(&program, &lead).spawn().ok()?;

    let mut stdin = child.stdin.take()?;
    let feed = async move {
        // The runner may exit without reading its input.
        let _ = stdin.write_all(&raw).await;
    };
    let (_, output) = tokio::join!(feed, child.wait_with_output());
    let output = output.ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[tokio::main]
async fn main() {
    let mut raw = Vec::new();
    let _ = tokio::io::stdin().read_to_end(&mut raw).await;

    let timeout = Duration::from_millis(env_num("CCSL_CCUSAGE_TIMEOUT_MS", DEFAULT_TIMEOUT_MS));
    let Ok(Some(text)) = tokio::time::timeout(timeout, run(raw)).await else {
        return;
    };

    let response = PluginResponse {
        text,
        priority: PRIORITY,
        cache_ttl_ms: env_num("CCSL_CCUSAGE_TTL_MS", DEFAULT_TTL_MS),
        ..Default::default()
    };
    if let Ok(json) = serde_json::to_string(&response) {
        println!("{json}");
    }
}
