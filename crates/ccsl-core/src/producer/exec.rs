//! External command producers.
//!
//! The command receives the original stdin payload on its stdin. At most
//! [`MAX_STDOUT_BYTES`] of stdout are kept (the rest is read and dropped so
//! the child never blocks on a full pipe); stderr goes to `/dev/null`. Only
//! the first line of output counts. It is parsed as a JSON
//! [`PluginResponse`] and, failing that, used verbatim as the segment text.
//!
//! The child is spawned with `kill_on_drop`, so a caller that abandons the
//! future on its deadline also kills the process.

use crate::config::PluginConfig;
use crate::error::ProducerError;
use crate::segment::{PluginResponse, Segment};
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Cap on captured stdout.
pub const MAX_STDOUT_BYTES: usize = 4096;

/// Run an `exec` producer and parse its output.
pub async fn run(plugin: &PluginConfig, payload: &[u8]) -> Result<Segment, ProducerError> {
    let stdout = capture(plugin, payload).await?;
    Ok(parse_output(&stdout))
}

/// Spawn the command, feed `payload`, and collect capped stdout.
///
/// Non-zero exit is an error even when output was written.
pub async fn capture(plugin: &PluginConfig, payload: &[u8]) -> Result<Vec<u8>, ProducerError> {
    if plugin.command.trim().is_empty() {
        return Err(ProducerError::MissingCommand);
    }

    let mut child = Command::new(&plugin.command)
        .args(&plugin.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProducerError::Spawn {
            command: plugin.command.clone(),
            source,
        })?;

    let stdin = child.stdin.take();
    let stdout = child.stdout.take();

    let feed = async move {
        if let Some(mut stdin) = stdin {
            // A producer may exit without reading its input; a broken pipe
            // here is not a failure.
            let _ = stdin.write_all(payload).await;
            let _ = stdin.shutdown().await;
        }
    };
    let drain = async move {
        match stdout {
            Some(out) => read_capped(out, MAX_STDOUT_BYTES).await,
            None => Ok(Vec::new()),
        }
    };

    let ((), captured) = tokio::join!(feed, drain);
    let captured = captured?;

    let status = child.wait().await?;
    if !status.success() {
        return Err(ProducerError::Exit {
            code: status.code(),
        });
    }
    Ok(captured)
}

/// Read `reader` to EOF, keeping only the first `cap` bytes.
async fn read_capped<R: AsyncRead + Unpin>(mut reader: R, cap: usize) -> std::io::Result<Vec<u8>> {
    let mut kept = Vec::with_capacity(cap.min(1024));
    let mut buf = [0u8; 1024];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let room = cap.saturating_sub(kept.len());
        kept.extend_from_slice(&buf[..n.min(room)]);
    }
    Ok(kept)
}

/// Normalize captured stdout into a segment.
pub fn parse_output(stdout: &[u8]) -> Segment {
    let text = String::from_utf8_lossy(stdout);
    let line = text.trim().lines().next().unwrap_or_default().trim();
    if line.is_empty() {
        return Segment::default();
    }
    match serde_json::from_str::<PluginResponse>(line) {
        Ok(resp) => resp.into(),
        Err(_) => Segment::text(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_first_line_is_structured() {
        let seg = parse_output(
            br#"{"text":"5h 42%","style":"dim","priority":30,"cache_ttl_ms":1500,"cache_key":"t1"}
trailing log line"#,
        );
        assert_eq!(seg.text, "5h 42%");
        assert_eq!(seg.style, "dim");
        assert_eq!(seg.priority, 30);
        assert_eq!(seg.cache_ttl_ms, 1500);
        assert_eq!(seg.cache_key, "t1");
    }

    #[test]
    fn plain_first_line_is_literal_text() {
        let seg = parse_output(b"  hello world  \nsecond line\n");
        assert_eq!(seg.text, "hello world");
        assert!(seg.style.is_empty());
        assert_eq!(seg.priority, 0);
    }

    #[test]
    fn non_object_json_is_literal_text() {
        assert_eq!(parse_output(b"42\n").text, "42");
        assert_eq!(parse_output(b"[1,2]").text, "[1,2]");
    }

    #[test]
    fn empty_output_is_empty_segment() {
        assert!(parse_output(b"").is_empty());
        assert!(parse_output(b"   \n\n").is_empty());
    }

    #[test]
    fn json_with_empty_text_omits_segment() {
        assert!(parse_output(br#"{"text":""}"#).is_empty());
    }

    #[tokio::test]
    async fn read_capped_discards_overflow() {
        let data = vec![b'x'; MAX_STDOUT_BYTES * 3];
        let kept = read_capped(&data[..], MAX_STDOUT_BYTES).await.unwrap();
        assert_eq!(kept.len(), MAX_STDOUT_BYTES);
    }

    #[tokio::test]
    async fn missing_command_is_an_error() {
        let plugin = PluginConfig::exec("  ", vec![]);
        let err = run(&plugin, b"{}").await.unwrap_err();
        assert!(matches!(err, ProducerError::MissingCommand));
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error() {
        let plugin = PluginConfig::exec("/definitely/not/a/real/binary", vec![]);
        let err = run(&plugin, b"{}").await.unwrap_err();
        assert!(matches!(err, ProducerError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_reads_payload_from_stdin() {
        let plugin = PluginConfig::exec("sh", vec!["-c".into(), "cat; echo".into()]);
        let seg = run(&plugin, br#"{"text":"from stdin","priority":7}"#)
            .await
            .unwrap();
        assert_eq!(seg.text, "from stdin");
        assert_eq!(seg.priority, 7);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_is_discarded() {
        let plugin = PluginConfig::exec(
            "sh",
            vec!["-c".into(), "echo noise >&2; echo ok".into()],
        );
        assert_eq!(run(&plugin, b"").await.unwrap().text, "ok");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_an_error() {
        let plugin = PluginConfig::exec("sh", vec!["-c".into(), "echo partial; exit 3".into()]);
        let err = run(&plugin, b"").await.unwrap_err();
        assert!(matches!(err, ProducerError::Exit { code: Some(3) }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn large_output_is_capped() {
        let plugin = PluginConfig::exec(
            "sh",
            vec![
                "-c".into(),
                "head -c 20000 /dev/zero | tr '\\0' 'a'".into(),
            ],
        );
        let out = capture(&plugin, b"").await.unwrap();
        assert_eq!(out.len(), MAX_STDOUT_BYTES);
    }
}
