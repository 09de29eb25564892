//! yt-dlp media resolver
//!
//! Runs the external resolver as a child process and reads three lines from
//! its standard output: title, direct stream URL, duration text.
//!
//! The process is bounded by a timeout and killed if it overruns. Only stdout
//! is parsed; stderr is kept for diagnostics.

use super::{MediaResolver, ResolvedMedia, ResolverError};
use async_trait::async_trait;
use jukebox_common::config::ResolverConfig;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

/// Arguments passed after the program, before the URL
const RESOLVER_ARGS: [&str; 6] = [
    "--get-title",
    "--get-url",
    "--get-duration",
    "--format",
    "bestaudio/best",
    "--no-playlist",
];

/// Timeout for the `--version` availability check
const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// External resolver invoked as `program... <args> <url>`
#[derive(Debug, Clone)]
pub struct YtDlpResolver {
    /// Program and leading arguments (e.g. `python -m yt_dlp`)
    program: Vec<String>,
    timeout: Duration,
}

impl YtDlpResolver {
    pub fn new(program: Vec<String>, timeout: Duration) -> Self {
        Self { program, timeout }
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        Self::new(config.program.clone(), config.timeout())
    }

    fn command(&self) -> Result<Command, ResolverError> {
        let (exe, leading) = self
            .program
            .split_first()
            .ok_or_else(|| ResolverError::Spawn("resolver program is empty".to_string()))?;

        let mut cmd = Command::new(exe);
        cmd.args(leading)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait]
impl MediaResolver for YtDlpResolver {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, ResolverError> {
        let mut cmd = self.command()?;
        cmd.args(RESOLVER_ARGS).arg(url);

        debug!(url = %url, program = ?self.program, "Starting resolver");

        let child = cmd.spawn().map_err(|e| {
            error!("Failed to start resolver {:?}: {}", self.program, e);
            ResolverError::Spawn(e.to_string())
        })?;

        // Dropping the child on timeout kills it (kill_on_drop)
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ResolverError::Spawn(e.to_string()))?,
            Err(_) => {
                warn!(url = %url, timeout = ?self.timeout, "Resolver timed out");
                return Err(ResolverError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "terminated by signal".to_string());
            error!(url = %url, status = %status, "Resolver failed");
            for line in String::from_utf8_lossy(&output.stderr).lines() {
                error!("resolver stderr: {}", line);
            }
            return Err(ResolverError::ExitStatus(status));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let media = parse_resolver_output(&stdout)?;
        info!(url = %url, title = %media.title, duration = %media.duration_text, "Resolved media");
        Ok(media)
    }

    async fn is_available(&self) -> bool {
        let Ok(mut cmd) = self.command() else {
            return false;
        };
        cmd.arg("--version").stdout(Stdio::null()).stderr(Stdio::null());

        let status = match cmd.spawn() {
            Ok(mut child) => tokio::time::timeout(VERSION_CHECK_TIMEOUT, child.wait()).await,
            Err(e) => {
                debug!("Resolver not available: {}", e);
                return false;
            }
        };

        let available = matches!(status, Ok(Ok(status)) if status.success());
        if available {
            info!(program = ?self.program, "Resolver available");
        } else {
            warn!(program = ?self.program, "Resolver not available");
        }
        available
    }
}

/// Parse resolver stdout: first three lines are title, stream URL, duration
pub fn parse_resolver_output(stdout: &str) -> Result<ResolvedMedia, ResolverError> {
    let lines: Vec<&str> = stdout.lines().collect();
    if lines.len() < 3 {
        return Err(ResolverError::IncompleteOutput(lines.len()));
    }

    Ok(ResolvedMedia {
        title: lines[0].trim().to_string(),
        stream_url: lines[1].trim().to_string(),
        duration_text: lines[2].trim().to_string(),
    })
}

/// Parse `MM:SS` or `HH:MM:SS` into milliseconds.
///
/// Any other shape, or a non-numeric field, yields 0.
pub fn parse_duration_text(text: &str) -> u64 {
    let fields: Option<Vec<u64>> = text
        .trim()
        .split(':')
        .map(|field| field.parse::<u64>().ok())
        .collect();

    let total_seconds = match fields.as_deref() {
        Some(&[minutes, seconds]) => minutes.saturating_mul(60).saturating_add(seconds),
        Some(&[hours, minutes, seconds]) => hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(seconds),
        _ => {
            debug!("Unparseable duration text: {:?}", text);
            0
        }
    };

    total_seconds.saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_two_fields() {
        assert_eq!(parse_duration_text("3:45"), 225_000);
        assert_eq!(parse_duration_text("00:30"), 30_000);
    }

    #[test]
    fn test_parse_duration_three_fields() {
        assert_eq!(parse_duration_text("1:23:45"), 5_025_000);
    }

    #[test]
    fn test_parse_duration_other_shapes_are_zero() {
        assert_eq!(parse_duration_text("45"), 0);
        assert_eq!(parse_duration_text("1:2:3:4"), 0);
        assert_eq!(parse_duration_text("a:b"), 0);
        assert_eq!(parse_duration_text(""), 0);
        assert_eq!(parse_duration_text("-1:30"), 0);
    }

    #[test]
    fn test_parse_output_three_lines() {
        let media = parse_resolver_output("Song Title\nhttps://cdn.test/stream\n4:05\n").unwrap();
        assert_eq!(media.title, "Song Title");
        assert_eq!(media.stream_url, "https://cdn.test/stream");
        assert_eq!(media.duration_text, "4:05");
    }

    #[test]
    fn test_parse_output_extra_lines_ignored() {
        let media = parse_resolver_output("T\nU\n1:00\nnoise\n").unwrap();
        assert_eq!(media.duration_text, "1:00");
    }

    #[test]
    fn test_parse_output_too_short() {
        assert_eq!(
            parse_resolver_output("T\nU\n"),
            Err(ResolverError::IncompleteOutput(2))
        );
        assert_eq!(parse_resolver_output(""), Err(ResolverError::IncompleteOutput(0)));
    }

    #[tokio::test]
    async fn test_empty_program_is_spawn_error() {
        let resolver = YtDlpResolver::new(Vec::new(), Duration::from_secs(1));
        let result = resolver.resolve("https://youtu.be/x").await;
        assert!(matches!(result, Err(ResolverError::Spawn(_))));
        assert!(!resolver.is_available().await);
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let resolver = YtDlpResolver::new(
            vec!["jukebox-nonexistent-resolver-binary".to_string()],
            Duration::from_secs(1),
        );
        assert!(!resolver.is_available().await);
        assert!(matches!(
            resolver.resolve("https://youtu.be/x").await,
            Err(ResolverError::Spawn(_))
        ));
    }

    #[cfg(unix)]
    fn shell(script: &str, timeout: Duration) -> YtDlpResolver {
        // Extra resolver arguments become positional parameters and are ignored
        YtDlpResolver::new(
            vec!["sh".to_string(), "-c".to_string(), script.to_string()],
            timeout,
        )
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_reads_stdout() {
        let resolver = shell(
            "printf 'Song\\nhttps://cdn.test/a\\n3:45\\n'",
            Duration::from_secs(5),
        );
        let media = resolver.resolve("https://youtu.be/x").await.unwrap();
        assert_eq!(media.title, "Song");
        assert_eq!(media.stream_url, "https://cdn.test/a");
        assert_eq!(media.duration_text, "3:45");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_nonzero_exit() {
        let resolver = shell("echo partial; exit 3", Duration::from_secs(5));
        let result = resolver.resolve("https://youtu.be/x").await;
        assert_eq!(result, Err(ResolverError::ExitStatus("3".to_string())));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_times_out() {
        let resolver = shell("sleep 5", Duration::from_millis(100));
        let result = resolver.resolve("https://youtu.be/x").await;
        assert_eq!(result, Err(ResolverError::Timeout(Duration::from_millis(100))));
    }
}
