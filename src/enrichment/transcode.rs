//! MP3 transcoding with ffmpeg.
//!
//! `ffprobe` reads the source duration, then `ffmpeg` encodes with LAME VBR
//! quality 2 while reporting progress on stdout (`-progress pipe:1`). The
//! blocking process runs on the tokio blocking pool; progress updates flow
//! back over a channel so the callback runs on the caller's task.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::domain::ServiceError;
use super::traits::{AudioTranscoder, Progress};

/// Transcoder shelling out to `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl FfmpegTranscoder {
    fn probe_duration(&self, source: &Path) -> Option<f64> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
            .arg(source)
            .output()
            .ok()
            .filter(|o| o.status.success())?;
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| *d > 0.0)
    }

    fn run(
        &self,
        source: &Path,
        dest: &Path,
        progress: mpsc::UnboundedSender<f32>,
    ) -> Result<(), ServiceError> {
        let total_secs = self.probe_duration(source);

        let child = Command::new(&self.ffmpeg)
            .args(["-y", "-hide_banner", "-loglevel", "error", "-nostats"])
            .arg("-i")
            .arg(source)
            .args(["-vn", "-codec:a", "libmp3lame", "-q:a", "2", "-progress", "pipe:1"])
            .arg(dest)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ServiceError::Tool(format!("Failed to run ffmpeg: {e}")))?;

        watch(child, total_secs, &progress)
    }
}

/// Forward progress from the child's stdout and wait for it to exit.
fn watch(
    mut child: Child,
    total_secs: Option<f64>,
    progress: &mpsc::UnboundedSender<f32>,
) -> Result<(), ServiceError> {
    // Drained on its own thread so a chatty stderr cannot stall stdout
    let stderr_reader = child.stderr.take().map(|pipe| thread::spawn(move || drain(pipe)));

    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines().map_while(|l| l.ok()) {
            if let Some(fraction) = parse_progress_line(&line, total_secs) {
                let _ = progress.send(fraction);
            }
        }
    }

    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();

    let status = child
        .wait()
        .map_err(|e| ServiceError::Tool(format!("ffmpeg did not finish: {e}")))?;
    if !status.success() {
        return Err(ServiceError::Tool(format!("ffmpeg failed: {}", stderr.trim())));
    }
    Ok(())
}

fn drain(mut pipe: impl Read) -> String {
    let mut text = String::new();
    let _ = pipe.read_to_string(&mut text);
    text
}

/// Turn one `key=value` line of ffmpeg's progress output into a fraction.
fn parse_progress_line(line: &str, total_secs: Option<f64>) -> Option<f32> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "progress" if value == "end" => Some(1.0),
        // Both keys carry microseconds
        "out_time_us" | "out_time_ms" => {
            let total = total_secs?;
            let done = value.parse::<f64>().ok()? / 1_000_000.0;
            Some((done / total).clamp(0.0, 1.0) as f32)
        }
        _ => None,
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        source: &Path,
        dest: &Path,
        progress: Progress<'_>,
    ) -> Result<(), ServiceError> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let this = self.clone();
        let (source, dest) = (source.to_path_buf(), dest.to_path_buf());
        debug!(source = %source.display(), dest = %dest.display(), "Transcoding");

        let handle = tokio::task::spawn_blocking(move || this.run(&source, &dest, tx));
        while let Some(fraction) = rx.recv().await {
            progress(fraction);
        }

        handle
            .await
            .map_err(|e| ServiceError::Tool(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_progress_line() {
        assert_eq!(parse_progress_line("out_time_us=30000000", Some(120.0)), Some(0.25));
        assert_eq!(parse_progress_line("out_time_ms=240000000", Some(120.0)), Some(1.0));
        assert_eq!(parse_progress_line("progress=end", None), Some(1.0));
        assert_eq!(parse_progress_line("progress=continue", Some(120.0)), None);
        assert_eq!(parse_progress_line("out_time_us=30000000", None), None);
        assert_eq!(parse_progress_line("bitrate=128kbits/s", Some(120.0)), None);
    }

    #[cfg(unix)]
    fn shell(script: &str) -> Child {
        Command::new("sh")
            .args(["-c", script])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_watch_survives_flooded_stderr() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Well past the pipe buffer before any progress line
        let child = shell("head -c 1000000 /dev/zero >&2; echo progress=end");

        watch(child, None, &tx).unwrap();

        assert_eq!(rx.try_recv().ok(), Some(1.0));
    }

    #[cfg(unix)]
    #[test]
    fn test_watch_reports_stderr_on_failure() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let child = shell("echo 'Invalid data found' >&2; exit 1");

        let result = watch(child, None, &tx);

        assert_eq!(
            result,
            Err(ServiceError::Tool("ffmpeg failed: Invalid data found".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_error() {
        let transcoder = FfmpegTranscoder {
            ffmpeg: PathBuf::from("/nonexistent/ffmpeg"),
            ffprobe: PathBuf::from("/nonexistent/ffprobe"),
        };
        let result = transcoder
            .transcode(Path::new("in.webm"), Path::new("out.mp3"), &|_: f32| {})
            .await;
        assert!(matches!(result, Err(ServiceError::Tool(_))));
    }
}
