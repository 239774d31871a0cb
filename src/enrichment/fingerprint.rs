//! Chromaprint fingerprints of song files.
//!
//! The AcoustID recognizer identifies a song from its fingerprint and
//! duration, both produced by the `fpcalc` tool shipped with Chromaprint
//! (`libchromaprint-tools` on Debian, `chromaprint` on Homebrew). The tool is
//! looked up on `PATH` first, then in the usual install locations.

use std::path::Path;
use std::process::Command;

use crate::enrichment::domain::{AudioFingerprint, ServiceError};

#[cfg(windows)]
const FPCALC_PATHS: &[&str] = &[
    "fpcalc",
    r"C:\Program Files\Chromaprint\fpcalc.exe",
    r"C:\Program Files\MusicBrainz Picard\fpcalc.exe",
];

#[cfg(not(windows))]
const FPCALC_PATHS: &[&str] = &[
    "fpcalc",
    "/usr/bin/fpcalc",
    "/usr/local/bin/fpcalc",
    "/opt/homebrew/bin/fpcalc",
];

fn find_fpcalc() -> Option<&'static str> {
    FPCALC_PATHS.iter().copied().find(|path| {
        Command::new(path)
            .arg("-version")
            .output()
            .is_ok_and(|o| o.status.success())
    })
}

/// Fingerprint a song file with `fpcalc -json`.
///
/// Blocking: callers on the async side run it on the blocking pool.
pub fn generate_fingerprint(path: &Path) -> Result<AudioFingerprint, ServiceError> {
    if !path.is_file() {
        return Err(ServiceError::Tool(format!(
            "Song file {} is missing",
            path.display()
        )));
    }

    let fpcalc = find_fpcalc().ok_or_else(|| {
        ServiceError::Tool(
            "fpcalc not found: install Chromaprint to recognize songs"
                .to_string(),
        )
    })?;

    let output = Command::new(fpcalc)
        .arg("-json")
        .arg(path)
        .output()
        .map_err(|e| ServiceError::Tool(format!("Failed to run fpcalc: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ServiceError::Tool(format!("fpcalc failed: {}", stderr.trim())));
    }

    parse_fpcalc_json(&String::from_utf8_lossy(&output.stdout))
}

fn parse_fpcalc_json(json: &str) -> Result<AudioFingerprint, ServiceError> {
    let parsed: FpcalcOutput = serde_json::from_str(json)
        .map_err(|e| ServiceError::Parse(format!("Failed to parse fpcalc output: {e}")))?;

    Ok(AudioFingerprint {
        fingerprint: parsed.fingerprint,
        duration_secs: parsed.duration.round() as u32,
    })
}

#[derive(serde::Deserialize)]
struct FpcalcOutput {
    fingerprint: String,
    duration: f64,
}
