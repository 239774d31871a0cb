//! Junk song tagging command.

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use tokio::runtime::Runtime;
use tracing::info;

use super::{Context, SelectionArgs};
use crate::enrichment::{AcoustIdRecognizer, HttpCoverArtFetcher, RecognitionThrottle, TaggingServices};
use crate::error::Error;
use crate::library::{CancelFlag, tag_junk_songs};

/// AcoustID recognizer from the command line key or the configured one.
pub(super) fn acoustid_recognizer(
    ctx: &Context,
    api_key: Option<&str>,
) -> anyhow::Result<AcoustIdRecognizer> {
    let Some(api_key) = api_key.or(ctx.config.credentials.acoustid_api_key.as_deref()) else {
        bail!("An AcoustID API key is required: pass --api-key or set ACOUSTID_API_KEY");
    };
    AcoustIdRecognizer::new(api_key).context("Failed to create AcoustID client")
}

/// Recognize junk songs and fix their tags, cover art and filename.
pub fn cmd_tag_junks(
    rt: &Runtime,
    ctx: &Context,
    selection: &SelectionArgs,
    api_key: Option<&str>,
    threshold: Option<u8>,
) -> anyhow::Result<()> {
    let recognizer = acoustid_recognizer(ctx, api_key)?;
    let threshold = threshold.unwrap_or(ctx.config.recognition.match_threshold);

    let query = selection.query(&ctx.config, true);
    let paths: Vec<PathBuf> = ctx
        .library
        .select_songs(&query, selection.index)?
        .iter()
        .map(|song| song.path().to_path_buf())
        .collect();
    println!("Tagging {} junk songs (match threshold: {threshold}%)", paths.len());

    let cover_art = HttpCoverArtFetcher::new().context("Failed to create HTTP client")?;
    let throttle = RecognitionThrottle::from_config(&ctx.config.recognition);
    let services = TaggingServices {
        recognizer: &recognizer,
        throttle: &throttle,
        cover_art: &cover_art,
        match_threshold: threshold,
    };

    let cancel = CancelFlag::new();
    let report = rt.block_on(async {
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, stopping after the current song");
                on_interrupt.cancel();
            }
        });
        tag_junk_songs(&paths, ctx.library.store(), services, &cancel).await
    });

    let report = match report {
        Ok(report) => report,
        Err(Error::Cancelled) => {
            println!("\nInterrupted.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for path in &report.fixed {
        println!("Fixed:      {}", display_name(path));
    }
    for path in &report.still_junk {
        println!("Still junk: {}", display_name(path));
    }
    for (path, reason) in &report.failed {
        println!("Failed:     {} ({reason})", display_name(path));
    }
    println!(
        "\n{} fixed, {} still junk, {} failed",
        report.fixed.len(),
        report.still_junk.len(),
        report.failed.len()
    );
    Ok(())
}

pub(super) fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
