//! Song listing and maintenance commands.

use tracing::warn;

use super::{Context, SelectionArgs};
use crate::library::PlaylistRef;
use crate::song::Song;

/// One line per song: position, labels, match level, junk marker.
fn print_song(position: usize, song: &Song) {
    let score = match song.shazam_match_score() {
        Some(score) => format!("{score}%"),
        None => "-".to_string(),
    };
    println!(
        "{:>4}. {} [{}] {} {}{}",
        position,
        song.song_name(),
        song.id(),
        song.duration_label(),
        score,
        if song.is_junk() { " (JUNK)" } else { "" }
    );
}

fn print_summary(ctx: &Context, selection: &SelectionArgs, count: usize) -> anyhow::Result<()> {
    println!("Found {count} songs matching criteria");
    match &selection.playlist {
        Some(identifier) => {
            let PlaylistRef { playlist, url, .. } =
                ctx.library.resolve_playlist(identifier, true)?;
            let label = playlist.map(|p| p.label).unwrap_or_default();
            println!("  Playlist:  {label} ({url})");
        }
        None => println!("  Playlists: ALL"),
    }
    if selection.filter.trim().is_empty() {
        println!("  Filter:    NONE");
    } else {
        let threshold = selection
            .match_level
            .unwrap_or(ctx.config.matching.filter_threshold);
        println!("  Filter:    {} (match threshold: {threshold}%)", selection.filter);
    }
    println!();
    Ok(())
}

/// List songs, or only junk songs.
pub fn cmd_list_songs(ctx: &Context, selection: &SelectionArgs, junk_only: bool) -> anyhow::Result<()> {
    let query = selection.query(&ctx.config, junk_only);
    let songs = ctx.library.select_songs(&query, selection.index)?;

    print_summary(ctx, selection, songs.len())?;
    for (position, song) in songs.iter().enumerate() {
        print_song(position + 1, song);
        println!("      {}", song.video_url());
    }
    Ok(())
}

/// Reset the tags of the selected songs and mark them as junk.
pub fn cmd_junkize(ctx: &Context, selection: &SelectionArgs) -> anyhow::Result<()> {
    let query = selection.query(&ctx.config, false);
    let songs = ctx.library.select_songs(&query, selection.index)?;

    let mut done = 0;
    for mut song in songs {
        if let Err(e) = song.junkize() {
            warn!(path = %song.path().display(), error = %e, "Failed to junkize song");
            eprintln!("Failed to junkize {}: {e}", song.filename());
            continue;
        }
        done += 1;
        println!("Junkized: {}", song.filename());
    }
    println!("\nJunkized {done} songs.");
    Ok(())
}

/// Rename the selected songs whose filename is not canonical.
///
/// The junk flag of each song is kept.
pub fn cmd_rename(ctx: &Context, selection: &SelectionArgs) -> anyhow::Result<()> {
    let query = selection.query(&ctx.config, false);
    let songs = ctx.library.select_songs(&query, selection.index)?;

    let mut renamed = 0;
    for mut song in songs.into_iter().filter(|s| s.status().should_be_renamed) {
        let before = song.filename().to_string();
        if let Err(e) = song.fix_filename(None) {
            warn!(path = %song.path().display(), error = %e, "Failed to rename song");
            eprintln!("Failed to rename {before}: {e}");
            continue;
        }
        renamed += 1;
        println!("{before}\n  -> {}", song.filename());
    }
    println!("\nRenamed {renamed} songs.");
    Ok(())
}
