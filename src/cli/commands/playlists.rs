//! Playlist listing command.

use anyhow::bail;

use super::Context;

/// List playlists with their song counts.
pub fn cmd_playlists(ctx: &Context) -> anyhow::Result<()> {
    let playlists = ctx.library.playlists()?;
    if playlists.is_empty() {
        bail!("No playlist found in {}", ctx.library.root().display());
    }

    println!("Found {} playlists in repository.\n", playlists.len());
    for (position, stats) in playlists.iter().enumerate() {
        println!("{:>4}. {}", position + 1, stats.playlist.label);
        println!("      {}", stats.playlist.url());
        println!(
            "      {} songs: {} clean, {} junk",
            stats.total,
            stats.clean(),
            stats.junk
        );
    }
    Ok(())
}
