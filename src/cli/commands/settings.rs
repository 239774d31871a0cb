//! Configuration command.

use super::Context;
use crate::config;

/// Print the effective configuration, optionally saving it.
pub fn cmd_config(ctx: &Context, save: bool) -> anyhow::Result<()> {
    let mut shown = ctx.config.clone();
    if shown.credentials.acoustid_api_key.is_some() {
        shown.credentials.acoustid_api_key = Some("********".to_string());
    }
    print!("{}", toml::to_string_pretty(&shown)?);

    if save {
        let path = config::save(&ctx.config)?;
        println!("\nSaved to {}", path.display());
    } else if let Some(path) = config::config_path() {
        println!("\n# {}", path.display());
    }
    Ok(())
}
