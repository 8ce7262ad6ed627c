//! Config command handler - Show and edit the configuration file

use crate::cli::{ConfigArgs, ConfigOperation};
use crate::commands::CommandContext;
use crate::config::GalleryConfig;
use crate::error::Result;

/// Run the config command
///
/// Edits apply to the file on disk, not to the flag overrides in `ctx`.
pub fn run_config(args: &ConfigArgs, ctx: &CommandContext) -> Result<String> {
    let path = &ctx.config_path;
    match &args.operation {
        ConfigOperation::Show => {
            let config = GalleryConfig::load_from(path)?;
            Ok(format!("# {}\n{}", path.display(), config.display()))
        }
        ConfigOperation::Set { key, value } => {
            let mut config = GalleryConfig::load_from(path)?;
            config.set(key, value)?;
            config.save_to(path)?;
            Ok(format!("{} = {}\n", key, config.get(key).unwrap_or_default()))
        }
        ConfigOperation::Reset => {
            GalleryConfig::default().save_to(path)?;
            Ok(format!("Reset {} to defaults\n", path.display()))
        }
    }
}
