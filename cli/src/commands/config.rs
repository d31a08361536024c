//! Config commands

use anyhow::Result;

use super::Context;
use crate::config::Config;
use crate::output;
use crate::ConfigCommands;

pub fn handle(context: &Context, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Init => {
            let path = Config::for_profile(context.config.profile()).save()?;
            output::success(&format!("Configuration initialized at {}", path.display()));
        }
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load(context.config.profile())?;
            config.set(&key, &value)?;
            config.save()?;
            output::success(&format!("Set {} successfully", key));
        }
        ConfigCommands::Show => {
            context.format.print(&context.config);
            println!("draft_dir: {}", context.config.draft_dir()?.display());
        }
    }
    Ok(())
}
