use clap::Subcommand;
use std::io::{self, Write};

use brewguide_core::Config;

/// `brewguide-cli config ...`
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting, addressed by a dotted key
    Get {
        /// e.g. "timer.tick_interval_ms", "display.announce_every_secs"
        key: String,
    },
    /// Change one setting and write the file back
    Set { key: String, value: String },
    /// Print the whole config as TOML
    List,
    /// Overwrite the config file with the defaults
    Reset,
    /// Print where the config file lives
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or_else(|| format!("no such setting: {key}"))?;
            writeln!(out, "{value}")?;
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(%key, %value, "config updated");
            // Echo the stored form, e.g. "true" for "TRUE".
            let stored = config.get(&key).unwrap_or(value);
            writeln!(out, "{key} = {stored}")?;
        }
        ConfigAction::List => {
            let config = Config::load()?;
            write!(out, "{}", toml::to_string_pretty(&config)?)?;
        }
        ConfigAction::Reset => {
            let path = Config::path()?;
            Config::default().save_to(&path)?;
            writeln!(out, "defaults written to {}", path.display())?;
        }
        ConfigAction::Path => writeln!(out, "{}", Config::path()?.display())?,
    }
    Ok(())
}
