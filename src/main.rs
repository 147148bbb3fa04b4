//! Binary entry point: opens a window with a controllable party.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;
use cortege::{init_logging, CharacterKey, PartyConfig, PartyPlugin, StatTable};

/// Walk a party of characters around an empty field
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file with movement tuning and keybindings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file with character stats, replacing the builtin table
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Characters in party order; the first one leads
    #[arg(short, long, value_delimiter = ',', default_value = "ardent,wren,sable")]
    party: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => PartyConfig::load(path)?,
        None => PartyConfig::default(),
    };
    let stats = match &args.stats {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            StatTable::from_json_str(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => StatTable::builtin(),
    };

    let roster: Vec<CharacterKey> = args
        .party
        .iter()
        .map(|name| CharacterKey::new(name.trim()))
        .collect();
    if roster.is_empty() {
        bail!("the party needs at least one character");
    }
    if let Some(unknown) = roster.iter().find(|key| stats.get(key).is_none()) {
        bail!("unknown character '{unknown}'; known: {:?}", stats.keys());
    }

    App::new()
        .add_plugins(DefaultPlugins.build().disable::<LogPlugin>())
        .add_plugins(PartyPlugin {
            config,
            stats,
            roster,
            spawn: Vec2::ZERO,
        })
        .run();
    Ok(())
}
