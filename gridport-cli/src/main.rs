//! gridport CLI
//!
//! Imports games from other launchers into Steam, together with artwork
//! from SteamGridDB.

mod commands;
mod error;
mod settings;
mod spinner;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use gridport_catalog::default_overrides_path;
use gridport_core::Platform;
use gridport_steam::AssetKind;

use crate::error::CliError;
use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "gridport")]
#[command(about = "Import games from other launchers into Steam, with artwork", long_about = None)]
struct Cli {
    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Settings file (default: ~/.config/gridport/settings.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Id override file (default: ./LocalFixes.json)
    #[arg(long, global = true)]
    overrides: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List importable games and the artwork found for them
    Scan,

    /// Import games into Steam and download their artwork
    Import {
        /// Only these launchers (e.g., oculus,egs)
        #[arg(short, long, value_delimiter = ',')]
        platform: Option<Vec<Platform>>,

        /// Only games whose name contains this text
        #[arg(short, long)]
        game: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Set or reset custom artwork for a Steam app
    Asset {
        #[command(subcommand)]
        action: AssetAction,
    },

    /// Inspect the local id override file
    Overrides {
        #[command(subcommand)]
        action: OverridesAction,
    },

    /// Inspect the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum AssetAction {
    /// Use an image file or URL as artwork
    Set {
        app_id: u32,
        /// horizontal-grid, vertical-grid, hero or logo
        kind: AssetKind,
        /// Local path or http(s) URL
        source: String,
    },

    /// Remove custom artwork
    Reset { app_id: u32, kind: AssetKind },
}

#[derive(Subcommand)]
enum OverridesAction {
    /// List every override
    Show,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the current settings
    Show,

    /// Print the settings file path
    Path,
}

/// Everything a command needs from the command line and the settings file.
pub(crate) struct Context {
    pub settings: Settings,
    pub settings_path: PathBuf,
    pub overrides_path: PathBuf,
    pub quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{} {e}", "\u{2718}".if_supports_color(Stderr, |t| t.red()));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings_path = cli.config.unwrap_or_else(settings::settings_path);
    let ctx = Context {
        settings: Settings::load(&settings_path)?,
        settings_path,
        overrides_path: cli.overrides.unwrap_or_else(default_overrides_path),
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Scan => commands::scan::run_scan(&ctx),
        Commands::Import {
            platform,
            game,
            yes,
        } => commands::import::run_import(&ctx, platform, game, yes),
        Commands::Asset { action } => match action {
            AssetAction::Set {
                app_id,
                kind,
                source,
            } => commands::asset::run_asset_set(&ctx, app_id, kind, &source),
            AssetAction::Reset { app_id, kind } => {
                commands::asset::run_asset_reset(&ctx, app_id, kind)
            }
        },
        Commands::Overrides { action } => match action {
            OverridesAction::Show => commands::overrides::run_overrides_show(&ctx),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&ctx),
            ConfigAction::Path => commands::config::run_config_path(&ctx),
        },
    }
}

/// User-facing output goes through `log`; info lines are printed bare.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "[{}] {}", level, record.args()),
        })
        .init();
}
