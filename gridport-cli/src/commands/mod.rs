pub(crate) mod asset;
pub(crate) mod config;
pub(crate) mod import;
pub(crate) mod overrides;
pub(crate) mod scan;

use std::future::Future;

use gridport_catalog::{CatalogClient, LocalOverrideTable, SteamGridDbApi};
use gridport_import::{ImportEvent, PlatformSource, known_sources, run_with_events};
use gridport_steam::{GameLibrary, GridDirectory, ShortcutsFile, SteamPaths};
use indicatif::ProgressBar;
use tokio::sync::mpsc;

use crate::Context;
use crate::error::CliError;
use crate::settings::API_KEY_ENV;

/// Blank line in the log output.
pub(crate) fn log_blank() {
    log::info!("");
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {e}")))
}

/// Build the catalog client from the override file and the API key.
pub(crate) fn connect_catalog(ctx: &Context) -> Result<CatalogClient, CliError> {
    let overrides = LocalOverrideTable::load_from(&ctx.overrides_path)?;

    let Some(api_key) = ctx.settings.api_key(std::env::var(API_KEY_ENV).ok()) else {
        return Err(CliError::config(format!(
            "no SteamGridDB API key; set {API_KEY_ENV} or [catalog] api_key in {}",
            ctx.settings_path.display()
        )));
    };

    let mut api = SteamGridDbApi::new(&api_key)?;
    if let Some(base_url) = &ctx.settings.catalog.base_url {
        api = api.with_base_url(base_url)?;
    }
    Ok(CatalogClient::new(api, overrides))
}

/// The local Steam installation: grid directory, shortcut file and game library.
pub(crate) struct SteamTargets {
    pub grid: GridDirectory,
    pub shortcuts: ShortcutsFile,
    pub library: GameLibrary,
}

pub(crate) fn steam_targets(ctx: &Context) -> Result<SteamTargets, CliError> {
    let paths = SteamPaths::detect(
        ctx.settings.steam_root(),
        ctx.settings.steam.user_id.clone(),
    )?;
    let library_path = ctx
        .settings
        .library_path()
        .ok_or_else(|| CliError::config("could not determine the game library path"))?;

    log::debug!("Game library at {}", library_path.display());
    Ok(SteamTargets {
        grid: GridDirectory::new(paths.grid_dir())?,
        shortcuts: ShortcutsFile::new(paths.shortcuts_path()),
        library: GameLibrary::new(library_path),
    })
}

pub(crate) fn sources(ctx: &Context) -> Vec<Box<dyn PlatformSource>> {
    known_sources(ctx.settings.oculus_libraries())
}

/// Run `task` while showing its progress events on `pb`.
pub(crate) async fn with_progress<Fut, T>(
    pb: &ProgressBar,
    task: impl FnOnce(mpsc::UnboundedSender<ImportEvent>) -> Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    let (tx, rx) = mpsc::unbounded_channel();
    run_with_events(task(tx), rx, |event| {
        log::debug!("{event:?}");
        if let Some(msg) = progress_message(&event) {
            pb.set_message(msg);
        }
    })
    .await
}

fn progress_message(event: &ImportEvent) -> Option<String> {
    Some(match event {
        ImportEvent::DetectingPlatforms { total } => {
            format!("Checking {total} launcher(s)...")
        }
        ImportEvent::ListingGames { platform } => format!("Listing {platform} games..."),
        ImportEvent::ResolvingArtwork { platforms } => {
            format!("Looking up artwork for {platforms} launcher(s)...")
        }
        ImportEvent::LookupFailed { name, .. } => format!("Searching for '{name}'..."),
        ImportEvent::GamesImported { platform, count } => {
            format!("Imported {count} {platform} game(s)")
        }
        ImportEvent::DownloadsStarted { platform, count } => {
            format!("Downloading artwork for {count} {platform} game(s)...")
        }
        _ => return None,
    })
}
