use gridport_steam::{AssetKind, AssetSource, AssetStore, GridDirectory, SteamPaths};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::Context;
use crate::commands::runtime;
use crate::error::CliError;

fn grid_directory(ctx: &Context) -> Result<GridDirectory, CliError> {
    let paths = SteamPaths::detect(
        ctx.settings.steam_root(),
        ctx.settings.steam.user_id.clone(),
    )?;
    Ok(GridDirectory::new(paths.grid_dir())?)
}

/// Use a local image or a URL as the `kind` artwork of `app_id`.
pub(crate) fn run_asset_set(
    ctx: &Context,
    app_id: u32,
    kind: AssetKind,
    source: &str,
) -> Result<(), CliError> {
    let grid = grid_directory(ctx)?;
    let source = AssetSource::parse(source);
    match &source {
        AssetSource::Path(path) if !path.is_file() => {
            return Err(CliError::other(format!("no such image: {}", path.display())));
        }
        _ => {}
    }

    let rt = runtime()?;
    let dest = rt.block_on(grid.write_asset(kind, app_id, &source))?;
    log::info!(
        "{} Set {kind} for {app_id}: {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        dest.display().if_supports_color(Stdout, |t| t.cyan()),
    );
    Ok(())
}

/// Remove the `kind` artwork of `app_id`.
pub(crate) fn run_asset_reset(ctx: &Context, app_id: u32, kind: AssetKind) -> Result<(), CliError> {
    let grid = grid_directory(ctx)?;
    match grid.remove_asset(kind, app_id)? {
        0 => log::info!(
            "{}",
            format!("No custom {kind} for {app_id}").if_supports_color(Stdout, |t| t.dimmed()),
        ),
        removed => log::info!(
            "{} Removed {removed} {kind} file(s) for {app_id}",
            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        ),
    }
    Ok(())
}
