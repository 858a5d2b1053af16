use gridport_catalog::LocalOverrideTable;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::Context;
use crate::commands::log_blank;
use crate::error::CliError;

/// List every local id override.
pub(crate) fn run_overrides_show(ctx: &Context) -> Result<(), CliError> {
    let path = &ctx.overrides_path;
    if !path.exists() {
        log::info!(
            "No override file at {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
        );
        return Ok(());
    }

    let table = LocalOverrideTable::load_from(path)?;
    log::info!(
        "{} ({} overrides)",
        path.display().if_supports_color(Stdout, |t| t.cyan()),
        table.len(),
    );
    log_blank();
    for (id_type, id, canonical) in table.entries() {
        log::info!(
            "  {} {} {} {}",
            format!("{id_type:<8}").if_supports_color(Stdout, |t| t.bold()),
            id,
            "->".if_supports_color(Stdout, |t| t.dimmed()),
            canonical,
        );
    }
    Ok(())
}
