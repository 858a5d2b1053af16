use gridport_catalog::CatalogClient;
use gridport_import::{ImportError, Orchestrator, PlatformSource, PlatformStatus, ScanReport};
use indicatif::ProgressBar;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::Context;
use crate::commands::{
    SteamTargets, connect_catalog, log_blank, runtime, sources, steam_targets, with_progress,
};
use crate::error::CliError;
use crate::spinner::spinner;

/// Run the scan command.
pub(crate) fn run_scan(ctx: &Context) -> Result<(), CliError> {
    let catalog = connect_catalog(ctx)?;
    let targets = steam_targets(ctx)?;
    let sources = sources(ctx);
    let rt = runtime()?;

    let pb = spinner(ctx.quiet, "Scanning launchers...");
    let report = rt.block_on(scan_with_progress(&pb, &catalog, &targets, &sources));
    pb.finish_and_clear();

    print_scan(&report?);
    Ok(())
}

/// Scan every source, updating `pb` as the scan progresses.
pub(crate) async fn scan_with_progress(
    pb: &ProgressBar,
    catalog: &CatalogClient,
    targets: &SteamTargets,
    sources: &[Box<dyn PlatformSource>],
) -> Result<ScanReport, ImportError> {
    with_progress(pb, |tx| async move {
        let mut orchestrator =
            Orchestrator::new(catalog, &targets.grid, &targets.shortcuts, &targets.library)
                .with_events(tx);
        orchestrator.scan(sources).await
    })
    .await
}

pub(crate) fn print_scan(report: &ScanReport) {
    for platform in &report.platforms {
        match &platform.status {
            PlatformStatus::Ready => {
                log::info!(
                    "{} ({} games)",
                    platform.name.if_supports_color(Stdout, |t| t.bold()),
                    platform.candidates.len(),
                );
                for candidate in &platform.candidates {
                    if candidate.grid.is_some() {
                        log::info!(
                            "  {} {}",
                            "\u{2714}".if_supports_color(Stdout, |t| t.green()),
                            candidate.game.name,
                        );
                    } else {
                        log::info!(
                            "  {} {} {}",
                            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                            candidate.game.name,
                            "(no artwork)".if_supports_color(Stdout, |t| t.dimmed()),
                        );
                    }
                }
            }
            PlatformStatus::NotInstalled => {
                log::info!(
                    "{} {}",
                    platform.name.if_supports_color(Stdout, |t| t.bold()),
                    "(not installed)".if_supports_color(Stdout, |t| t.dimmed()),
                );
            }
            PlatformStatus::Errored(reason) => {
                log::info!(
                    "{} {} {}",
                    platform.name.if_supports_color(Stdout, |t| t.bold()),
                    "error:".if_supports_color(Stdout, |t| t.red()),
                    reason,
                );
            }
        }
    }

    log_blank();
    log::info!(
        "{} game(s) found, {} not known to SteamGridDB",
        report.game_count(),
        report.failed.len(),
    );
}
