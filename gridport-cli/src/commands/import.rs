use std::io::Write;

use gridport_core::Platform;
use gridport_import::{ImportReport, Orchestrator, PlatformScan, ScanReport};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::Context;
use crate::commands::scan::{print_scan, scan_with_progress};
use crate::commands::{
    connect_catalog, log_blank, runtime, sources, steam_targets, with_progress,
};
use crate::error::CliError;
use crate::spinner::spinner;

/// Run the import command.
pub(crate) fn run_import(
    ctx: &Context,
    platforms: Option<Vec<Platform>>,
    game: Option<String>,
    yes: bool,
) -> Result<(), CliError> {
    let catalog = connect_catalog(ctx)?;
    let targets = steam_targets(ctx)?;
    let sources = sources(ctx);
    let rt = runtime()?;

    let pb = spinner(ctx.quiet, "Scanning launchers...");
    let scan = rt.block_on(scan_with_progress(&pb, &catalog, &targets, &sources));
    pb.finish_and_clear();

    let selected = select(scan?, platforms.as_deref(), game.as_deref());
    print_scan(&selected);
    if selected.game_count() == 0 {
        log::info!("Nothing to import.");
        return Ok(());
    }
    if !yes && !confirm(selected.game_count())? {
        log::info!("Import cancelled.");
        return Ok(());
    }

    let pb = spinner(ctx.quiet, "Importing...");
    let (catalog, targets, selected) = (&catalog, &targets, &selected);
    let reports = rt.block_on(with_progress(&pb, |tx| async move {
        let mut orchestrator =
            Orchestrator::new(catalog, &targets.grid, &targets.shortcuts, &targets.library)
                .with_events(tx);
        orchestrator.import_all(selected).await
    }));
    pb.finish_and_clear();

    log_blank();
    for report in &reports? {
        print_report(report);
    }
    Ok(())
}

/// Keep the requested launchers and the games whose name contains `game`.
fn select(scan: ScanReport, platforms: Option<&[Platform]>, game: Option<&str>) -> ScanReport {
    let needle = game.map(str::to_lowercase);
    let platforms = scan
        .platforms
        .into_iter()
        .filter(|p| platforms.is_none_or(|wanted| wanted.contains(&p.platform)))
        .map(|p| PlatformScan {
            candidates: p
                .candidates
                .into_iter()
                .filter(|c| {
                    needle
                        .as_deref()
                        .is_none_or(|n| c.game.name.to_lowercase().contains(n))
                })
                .collect(),
            ..p
        })
        .collect();
    ScanReport {
        platforms,
        failed: scan.failed,
    }
}

fn confirm(count: usize) -> Result<bool, CliError> {
    print!("Import {count} game(s) into Steam? [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_report(report: &ImportReport) {
    let name = report.platform.display_name();
    if report.blocked {
        log::warn!(
            "{} {name}: Steam is running, close it and import again",
            "\u{2718}".if_supports_color(Stdout, |t| t.red()),
        );
        return;
    }
    log::info!(
        "{} {name}: imported {} game(s), {} image(s) downloaded",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        report.imported,
        report.downloaded,
    );
    if report.failed_downloads > 0 {
        log::warn!(
            "  {} image(s) failed to download",
            report.failed_downloads.if_supports_color(Stdout, |t| t.yellow()),
        );
    }
}
