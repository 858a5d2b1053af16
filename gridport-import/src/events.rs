//! Progress events emitted during scan and import, and a helper that
//! drains them while the run is driven.

use std::future::Future;

use gridport_core::Platform;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};

/// Upper bound for draining leftover events once the run has finished.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportEvent {
    /// Checking which of `total` launchers are installed.
    DetectingPlatforms { total: usize },
    PlatformDetected { platform: Platform, installed: bool },
    /// A launcher failed detection or listing and is excluded.
    PlatformErrored { platform: Platform, reason: String },
    /// About to list the games of one launcher.
    ListingGames { platform: Platform },
    GamesListed { platform: Platform, count: usize },
    /// Bulk grid lookups started for `platforms` launchers.
    ResolvingArtwork { platforms: usize },
    /// A game has no catalog entry; alternatives are being searched.
    LookupFailed { platform: Platform, name: String, id: String },
    /// The scan finished with `games` importable games.
    ScanComplete { games: usize },
    /// Games were saved and registered with Steam.
    GamesImported { platform: Platform, count: usize },
    /// Steam holds its files open; nothing from `platform` was imported.
    ImportBlocked { platform: Platform },
    DownloadsStarted { platform: Platform, count: usize },
    DownloadsComplete {
        platform: Platform,
        downloaded: usize,
        failed: usize,
    },
}

/// Drive `task` to completion, passing every event from `event_rx` to
/// `on_event`. Events still queued when the task finishes are drained
/// before returning.
pub async fn run_with_events<F, R>(
    task: F,
    mut event_rx: mpsc::UnboundedReceiver<ImportEvent>,
    mut on_event: impl FnMut(ImportEvent),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);

    let result = loop {
        tokio::select! {
            r = &mut task => break Some(r),
            event = event_rx.recv() => match event {
                Some(e) => on_event(e),
                None => break None,
            },
        }
    };

    let Some(result) = result else {
        log::debug!("run_with_events: channel closed before the task finished");
        return task.await;
    };

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, event_rx.recv()).await {
            Ok(Some(e)) => on_event(e),
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "run_with_events: drain timed out after {}s",
                    DRAIN_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }
    result
}
