//! Scan launchers for games, find artwork, and import confirmed games into
//! Steam.
//!
//! A run goes through
//! `Idle → DetectingPlatforms → ListingGames → ResolvingArt →
//! ReconcilingFailures → AwaitingConfirmation` during [`Orchestrator::scan`],
//! then `Persisting → DownloadingAssets → Done` for each imported batch.
//! Any step can end in `Failed`.

use futures::future::join_all;
use gridport_catalog::{
    Artwork, ArtworkFetch, ArtworkResponse, CatalogClient, CatalogError,
};
use gridport_core::{ExternalGameRef, ImportedGame, Platform};
use gridport_steam::{
    AssetKind, AssetSource, AssetStore, GameStore, Shortcut, ShortcutRegistry, SteamError,
};
use tokio::sync::mpsc;

use crate::error::ImportError;
use crate::events::ImportEvent;
use crate::failed::{FailedLookup, search_alternatives};
use crate::platform::PlatformSource;
use crate::sequence::run_sequential;

/// Poster size requested for vertical grids.
pub const POSTER_DIMENSIONS: &str = "600x900";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    DetectingPlatforms,
    ListingGames,
    ResolvingArt,
    ReconcilingFailures,
    AwaitingConfirmation,
    Persisting,
    DownloadingAssets,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformStatus {
    Ready,
    NotInstalled,
    /// Detection or listing failed; the launcher contributes no games
    Errored(String),
}

/// A listed game and the grid found for it during the scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCandidate {
    pub game: ExternalGameRef,
    pub grid: Option<Artwork>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformScan {
    pub platform: Platform,
    pub name: String,
    pub status: PlatformStatus,
    pub candidates: Vec<ImportCandidate>,
}

impl PlatformScan {
    pub fn is_ready(&self) -> bool {
        self.status == PlatformStatus::Ready
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub platforms: Vec<PlatformScan>,
    pub failed: Vec<FailedLookup>,
}

impl ScanReport {
    /// Launchers that listed their games successfully.
    pub fn ready(&self) -> impl Iterator<Item = &PlatformScan> {
        self.platforms.iter().filter(|p| p.is_ready())
    }

    pub fn game_count(&self) -> usize {
        self.ready().map(|p| p.candidates.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub platform: Platform,
    pub imported: usize,
    /// Steam was running; nothing was registered or downloaded
    pub blocked: bool,
    pub downloaded: usize,
    pub failed_downloads: usize,
}

/// One image to fetch for one imported game.
struct AssetJob {
    game: String,
    kind: AssetKind,
    app_id: u32,
    url: String,
    /// Also link the written file under this legacy id
    legacy: Option<u64>,
}

/// Drives detection, lookup and import against injected collaborators.
pub struct Orchestrator<'a, F, A, R, S> {
    catalog: &'a CatalogClient<F>,
    assets: &'a A,
    shortcuts: &'a R,
    store: &'a S,
    events: Option<mpsc::UnboundedSender<ImportEvent>>,
    state: RunState,
}

impl<'a, F, A, R, S> Orchestrator<'a, F, A, R, S>
where
    F: ArtworkFetch,
    A: AssetStore,
    R: ShortcutRegistry,
    S: GameStore,
{
    pub fn new(
        catalog: &'a CatalogClient<F>,
        assets: &'a A,
        shortcuts: &'a R,
        store: &'a S,
    ) -> Self {
        Self {
            catalog,
            assets,
            shortcuts,
            store,
            events: None,
            state: RunState::Idle,
        }
    }

    /// Send progress events to `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<ImportEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn set_state(&mut self, state: RunState) {
        log::debug!("import: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn emit(&self, event: ImportEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    fn fail(&mut self, error: ImportError) -> ImportError {
        self.set_state(RunState::Failed);
        error
    }

    /// Detect launchers, list their games, and look up grids in bulk.
    ///
    /// Only catalog errors that make further lookups pointless abort the
    /// scan; every other failure is logged and excludes the launcher or the
    /// lookup it hit.
    pub async fn scan(
        &mut self,
        sources: &[Box<dyn PlatformSource>],
    ) -> Result<ScanReport, ImportError> {
        let mut platforms = self.detect(sources).await;
        self.list(sources, &mut platforms).await;

        let failed_games = match self.resolve_grids(&mut platforms).await {
            Ok(failed) => failed,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.set_state(RunState::ReconcilingFailures);
        for game in &failed_games {
            self.emit(ImportEvent::LookupFailed {
                platform: game.platform,
                name: game.name.clone(),
                id: game.id.clone(),
            });
        }
        let catalog = self.catalog;
        let failed = join_all(
            failed_games
                .into_iter()
                .map(|game| search_alternatives(catalog, game)),
        )
        .await;
        for lookup in &failed {
            lookup.log();
        }

        let report = ScanReport { platforms, failed };
        self.emit(ImportEvent::ScanComplete {
            games: report.game_count(),
        });
        self.set_state(RunState::AwaitingConfirmation);
        Ok(report)
    }

    async fn detect(&mut self, sources: &[Box<dyn PlatformSource>]) -> Vec<PlatformScan> {
        self.set_state(RunState::DetectingPlatforms);
        self.emit(ImportEvent::DetectingPlatforms {
            total: sources.len(),
        });

        let checks = join_all(sources.iter().map(|s| s.is_installed())).await;

        sources
            .iter()
            .zip(checks)
            .map(|(source, check)| {
                let status = match check {
                    Ok(true) => PlatformStatus::Ready,
                    Ok(false) => PlatformStatus::NotInstalled,
                    Err(e) => {
                        log::info!("Import: {} detection failed: {e}", source.name());
                        self.emit(ImportEvent::PlatformErrored {
                            platform: source.platform(),
                            reason: e.to_string(),
                        });
                        PlatformStatus::Errored(e.to_string())
                    }
                };
                if !matches!(status, PlatformStatus::Errored(_)) {
                    self.emit(ImportEvent::PlatformDetected {
                        platform: source.platform(),
                        installed: status == PlatformStatus::Ready,
                    });
                }
                PlatformScan {
                    platform: source.platform(),
                    name: source.name().to_string(),
                    status,
                    candidates: Vec::new(),
                }
            })
            .collect()
    }

    async fn list(&mut self, sources: &[Box<dyn PlatformSource>], platforms: &mut [PlatformScan]) {
        self.set_state(RunState::ListingGames);

        let installed: Vec<usize> = platforms
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_ready())
            .map(|(i, _)| i)
            .collect();

        // Each outcome is reported inside its step, before the next
        // launcher's ListingGames
        let this = &*self;
        let listings = run_sequential(
            installed.iter().copied(),
            |_, &i| {
                log::debug!("Grabbing games from {}...", sources[i].name());
                this.emit(ImportEvent::ListingGames {
                    platform: sources[i].platform(),
                });
            },
            |i| async move {
                let source = &sources[i];
                let listing = source.get_games().await;
                match &listing {
                    Ok(games) => this.emit(ImportEvent::GamesListed {
                        platform: source.platform(),
                        count: games.len(),
                    }),
                    Err(e) => {
                        log::info!("Import: {} rejected {e}", source.platform().short_name());
                        this.emit(ImportEvent::PlatformErrored {
                            platform: source.platform(),
                            reason: e.to_string(),
                        });
                    }
                }
                (i, listing)
            },
        )
        .await;

        for (i, listing) in listings {
            let platform = &mut platforms[i];
            match listing {
                Ok(games) => {
                    platform.candidates = games
                        .into_iter()
                        .map(|game| ImportCandidate { game, grid: None })
                        .collect();
                }
                Err(e) => {
                    platform.status = PlatformStatus::Errored(e.to_string());
                    platform.candidates.clear();
                }
            }
        }
    }

    /// Fill in scan grids; returns the games the catalog does not know.
    async fn resolve_grids(
        &mut self,
        platforms: &mut [PlatformScan],
    ) -> Result<Vec<ExternalGameRef>, CatalogError> {
        self.set_state(RunState::ResolvingArt);

        let targets: Vec<usize> = platforms
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_ready() && !p.candidates.is_empty())
            .map(|(i, _)| i)
            .collect();
        self.emit(ImportEvent::ResolvingArtwork {
            platforms: targets.len(),
        });

        let catalog = self.catalog;
        let lookups = join_all(targets.iter().map(|&i| {
            let platform = &platforms[i];
            let ids = source_ids(&platform.candidates);
            async move {
                catalog
                    .get_grids(platform.platform.short_name(), &ids, &[])
                    .await
            }
        }))
        .await;

        let mut failed = Vec::new();
        for (&i, lookup) in targets.iter().zip(lookups) {
            let platform = &mut platforms[i];
            match lookup {
                Ok(response) => {
                    for (candidate, grid) in
                        platform.candidates.iter_mut().zip(response.first_per_id())
                    {
                        candidate.grid = grid;
                    }
                    for pos in response.not_found_positions() {
                        if let Some(candidate) = platform.candidates.get(pos) {
                            failed.push(candidate.game.clone());
                        }
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) if e.is_not_found() => {
                    failed.extend(platform.candidates.iter().map(|c| c.game.clone()));
                }
                Err(e) => log::info!("getGrids ({}): {e}", platform.name),
            }
        }
        Ok(failed)
    }

    /// Import every candidate of every ready launcher in `scan`.
    pub async fn import_all(&mut self, scan: &ScanReport) -> Result<Vec<ImportReport>, ImportError> {
        let mut reports = Vec::new();
        for platform in scan.ready().filter(|p| !p.candidates.is_empty()) {
            reports.push(
                self.import_platform(platform.platform, &platform.candidates)
                    .await?,
            );
        }
        Ok(reports)
    }

    /// Save `candidates`, register them with Steam, and download artwork.
    ///
    /// Steam running blocks this batch and is reported in the result.
    /// Failing to save the games aborts.
    pub async fn import_platform(
        &mut self,
        platform: Platform,
        candidates: &[ImportCandidate],
    ) -> Result<ImportReport, ImportError> {
        let name = platform.display_name();
        let mut report = ImportReport {
            platform,
            imported: 0,
            blocked: false,
            downloaded: 0,
            failed_downloads: 0,
        };
        if candidates.is_empty() {
            return Ok(report);
        }

        self.set_state(RunState::Persisting);
        let games: Vec<ImportedGame> = candidates
            .iter()
            .map(|c| ImportedGame::from_ref(&c.game))
            .collect();
        if let Err(e) = self.store.upsert(&games) {
            return Err(self.fail(ImportError::Persistence(e)));
        }

        log::info!("Trying to import {} games from {name}", games.len());
        match self.register(&games, name) {
            Ok(()) => {}
            Err(e) if e.is_steam_running() => {
                log::warn!("{e}");
                self.emit(ImportEvent::ImportBlocked { platform });
                report.blocked = true;
                self.set_state(RunState::Done);
                return Ok(report);
            }
            Err(e) => return Err(self.fail(e.into())),
        }
        report.imported = games.len();
        self.emit(ImportEvent::GamesImported {
            platform,
            count: games.len(),
        });

        self.set_state(RunState::DownloadingAssets);
        self.emit(ImportEvent::DownloadsStarted {
            platform,
            count: games.len(),
        });
        let jobs = self.plan_downloads(platform, candidates, &games).await;
        let results = join_all(jobs.iter().map(|job| self.download(job))).await;
        for (job, result) in jobs.iter().zip(results) {
            match result {
                Ok(()) => report.downloaded += 1,
                Err(e) => {
                    log::warn!("Failed to download {} for {}: {e}", job.kind, job.game);
                    report.failed_downloads += 1;
                }
            }
        }
        self.emit(ImportEvent::DownloadsComplete {
            platform,
            downloaded: report.downloaded,
            failed: report.failed_downloads,
        });

        self.set_state(RunState::Done);
        Ok(report)
    }

    fn register(&self, games: &[ImportedGame], category: &str) -> Result<(), SteamError> {
        let shortcuts: Vec<Shortcut> = games.iter().map(Shortcut::from_game).collect();
        self.shortcuts.add_shortcuts(&shortcuts)?;
        let app_ids: Vec<u32> = shortcuts.iter().map(|s| s.app_id).collect();
        self.shortcuts.add_category(&app_ids, category)
    }

    /// Work out every image to fetch. Posters and heroes are looked up now;
    /// horizontal grids come from the scan.
    async fn plan_downloads(
        &self,
        platform: Platform,
        candidates: &[ImportCandidate],
        games: &[ImportedGame],
    ) -> Vec<AssetJob> {
        let id_type = platform.short_name();
        let ids = source_ids(candidates);
        let poster_dims = [POSTER_DIMENSIONS.to_string()];

        let (posters, heroes) = futures::join!(
            self.catalog.get_grids(id_type, &ids, &poster_dims),
            self.catalog.get_heroes(id_type, &ids, &[]),
        );
        let posters = firsts_or_log(posters, "getGrids", ids.len());
        let heroes = firsts_or_log(heroes, "getHeroes", ids.len());

        let mut jobs = Vec::new();
        for (i, (candidate, game)) in candidates.iter().zip(games).enumerate() {
            let app_ids = game.app_ids();
            let mut push = |kind, art: Option<&Artwork>, legacy| {
                if let Some(art) = art {
                    jobs.push(AssetJob {
                        game: game.name.clone(),
                        kind,
                        app_id: app_ids.new,
                        url: art.url.clone(),
                        legacy,
                    });
                }
            };
            push(
                AssetKind::HorizontalGrid,
                candidate.grid.as_ref(),
                Some(app_ids.legacy),
            );
            push(AssetKind::VerticalGrid, posters[i].as_ref(), None);
            push(AssetKind::Hero, heroes[i].as_ref(), None);
        }
        jobs
    }

    async fn download(&self, job: &AssetJob) -> Result<(), SteamError> {
        let source = AssetSource::Url(job.url.clone());
        let dest = self.assets.write_asset(job.kind, job.app_id, &source).await?;
        if let Some(legacy) = job.legacy {
            self.assets.link_legacy(&dest, legacy)?;
        }
        Ok(())
    }
}

fn source_ids(candidates: &[ImportCandidate]) -> Vec<String> {
    candidates.iter().map(|c| c.game.id.clone()).collect()
}

/// First image per id, or nothing for every id when the lookup failed.
fn firsts_or_log(
    result: Result<ArtworkResponse, CatalogError>,
    what: &str,
    len: usize,
) -> Vec<Option<Artwork>> {
    match result {
        Ok(response) if response.len() == len => response.first_per_id(),
        Ok(response) => {
            log::info!("{what}: expected {len} results, got {}", response.len());
            vec![None; len]
        }
        Err(e) => {
            log::info!("{what}: {e}");
            vec![None; len]
        }
    }
}
