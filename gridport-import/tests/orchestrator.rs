use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use futures::future::BoxFuture;
use gridport_catalog::{
    Artwork, ArtworkFetch, ArtworkKind, ArtworkQuery, ArtworkResponse, BatchEntry, CatalogClient,
    CatalogError, GameInfo, LocalOverrideTable,
};
use gridport_core::{ExternalGameRef, Platform};
use gridport_import::*;
use gridport_steam::{
    AssetKind, AssetSource, AssetStore, GameLibrary, GameStore, LIBRARY_FILE, Shortcut,
    ShortcutRegistry, SteamError,
};
use tokio::sync::mpsc;

// -- fakes --

struct FakeSource {
    platform: Platform,
    installed: Result<bool, String>,
    games: Result<Vec<ExternalGameRef>, String>,
}

impl FakeSource {
    fn with_games(platform: Platform, games: Vec<ExternalGameRef>) -> Box<dyn PlatformSource> {
        Box::new(Self {
            platform,
            installed: Ok(true),
            games: Ok(games),
        })
    }

    fn failing_listing(platform: Platform) -> Box<dyn PlatformSource> {
        Box::new(Self {
            platform,
            installed: Ok(true),
            games: Err("library unreadable".to_string()),
        })
    }

    fn failing_detection(platform: Platform) -> Box<dyn PlatformSource> {
        Box::new(Self {
            platform,
            installed: Err("registry unavailable".to_string()),
            games: Ok(Vec::new()),
        })
    }
}

impl PlatformSource for FakeSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn is_installed(&self) -> BoxFuture<'_, Result<bool, ImportError>> {
        Box::pin(async move {
            self.installed
                .clone()
                .map_err(|e| ImportError::source_failed(self.name(), e))
        })
    }

    fn get_games(&self) -> BoxFuture<'_, Result<Vec<ExternalGameRef>, ImportError>> {
        Box::pin(async move {
            self.games
                .clone()
                .map_err(|e| ImportError::source_failed(self.name(), e))
        })
    }
}

#[derive(Default)]
struct FakeCatalog {
    /// `(kind, type, id, dimensions)` -> image urls
    known: HashMap<(ArtworkKind, String, String, String), Vec<String>>,
    fail_with_credentials: bool,
    queries: Mutex<Vec<(ArtworkKind, String, Vec<String>, Vec<String>)>>,
    searches: Mutex<Vec<String>>,
}

impl FakeCatalog {
    fn with(self, kind: ArtworkKind, id_type: &str, id: &str) -> Self {
        self.with_dimensions(kind, id_type, id, "")
    }

    fn with_dimensions(mut self, kind: ArtworkKind, id_type: &str, id: &str, dims: &str) -> Self {
        self.known.insert(
            (kind, id_type.to_string(), id.to_string(), dims.to_string()),
            vec![format!("https://cdn.example/{kind}/{id}.png")],
        );
        self
    }

    fn entry(&self, kind: ArtworkKind, query: &ArtworkQuery, id: &str) -> BatchEntry {
        let key = (
            kind,
            query.id_type.clone(),
            id.to_string(),
            query.dimensions.join(","),
        );
        match self.known.get(&key) {
            Some(urls) => BatchEntry::found(urls.iter().map(|u| art(u)).collect()),
            None => BatchEntry::not_found(Vec::new()),
        }
    }

    fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    fn queries(&self) -> Vec<(ArtworkKind, String, Vec<String>, Vec<String>)> {
        self.queries.lock().unwrap().clone()
    }
}

impl ArtworkFetch for FakeCatalog {
    async fn fetch_artwork(
        &self,
        kind: ArtworkKind,
        query: &ArtworkQuery,
    ) -> Result<ArtworkResponse, CatalogError> {
        self.queries.lock().unwrap().push((
            kind,
            query.id_type.clone(),
            query.ids.clone(),
            query.dimensions.clone(),
        ));
        if self.fail_with_credentials {
            return Err(CatalogError::InvalidCredentials("API key rejected".into()));
        }
        if query.ids.len() == 1 {
            let entry = self.entry(kind, query, &query.ids[0]);
            if entry.success {
                Ok(ArtworkResponse::Flat(entry.data))
            } else {
                Err(CatalogError::NotFound {
                    errors: entry.errors,
                })
            }
        } else {
            Ok(ArtworkResponse::Nested(
                query
                    .ids
                    .iter()
                    .map(|id| self.entry(kind, query, id))
                    .collect(),
            ))
        }
    }

    async fn fetch_game(&self, _id_type: &str, _id: &str) -> Result<GameInfo, CatalogError> {
        Err(CatalogError::NotFound { errors: Vec::new() })
    }

    async fn search_game(&self, term: &str) -> Result<Vec<GameInfo>, CatalogError> {
        self.searches.lock().unwrap().push(term.to_string());
        Ok(vec![GameInfo {
            id: 77,
            name: format!("{term} (Remastered)"),
            types: vec!["steam".to_string()],
            verified: true,
            release_date: None,
        }])
    }
}

#[derive(Default)]
struct FakeAssets {
    writes: Mutex<Vec<(AssetKind, u32, String)>>,
    links: Mutex<Vec<(PathBuf, u64)>>,
}

impl AssetStore for FakeAssets {
    async fn write_asset(
        &self,
        kind: AssetKind,
        app_id: u32,
        source: &AssetSource,
    ) -> Result<PathBuf, SteamError> {
        if source.to_string().contains("broken") {
            return Err(SteamError::Download {
                url: source.to_string(),
                status: 404,
            });
        }
        self.writes
            .lock()
            .unwrap()
            .push((kind, app_id, source.to_string()));
        Ok(PathBuf::from("/grid").join(kind.file_name(app_id, "png")))
    }

    fn link_legacy(&self, destination: &Path, legacy_app_id: u64) -> Result<PathBuf, SteamError> {
        self.links
            .lock()
            .unwrap()
            .push((destination.to_path_buf(), legacy_app_id));
        Ok(PathBuf::from(format!("/grid/{legacy_app_id}.png")))
    }

    fn remove_asset(&self, _kind: AssetKind, _app_id: u32) -> Result<usize, SteamError> {
        Ok(0)
    }
}

#[derive(Default)]
struct FakeRegistry {
    steam_running: bool,
    shortcuts: Mutex<Vec<Shortcut>>,
    categories: Mutex<Vec<(Vec<u32>, String)>>,
}

impl ShortcutRegistry for FakeRegistry {
    fn add_shortcuts(&self, shortcuts: &[Shortcut]) -> Result<(), SteamError> {
        if self.steam_running {
            return Err(SteamError::SteamRunning {
                path: "shortcuts.vdf".to_string(),
            });
        }
        let mut stored = self.shortcuts.lock().unwrap();
        for s in shortcuts {
            stored.retain(|existing| existing.app_id != s.app_id);
            stored.push(s.clone());
        }
        Ok(())
    }

    fn add_category(&self, app_ids: &[u32], category: &str) -> Result<(), SteamError> {
        self.categories
            .lock()
            .unwrap()
            .push((app_ids.to_vec(), category.to_string()));
        Ok(())
    }
}

struct BrokenStore;

impl GameStore for BrokenStore {
    fn upsert(&self, _games: &[gridport_core::ImportedGame]) -> Result<usize, SteamError> {
        Err(SteamError::Library {
            path: "games.json".to_string(),
            message: "disk full".to_string(),
        })
    }

    fn load(
        &self,
    ) -> Result<std::collections::BTreeMap<String, gridport_core::ImportedGame>, SteamError> {
        Ok(Default::default())
    }
}

// -- helpers --

fn art(url: &str) -> Artwork {
    Artwork {
        id: 1,
        url: url.to_string(),
        thumb: String::new(),
        width: 920,
        height: 430,
        style: None,
        mime: None,
        score: 0,
    }
}

fn game(platform: Platform, id: &str, name: &str) -> ExternalGameRef {
    ExternalGameRef {
        platform,
        id: id.to_string(),
        name: name.to_string(),
        exe: format!("C:\\Games\\{name}\\{name}.exe"),
        start_in: format!("C:\\Games\\{name}"),
        params: String::new(),
        icon: String::new(),
    }
}

fn gog_games(n: usize) -> Vec<ExternalGameRef> {
    (1..=n)
        .map(|i| game(Platform::Gog, &i.to_string(), &format!("Game {i}")))
        .collect()
}

struct Harness {
    catalog: CatalogClient<FakeCatalog>,
    assets: FakeAssets,
    registry: FakeRegistry,
    library: GameLibrary,
    _dir: tempfile::TempDir,
}

impl Harness {
    fn new(catalog: FakeCatalog) -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self {
            catalog: CatalogClient::new(catalog, LocalOverrideTable::empty()),
            assets: FakeAssets::default(),
            registry: FakeRegistry::default(),
            library: GameLibrary::new(dir.path().join(LIBRARY_FILE)),
            _dir: dir,
        }
    }

    fn orchestrator(&self) -> Orchestrator<'_, FakeCatalog, FakeAssets, FakeRegistry, GameLibrary> {
        Orchestrator::new(&self.catalog, &self.assets, &self.registry, &self.library)
    }
}

// -- scan --

#[tokio::test]
async fn failing_platform_is_excluded_and_the_rest_continue() {
    let fake = FakeCatalog::default()
        .with(ArtworkKind::Grids, "gog", "1")
        .with(ArtworkKind::Grids, "gog", "2")
        .with(ArtworkKind::Grids, "gog", "3");
    let h = Harness::new(fake);
    let sources = vec![
        FakeSource::failing_listing(Platform::Epic),
        FakeSource::with_games(Platform::Gog, gog_games(3)),
    ];

    let mut orchestrator = h.orchestrator();
    let report = orchestrator.scan(&sources).await.unwrap();

    assert_eq!(orchestrator.state(), RunState::AwaitingConfirmation);
    assert!(matches!(
        report.platforms[0].status,
        PlatformStatus::Errored(_)
    ));
    assert!(report.platforms[0].candidates.is_empty());
    assert_eq!(report.platforms[1].candidates.len(), 3);
    assert!(report.platforms[1].candidates.iter().all(|c| c.grid.is_some()));
    assert_eq!(report.game_count(), 3);

    let queries = h.catalog.fetch().queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].1, "gog");
    assert_eq!(queries[0].2, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn one_unknown_id_in_a_batch_triggers_one_search() {
    let mut fake = FakeCatalog::default();
    for id in ["1", "2", "4", "5"] {
        fake = fake.with(ArtworkKind::Grids, "gog", id);
    }
    let h = Harness::new(fake);
    let sources = vec![FakeSource::with_games(Platform::Gog, gog_games(5))];

    let report = h.orchestrator().scan(&sources).await.unwrap();

    assert_eq!(h.catalog.fetch().searches(), vec!["Game 3"]);
    assert_eq!(report.failed.len(), 1);
    let failed = &report.failed[0];
    assert_eq!(failed.game.id, "3");
    assert_eq!(
        failed.summary(),
        "Game 'Game 3', id '3' not found, looking for alternatives..."
    );
    assert_eq!(failed.alternatives[0].id, 77);
    // Suggestions are never applied
    let candidates = &report.platforms[0].candidates;
    assert!(candidates[2].grid.is_none());
    for i in [0, 1, 3, 4] {
        assert!(candidates[i].grid.is_some(), "{} has no grid", candidates[i].game.name);
    }
}

#[tokio::test]
async fn failed_detection_is_isolated_to_its_platform() {
    let fake = FakeCatalog::default().with(ArtworkKind::Grids, "gog", "1");
    let h = Harness::new(fake);
    let sources = vec![
        FakeSource::failing_detection(Platform::Epic),
        FakeSource::with_games(Platform::Gog, gog_games(1)),
    ];

    let mut orchestrator = h.orchestrator();
    let report = orchestrator.scan(&sources).await.unwrap();

    assert_eq!(orchestrator.state(), RunState::AwaitingConfirmation);
    match &report.platforms[0].status {
        PlatformStatus::Errored(reason) => assert!(reason.contains("registry unavailable")),
        other => panic!("expected Errored, got {other:?}"),
    }
    assert!(report.platforms[0].candidates.is_empty());
    assert_eq!(report.platforms[1].status, PlatformStatus::Ready);
    assert_eq!(report.game_count(), 1);
    assert!(report.platforms[1].candidates[0].grid.is_some());
}

#[tokio::test]
async fn single_game_not_found_falls_back_to_search() {
    let h = Harness::new(FakeCatalog::default());
    let sources = vec![FakeSource::with_games(
        Platform::Oculus,
        vec![game(Platform::Oculus, "42", "Lonely Game")],
    )];

    let report = h.orchestrator().scan(&sources).await.unwrap();

    assert_eq!(h.catalog.fetch().searches(), vec!["Lonely Game"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.platforms[0].candidates.len(), 1);
}

#[tokio::test]
async fn rejected_api_key_aborts_the_scan() {
    let fake = FakeCatalog {
        fail_with_credentials: true,
        ..Default::default()
    };
    let h = Harness::new(fake);
    let sources = vec![FakeSource::with_games(Platform::Gog, gog_games(2))];

    let mut orchestrator = h.orchestrator();
    let err = orchestrator.scan(&sources).await.unwrap_err();

    assert!(matches!(
        err,
        ImportError::Catalog(CatalogError::InvalidCredentials(_))
    ));
    assert_eq!(orchestrator.state(), RunState::Failed);
}

#[tokio::test]
async fn listing_progress_is_reported_before_each_platform() {
    let h = Harness::new(FakeCatalog::default());
    let sources = vec![
        FakeSource::with_games(Platform::Epic, Vec::new()),
        FakeSource::with_games(Platform::Gog, Vec::new()),
    ];
    let (tx, rx) = mpsc::unbounded_channel();

    let orchestrator = h.orchestrator().with_events(tx);
    // The sender goes away with the orchestrator when the task ends
    let task = async move {
        let mut orchestrator = orchestrator;
        orchestrator.scan(&sources).await
    };
    let mut events = Vec::new();
    run_with_events(task, rx, |e| events.push(e)).await.unwrap();

    let listing: Vec<&ImportEvent> = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                ImportEvent::ListingGames { .. } | ImportEvent::GamesListed { .. }
            )
        })
        .collect();
    assert_eq!(
        listing,
        vec![
            &ImportEvent::ListingGames {
                platform: Platform::Epic
            },
            &ImportEvent::GamesListed {
                platform: Platform::Epic,
                count: 0
            },
            &ImportEvent::ListingGames {
                platform: Platform::Gog
            },
            &ImportEvent::GamesListed {
                platform: Platform::Gog,
                count: 0
            },
        ]
    );
    assert_eq!(events.last(), Some(&ImportEvent::ScanComplete { games: 0 }));
}

#[tokio::test]
async fn listing_failure_is_reported_before_the_next_platform() {
    let h = Harness::new(FakeCatalog::default());
    let sources = vec![
        FakeSource::failing_listing(Platform::Epic),
        FakeSource::with_games(Platform::Gog, Vec::new()),
    ];
    let (tx, rx) = mpsc::unbounded_channel();

    let orchestrator = h.orchestrator().with_events(tx);
    let task = async move {
        let mut orchestrator = orchestrator;
        orchestrator.scan(&sources).await
    };
    let mut events = Vec::new();
    run_with_events(task, rx, |e| events.push(e)).await.unwrap();

    let position = |wanted: fn(&ImportEvent) -> bool| events.iter().position(wanted);
    let errored = position(|e| {
        matches!(
            e,
            ImportEvent::PlatformErrored {
                platform: Platform::Epic,
                ..
            }
        )
    })
    .unwrap();
    let next = position(|e| {
        matches!(
            e,
            ImportEvent::ListingGames {
                platform: Platform::Gog
            }
        )
    })
    .unwrap();
    assert!(errored < next);
}

// -- import --

#[tokio::test]
async fn import_writes_all_assets_and_links_legacy_ids() {
    let fake = FakeCatalog::default()
        .with(ArtworkKind::Grids, "gog", "1")
        .with(ArtworkKind::Grids, "gog", "2")
        .with(ArtworkKind::Heroes, "gog", "1")
        .with_dimensions(ArtworkKind::Grids, "gog", "2", POSTER_DIMENSIONS);
    let h = Harness::new(fake);
    let sources = vec![FakeSource::with_games(Platform::Gog, gog_games(2))];

    let mut orchestrator = h.orchestrator();
    let scan = orchestrator.scan(&sources).await.unwrap();
    let reports = orchestrator.import_all(&scan).await.unwrap();

    assert_eq!(orchestrator.state(), RunState::Done);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].imported, 2);
    assert!(!reports[0].blocked);

    let writes = h.assets.writes.lock().unwrap().clone();
    let grids: Vec<_> = writes
        .iter()
        .filter(|w| w.0 == AssetKind::HorizontalGrid)
        .collect();
    assert_eq!(grids.len(), 2);
    let links = h.assets.links.lock().unwrap().clone();
    assert_eq!(links.len(), grids.len());

    // Both id schemes for every game
    for g in gog_games(2) {
        let ids = g.app_ids();
        assert!(grids.iter().any(|w| w.1 == ids.new));
        assert!(links.iter().any(|l| l.1 == ids.legacy));
    }

    // Posters come from a sized lookup; only game 2 has one
    let queries = h.catalog.fetch().queries();
    assert!(queries.iter().any(|q| q.0 == ArtworkKind::Grids
        && q.3 == vec![POSTER_DIMENSIONS.to_string()]));
    let posters: Vec<_> = writes
        .iter()
        .filter(|w| w.0 == AssetKind::VerticalGrid)
        .collect();
    assert_eq!(posters.len(), 1);
    assert_eq!(posters[0].1, gog_games(2)[1].app_ids().new);
    assert_eq!(
        writes.iter().filter(|w| w.0 == AssetKind::Hero).count(),
        1
    );

    let categories = h.registry.categories.lock().unwrap().clone();
    assert_eq!(categories[0].1, "GOG.com");
}

#[tokio::test]
async fn reimport_is_idempotent() {
    let h = Harness::new(FakeCatalog::default().with(ArtworkKind::Grids, "gog", "1"));
    let candidates = vec![ImportCandidate {
        game: game(Platform::Gog, "1", "Game 1"),
        grid: None,
    }];

    let mut orchestrator = h.orchestrator();
    orchestrator
        .import_platform(Platform::Gog, &candidates)
        .await
        .unwrap();
    orchestrator
        .import_platform(Platform::Gog, &candidates)
        .await
        .unwrap();

    assert_eq!(h.library.load().unwrap().len(), 1);
    assert_eq!(h.registry.shortcuts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn steam_running_blocks_the_batch() {
    let mut h = Harness::new(FakeCatalog::default().with(ArtworkKind::Grids, "gog", "1"));
    h.registry.steam_running = true;
    let candidates = vec![ImportCandidate {
        game: game(Platform::Gog, "1", "Game 1"),
        grid: Some(art("https://cdn.example/grid.png")),
    }];
    let (tx, mut rx) = mpsc::unbounded_channel();

    let report = h
        .orchestrator()
        .with_events(tx)
        .import_platform(Platform::Gog, &candidates)
        .await
        .unwrap();

    assert!(report.blocked);
    assert_eq!(report.imported, 0);
    assert!(h.assets.writes.lock().unwrap().is_empty());

    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    assert!(events.contains(&ImportEvent::ImportBlocked {
        platform: Platform::Gog
    }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, ImportEvent::DownloadsStarted { .. })));
}

#[tokio::test]
async fn failed_downloads_are_counted_not_fatal() {
    let h = Harness::new(FakeCatalog::default());
    let candidates = vec![
        ImportCandidate {
            game: game(Platform::Gog, "1", "Game 1"),
            grid: Some(art("https://cdn.example/broken.png")),
        },
        ImportCandidate {
            game: game(Platform::Gog, "2", "Game 2"),
            grid: Some(art("https://cdn.example/fine.png")),
        },
    ];

    let report = h
        .orchestrator()
        .import_platform(Platform::Gog, &candidates)
        .await
        .unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.failed_downloads, 1);
    assert_eq!(h.assets.links.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn persistence_failure_is_fatal() {
    let catalog = CatalogClient::new(FakeCatalog::default(), LocalOverrideTable::empty());
    let assets = FakeAssets::default();
    let registry = FakeRegistry::default();
    let store = BrokenStore;
    let candidates = vec![ImportCandidate {
        game: game(Platform::Gog, "1", "Game 1"),
        grid: None,
    }];

    let mut orchestrator = Orchestrator::new(&catalog, &assets, &registry, &store);
    let err = orchestrator
        .import_platform(Platform::Gog, &candidates)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Persistence(_)));
    assert_eq!(orchestrator.state(), RunState::Failed);
    assert!(registry.shortcuts.lock().unwrap().is_empty());
}
