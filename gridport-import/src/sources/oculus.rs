//! Oculus (Meta Quest Link) libraries.
//!
//! Each library folder holds a `Manifests` directory with one
//! `<canonical name>.json.mini` per installed app, and the app itself under
//! `Software/<canonical name>`.

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use gridport_core::{ExternalGameRef, Platform};
use serde::Deserialize;

use crate::error::ImportError;
use crate::platform::PlatformSource;

const MANIFEST_SUFFIX: &str = ".json.mini";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    #[serde(deserialize_with = "string_or_number")]
    app_id: String,
    canonical_name: String,
    launch_file: String,
    #[serde(default)]
    display_name: Option<String>,
}

fn string_or_number<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    })
}

pub struct OculusSource {
    library_paths: Vec<PathBuf>,
}

impl OculusSource {
    pub fn new(library_paths: Vec<PathBuf>) -> Self {
        Self { library_paths }
    }

    fn list(&self) -> Result<Vec<ExternalGameRef>, ImportError> {
        let mut games = Vec::new();
        for library in self.library_paths.iter().filter(|p| p.is_dir()) {
            let manifests = library.join("Manifests");
            if !manifests.is_dir() {
                log::warn!("Oculus library {} has no Manifests folder", library.display());
                continue;
            }
            log::debug!("Reading Oculus manifests in {}", manifests.display());
            games.extend(read_library(library, &manifests)?);
        }
        Ok(games)
    }
}

fn read_library(library: &Path, manifests: &Path) -> Result<Vec<ExternalGameRef>, ImportError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(manifests)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.to_lowercase().ends_with(MANIFEST_SUFFIX))
        })
        .collect();
    files.sort();

    let mut games = Vec::with_capacity(files.len());
    for file in files {
        let manifest: Manifest = match std::fs::read_to_string(&file)
            .map_err(ImportError::from)
            .and_then(|text| serde_json::from_str(&text).map_err(ImportError::from))
        {
            Ok(manifest) => manifest,
            Err(e) => {
                log::warn!("Skipping Oculus manifest {}: {e}", file.display());
                continue;
            }
        };
        games.push(game_from_manifest(library, manifest));
    }
    Ok(games)
}

fn game_from_manifest(library: &Path, manifest: Manifest) -> ExternalGameRef {
    let install_dir = library.join("Software").join(&manifest.canonical_name);
    let exe = install_dir.join(&manifest.launch_file).display().to_string();
    let name = manifest
        .display_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(manifest.canonical_name);
    ExternalGameRef {
        platform: Platform::Oculus,
        id: manifest.app_id,
        name,
        icon: exe.clone(),
        exe,
        start_in: install_dir.display().to_string(),
        params: String::new(),
    }
}

impl PlatformSource for OculusSource {
    fn platform(&self) -> Platform {
        Platform::Oculus
    }

    fn is_installed(&self) -> BoxFuture<'_, Result<bool, ImportError>> {
        Box::pin(async move { Ok(self.library_paths.iter().any(|p| p.is_dir())) })
    }

    fn get_games(&self) -> BoxFuture<'_, Result<Vec<ExternalGameRef>, ImportError>> {
        Box::pin(async move {
            log::info!("Import: started {}", self.name());
            let games = self.list()?;
            log::info!("Import: {} game(s) found in {}", games.len(), self.name());
            Ok(games)
        })
    }
}
