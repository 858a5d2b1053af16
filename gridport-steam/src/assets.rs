//! Custom artwork in Steam's grid directory.
//!
//! File names are `<app id><suffix>.<ext>`:
//!
//! | kind | suffix |
//! |------|--------|
//! | horizontal grid | (none) |
//! | vertical grid (poster) | `p` |
//! | hero | `_hero` |
//! | logo | `_logo` |

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::SteamError;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "ico", "gif"];
const DEFAULT_EXTENSION: &str = "png";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    HorizontalGrid,
    VerticalGrid,
    Hero,
    Logo,
}

impl AssetKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::HorizontalGrid => "",
            Self::VerticalGrid => "p",
            Self::Hero => "_hero",
            Self::Logo => "_logo",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::HorizontalGrid => "horizontal-grid",
            Self::VerticalGrid => "vertical-grid",
            Self::Hero => "hero",
            Self::Logo => "logo",
        }
    }

    pub fn all() -> &'static [AssetKind] {
        &[
            Self::HorizontalGrid,
            Self::VerticalGrid,
            Self::Hero,
            Self::Logo,
        ]
    }

    /// `<app id><suffix>.<ext>`
    pub fn file_name(&self, app_id: u32, ext: &str) -> String {
        format!("{app_id}{}.{ext}", self.suffix())
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AssetKind {
    type Err = SteamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "horizontal-grid" | "horizontal" | "grid" => Ok(Self::HorizontalGrid),
            "vertical-grid" | "vertical" | "poster" => Ok(Self::VerticalGrid),
            "hero" => Ok(Self::Hero),
            "logo" => Ok(Self::Logo),
            _ => Err(SteamError::UnknownAssetKind(s.to_string())),
        }
    }
}

/// Where an image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Url(String),
    Path(PathBuf),
}

impl AssetSource {
    /// `http(s)://` is a URL, anything else a local path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Self::Url(s.to_string())
        } else {
            Self::Path(PathBuf::from(s))
        }
    }

    /// Image extension, lowercased, defaulting to png.
    fn extension(&self) -> String {
        let ext = match self {
            Self::Url(url) => {
                let path = url.split(['?', '#']).next().unwrap_or_default();
                Path::new(path)
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase)
            }
            Self::Path(path) => path
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_lowercase),
        };
        match ext {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => ext,
            _ => DEFAULT_EXTENSION.to_string(),
        }
    }
}

impl std::fmt::Display for AssetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Writes artwork where Steam looks for it.
#[allow(async_fn_in_trait)]
pub trait AssetStore {
    /// Store `source` as the `kind` artwork of `app_id`, replacing any
    /// previous image of that kind. Returns the written file.
    async fn write_asset(
        &self,
        kind: AssetKind,
        app_id: u32,
        source: &AssetSource,
    ) -> Result<PathBuf, SteamError>;

    /// Make `destination` visible under the legacy 64-bit id as well.
    fn link_legacy(&self, destination: &Path, legacy_app_id: u64) -> Result<PathBuf, SteamError>;

    /// Delete the `kind` artwork of `app_id`. Returns how many files went.
    fn remove_asset(&self, kind: AssetKind, app_id: u32) -> Result<usize, SteamError>;
}

/// `userdata/<user>/config/grid`.
pub struct GridDirectory {
    dir: PathBuf,
    http: reqwest::Client,
}

impl GridDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SteamError> {
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(concat!("gridport/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            dir: dir.into(),
            http,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, SteamError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SteamError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

impl AssetStore for GridDirectory {
    async fn write_asset(
        &self,
        kind: AssetKind,
        app_id: u32,
        source: &AssetSource,
    ) -> Result<PathBuf, SteamError> {
        let dest = self.dir.join(kind.file_name(app_id, &source.extension()));
        let bytes = match source {
            AssetSource::Url(url) => self.download(url).await?,
            AssetSource::Path(path) => std::fs::read(path)?,
        };

        std::fs::create_dir_all(&self.dir)?;
        self.remove_asset(kind, app_id)?;
        std::fs::write(&dest, &bytes)?;
        log::debug!("Wrote {kind} for {app_id} to {}", dest.display());
        Ok(dest)
    }

    fn link_legacy(&self, destination: &Path, legacy_app_id: u64) -> Result<PathBuf, SteamError> {
        let ext = destination
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(DEFAULT_EXTENSION);
        let dir = destination.parent().unwrap_or(&self.dir);

        // A previous link may carry another extension
        for old_ext in IMAGE_EXTENSIONS {
            let old = dir.join(format!("{legacy_app_id}.{old_ext}"));
            if old.symlink_metadata().is_ok() {
                std::fs::remove_file(&old)?;
            }
        }
        let link = dir.join(format!("{legacy_app_id}.{ext}"));
        make_link(destination, &link)?;
        Ok(link)
    }

    fn remove_asset(&self, kind: AssetKind, app_id: u32) -> Result<usize, SteamError> {
        let mut removed = Vec::new();
        for ext in IMAGE_EXTENSIONS {
            let name = kind.file_name(app_id, ext);
            let path = self.dir.join(&name);
            if path.symlink_metadata().is_ok() {
                std::fs::remove_file(&path)?;
                removed.push(name);
            }
        }
        if !removed.is_empty() {
            self.remove_links_to(&removed)?;
        }
        Ok(removed.len())
    }
}

impl GridDirectory {
    /// Delete symlinks in the grid directory that point at one of `names`.
    fn remove_links_to(&self, names: &[String]) -> Result<(), SteamError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let path = entry?.path();
            let Ok(target) = std::fs::read_link(&path) else {
                continue;
            };
            let in_grid = target
                .parent()
                .is_none_or(|p| p.as_os_str().is_empty() || p == self.dir);
            let dangling = target
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| names.iter().any(|r| r == n));
            if in_grid && dangling {
                std::fs::remove_file(&path)?;
                log::debug!("Removed link {}", path.display());
            }
        }
        Ok(())
    }
}

#[cfg(unix)]
fn make_link(target: &Path, link: &Path) -> std::io::Result<()> {
    // Both live in the grid directory
    let target = target.file_name().map(Path::new).unwrap_or(target);
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_link(target: &Path, link: &Path) -> std::io::Result<()> {
    // Symlinks need developer mode or elevation on Windows
    std::os::windows::fs::symlink_file(target, link).or_else(|_| std::fs::hard_link(target, link))
}

#[cfg(not(any(unix, windows)))]
fn make_link(target: &Path, link: &Path) -> std::io::Result<()> {
    std::fs::hard_link(target, link)
}
