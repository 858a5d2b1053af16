use serde::{Deserialize, Serialize};

/// Game platforms (storefronts and launchers) that inventories can be imported from.
///
/// The short name doubles as the id type the artwork catalog understands,
/// and as the top-level key in the local override file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "steam")]
    Steam,
    #[serde(rename = "origin")]
    Origin,
    #[serde(rename = "egs")]
    Epic,
    #[serde(rename = "uplay")]
    Uplay,
    #[serde(rename = "bnet")]
    BattleNet,
    #[serde(rename = "gog")]
    Gog,
    #[serde(rename = "oculus")]
    Oculus,
}

/// All platform variants in registration order.
const ALL_PLATFORMS: &[Platform] = &[
    Platform::Steam,
    Platform::Origin,
    Platform::Epic,
    Platform::Uplay,
    Platform::BattleNet,
    Platform::Gog,
    Platform::Oculus,
];

impl Platform {
    /// Canonical short name, used as the catalog id type.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Steam => "steam",
            Self::Origin => "origin",
            Self::Epic => "egs",
            Self::Uplay => "uplay",
            Self::BattleNet => "bnet",
            Self::Gog => "gog",
            Self::Oculus => "oculus",
        }
    }

    /// Display name, also used as the Steam category for imported shortcuts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Steam => "Steam",
            Self::Origin => "Origin",
            Self::Epic => "Epic Games Launcher",
            Self::Uplay => "Uplay",
            Self::BattleNet => "Blizzard Battle.net",
            Self::Gog => "GOG.com",
            Self::Oculus => "Oculus",
        }
    }

    /// All accepted names for this platform (case-insensitive matching).
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Steam => &["steam"],
            Self::Origin => &["origin", "ea"],
            Self::Epic => &["egs", "epic", "epic games"],
            Self::Uplay => &["uplay", "ubisoft", "ubisoft connect"],
            Self::BattleNet => &["bnet", "battlenet", "battle.net", "blizzard"],
            Self::Gog => &["gog", "gog.com", "galaxy"],
            Self::Oculus => &["oculus", "rift"],
        }
    }

    pub fn all() -> &'static [Platform] {
        ALL_PLATFORMS
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string cannot be parsed into a `Platform`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown platform: '{0}'")]
pub struct PlatformParseError(pub String);

impl std::str::FromStr for Platform {
    type Err = PlatformParseError;

    /// Parse a platform from its short name or any alias (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ALL_PLATFORMS
            .iter()
            .copied()
            .find(|p| p.aliases().contains(&lower.as_str()))
            .ok_or_else(|| PlatformParseError(s.to_string()))
    }
}
