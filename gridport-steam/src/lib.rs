//! The local Steam side of an import: where Steam lives, its shortcut list,
//! its grid artwork directory, and gridport's own record of imported games.

pub mod assets;
pub mod error;
pub mod library;
pub mod paths;
pub mod shortcuts;
pub mod vdf;

pub use assets::{AssetKind, AssetSource, AssetStore, GridDirectory};
pub use error::SteamError;
pub use library::{GameLibrary, GameStore, LIBRARY_FILE};
pub use paths::{SteamPaths, default_root};
pub use shortcuts::{Shortcut, ShortcutRegistry, ShortcutsFile};
pub use vdf::{VdfMap, VdfValue};
