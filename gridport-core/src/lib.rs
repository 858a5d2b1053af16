//! Shared types for gridport: platforms, game references, and the
//! identifiers derived from them.

pub mod app_id;
pub mod game;
pub mod platform;

pub use app_id::{AppIds, generate_app_id, generate_new_app_id};
pub use game::{ExternalGameRef, ImportedGame, content_hash};
pub use platform::{Platform, PlatformParseError};
