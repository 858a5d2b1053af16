use futures::future::BoxFuture;
use gridport_core::{ExternalGameRef, Platform};

use crate::error::ImportError;

/// A launcher whose installed games can be imported.
pub trait PlatformSource: Send + Sync {
    fn platform(&self) -> Platform;

    /// Display name used in progress messages and as the Steam category.
    fn name(&self) -> &str {
        self.platform().display_name()
    }

    /// Whether the launcher is present on this machine.
    fn is_installed(&self) -> BoxFuture<'_, Result<bool, ImportError>>;

    /// Every installed game the launcher knows about.
    fn get_games(&self) -> BoxFuture<'_, Result<Vec<ExternalGameRef>, ImportError>>;
}
