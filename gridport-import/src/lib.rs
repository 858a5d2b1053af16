//! Importing games from other launchers into Steam.
//!
//! The [`Orchestrator`] drives a run: it asks every [`PlatformSource`]
//! whether it is installed, lists games one launcher at a time, looks up
//! grids in bulk through the catalog, and imports the games the user
//! confirms together with their artwork.

pub mod error;
pub mod events;
pub mod failed;
pub mod orchestrator;
pub mod platform;
pub mod sequence;
pub mod sources;

pub use error::ImportError;
pub use events::{ImportEvent, run_with_events};
pub use failed::{Alternative, FailedLookup, search_alternatives};
pub use orchestrator::{
    ImportCandidate, ImportReport, Orchestrator, POSTER_DIMENSIONS, PlatformScan,
    PlatformStatus, RunState, ScanReport,
};
pub use platform::PlatformSource;
pub use sequence::run_sequential;
pub use sources::OculusSource;

/// Every launcher source gridport knows how to read.
pub fn known_sources(oculus_libraries: Vec<std::path::PathBuf>) -> Vec<Box<dyn PlatformSource>> {
    vec![Box::new(OculusSource::new(oculus_libraries))]
}
