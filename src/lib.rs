pub mod db;
pub mod models;
pub mod services;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod logging;
#[cfg(feature = "server")]
pub mod state;

// Re-export for convenience
pub use models::{MatchError, MixCandidate, MixIngredient, Paint, RankedMatch, Rgb, TargetColor};
pub use services::{find_closest, KubelkaMunkTransform, MixSearchEngine, PigmentTransform, RatioGrid};
