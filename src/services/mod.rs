pub mod distance;
pub mod nearest;
pub mod paint_mixing;
pub mod pigment;

pub use distance::{color_distance, match_percentage};
pub use nearest::{find_closest, DEFAULT_MATCH_LIMIT};
pub use paint_mixing::{mix_ingredients, MixSearchEngine, ParseRatioGridError, RatioGrid, DEFAULT_SUGGESTION_LIMIT};
pub use pigment::{KubelkaMunkTransform, Latent, PigmentTransform, LATENT_DIM};
