//! Mix search: find catalog paints and two-paint mixes closest to a target
//!
//! Candidates are every single paint plus every unordered pair of paints at a
//! fixed grid of ratios out of ten parts. Mixes are computed in pigment latent
//! space, see [`crate::services::pigment`].

use std::str::FromStr;

use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MatchError, MixCandidate, MixIngredient, Paint, Rgb, TargetColor, TransformError};
use crate::services::distance::{color_distance, match_percentage};
use crate::services::pigment::{validate_latent, Latent, PigmentTransform, LATENT_DIM};

/// Default number of suggestions returned to callers
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Total parts shared by the two paints of a pair
pub const PAIR_TOTAL_PARTS: u32 = 10;

/// Which parts values the first-listed paint of a pair is tried at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatioGrid {
    /// 1:9 through 4:6 only. Mixes weighted towards the first-listed paint
    /// are never tried; kept so results stay comparable with earlier releases.
    #[default]
    Reference,
    /// 1:9 through 9:1
    Symmetric,
}

impl RatioGrid {
    pub fn first_parts(&self) -> std::ops::RangeInclusive<u32> {
        match self {
            RatioGrid::Reference => 1..=4,
            RatioGrid::Symmetric => 1..=PAIR_TOTAL_PARTS - 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatioGrid::Reference => "reference",
            RatioGrid::Symmetric => "symmetric",
        }
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown ratio grid '{0}', expected reference or symmetric")]
pub struct ParseRatioGridError(pub String);

impl FromStr for RatioGrid {
    type Err = ParseRatioGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reference" => Ok(RatioGrid::Reference),
            "symmetric" => Ok(RatioGrid::Symmetric),
            _ => Err(ParseRatioGridError(s.to_string())),
        }
    }
}

/// Mix colours by weighted latent sum. Weights are `parts / total parts`.
///
/// A single ingredient is returned unchanged without touching the transform.
pub fn mix_ingredients<T: PigmentTransform + ?Sized>(
    transform: &T,
    ingredients: &[(Rgb, u32)],
) -> Result<Rgb, MatchError> {
    match ingredients {
        [] => return Err(MatchError::InvalidInput("a mix needs at least one colour".into())),
        [(rgb, parts)] if *parts > 0 => return Ok(*rgb),
        _ => {}
    }

    if ingredients.iter().any(|(_, parts)| *parts == 0) {
        return Err(MatchError::InvalidInput("every colour needs at least one part".into()));
    }
    // u32 parts can sum past u32::MAX
    let total: u64 = ingredients.iter().map(|(_, parts)| u64::from(*parts)).sum();

    let mut mixed: Latent = Array1::zeros(LATENT_DIM);
    for (rgb, parts) in ingredients {
        let latent = transform.to_latent(*rgb)?;
        validate_latent(&latent)?;
        mixed.scaled_add(*parts as f64 / total as f64, &latent);
    }
    Ok(transform.from_latent(&mixed)?)
}

/// Searches catalog paints and pairs of paints for the closest mixes
pub struct MixSearchEngine<T> {
    transform: T,
    ratio_grid: RatioGrid,
}

impl<T: PigmentTransform> MixSearchEngine<T> {
    pub fn new(transform: T) -> Self {
        Self {
            transform,
            ratio_grid: RatioGrid::default(),
        }
    }

    pub fn with_ratio_grid(mut self, ratio_grid: RatioGrid) -> Self {
        self.ratio_grid = ratio_grid;
        self
    }

    pub fn ratio_grid(&self) -> RatioGrid {
        self.ratio_grid
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Rank single paints and, when `max_colors >= 2`, two-paint mixes by
    /// distance to `target`, keeping the best `limit`.
    ///
    /// Candidates whose mix cannot be computed are skipped. Ties keep
    /// generation order: singles in catalog order, then pairs.
    pub fn suggest_mixes<'a>(
        &self,
        target: TargetColor,
        catalog: &'a [Paint],
        max_colors: usize,
        limit: usize,
    ) -> Result<Vec<MixCandidate<'a>>, MatchError> {
        if max_colors < 1 {
            return Err(MatchError::InvalidInput("maxColors must be at least 1".into()));
        }
        if limit == 0 || catalog.is_empty() {
            return Ok(Vec::new());
        }

        let target = target.rgb();
        let mut candidates: Vec<MixCandidate<'a>> = catalog
            .iter()
            .map(|paint| {
                score(
                    target,
                    vec![MixIngredient { paint, parts: 1 }],
                    paint.rgb,
                )
            })
            .collect();

        if max_colors >= 2 && catalog.len() >= 2 {
            let pairs = self.score_pairs(target, catalog);
            candidates.extend(pairs);
        }

        log::debug!(
            "suggest_mixes: {} candidates from {} paints ({} grid)",
            candidates.len(),
            catalog.len(),
            self.ratio_grid.as_str()
        );

        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        candidates.truncate(limit);
        Ok(candidates)
    }

    /// Mix a user-composed recipe and score nothing; single ingredients
    /// return their own colour.
    pub fn mix_recipe(&self, ingredients: &[MixIngredient<'_>]) -> Result<Rgb, MatchError> {
        let parts: Vec<(Rgb, u32)> = ingredients
            .iter()
            .map(|ing| (ing.paint.rgb, ing.parts))
            .collect();
        mix_ingredients(&self.transform, &parts)
    }

    fn score_pairs<'a>(&self, target: Rgb, catalog: &'a [Paint]) -> Vec<MixCandidate<'a>> {
        // Each paint's latent is needed by n-1 pairs, compute it once
        let latents: Vec<Option<Latent>> = catalog
            .par_iter()
            .map(|paint| match self.checked_latent(paint.rgb) {
                Ok(latent) => Some(latent),
                Err(e) => {
                    log::warn!("skipping mixes with '{}': {}", paint.id, e);
                    None
                }
            })
            .collect();

        let n = catalog.len();
        let grid = self.ratio_grid;
        let attempted = n * (n - 1) / 2 * grid.first_parts().count();

        let pairs: Vec<MixCandidate<'a>> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                ((i + 1)..n).flat_map(move |j| grid.first_parts().map(move |k| (i, j, k)))
            })
            .filter_map(|(i, j, k)| {
                let (zi, zj) = (latents[i].as_ref()?, latents[j].as_ref()?);
                let total = PAIR_TOTAL_PARTS as f64;
                let mixed = zi * (k as f64 / total) + zj * ((PAIR_TOTAL_PARTS - k) as f64 / total);
                match self.transform.from_latent(&mixed) {
                    Ok(rgb) => Some(score(
                        target,
                        vec![
                            MixIngredient { paint: &catalog[i], parts: k },
                            MixIngredient { paint: &catalog[j], parts: PAIR_TOTAL_PARTS - k },
                        ],
                        rgb,
                    )),
                    Err(e) => {
                        log::debug!(
                            "skipping {}:{} {} + {}: {}",
                            k,
                            PAIR_TOTAL_PARTS - k,
                            catalog[i].id,
                            catalog[j].id,
                            e
                        );
                        None
                    }
                }
            })
            .collect();

        if pairs.is_empty() && attempted > 0 {
            log::warn!("all {attempted} pair mixes failed, returning single colours only");
        } else if pairs.len() < attempted {
            log::warn!("{} of {attempted} pair mixes skipped", attempted - pairs.len());
        }
        pairs
    }

    fn checked_latent(&self, rgb: Rgb) -> Result<Latent, TransformError> {
        let latent = self.transform.to_latent(rgb)?;
        validate_latent(&latent)?;
        Ok(latent)
    }
}

fn score<'a>(target: Rgb, ingredients: Vec<MixIngredient<'a>>, result_rgb: Rgb) -> MixCandidate<'a> {
    let distance = color_distance(target, result_rgb);
    MixCandidate {
        ingredients,
        result_rgb,
        distance,
        match_percentage: match_percentage(distance),
    }
}
