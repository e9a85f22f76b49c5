//! Colour matching endpoints

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::db::ColorCatalog;
use crate::models::{MatchError, MixCandidate, MixIngredient, Paint, RankedMatch, TargetColor};
use crate::services::{find_closest as rank_closest, DEFAULT_MATCH_LIMIT, DEFAULT_SUGGESTION_LIMIT};
use crate::state::AppState;

/// Default `maxColors` when a request leaves it out
pub const DEFAULT_MAX_COLORS: i64 = 3;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindClosestRequest {
    pub r: Option<f64>,
    pub g: Option<f64>,
    pub b: Option<f64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestMixRequest {
    pub r: Option<f64>,
    pub g: Option<f64>,
    pub b: Option<f64>,
    pub max_colors: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub color_id: String,
    pub parts: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MixRequest {
    pub ingredients: Vec<RecipeIngredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub hex: String,
}

impl From<TargetColor> for TargetInfo {
    fn from(target: TargetColor) -> Self {
        let rgb = target.rgb();
        Self {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            hex: rgb.to_hex(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub id: String,
    pub name: Option<String>,
}

/// A catalog colour as sent over the wire; `rgb` is `"R,G,B"` text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogColor {
    pub id: String,
    pub name: String,
    pub hex: String,
    pub rgb: String,
    pub buy_link: Option<String>,
    pub series_id: String,
    pub series: SeriesInfo,
}

impl From<&Paint> for CatalogColor {
    fn from(paint: &Paint) -> Self {
        Self {
            id: paint.id.clone(),
            name: paint.name.clone(),
            hex: paint.hex.clone(),
            rgb: paint.rgb.to_csv(),
            buy_link: paint.buy_link.clone(),
            series_id: paint.series_id.clone(),
            series: SeriesInfo {
                id: paint.series_id.clone(),
                name: paint.series_name.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintMatch {
    #[serde(flatten)]
    pub color: CatalogColor,
    pub distance: f64,
    pub match_percentage: u8,
}

impl From<&RankedMatch<'_>> for PaintMatch {
    fn from(m: &RankedMatch<'_>) -> Self {
        Self {
            color: CatalogColor::from(m.paint),
            distance: m.distance,
            match_percentage: m.match_percent_rounded(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionColor {
    #[serde(flatten)]
    pub color: CatalogColor,
    pub parts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub colors: Vec<SuggestionColor>,
    pub result_hex: String,
    pub result_rgb: [u8; 3],
    pub distance: f64,
    pub match_percentage: u8,
}

impl From<&MixCandidate<'_>> for Suggestion {
    fn from(c: &MixCandidate<'_>) -> Self {
        Self {
            colors: c
                .ingredients
                .iter()
                .map(|ing| SuggestionColor {
                    color: CatalogColor::from(ing.paint),
                    parts: ing.parts,
                })
                .collect(),
            result_hex: c.result_hex(),
            result_rgb: c.result_rgb.channels(),
            distance: c.distance,
            match_percentage: c.match_percent_rounded(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindClosestResponse {
    pub target: TargetInfo,
    pub matches: Vec<PaintMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestMixResponse {
    pub target: TargetInfo,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixResponse {
    pub result_hex: String,
    pub result_rgb: [u8; 3],
}

fn target_from(r: Option<f64>, g: Option<f64>, b: Option<f64>) -> Result<TargetColor, MatchError> {
    match (r, g, b) {
        (Some(r), Some(g), Some(b)) => TargetColor::from_channels(r, g, b),
        _ => Err(MatchError::InvalidInput("RGB values are required".into())),
    }
}

/// Non-positive limits mean "nothing", not "everything"
fn effective_limit(limit: Option<i64>, default: usize) -> usize {
    match limit {
        None => default,
        Some(n) if n <= 0 => 0,
        Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
    }
}

/// List the whole catalog
pub async fn list_colors<C: ColorCatalog>(
    State(state): State<AppState<C>>,
) -> Result<Json<Vec<CatalogColor>>, ApiError> {
    let paints = state.catalog.list_all().await.map_err(MatchError::from)?;
    Ok(Json(paints.iter().map(CatalogColor::from).collect()))
}

/// Rank catalog paints by distance to the requested colour
pub async fn find_closest<C: ColorCatalog>(
    State(state): State<AppState<C>>,
    Json(req): Json<FindClosestRequest>,
) -> Result<Json<FindClosestResponse>, ApiError> {
    let target = target_from(req.r, req.g, req.b)?;
    let limit = effective_limit(req.limit, DEFAULT_MATCH_LIMIT);
    if limit == 0 {
        return Ok(Json(FindClosestResponse {
            target: target.into(),
            matches: Vec::new(),
        }));
    }

    let catalog = state.catalog.list_all().await.map_err(MatchError::from)?;
    let matches = rank_closest(target, &catalog, limit)
        .iter()
        .map(PaintMatch::from)
        .collect();

    Ok(Json(FindClosestResponse {
        target: target.into(),
        matches,
    }))
}

/// Suggest single paints and two-paint mixes for the requested colour
pub async fn suggest_mix<C: ColorCatalog>(
    State(state): State<AppState<C>>,
    Json(req): Json<SuggestMixRequest>,
) -> Result<Json<SuggestMixResponse>, ApiError> {
    let target = target_from(req.r, req.g, req.b)?;
    let max_colors = req.max_colors.unwrap_or(DEFAULT_MAX_COLORS);
    if max_colors < 1 {
        return Err(MatchError::InvalidInput("maxColors must be at least 1".into()).into());
    }
    let max_colors = usize::try_from(max_colors).unwrap_or(usize::MAX);
    let limit = effective_limit(req.limit, DEFAULT_SUGGESTION_LIMIT);
    if limit == 0 {
        return Ok(Json(SuggestMixResponse {
            target: target.into(),
            suggestions: Vec::new(),
        }));
    }

    let catalog = state.catalog.list_all().await.map_err(MatchError::from)?;
    let engine = state.engine.clone();

    // O(n²) over the catalog, keep it off the async workers
    let suggestions = tokio::task::spawn_blocking(move || {
        engine
            .suggest_mixes(target, &catalog, max_colors, limit)
            .map(|candidates| candidates.iter().map(Suggestion::from).collect::<Vec<_>>())
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(SuggestMixResponse {
        target: target.into(),
        suggestions,
    }))
}

/// Mix a user-composed recipe of catalog paints
pub async fn mix<C: ColorCatalog>(
    State(state): State<AppState<C>>,
    Json(req): Json<MixRequest>,
) -> Result<Json<MixResponse>, ApiError> {
    if req.ingredients.is_empty() {
        return Err(MatchError::InvalidInput("a mix needs at least one colour".into()).into());
    }
    let mut parts = Vec::with_capacity(req.ingredients.len());
    for ing in &req.ingredients {
        let p = u32::try_from(ing.parts)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| {
                MatchError::InvalidInput(format!("parts for '{}' must be positive", ing.color_id))
            })?;
        parts.push(p);
    }

    let catalog = state.catalog.list_all().await.map_err(MatchError::from)?;
    let mut ingredients: Vec<MixIngredient<'_>> = Vec::with_capacity(parts.len());
    for (ing, parts) in req.ingredients.iter().zip(parts) {
        let paint = catalog
            .iter()
            .find(|p| p.id == ing.color_id)
            .ok_or_else(|| MatchError::InvalidInput(format!("unknown colour '{}'", ing.color_id)))?;
        ingredients.push(MixIngredient { paint, parts });
    }

    let rgb = state.engine.mix_recipe(&ingredients)?;
    Ok(Json(MixResponse {
        result_hex: rgb.to_hex(),
        result_rgb: rgb.channels(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits() {
        assert_eq!(effective_limit(None, 5), 5);
        assert_eq!(effective_limit(Some(0), 5), 0);
        assert_eq!(effective_limit(Some(-3), 5), 0);
        assert_eq!(effective_limit(Some(12), 5), 12);
    }

    #[test]
    fn missing_channel_is_invalid() {
        assert!(matches!(
            target_from(Some(1.0), None, Some(3.0)),
            Err(MatchError::InvalidInput(_))
        ));
        assert!(target_from(Some(1.0), Some(2.0), Some(3.0)).is_ok());
    }

    #[test]
    fn catalog_colour_wire_shape() {
        let paint = Paint::new("p", "Rust Red", crate::models::Rgb::new(183, 65, 14), "s-1")
            .with_series_name("Mecha Color Palette");
        let json = serde_json::to_value(SuggestionColor {
            color: CatalogColor::from(&paint),
            parts: 3,
        })
        .unwrap();
        assert_eq!(json["rgb"], "183,65,14");
        assert_eq!(json["seriesId"], "s-1");
        assert_eq!(json["series"]["name"], "Mecha Color Palette");
        assert_eq!(json["parts"], 3);
    }

    #[test]
    fn target_info_carries_hex() {
        let info = TargetInfo::from(TargetColor::from_channels(220.0, 20.0, 60.0).unwrap());
        assert_eq!(info.hex, "#dc143c");
    }
}
