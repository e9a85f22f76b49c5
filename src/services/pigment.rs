//! Pigment latent space
//!
//! Paints mix subtractively, so averaging RGB values gives the wrong answer
//! (blue + yellow averages to grey, not green). Mixing is instead done on a
//! latent vector built from Kubelka-Munk K/S ratios, where a weighted sum of
//! latents is the physically sensible mix.

use ndarray::{s, Array1};

use crate::models::{Rgb, TransformError};

/// Number of components in a latent pigment vector
pub const LATENT_DIM: usize = 7;

/// Latent pigment representation of a colour
pub type Latent = Array1<f64>;

/// Converts colours to and from a latent space where mixing is linear.
///
/// Implementations must round-trip: `from_latent(to_latent(c))` stays within
/// a couple of units per channel of `c` for every 8-bit colour.
pub trait PigmentTransform: Send + Sync {
    fn to_latent(&self, rgb: Rgb) -> Result<Latent, TransformError>;

    fn from_latent(&self, latent: &Latent) -> Result<Rgb, TransformError>;

    /// Mix `a` and `b`, with `t` the share of `b` (clamped to `[0, 1]`)
    fn lerp(&self, a: Rgb, b: Rgb, t: f64) -> Result<Rgb, TransformError> {
        let t = t.clamp(0.0, 1.0);
        let za = self.to_latent(a)?;
        let zb = self.to_latent(b)?;
        validate_latent(&za)?;
        validate_latent(&zb)?;
        let mixed = za * (1.0 - t) + zb * t;
        self.from_latent(&mixed)
    }
}

/// Check a latent vector has the expected shape and only finite values
pub fn validate_latent(latent: &Latent) -> Result<(), TransformError> {
    if latent.len() != LATENT_DIM {
        return Err(TransformError::Dimension {
            expected: LATENT_DIM,
            actual: latent.len(),
        });
    }
    if latent.iter().any(|v| !v.is_finite()) {
        return Err(TransformError::NonFinite);
    }
    Ok(())
}

// Rec. 709 luminance weights for linear RGB
const LUMA: [f64; 3] = [0.2126, 0.7152, 0.0722];

/// Four-band Kubelka-Munk model.
///
/// Latent layout: K/S of linear red, green and blue reflectance, K/S of linear
/// luminance, then a three-channel residual in 8-bit units. The residual
/// carries whatever the K/S bands cannot reproduce (clamping, the luminance
/// rescale), which makes the round trip exact up to rounding.
#[derive(Debug, Clone, Copy, Default)]
pub struct KubelkaMunkTransform;

impl KubelkaMunkTransform {
    pub fn new() -> Self {
        Self
    }

    /// Reconstruct 8-bit channels (unrounded) from the four K/S bands
    fn decode_bands(ks: &[f64]) -> [f64; 3] {
        let mut refl = [
            ks_to_reflectance(ks[0]),
            ks_to_reflectance(ks[1]),
            ks_to_reflectance(ks[2]),
        ];
        let luminance = ks_to_reflectance(ks[3]);
        let reconstructed = luma(&refl);
        if reconstructed > 1e-9 {
            let scale = luminance / reconstructed;
            for r in refl.iter_mut() {
                *r = (*r * scale).clamp(0.0, 1.0);
            }
        }
        refl.map(|r| linear_to_srgb(r) * 255.0)
    }
}

impl PigmentTransform for KubelkaMunkTransform {
    fn to_latent(&self, rgb: Rgb) -> Result<Latent, TransformError> {
        let linear = rgb.channels().map(srgb_to_linear);
        let ks = [
            reflectance_to_ks(linear[0]),
            reflectance_to_ks(linear[1]),
            reflectance_to_ks(linear[2]),
            reflectance_to_ks(luma(&linear)),
        ];
        let decoded = Self::decode_bands(&ks);

        let mut latent = Array1::zeros(LATENT_DIM);
        for (i, v) in ks.iter().enumerate() {
            latent[i] = *v;
        }
        for (i, c) in rgb.channels().iter().enumerate() {
            latent[4 + i] = *c as f64 - decoded[i];
        }
        Ok(latent)
    }

    fn from_latent(&self, latent: &Latent) -> Result<Rgb, TransformError> {
        validate_latent(latent)?;
        let ks = latent.slice(s![..4]).to_vec();
        let decoded = Self::decode_bands(&ks);
        let channel = |i: usize| (decoded[i] + latent[4 + i]).round().clamp(0.0, 255.0) as u8;
        Ok(Rgb::new(channel(0), channel(1), channel(2)))
    }
}

/// Convert reflectance R to Kubelka-Munk K/S ratio
/// Formula: K/S = (1 - R)² / (2R)
#[inline]
fn reflectance_to_ks(r: f64) -> f64 {
    // Clamp away from 0 and 1 so K/S stays finite
    let r = r.clamp(0.001, 0.999);
    (1.0 - r).powi(2) / (2.0 * r)
}

/// Convert Kubelka-Munk K/S ratio back to reflectance R
/// Formula: R = 1 + K/S - √(K/S² + 2·K/S)
#[inline]
fn ks_to_reflectance(ks: f64) -> f64 {
    if ks <= 0.0 {
        return 1.0;
    }
    let r = 1.0 + ks - (ks * ks + 2.0 * ks).sqrt();
    r.clamp(0.0, 1.0)
}

#[inline]
fn luma(linear: &[f64; 3]) -> f64 {
    LUMA[0] * linear[0] + LUMA[1] * linear[1] + LUMA[2] * linear[2]
}

/// sRGB channel to linear light
#[inline]
fn srgb_to_linear(c: u8) -> f64 {
    let x = c as f64 / 255.0;
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// Linear light to sRGB in `[0, 1]`
#[inline]
fn linear_to_srgb(c: f64) -> f64 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn max_channel_error(a: Rgb, b: Rgb) -> u8 {
        a.channels()
            .iter()
            .zip(b.channels())
            .map(|(x, y)| x.abs_diff(y))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn latent_has_seven_finite_components() {
        let km = KubelkaMunkTransform::new();
        for rgb in [Rgb::new(0, 0, 0), Rgb::new(255, 255, 255), Rgb::new(0, 127, 255)] {
            let z = km.to_latent(rgb).unwrap();
            assert_eq!(z.len(), LATENT_DIM);
            assert!(validate_latent(&z).is_ok());
        }
    }

    #[test]
    fn round_trip_random_colours() {
        let km = KubelkaMunkTransform::new();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
        for _ in 0..100 {
            let c = Rgb::new(rng.gen(), rng.gen(), rng.gen());
            let back = km.from_latent(&km.to_latent(c).unwrap()).unwrap();
            assert!(max_channel_error(c, back) <= 2, "{c} came back as {back}");
        }
    }

    #[test]
    fn round_trip_extremes() {
        let km = KubelkaMunkTransform::new();
        for c in [
            Rgb::new(0, 0, 0),
            Rgb::new(255, 255, 255),
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 0, 255),
            Rgb::new(1, 254, 128),
        ] {
            let back = km.from_latent(&km.to_latent(c).unwrap()).unwrap();
            assert!(max_channel_error(c, back) <= 1, "{c} came back as {back}");
        }
    }

    #[test]
    fn blue_and_yellow_mix_green() {
        let km = KubelkaMunkTransform::new();
        let green = km
            .lerp(Rgb::new(0, 127, 255), Rgb::new(255, 199, 44), 0.5)
            .unwrap();
        assert!(green.g > green.r + 50, "got {green}");
        assert!(green.g > green.b, "got {green}");
    }

    #[test]
    fn white_and_black_mix_neutral_grey() {
        let km = KubelkaMunkTransform::new();
        let grey = km
            .lerp(Rgb::new(255, 255, 255), Rgb::new(10, 10, 10), 0.5)
            .unwrap();
        assert_eq!(grey.r, grey.g);
        assert_eq!(grey.g, grey.b);
        assert!(grey.r > 10 && grey.r < 255);
    }

    #[test]
    fn lerp_endpoints_return_sources() {
        let km = KubelkaMunkTransform::new();
        let a = Rgb::new(183, 65, 14);
        let b = Rgb::new(70, 130, 180);
        assert!(max_channel_error(km.lerp(a, b, 0.0).unwrap(), a) <= 1);
        assert!(max_channel_error(km.lerp(a, b, 1.0).unwrap(), b) <= 1);
    }

    #[test]
    fn rejects_malformed_latents() {
        let km = KubelkaMunkTransform::new();
        let short = Array1::zeros(4);
        assert_eq!(
            km.from_latent(&short),
            Err(TransformError::Dimension { expected: 7, actual: 4 })
        );
        let mut bad = km.to_latent(Rgb::new(1, 2, 3)).unwrap();
        bad[2] = f64::NAN;
        assert_eq!(km.from_latent(&bad), Err(TransformError::NonFinite));
    }
}
