//! Hue / saturation / brightness filter shared by a colour group.
//!
//! A [`FilterSpec`] mirrors the CSS filter chain
//! `hue-rotate(Hdeg) saturate(S%) brightness(B%)` and knows how to apply that
//! chain to raster pixels, so a layer drawn through the raster surface looks
//! the same as the browser rendering of the composed filter string.

use std::fmt;

use image::{Rgba, RgbaImage};
use palette::Srgb;
use serde::{Deserialize, Serialize};

// ============================================================================
// FilterSpec
// ============================================================================

/// Hue/saturation/brightness triple defining a colour transform.
///
/// - `hue` is a rotation in degrees, kept within `0..360` by [`FilterSpec::new`].
/// - `saturation` and `brightness` are percentages (100 = unchanged). They are
///   never clamped; the control's declared range is the caller's concern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub hue: f64,
    pub saturation: f64,
    pub brightness: f64,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FilterSpec {
    /// The filter that leaves pixels unchanged.
    pub const IDENTITY: Self = Self {
        hue: 0.0,
        saturation: 100.0,
        brightness: 100.0,
    };

    /// Creates a filter, normalizing the hue with [`FilterSpec::normalize_hue`].
    pub fn new(hue: f64, saturation: f64, brightness: f64) -> Self {
        Self {
            hue: Self::normalize_hue(hue),
            saturation,
            brightness,
        }
    }

    /// Negative and non-finite hues clamp to 0, everything else wraps modulo 360.
    ///
    /// `400 -> 40`, `360 -> 0`, `-15 -> 0`, `inf -> 0`.
    pub fn normalize_hue(degrees: f64) -> f64 {
        if !degrees.is_finite() || degrees <= 0.0 {
            0.0
        } else {
            degrees.rem_euclid(360.0)
        }
    }

    /// Returns true if applying this filter would not change any pixel.
    pub fn is_identity(&self) -> bool {
        self.hue.rem_euclid(360.0) == 0.0 && self.saturation == 100.0 && self.brightness == 100.0
    }

    /// The composed CSS filter string, in hue-rotate, saturate, brightness order.
    pub fn css(&self) -> String {
        self.to_string()
    }

    /// Applies the filter chain to every pixel of `image`.
    pub fn apply(&self, image: &RgbaImage) -> RgbaImage {
        let mut result = image.clone();
        self.apply_in_place(&mut result);
        result
    }

    /// Applies the filter chain to `image` without allocating a copy.
    pub fn apply_in_place(&self, image: &mut RgbaImage) {
        if self.is_identity() {
            return;
        }

        let chain = FilterChain::from_spec(self);
        for pixel in image.pixels_mut() {
            *pixel = chain.apply(*pixel);
        }
    }

    /// Applies the filter chain to a single pixel.
    pub fn apply_pixel(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        if self.is_identity() {
            return pixel;
        }
        FilterChain::from_spec(self).apply(pixel)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hue-rotate({}deg) saturate({}%) brightness({}%)",
            self.hue, self.saturation, self.brightness
        )
    }
}

// ============================================================================
// Filter Matrices
// ============================================================================

/// Row-major 3x3 colour matrix acting on un-premultiplied sRGB.
type ColorMatrix = [[f32; 3]; 3];

const LUMA_R: f32 = 0.213;
const LUMA_G: f32 = 0.715;
const LUMA_B: f32 = 0.072;

fn hue_rotate_matrix(degrees: f64) -> ColorMatrix {
    let (sin, cos) = (degrees as f32).to_radians().sin_cos();
    [
        [
            LUMA_R + cos * (1.0 - LUMA_R) - sin * LUMA_R,
            LUMA_G - cos * LUMA_G - sin * LUMA_G,
            LUMA_B - cos * LUMA_B + sin * (1.0 - LUMA_B),
        ],
        [
            LUMA_R - cos * LUMA_R + sin * 0.143,
            LUMA_G + cos * (1.0 - LUMA_G) + sin * 0.140,
            LUMA_B - cos * LUMA_B - sin * 0.283,
        ],
        [
            LUMA_R - cos * LUMA_R - sin * (1.0 - LUMA_R),
            LUMA_G - cos * LUMA_G + sin * LUMA_G,
            LUMA_B + cos * (1.0 - LUMA_B) + sin * LUMA_B,
        ],
    ]
}

fn saturate_matrix(percent: f64) -> ColorMatrix {
    let s = (percent / 100.0) as f32;
    [
        [LUMA_R + (1.0 - LUMA_R) * s, LUMA_G - LUMA_G * s, LUMA_B - LUMA_B * s],
        [LUMA_R - LUMA_R * s, LUMA_G + (1.0 - LUMA_G) * s, LUMA_B - LUMA_B * s],
        [LUMA_R - LUMA_R * s, LUMA_G - LUMA_G * s, LUMA_B + (1.0 - LUMA_B) * s],
    ]
}

fn multiply(matrix: &ColorMatrix, rgb: [f32; 3]) -> [f32; 3] {
    let row = |r: &[f32; 3]| (r[0] * rgb[0] + r[1] * rgb[1] + r[2] * rgb[2]).clamp(0.0, 1.0);
    [row(&matrix[0]), row(&matrix[1]), row(&matrix[2])]
}

/// The three filter primitives, precomputed once per [`FilterSpec::apply`].
///
/// Each primitive clamps its output, matching a browser that evaluates the
/// CSS shorthand as a chain of separate filter steps.
struct FilterChain {
    hue: ColorMatrix,
    saturate: ColorMatrix,
    brightness: f32,
}

impl FilterChain {
    fn from_spec(spec: &FilterSpec) -> Self {
        Self {
            hue: hue_rotate_matrix(spec.hue),
            saturate: saturate_matrix(spec.saturation),
            brightness: (spec.brightness / 100.0) as f32,
        }
    }

    fn apply(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = pixel.0;
        if a == 0 {
            return pixel;
        }

        let srgb: Srgb<f32> = Srgb::new(r, g, b).into_format();
        let rgb = multiply(&self.hue, [srgb.red, srgb.green, srgb.blue]);
        let rgb = multiply(&self.saturate, rgb);
        let rgb = rgb.map(|c| (c * self.brightness).clamp(0.0, 1.0));

        let out: Srgb<u8> = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format();
        Rgba([out.red, out.green, out.blue, a])
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_normalization() {
        assert_eq!(FilterSpec::normalize_hue(-20.0), 0.0);
        assert_eq!(FilterSpec::normalize_hue(400.0), 40.0);
        assert_eq!(FilterSpec::normalize_hue(360.0), 0.0);
        assert_eq!(FilterSpec::normalize_hue(359.0), 359.0);
        assert_eq!(FilterSpec::normalize_hue(f64::NAN), 0.0);
        assert_eq!(FilterSpec::normalize_hue(f64::INFINITY), 0.0);
        assert_eq!(FilterSpec::normalize_hue(f64::NEG_INFINITY), 0.0);
        assert_eq!(FilterSpec::new(725.0, 50.0, 150.0).hue, 5.0);
    }

    #[test]
    fn saturation_and_brightness_are_not_clamped() {
        let spec = FilterSpec::new(0.0, 500.0, -10.0);
        assert_eq!(spec.saturation, 500.0);
        assert_eq!(spec.brightness, -10.0);
    }

    #[test]
    fn css_string_order() {
        let spec = FilterSpec::new(10.0, 120.0, 90.0);
        assert_eq!(spec.css(), "hue-rotate(10deg) saturate(120%) brightness(90%)");
        assert_eq!(
            FilterSpec::IDENTITY.css(),
            "hue-rotate(0deg) saturate(100%) brightness(100%)"
        );
        assert_eq!(
            FilterSpec::new(12.5, 100.0, 100.0).to_string(),
            "hue-rotate(12.5deg) saturate(100%) brightness(100%)"
        );
    }

    #[test]
    fn identity_leaves_pixels_unchanged() {
        let px = Rgba([12, 200, 99, 180]);
        assert!(FilterSpec::IDENTITY.is_identity());
        assert_eq!(FilterSpec::IDENTITY.apply_pixel(px), px);
    }

    #[test]
    fn brightness_scales_channels() {
        let spec = FilterSpec::new(0.0, 100.0, 50.0);
        let out = spec.apply_pixel(Rgba([200, 100, 50, 255]));
        assert_eq!(out.0, [100, 50, 25, 255]);

        let black = FilterSpec::new(0.0, 100.0, 0.0).apply_pixel(Rgba([200, 100, 50, 255]));
        assert_eq!(black.0, [0, 0, 0, 255]);
    }

    #[test]
    fn zero_saturation_is_grey() {
        let out = FilterSpec::new(0.0, 0.0, 100.0).apply_pixel(Rgba([255, 0, 0, 255]));
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn hue_rotation_moves_red_towards_green() {
        let out = FilterSpec::new(120.0, 100.0, 100.0).apply_pixel(Rgba([255, 0, 0, 255]));
        assert!(out[1] > out[0], "green should dominate after 120deg: {:?}", out);
        assert!(out[1] > out[2], "green should dominate after 120deg: {:?}", out);
    }

    #[test]
    fn alpha_is_preserved_and_transparent_skipped() {
        let spec = FilterSpec::new(90.0, 150.0, 80.0);
        assert_eq!(spec.apply_pixel(Rgba([10, 20, 30, 77]))[3], 77);
        assert_eq!(spec.apply_pixel(Rgba([10, 20, 30, 0])), Rgba([10, 20, 30, 0]));
    }

    #[test]
    fn apply_matches_per_pixel() {
        let spec = FilterSpec::new(45.0, 130.0, 110.0);
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 128, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 64, 200, 128]));

        let out = spec.apply(&img);
        assert_eq!(*out.get_pixel(0, 0), spec.apply_pixel(*img.get_pixel(0, 0)));
        assert_eq!(*out.get_pixel(1, 0), spec.apply_pixel(*img.get_pixel(1, 0)));
    }
}
