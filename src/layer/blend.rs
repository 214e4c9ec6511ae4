//! Separable blend modes and source-over compositing.
//!
//! Follows the W3C Compositing and Blending formula: the source colour is
//! first mixed with the blend result in proportion to the backdrop alpha,
//! then composited source-over.

use image::{Rgba, RgbaImage};

use super::BlendMode;

/// Blend function `B(cb, cs)` for one colour channel in `0..=1`.
pub fn blend_channel(mode: BlendMode, cb: f32, cs: f32) -> f32 {
    match mode {
        BlendMode::SourceOver => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Overlay => hard_light(cs, cb),
        BlendMode::HardLight => hard_light(cb, cs),
        BlendMode::ColorDodge => {
            if cb == 0.0 {
                0.0
            } else if cs >= 1.0 {
                1.0
            } else {
                (cb / (1.0 - cs)).min(1.0)
            }
        }
    }
}

fn hard_light(cb: f32, cs: f32) -> f32 {
    if cs <= 0.5 {
        cb * 2.0 * cs
    } else {
        let s = 2.0 * cs - 1.0;
        cb + s - cb * s
    }
}

/// Composites one source pixel over one backdrop pixel.
///
/// `opacity` scales the source alpha (the canvas `globalAlpha`).
pub fn composite_pixel(dst: Rgba<u8>, src: Rgba<u8>, mode: BlendMode, opacity: f32) -> Rgba<u8> {
    if src[3] == 0 || opacity <= 0.0 {
        return dst;
    }
    if mode == BlendMode::SourceOver && src[3] == 255 && opacity >= 1.0 {
        return src;
    }

    let ab = dst[3] as f32 / 255.0;
    let as_ = (src[3] as f32 / 255.0) * opacity.min(1.0);
    let ao = as_ + ab * (1.0 - as_);
    if ao == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| -> u8 {
        let cb = dst[i] as f32 / 255.0;
        let cs = src[i] as f32 / 255.0;
        let mixed = (1.0 - ab) * cs + ab * blend_channel(mode, cb, cs);
        let co = as_ * mixed + ab * cb * (1.0 - as_);
        ((co / ao).clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (ao.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

/// Composites `src` onto `dest` pixel by pixel, anchored at the origin.
///
/// Pixels of `src` outside `dest` are ignored.
pub fn composite_image(dest: &mut RgbaImage, src: &RgbaImage, mode: BlendMode, opacity: f32) {
    let width = dest.width().min(src.width());
    let height = dest.height().min(src.height());

    for y in 0..height {
        for x in 0..width {
            let blended =
                composite_pixel(*dest.get_pixel(x, y), *src.get_pixel(x, y), mode, opacity);
            dest.put_pixel(x, y, blended);
        }
    }
}
