//! SVG rasterisation for vector assets (the signature, mostly).

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::{RendererError, RendererResult};

/// Rasterises SVG markup at its intrinsic size.
///
/// `uri` is only used for error reporting.
pub fn rasterize_svg(uri: &str, svg_data: &str) -> RendererResult<RgbaImage> {
    let opts = Options::default();
    let tree = Tree::from_str(svg_data, &opts).map_err(|_| RendererError::svg(uri))?;

    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = Pixmap::new(width, height).ok_or_else(|| RendererError::svg(uri))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Converts a premultiplied tiny_skia pixmap to a straight-alpha image.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());

    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    img
}
