//! Raster drawing surface.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};

use crate::error::RendererResult;
use crate::filter::FilterSpec;
use crate::layer::blend::composite_image;
use crate::layer::{BlendMode, Part, RenderTarget};

/// Default logical resolution of the customizer canvas.
pub const DEFAULT_SURFACE_SIZE: (u32, u32) = (800, 800);

/// An RGBA canvas with an active filter and composite operation.
///
/// Every drawn image is stretched over the full surface, the active filter
/// is applied to the stretched copy, and the result is blended in.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
    filter: Option<FilterSpec>,
    blend_mode: BlendMode,
}

impl Surface {
    /// Creates a transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
            filter: None,
            blend_mode: BlendMode::SourceOver,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Resizes the surface, discarding its contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.pixels.dimensions() != (width, height) {
            self.pixels = RgbaImage::new(width, height);
        }
    }

    /// Encodes the current contents as PNG.
    pub fn to_png(&self) -> RendererResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.pixels.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    /// Encodes the current contents as a `data:image/png;base64,` URI.
    pub fn to_data_uri(&self) -> RendererResult<String> {
        let png = self.to_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_SIZE.0, DEFAULT_SURFACE_SIZE.1)
    }
}

impl RenderTarget for Surface {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            pixel.0 = [0, 0, 0, 0];
        }
    }

    fn set_filter(&mut self, filter: Option<FilterSpec>) {
        self.filter = filter;
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend_mode = mode;
    }

    fn draw_image(&mut self, _part: Part, image: &RgbaImage, opacity: f32) {
        let (width, height) = self.size();
        if width == 0 || height == 0 {
            return;
        }

        let mut source = if image.dimensions() == (width, height) {
            image.clone()
        } else {
            imageops::resize(image, width, height, FilterType::Triangle)
        };

        if let Some(filter) = &self.filter {
            filter.apply_in_place(&mut source);
        }

        composite_image(&mut self.pixels, &source, self.blend_mode, opacity);
    }
}
