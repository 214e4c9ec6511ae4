//! Asset sources and loaders.
//!
//! Assets are static files co-located with the application. A loader turns a
//! [`Part`] into an [`AssetSource`]; decoding the source produces the image
//! that resolves the part's resource. A [`LoadGate`] tracks which parts are
//! still outstanding and opens once, when the last one arrives.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::{RendererError, RendererResult};
use crate::layer::Part;
use crate::layer::svg::rasterize_svg;

/// Undecoded asset contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// An encoded raster image (PNG, JPEG, WebP...).
    Encoded(Vec<u8>),
    /// SVG markup.
    Svg(String),
}

impl AssetSource {
    /// Decodes the source into a straight-alpha RGBA image.
    pub fn decode(&self, uri: &str) -> RendererResult<RgbaImage> {
        match self {
            AssetSource::Encoded(bytes) => image::load_from_memory(bytes)
                .map(|img| img.to_rgba8())
                .map_err(|source| RendererError::Decode {
                    uri: uri.to_string(),
                    source,
                }),
            AssetSource::Svg(markup) => rasterize_svg(uri, markup),
        }
    }
}

/// Fetches the source of a part's asset.
pub trait AssetLoader {
    fn load(&self, part: Part) -> RendererResult<AssetSource>;
}

/// Loads assets from files named by [`Part::asset_name`] under a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    root: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for DirectoryLoader {
    fn load(&self, part: Part) -> RendererResult<AssetSource> {
        let path = self.root.join(part.asset_name());
        if part.is_vector() {
            Ok(AssetSource::Svg(fs::read_to_string(path)?))
        } else {
            Ok(AssetSource::Encoded(fs::read(path)?))
        }
    }
}

/// Serves assets held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: HashMap<Part, AssetSource>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, part: Part, source: AssetSource) {
        self.sources.insert(part, source);
    }

    pub fn with(mut self, part: Part, source: AssetSource) -> Self {
        self.insert(part, source);
        self
    }
}

impl AssetLoader for MemoryLoader {
    fn load(&self, part: Part) -> RendererResult<AssetSource> {
        self.sources
            .get(&part)
            .cloned()
            .ok_or_else(|| RendererError::unknown_asset(part.asset_name()))
    }
}

// ============================================================================
// LoadGate
// ============================================================================

/// Wait-all barrier over a fixed set of parts.
#[derive(Debug, Clone, Default)]
pub struct LoadGate {
    pending: HashSet<Part>,
    opened: bool,
}

impl LoadGate {
    pub fn new(parts: impl IntoIterator<Item = Part>) -> Self {
        Self {
            pending: parts.into_iter().collect(),
            opened: false,
        }
    }

    /// Number of parts not completed yet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, part: Part) -> bool {
        self.pending.contains(&part)
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Marks `part` as completed.
    ///
    /// Returns true only on the call that completes the last pending part.
    /// Repeated or unknown completions are ignored.
    pub fn complete(&mut self, part: Part) -> bool {
        if !self.pending.remove(&part) {
            tracing::warn!(%part, "ignoring duplicate ready signal");
            return false;
        }
        tracing::debug!(%part, remaining = self.pending.len(), "resource ready");

        if self.pending.is_empty() && !self.opened {
            self.opened = true;
            tracing::debug!("all resources ready");
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    fn png_bytes(pixel: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 3, pixel);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_png() {
        let source = AssetSource::Encoded(png_bytes(Rgba([1, 2, 3, 200])));
        let img = source.decode("gun.png").unwrap();
        assert_eq!(img.dimensions(), (3, 3));
        assert_eq!(img.get_pixel(2, 2).0, [1, 2, 3, 200]);
    }

    #[test]
    fn decode_garbage_reports_uri() {
        let err = AssetSource::Encoded(vec![0, 1, 2]).decode("hair0.png").unwrap_err();
        assert!(matches!(err, RendererError::Decode { ref uri, .. } if uri == "hair0.png"));
    }

    #[test]
    fn memory_loader_misses_are_errors() {
        let loader = MemoryLoader::new().with(Part::Gun, AssetSource::Encoded(vec![]));
        assert!(loader.load(Part::Gun).is_ok());
        assert!(matches!(
            loader.load(Part::Signature),
            Err(RendererError::UnknownAsset(_))
        ));
    }

    #[test]
    fn directory_loader_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join(Part::Gun.asset_name()), png_bytes(Rgba([9, 9, 9, 255]))).unwrap();
        fs::write(root.join(Part::Signature.asset_name()), "<svg/>").unwrap();

        let loader = DirectoryLoader::new(root);
        assert!(matches!(loader.load(Part::Gun), Ok(AssetSource::Encoded(_))));
        assert_eq!(
            loader.load(Part::Signature).unwrap(),
            AssetSource::Svg("<svg/>".into())
        );
        assert!(matches!(loader.load(Part::HairTop), Err(RendererError::Io(_))));
    }

    #[test]
    fn gate_opens_exactly_once() {
        let mut gate = LoadGate::new([Part::Gun, Part::Signature, Part::Outline]);
        assert_eq!(gate.pending(), 3);

        assert!(!gate.complete(Part::Gun));
        assert!(!gate.complete(Part::Gun));
        assert!(!gate.complete(Part::Outline));
        assert!(!gate.is_open());
        assert!(gate.is_pending(Part::Signature));

        assert!(gate.complete(Part::Signature));
        assert!(gate.is_open());
        assert!(!gate.complete(Part::Signature));
    }
}
