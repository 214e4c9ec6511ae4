//! Image layers and the parts catalogue.
//!
//! A [`Layer`] is one pre-rendered, full-surface image plus the state needed
//! to draw it: a blend mode, an opacity, a visibility flag and an optional
//! [`FilterSpec`] pushed in by its colour group. Layers draw themselves into
//! any [`RenderTarget`], so the compositing order can be verified against a
//! recording double as well as against real pixels.

pub mod blend;
pub mod svg;

use std::fmt;

use image::RgbaImage;

use crate::filter::FilterSpec;

// ============================================================================
// Part
// ============================================================================

/// Every image part of the character, in catalogue (draw) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Part {
    Background,
    BackgroundBlurred,
    Chains,
    BaseSilhouette,

    SukumizuBase,
    SukumizuTint,
    SukumizuHighlight2,
    SukumizuShadow,
    SukumizuLineArt,
    SukumizuHighlight,
    SukumizuTags,

    HairBase,
    HairShade,
    HairTop,

    Outline,

    HarnessBelt,
    HarnessBeltShade,
    HarnessStrap,
    HarnessDevice,
    HarnessDeviceShade,
    HarnessDeviceHighlight,
    HarnessLock,
    HarnessLineArt,

    EyeWhites,
    EyeIris,
    EyeShade,
    EyeHighlight,
    EyeLids,
    EyeLashes,
    Tears,

    MouthPlain,
    MouthPlainShade,
    MouthDrool,
    DroolStrand,

    Biribiri,
    BiribiriGlow,

    Gun,

    Signature,
}

impl Part {
    /// All parts in catalogue order.
    pub const ALL: [Part; 38] = [
        Part::Background,
        Part::BackgroundBlurred,
        Part::Chains,
        Part::BaseSilhouette,
        Part::SukumizuBase,
        Part::SukumizuTint,
        Part::SukumizuHighlight2,
        Part::SukumizuShadow,
        Part::SukumizuLineArt,
        Part::SukumizuHighlight,
        Part::SukumizuTags,
        Part::HairBase,
        Part::HairShade,
        Part::HairTop,
        Part::Outline,
        Part::HarnessBelt,
        Part::HarnessBeltShade,
        Part::HarnessStrap,
        Part::HarnessDevice,
        Part::HarnessDeviceShade,
        Part::HarnessDeviceHighlight,
        Part::HarnessLock,
        Part::HarnessLineArt,
        Part::EyeWhites,
        Part::EyeIris,
        Part::EyeShade,
        Part::EyeHighlight,
        Part::EyeLids,
        Part::EyeLashes,
        Part::Tears,
        Part::MouthPlain,
        Part::MouthPlainShade,
        Part::MouthDrool,
        Part::DroolStrand,
        Part::Biribiri,
        Part::BiribiriGlow,
        Part::Gun,
        Part::Signature,
    ];

    /// File name of the asset backing this part, relative to the asset root.
    pub fn asset_name(self) -> &'static str {
        match self {
            Part::Background => "background.png",
            Part::BackgroundBlurred => "background-blur.png",
            Part::Chains => "chains.png",
            Part::BaseSilhouette => "base.png",
            Part::SukumizuBase => "sukumizu.png",
            Part::SukumizuTint => "sukumizu-tint-overlay.png",
            Part::SukumizuHighlight2 => "base-hi2-dodge.png",
            Part::SukumizuShadow => "base-shadow-multiply.png",
            Part::SukumizuLineArt => "sukumizu-line.png",
            Part::SukumizuHighlight => "base-hi-hardlight.png",
            Part::SukumizuTags => "sukumizu-tags.png",
            Part::HairBase => "hair0.png",
            Part::HairShade => "hair1-multiply.png",
            Part::HairTop => "hair2.png",
            Part::Outline => "outline.png",
            Part::HarnessBelt => "harness0.png",
            Part::HarnessBeltShade => "harness1-multiply.png",
            Part::HarnessStrap => "harness2.png",
            Part::HarnessDevice => "harness3.png",
            Part::HarnessDeviceShade => "harness4-multiply.png",
            Part::HarnessDeviceHighlight => "harness5-dodge.png",
            Part::HarnessLock => "harness6.png",
            Part::HarnessLineArt => "harness7.png",
            Part::EyeWhites => "eyes0.png",
            Part::EyeIris => "eyes1.png",
            Part::EyeShade => "eyes2-multiply.png",
            Part::EyeHighlight => "eyes3-dodge.png",
            Part::EyeLids => "eyes4.png",
            Part::EyeLashes => "eyes5.png",
            Part::Tears => "eyes6.png",
            Part::MouthPlain => "mouth0.png",
            Part::MouthPlainShade => "mouth0-multiply.png",
            Part::MouthDrool => "mouth1.png",
            Part::DroolStrand => "mouth1-overlay.png",
            Part::Biribiri => "biribiri.png",
            Part::BiribiriGlow => "biribiri-dodge.png",
            Part::Gun => "gun.png",
            Part::Signature => "signature.svg",
        }
    }

    /// Looks a part up by its asset file name.
    pub fn from_asset_name(name: &str) -> Option<Part> {
        Part::ALL.into_iter().find(|p| p.asset_name() == name)
    }

    /// Returns true if the asset is vector markup rather than an encoded raster.
    pub fn is_vector(self) -> bool {
        self.asset_name().ends_with(".svg")
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_name())
    }
}

// ============================================================================
// BlendMode
// ============================================================================

/// The composite operations used by the catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    SourceOver,
    Multiply,
    Overlay,
    ColorDodge,
    HardLight,
}

impl BlendMode {
    pub const ALL: [BlendMode; 5] = [
        BlendMode::SourceOver,
        BlendMode::Multiply,
        BlendMode::Overlay,
        BlendMode::ColorDodge,
        BlendMode::HardLight,
    ];

    /// The canvas `globalCompositeOperation` name.
    pub fn css_name(self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::Multiply => "multiply",
            BlendMode::Overlay => "overlay",
            BlendMode::ColorDodge => "color-dodge",
            BlendMode::HardLight => "hard-light",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

// ============================================================================
// ImageResource
// ============================================================================

/// A decoded raster asset and its one-shot ready state.
///
/// Created pending at scene construction; becomes ready exactly once when
/// its decoded image is resolved, and is immutable afterwards.
#[derive(Debug, Clone)]
pub struct ImageResource {
    uri: String,
    image: Option<RgbaImage>,
}

impl ImageResource {
    /// Creates a pending resource for `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            image: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Returns true once the decoded image has been resolved.
    pub fn is_ready(&self) -> bool {
        self.image.is_some()
    }

    /// The decoded image, if ready.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_ref()
    }

    /// Marks the resource ready with its decoded image.
    ///
    /// Returns false (and keeps the first image) if it was already ready.
    pub fn resolve(&mut self, image: RgbaImage) -> bool {
        if self.image.is_some() {
            return false;
        }
        self.image = Some(image);
        true
    }
}

// ============================================================================
// RenderTarget
// ============================================================================

/// A 2D drawing surface with canvas-like state.
///
/// Layers set the active filter and composite operation immediately before
/// drawing, then reset the filter.
pub trait RenderTarget {
    /// Logical size of the surface in pixels.
    fn size(&self) -> (u32, u32);

    /// Clears the surface to transparent.
    fn clear(&mut self);

    /// Sets (or removes) the filter applied to subsequent draws.
    fn set_filter(&mut self, filter: Option<FilterSpec>);

    /// Sets the composite operation used by subsequent draws.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Draws `image` stretched over the full surface.
    fn draw_image(&mut self, part: Part, image: &RgbaImage, opacity: f32);
}

// ============================================================================
// Layer
// ============================================================================

/// One image part drawn with a blend mode and an optional filter.
#[derive(Debug, Clone)]
pub struct Layer {
    part: Part,
    resource: ImageResource,
    blend_mode: BlendMode,
    opacity: f32,
    visible: bool,
    filter: Option<FilterSpec>,
}

impl Layer {
    /// Creates a visible, unfiltered, source-over layer for `part`.
    pub fn new(part: Part) -> Self {
        Self {
            part,
            resource: ImageResource::new(part.asset_name()),
            blend_mode: BlendMode::SourceOver,
            opacity: 1.0,
            visible: true,
            filter: None,
        }
    }

    pub fn with_blend_mode(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    /// Sets the global alpha used when drawing, clamped to `0..=1`.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn part(&self) -> Part {
        self.part
    }

    pub fn resource(&self) -> &ImageResource {
        &self.resource
    }

    pub fn resource_mut(&mut self) -> &mut ImageResource {
        &mut self.resource
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn filter(&self) -> Option<&FilterSpec> {
        self.filter.as_ref()
    }

    pub fn set_filter(&mut self, filter: Option<FilterSpec>) {
        self.filter = filter;
    }

    /// Draws the layer into `target` if it is visible and its image is decoded.
    ///
    /// Returns true if something was drawn. Undecoded or zero-sized images
    /// draw nothing.
    pub fn draw(&self, target: &mut dyn RenderTarget) -> bool {
        if !self.visible {
            return false;
        }
        let Some(image) = self.resource.image() else {
            return false;
        };
        if image.width() == 0 || image.height() == 0 {
            return false;
        }

        tracing::trace!(part = %self.part, blend = %self.blend_mode, "drawing layer");
        target.set_filter(self.filter);
        target.set_blend_mode(self.blend_mode);
        target.draw_image(self.part, image, self.opacity);
        target.set_filter(None);
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgba;

    /// One recorded draw call.
    #[derive(Debug, Clone, PartialEq)]
    pub struct DrawCall {
        pub part: Part,
        pub filter: Option<FilterSpec>,
        pub blend_mode: BlendMode,
        pub opacity: f32,
    }

    /// Records draw calls instead of touching pixels.
    #[derive(Debug, Default)]
    pub struct RecordingTarget {
        pub calls: Vec<DrawCall>,
        pub clears: usize,
        pub filter: Option<FilterSpec>,
        pub blend_mode: BlendMode,
    }

    impl RecordingTarget {
        pub fn parts(&self) -> Vec<Part> {
            self.calls.iter().map(|c| c.part).collect()
        }
    }

    impl RenderTarget for RecordingTarget {
        fn size(&self) -> (u32, u32) {
            (4, 4)
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.calls.clear();
        }

        fn set_filter(&mut self, filter: Option<FilterSpec>) {
            self.filter = filter;
        }

        fn set_blend_mode(&mut self, mode: BlendMode) {
            self.blend_mode = mode;
        }

        fn draw_image(&mut self, part: Part, _image: &RgbaImage, opacity: f32) {
            self.calls.push(DrawCall {
                part,
                filter: self.filter,
                blend_mode: self.blend_mode,
                opacity,
            });
        }
    }

    fn ready_layer(part: Part) -> Layer {
        let mut layer = Layer::new(part);
        layer
            .resource_mut()
            .resolve(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])));
        layer
    }

    #[test]
    fn catalogue_is_unique_and_ordered() {
        let mut sorted = Part::ALL.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), Part::ALL.len());
        assert_eq!(sorted, Part::ALL.to_vec());
        assert_eq!(Part::ALL.last(), Some(&Part::Signature));
    }

    #[test]
    fn asset_names_round_trip() {
        for part in Part::ALL {
            assert_eq!(Part::from_asset_name(part.asset_name()), Some(part));
        }
        assert_eq!(Part::from_asset_name("missing.png"), None);
        assert!(Part::Signature.is_vector());
        assert!(!Part::Gun.is_vector());
    }

    #[test]
    fn resource_resolves_once() {
        let mut res = ImageResource::new("gun.png");
        assert!(!res.is_ready());
        assert!(res.resolve(RgbaImage::new(2, 2)));
        assert!(res.is_ready());
        assert!(!res.resolve(RgbaImage::new(8, 8)));
        assert_eq!(res.image().unwrap().width(), 2);
    }

    #[test]
    fn draw_sets_state_then_resets_filter() {
        let mut layer = ready_layer(Part::SukumizuShadow).with_blend_mode(BlendMode::Multiply);
        let spec = FilterSpec::new(10.0, 120.0, 90.0);
        layer.set_filter(Some(spec));

        let mut target = RecordingTarget::default();
        assert!(layer.draw(&mut target));

        assert_eq!(
            target.calls,
            vec![DrawCall {
                part: Part::SukumizuShadow,
                filter: Some(spec),
                blend_mode: BlendMode::Multiply,
                opacity: 1.0,
            }]
        );
        assert_eq!(target.filter, None);
    }

    #[test]
    fn hidden_or_undecoded_layers_draw_nothing() {
        let mut target = RecordingTarget::default();

        let pending = Layer::new(Part::Gun);
        assert!(!pending.draw(&mut target));

        let mut hidden = ready_layer(Part::Gun);
        hidden.set_visible(false);
        assert!(!hidden.draw(&mut target));

        let mut empty = Layer::new(Part::Gun);
        empty.resource_mut().resolve(RgbaImage::new(0, 0));
        assert!(!empty.draw(&mut target));

        assert!(target.calls.is_empty());
    }

    #[test]
    fn blend_modes_use_canvas_names() {
        let names: Vec<String> = BlendMode::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["source-over", "multiply", "overlay", "color-dodge", "hard-light"]
        );
        assert_eq!(BlendMode::default().css_name(), "source-over");
    }

    #[test]
    fn opacity_is_clamped() {
        assert_eq!(Layer::new(Part::SukumizuTint).with_opacity(1.7).opacity(), 1.0);
        assert_eq!(Layer::new(Part::SukumizuTint).with_opacity(0.3).opacity(), 0.3);
    }
}
