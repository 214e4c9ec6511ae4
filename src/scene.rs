//! The fixed, ordered catalogue of layers and the toggles that gate it.
//!
//! # Draw Order
//!
//! ```text
//! background | background-blurred
//! chains
//! base silhouette
//! sukumizu   (7 layers)
//! hair       (3 layers)
//! outline
//! harness    (8 layers, if harness visible; belt layer follows its own flag)
//! eyes       (7 layers, if eyes visible; tears layer follows its own flag)
//! mouth      (plain pair | drooling pair)
//! biribiri   (2 layers, if enabled)
//! gun        (if enabled)
//! signature  (always last)
//! ```

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::{RendererError, RendererResult};
use crate::filter::FilterSpec;
use crate::layer::{BlendMode, Layer, Part, RenderTarget};

// ============================================================================
// Toggles
// ============================================================================

/// A boolean switch exposed to the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Toggle {
    Eyes,
    Tears,
    Harness,
    HarnessBelt,
    Biribiri,
    Gun,
    DroolingVariant,
    BackgroundBlur,
}

impl Toggle {
    /// All toggles, in serialization order.
    pub const ALL: [Toggle; 8] = [
        Toggle::Eyes,
        Toggle::Tears,
        Toggle::Harness,
        Toggle::HarnessBelt,
        Toggle::Biribiri,
        Toggle::Gun,
        Toggle::DroolingVariant,
        Toggle::BackgroundBlur,
    ];
}

/// The boolean half of a scene configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Toggles {
    pub eyes_visible: bool,
    pub tears_visible: bool,
    pub harness_visible: bool,
    pub harness_belt_visible: bool,
    pub biribiri_visible: bool,
    pub gun_visible: bool,
    pub drooling_variant: bool,
    pub background_blur: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            eyes_visible: true,
            tears_visible: false,
            harness_visible: true,
            harness_belt_visible: true,
            biribiri_visible: false,
            gun_visible: false,
            drooling_variant: false,
            background_blur: false,
        }
    }
}

impl Toggles {
    pub fn get(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Eyes => self.eyes_visible,
            Toggle::Tears => self.tears_visible,
            Toggle::Harness => self.harness_visible,
            Toggle::HarnessBelt => self.harness_belt_visible,
            Toggle::Biribiri => self.biribiri_visible,
            Toggle::Gun => self.gun_visible,
            Toggle::DroolingVariant => self.drooling_variant,
            Toggle::BackgroundBlur => self.background_blur,
        }
    }

    /// Sets one flag with no cross-flag rules applied.
    pub fn set(&mut self, toggle: Toggle, value: bool) {
        let slot = match toggle {
            Toggle::Eyes => &mut self.eyes_visible,
            Toggle::Tears => &mut self.tears_visible,
            Toggle::Harness => &mut self.harness_visible,
            Toggle::HarnessBelt => &mut self.harness_belt_visible,
            Toggle::Biribiri => &mut self.biribiri_visible,
            Toggle::Gun => &mut self.gun_visible,
            Toggle::DroolingVariant => &mut self.drooling_variant,
            Toggle::BackgroundBlur => &mut self.background_blur,
        };
        *slot = value;
    }
}

/// The mutually exclusive effect overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    Biribiri,
    Gun,
}

// ============================================================================
// FeatureSet
// ============================================================================

/// Optional features a customizer variant exposes.
///
/// A disabled feature's toggle stays at its default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSet {
    pub tears: bool,
    pub background_blur: bool,
    pub drooling_variant: bool,
    pub hue_cycle: bool,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            tears: true,
            background_blur: true,
            drooling_variant: true,
            hue_cycle: true,
        }
    }
}

impl FeatureSet {
    /// The first published page: tears and the hue cycle, no blur or drooling.
    pub fn classic() -> Self {
        Self {
            tears: true,
            background_blur: false,
            drooling_variant: false,
            hue_cycle: true,
        }
    }

    /// Returns true if `toggle` may be changed under this feature set.
    pub fn allows(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Tears => self.tears,
            Toggle::BackgroundBlur => self.background_blur,
            Toggle::DroolingVariant => self.drooling_variant,
            _ => true,
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// A contiguous run of layers in the draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Background,
    Backdrop,
    Base,
    Sukumizu,
    Hair,
    Outline,
    Harness,
    Eyes,
    Mouth,
    Biribiri,
    Gun,
    Signature,
}

#[derive(Debug, Clone)]
pub struct Section {
    kind: SectionKind,
    layers: Vec<Layer>,
}

impl Section {
    fn new(kind: SectionKind, layers: Vec<Layer>) -> Self {
        Self { kind, layers }
    }

    pub fn kind(&self) -> SectionKind {
        self.kind
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}

fn catalogue() -> Vec<Section> {
    use BlendMode::*;
    use Part::*;

    let plain = Layer::new;
    let blended = |part, mode| Layer::new(part).with_blend_mode(mode);

    vec![
        Section::new(
            SectionKind::Background,
            vec![plain(Background), plain(BackgroundBlurred)],
        ),
        Section::new(SectionKind::Backdrop, vec![plain(Chains)]),
        Section::new(SectionKind::Base, vec![plain(BaseSilhouette)]),
        Section::new(
            SectionKind::Sukumizu,
            vec![
                plain(SukumizuBase),
                blended(SukumizuTint, Overlay).with_opacity(0.3),
                blended(SukumizuHighlight2, ColorDodge),
                blended(SukumizuShadow, Multiply),
                plain(SukumizuLineArt),
                blended(SukumizuHighlight, HardLight),
                plain(SukumizuTags),
            ],
        ),
        Section::new(
            SectionKind::Hair,
            vec![plain(HairBase), blended(HairShade, Multiply), plain(HairTop)],
        ),
        Section::new(SectionKind::Outline, vec![plain(Outline)]),
        Section::new(
            SectionKind::Harness,
            vec![
                plain(HarnessBelt),
                blended(HarnessBeltShade, Multiply),
                plain(HarnessStrap),
                plain(HarnessDevice),
                blended(HarnessDeviceShade, Multiply),
                blended(HarnessDeviceHighlight, ColorDodge),
                plain(HarnessLock),
                plain(HarnessLineArt),
            ],
        ),
        Section::new(
            SectionKind::Eyes,
            vec![
                plain(EyeWhites),
                plain(EyeIris),
                blended(EyeShade, Multiply),
                blended(EyeHighlight, ColorDodge),
                plain(EyeLids),
                plain(EyeLashes),
                plain(Tears),
            ],
        ),
        Section::new(
            SectionKind::Mouth,
            vec![
                plain(MouthPlain),
                blended(MouthPlainShade, Multiply),
                plain(MouthDrool),
                blended(DroolStrand, Overlay),
            ],
        ),
        Section::new(
            SectionKind::Biribiri,
            vec![plain(Biribiri), blended(BiribiriGlow, ColorDodge)],
        ),
        Section::new(SectionKind::Gun, vec![plain(Gun)]),
        Section::new(SectionKind::Signature, vec![plain(Signature)]),
    ]
}

// ============================================================================
// Scene
// ============================================================================

/// The full ordered catalogue of layers plus the visibility toggles.
#[derive(Debug, Clone)]
pub struct Scene {
    features: FeatureSet,
    sections: Vec<Section>,
    toggles: Toggles,
}

impl Scene {
    /// Builds the catalogue with every resource pending and default toggles.
    pub fn new(features: FeatureSet) -> Self {
        let mut scene = Self {
            features,
            sections: catalogue(),
            toggles: Toggles::default(),
        };
        scene.sync_visibility();
        scene
    }

    pub fn features(&self) -> FeatureSet {
        self.features
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// All layers in draw order.
    pub fn layers(&self) -> impl Iterator<Item = &Layer> {
        self.sections.iter().flat_map(|s| s.layers.iter())
    }

    pub fn layer(&self, part: Part) -> Option<&Layer> {
        self.layers().find(|l| l.part() == part)
    }

    pub fn layer_mut(&mut self, part: Part) -> Option<&mut Layer> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.layers.iter_mut())
            .find(|l| l.part() == part)
    }

    /// Sets the filter of a single layer.
    pub fn set_layer_filter(&mut self, part: Part, filter: Option<FilterSpec>) {
        if let Some(layer) = self.layer_mut(part) {
            layer.set_filter(filter);
        }
    }

    // ---- Resources ----

    /// Parts whose resources have not reported ready yet.
    pub fn pending_parts(&self) -> Vec<Part> {
        self.layers()
            .filter(|l| !l.resource().is_ready())
            .map(|l| l.part())
            .collect()
    }

    /// Returns true once every resource is ready.
    pub fn is_ready(&self) -> bool {
        self.layers().all(|l| l.resource().is_ready())
    }

    /// Resolves the resource of `part` with its decoded image.
    ///
    /// Returns false if the resource had already resolved.
    pub fn resolve_resource(&mut self, part: Part, image: RgbaImage) -> RendererResult<bool> {
        let layer = self
            .layer_mut(part)
            .ok_or_else(|| RendererError::unknown_asset(part.asset_name()))?;
        Ok(layer.resource_mut().resolve(image))
    }

    // ---- Toggles ----

    /// Applies a toggle change the way the controls do.
    ///
    /// - Enabling biribiri clears the gun, and vice versa.
    /// - The harness switch carries the harness belt with it.
    /// - Toggles of disabled features are ignored.
    pub fn set_toggle(&mut self, toggle: Toggle, value: bool) {
        if !self.features.allows(toggle) {
            tracing::debug!(?toggle, "toggle ignored: feature disabled");
            return;
        }

        self.toggles.set(toggle, value);
        match (toggle, value) {
            (Toggle::Biribiri, true) => self.toggles.gun_visible = false,
            (Toggle::Gun, true) => self.toggles.biribiri_visible = false,
            (Toggle::Harness, v) => self.toggles.harness_belt_visible = v,
            _ => {}
        }
        self.sync_visibility();
    }

    /// Flips a toggle through [`Scene::set_toggle`] and returns its new value.
    pub fn toggle(&mut self, toggle: Toggle) -> bool {
        let next = !self.toggles.get(toggle);
        self.set_toggle(toggle, next);
        self.toggles.get(toggle)
    }

    /// Replaces every flag as given, without the cross-flag rules.
    ///
    /// Flags of disabled features are pinned to their defaults.
    pub fn set_toggles(&mut self, toggles: Toggles) {
        let defaults = Toggles::default();
        self.toggles = toggles;
        for toggle in Toggle::ALL {
            if !self.features.allows(toggle) {
                self.toggles.set(toggle, defaults.get(toggle));
            }
        }
        self.sync_visibility();
    }

    /// Selects one of the mutually exclusive effects.
    pub fn select_effect(&mut self, effect: Effect) {
        self.toggles.biribiri_visible = effect == Effect::Biribiri;
        self.toggles.gun_visible = effect == Effect::Gun;
        self.sync_visibility();
    }

    /// The currently shown effect. Biribiri wins if both flags are set.
    pub fn effect(&self) -> Effect {
        if self.toggles.biribiri_visible {
            Effect::Biribiri
        } else if self.toggles.gun_visible {
            Effect::Gun
        } else {
            Effect::None
        }
    }

    /// Returns true if layers of `kind` are drawn under the current toggles.
    pub fn section_enabled(&self, kind: SectionKind) -> bool {
        match kind {
            SectionKind::Harness => self.toggles.harness_visible,
            SectionKind::Eyes => self.toggles.eyes_visible,
            SectionKind::Biribiri => self.toggles.biribiri_visible,
            SectionKind::Gun => self.toggles.gun_visible,
            _ => true,
        }
    }

    /// Pushes toggle state down to the layers that switch individually.
    fn sync_visibility(&mut self) {
        let t = self.toggles;
        let flags = [
            (Part::Background, !t.background_blur),
            (Part::BackgroundBlurred, t.background_blur),
            (Part::HarnessBelt, t.harness_belt_visible),
            (Part::Tears, t.tears_visible),
            (Part::MouthPlain, !t.drooling_variant),
            (Part::MouthPlainShade, !t.drooling_variant),
            (Part::MouthDrool, t.drooling_variant),
            (Part::DroolStrand, t.drooling_variant),
        ];
        for (part, visible) in flags {
            if let Some(layer) = self.layer_mut(part) {
                layer.set_visible(visible);
            }
        }
    }

    // ---- Rendering ----

    /// Clears `target` and draws every enabled layer in catalogue order.
    ///
    /// Returns the number of layers drawn.
    pub fn render(&self, target: &mut dyn RenderTarget) -> usize {
        target.clear();

        let mut drawn = 0;
        for section in &self.sections {
            if !self.section_enabled(section.kind) {
                continue;
            }
            for layer in &section.layers {
                if layer.draw(target) {
                    drawn += 1;
                }
            }
        }

        tracing::trace!(drawn, "scene rendered");
        drawn
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::tests::RecordingTarget;
    use image::Rgba;

    fn ready_scene(features: FeatureSet) -> Scene {
        let mut scene = Scene::new(features);
        for part in Part::ALL {
            scene
                .resolve_resource(part, RgbaImage::from_pixel(4, 4, Rgba([50, 60, 70, 255])))
                .unwrap();
        }
        scene
    }

    fn drawn(scene: &Scene) -> Vec<Part> {
        let mut target = RecordingTarget::default();
        scene.render(&mut target);
        target.parts()
    }

    #[test]
    fn catalogue_sizes() {
        let scene = Scene::new(FeatureSet::default());
        let len = |kind| {
            scene
                .sections()
                .iter()
                .find(|s| s.kind() == kind)
                .unwrap()
                .layers()
                .len()
        };
        assert_eq!(len(SectionKind::Sukumizu), 7);
        assert_eq!(len(SectionKind::Hair), 3);
        assert_eq!(len(SectionKind::Harness), 8);
        assert_eq!(len(SectionKind::Biribiri), 2);
        assert_eq!(len(SectionKind::Gun), 1);
        assert_eq!(scene.layers().count(), Part::ALL.len());

        let order: Vec<Part> = scene.layers().map(|l| l.part()).collect();
        assert_eq!(order, Part::ALL.to_vec());
    }

    #[test]
    fn default_render_order() {
        let scene = ready_scene(FeatureSet::default());
        let parts = drawn(&scene);

        assert_eq!(parts.first(), Some(&Part::Background));
        assert_eq!(parts.last(), Some(&Part::Signature));
        assert!(!parts.contains(&Part::BackgroundBlurred));
        assert!(!parts.contains(&Part::Tears));
        assert!(!parts.contains(&Part::Biribiri));
        assert!(!parts.contains(&Part::Gun));
        assert!(!parts.contains(&Part::MouthDrool));
        assert!(parts.contains(&Part::MouthPlain));
        assert!(parts.contains(&Part::HarnessBelt));

        let mut sorted = parts.clone();
        sorted.sort();
        assert_eq!(parts, sorted, "draw order must follow the catalogue");
    }

    #[test]
    fn signature_is_last_for_every_toggle_combination() {
        for bits in 0u32..(1 << Toggle::ALL.len()) {
            let mut toggles = Toggles::default();
            for (i, toggle) in Toggle::ALL.into_iter().enumerate() {
                toggles.set(toggle, bits & (1 << i) != 0);
            }

            let mut scene = ready_scene(FeatureSet::default());
            scene.set_toggles(toggles);
            let parts = drawn(&scene);

            assert_eq!(parts.last(), Some(&Part::Signature), "toggles: {:?}", toggles);
            assert_eq!(parts.iter().filter(|p| **p == Part::Signature).count(), 1);
        }
    }

    #[test]
    fn hidden_sections_are_skipped() {
        let mut scene = ready_scene(FeatureSet::default());
        scene.set_toggle(Toggle::Eyes, false);
        scene.set_toggle(Toggle::Harness, false);
        let parts = drawn(&scene);

        assert!(parts.iter().all(|p| !matches!(p, Part::EyeWhites | Part::EyeIris | Part::Tears)));
        assert!(parts.iter().all(|p| !matches!(p, Part::HarnessDevice | Part::HarnessBelt)));
    }

    #[test]
    fn tears_and_belt_follow_their_flags() {
        let mut scene = ready_scene(FeatureSet::default());
        scene.set_toggle(Toggle::Tears, true);
        scene.set_toggle(Toggle::HarnessBelt, false);
        let parts = drawn(&scene);

        assert!(parts.contains(&Part::Tears));
        assert!(!parts.contains(&Part::HarnessBelt));
        assert!(parts.contains(&Part::HarnessDevice));
    }

    #[test]
    fn exactly_one_mouth_pair() {
        let mut scene = ready_scene(FeatureSet::default());
        scene.set_toggle(Toggle::DroolingVariant, true);
        let parts = drawn(&scene);

        assert!(parts.contains(&Part::MouthDrool));
        assert!(parts.contains(&Part::DroolStrand));
        assert!(!parts.contains(&Part::MouthPlain));
        assert!(!parts.contains(&Part::MouthPlainShade));
    }

    #[test]
    fn background_alternatives() {
        let mut scene = ready_scene(FeatureSet::default());
        scene.set_toggle(Toggle::BackgroundBlur, true);
        let parts = drawn(&scene);

        assert_eq!(parts.first(), Some(&Part::BackgroundBlurred));
        assert!(!parts.contains(&Part::Background));
    }

    #[test]
    fn biribiri_and_gun_are_exclusive_through_toggles() {
        let mut scene = Scene::new(FeatureSet::default());
        scene.set_toggle(Toggle::Gun, true);
        scene.set_toggle(Toggle::Biribiri, true);
        let t = scene.toggles();
        assert!(t.biribiri_visible ^ t.gun_visible);
        assert!(t.biribiri_visible);

        assert!(scene.toggle(Toggle::Gun));
        let t = scene.toggles();
        assert!(t.gun_visible && !t.biribiri_visible);
        assert_eq!(scene.effect(), Effect::Gun);

        scene.select_effect(Effect::None);
        assert_eq!(scene.effect(), Effect::None);
    }

    #[test]
    fn raw_setter_does_not_enforce_exclusivity() {
        let mut scene = Scene::new(FeatureSet::default());
        scene.set_toggles(Toggles {
            biribiri_visible: true,
            gun_visible: true,
            ..Toggles::default()
        });
        assert!(scene.toggles().biribiri_visible && scene.toggles().gun_visible);
        assert_eq!(scene.effect(), Effect::Biribiri);
    }

    #[test]
    fn harness_toggle_carries_belt() {
        let mut scene = Scene::new(FeatureSet::default());
        assert!(!scene.toggle(Toggle::Harness));
        assert!(!scene.toggles().harness_belt_visible);
        assert!(scene.toggle(Toggle::Harness));
        assert!(scene.toggles().harness_belt_visible);
    }

    #[test]
    fn disabled_features_pin_their_toggles() {
        let mut scene = Scene::new(FeatureSet::classic());
        scene.set_toggle(Toggle::BackgroundBlur, true);
        assert!(!scene.toggles().background_blur);

        scene.set_toggles(Toggles {
            drooling_variant: true,
            tears_visible: true,
            ..Toggles::default()
        });
        assert!(!scene.toggles().drooling_variant);
        assert!(scene.toggles().tears_visible);
    }

    #[test]
    fn nothing_drawn_before_resources_resolve() {
        let scene = Scene::new(FeatureSet::default());
        assert!(!scene.is_ready());
        assert_eq!(scene.pending_parts().len(), Part::ALL.len());
        assert!(drawn(&scene).is_empty());
    }

    #[test]
    fn filters_reach_the_target() {
        let mut scene = ready_scene(FeatureSet::default());
        let spec = FilterSpec::new(200.0, 80.0, 110.0);
        scene.set_layer_filter(Part::HairBase, Some(spec));

        let mut target = RecordingTarget::default();
        scene.render(&mut target);

        let hair = target.calls.iter().find(|c| c.part == Part::HairBase).unwrap();
        assert_eq!(hair.filter, Some(spec));
        let top = target.calls.iter().find(|c| c.part == Part::HairTop).unwrap();
        assert_eq!(top.filter, None);
        let shade = target.calls.iter().find(|c| c.part == Part::HairShade).unwrap();
        assert_eq!(shade.blend_mode, BlendMode::Multiply);
    }
}
