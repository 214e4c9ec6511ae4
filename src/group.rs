//! Colour groups and their HSB controllers.
//!
//! A colour group is the unit of colour adjustment: every member layer
//! receives the same [`FilterSpec`]. The [`HsbController`] owns the group's
//! current triple, normalizes input from the controls, and pushes the whole
//! filter to every member in one step so no render can observe a
//! half-updated group.

use std::fmt;

use rand::Rng;

use crate::filter::FilterSpec;
use crate::layer::Part;
use crate::scene::Scene;

// ============================================================================
// GroupId
// ============================================================================

/// The five colour-adjustable groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupId {
    Sukumizu,
    Eyes,
    HarnessDevice,
    HarnessBelt,
    Hair,
}

impl GroupId {
    /// All groups, in serialization order.
    pub const ALL: [GroupId; 5] = [
        GroupId::Sukumizu,
        GroupId::Eyes,
        GroupId::HarnessDevice,
        GroupId::HarnessBelt,
        GroupId::Hair,
    ];

    /// Layers that receive this group's filter.
    ///
    /// Only the colour-bearing layers are members: the eyelids, tears and the
    /// shading layers of the hair keep their original colours.
    pub fn members(self) -> &'static [Part] {
        match self {
            GroupId::Sukumizu => &[
                Part::SukumizuBase,
                Part::SukumizuHighlight2,
                Part::SukumizuShadow,
            ],
            GroupId::Eyes => &[Part::EyeIris],
            GroupId::HarnessDevice => &[Part::HarnessDevice],
            GroupId::HarnessBelt => &[Part::HarnessBelt],
            GroupId::Hair => &[Part::HairBase],
        }
    }

    /// Stable camelCase name, as used in JSON presets.
    pub fn name(self) -> &'static str {
        match self {
            GroupId::Sukumizu => "sukumizu",
            GroupId::Eyes => "eyes",
            GroupId::HarnessDevice => "harnessDevice",
            GroupId::HarnessBelt => "harnessBelt",
            GroupId::Hair => "hair",
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ControlRanges
// ============================================================================

/// Declared maxima of a group's three slider controls.
///
/// Only [`HsbController::randomize`] consults these; the setters accept
/// whatever the control reports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRanges {
    pub hue_max: u32,
    pub saturation_max: u32,
    pub brightness_max: u32,
}

impl Default for ControlRanges {
    fn default() -> Self {
        Self {
            hue_max: 360,
            saturation_max: 200,
            brightness_max: 200,
        }
    }
}

// ============================================================================
// HsbController
// ============================================================================

/// Owns the (hue, saturation, brightness) triple of one colour group.
#[derive(Debug, Clone)]
pub struct HsbController {
    group: GroupId,
    members: Vec<Part>,
    ranges: ControlRanges,
    filter: FilterSpec,
}

impl HsbController {
    /// Creates a controller driving exactly `members`, starting at identity.
    pub fn new(group: GroupId, members: impl Into<Vec<Part>>, ranges: ControlRanges) -> Self {
        Self {
            group,
            members: members.into(),
            ranges,
            filter: FilterSpec::IDENTITY,
        }
    }

    /// Creates a controller for the catalogue members of `group`.
    pub fn for_group(group: GroupId) -> Self {
        Self::new(group, group.members(), ControlRanges::default())
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn members(&self) -> &[Part] {
        &self.members
    }

    pub fn ranges(&self) -> ControlRanges {
        self.ranges
    }

    /// The current composed filter.
    pub fn filter(&self) -> FilterSpec {
        self.filter
    }

    /// The current values, for reflecting back into the controls.
    pub fn values(&self) -> (f64, f64, f64) {
        (self.filter.hue, self.filter.saturation, self.filter.brightness)
    }

    /// Sets the hue: negatives clamp to 0, everything else wraps modulo 360.
    pub fn set_hue(&mut self, degrees: f64) -> FilterSpec {
        self.filter.hue = FilterSpec::normalize_hue(degrees);
        self.filter
    }

    /// Sets the saturation percentage as given.
    pub fn set_saturation(&mut self, percent: f64) -> FilterSpec {
        self.filter.saturation = percent;
        self.filter
    }

    /// Sets the brightness percentage as given.
    pub fn set_brightness(&mut self, percent: f64) -> FilterSpec {
        self.filter.brightness = percent;
        self.filter
    }

    /// Replaces the whole triple, normalizing the hue.
    pub fn set_filter(&mut self, filter: FilterSpec) -> FilterSpec {
        self.filter = FilterSpec::new(filter.hue, filter.saturation, filter.brightness);
        self.filter
    }

    /// Draws each value uniformly from `0..=max` of its control.
    ///
    /// Values are whole numbers, as a stepped slider would report them.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> FilterSpec {
        let hue = rng.random_range(0..=self.ranges.hue_max) as f64;
        let saturation = rng.random_range(0..=self.ranges.saturation_max) as f64;
        let brightness = rng.random_range(0..=self.ranges.brightness_max) as f64;
        self.set_filter(FilterSpec {
            hue,
            saturation,
            brightness,
        })
    }

    /// Pushes the current filter to every member layer of `scene`.
    pub fn push(&self, scene: &mut Scene) {
        tracing::trace!(group = %self.group, filter = %self.filter.css(), "pushing group filter");
        for part in &self.members {
            scene.set_layer_filter(*part, Some(self.filter));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn hue_setter_normalizes() {
        let mut ctrl = HsbController::for_group(GroupId::Eyes);
        assert_eq!(ctrl.set_hue(-5.0).hue, 0.0);
        assert_eq!(ctrl.set_hue(400.0).hue, 40.0);
        assert_eq!(ctrl.set_hue(360.0).hue, 0.0);
        assert_eq!(ctrl.set_hue(359.0).hue, 359.0);
    }

    #[test]
    fn saturation_and_brightness_pass_through() {
        let mut ctrl = HsbController::for_group(GroupId::Hair);
        ctrl.set_saturation(250.0);
        ctrl.set_brightness(-3.0);
        assert_eq!(ctrl.values(), (0.0, 250.0, -3.0));
    }

    #[test]
    fn setters_are_independent() {
        let mut ctrl = HsbController::for_group(GroupId::Sukumizu);
        ctrl.set_hue(10.0);
        ctrl.set_saturation(120.0);
        ctrl.set_brightness(90.0);
        assert_eq!(ctrl.filter(), FilterSpec::new(10.0, 120.0, 90.0));
        assert_eq!(
            ctrl.filter().css(),
            "hue-rotate(10deg) saturate(120%) brightness(90%)"
        );
    }

    #[test]
    fn randomize_stays_within_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ctrl = HsbController::new(
            GroupId::HarnessBelt,
            GroupId::HarnessBelt.members(),
            ControlRanges {
                hue_max: 360,
                saturation_max: 150,
                brightness_max: 120,
            },
        );

        for _ in 0..200 {
            let f = ctrl.randomize(&mut rng);
            assert!((0.0..360.0).contains(&f.hue));
            assert!((0.0..=150.0).contains(&f.saturation));
            assert!((0.0..=120.0).contains(&f.brightness));
            assert_eq!(f.hue.fract(), 0.0);
            assert_eq!(f.saturation.fract(), 0.0);
        }
    }

    #[test]
    fn randomize_is_deterministic_for_a_seed() {
        let mut a = HsbController::for_group(GroupId::Eyes);
        let mut b = HsbController::for_group(GroupId::Eyes);
        let fa = a.randomize(&mut StdRng::seed_from_u64(42));
        let fb = b.randomize(&mut StdRng::seed_from_u64(42));
        assert_eq!(fa, fb);
    }

    #[test]
    fn group_members_match_catalogue() {
        assert_eq!(GroupId::Sukumizu.members().len(), 3);
        for group in GroupId::ALL {
            if group != GroupId::Sukumizu {
                assert_eq!(group.members().len(), 1);
            }
        }
        assert!(!GroupId::Eyes.members().contains(&Part::Tears));
        assert!(!GroupId::Hair.members().contains(&Part::HairShade));
    }

    #[test]
    fn group_names_match_preset_keys() {
        let json = serde_json::to_value(crate::Configuration::default()).unwrap();
        for group in GroupId::ALL {
            assert!(json.get(group.name()).is_some(), "missing key {group}");
        }
        assert_eq!(GroupId::HarnessBelt.to_string(), "harnessBelt");
    }

    #[test]
    fn push_updates_every_member() {
        let mut scene = Scene::new(Default::default());
        let mut ctrl = HsbController::for_group(GroupId::Sukumizu);
        ctrl.set_hue(90.0);
        ctrl.push(&mut scene);

        for part in GroupId::Sukumizu.members() {
            assert_eq!(scene.layer(*part).unwrap().filter(), Some(&ctrl.filter()));
        }
        assert_eq!(scene.layer(Part::SukumizuTint).unwrap().filter(), None);
    }
}
