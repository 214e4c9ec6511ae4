//! The serializable scene configuration.
//!
//! A [`Configuration`] is everything a share link carries: the five group
//! filters and the boolean toggles. Besides the compact URL token (see
//! [`crate::codec`]) it round-trips through JSON for presets.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "sukumizu": { "hue": 10.0, "saturation": 120.0, "brightness": 90.0 },
//!   "eyes": { "hue": 0.0, "saturation": 100.0, "brightness": 100.0 },
//!   "harnessDevice": { "hue": 0.0, "saturation": 100.0, "brightness": 100.0 },
//!   "harnessBelt": { "hue": 0.0, "saturation": 100.0, "brightness": 100.0 },
//!   "hair": { "hue": 0.0, "saturation": 100.0, "brightness": 100.0 },
//!   "eyesVisible": true,
//!   "tearsVisible": false,
//!   "harnessVisible": true,
//!   "harnessBeltVisible": true,
//!   "biribiriVisible": false,
//!   "gunVisible": false,
//!   "droolingVariant": false,
//!   "backgroundBlur": false
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::filter::FilterSpec;
use crate::group::GroupId;
use crate::scene::Toggles;

/// Trait for types whose state can be captured as a [`Configuration`].
pub trait Configurable {
    /// Applies a configuration's settings to this instance.
    fn apply_configuration(&mut self, configuration: &Configuration);

    /// Exports the current settings as a configuration.
    fn export_configuration(&self) -> Configuration;
}

/// Five group filters plus the toggles.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub sukumizu: FilterSpec,
    pub eyes: FilterSpec,
    pub harness_device: FilterSpec,
    pub harness_belt: FilterSpec,
    pub hair: FilterSpec,

    #[serde(flatten)]
    pub toggles: Toggles,
}

impl Configuration {
    /// The default configuration: identity filters and default toggles.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self, group: GroupId) -> FilterSpec {
        match group {
            GroupId::Sukumizu => self.sukumizu,
            GroupId::Eyes => self.eyes,
            GroupId::HarnessDevice => self.harness_device,
            GroupId::HarnessBelt => self.harness_belt,
            GroupId::Hair => self.hair,
        }
    }

    pub fn set_filter(&mut self, group: GroupId, filter: FilterSpec) {
        let slot = match group {
            GroupId::Sukumizu => &mut self.sukumizu,
            GroupId::Eyes => &mut self.eyes,
            GroupId::HarnessDevice => &mut self.harness_device,
            GroupId::HarnessBelt => &mut self.harness_belt,
            GroupId::Hair => &mut self.hair,
        };
        *slot = filter;
    }

    /// Sets a group filter, builder style.
    pub fn with_filter(mut self, group: GroupId, filter: FilterSpec) -> Self {
        self.set_filter(group, filter);
        self
    }

    /// Sets the toggles, builder style.
    pub fn with_toggles(mut self, toggles: Toggles) -> Self {
        self.toggles = toggles;
        self
    }

    /// Serializes the configuration to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the configuration to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a configuration from a JSON string.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
