//! Key/value query encoding.
//!
//! Each field has a short key. Filters are written as `hue-saturation-brightness`
//! and flags as `1`/`0`:
//!
//! ```text
//! suk=10-120-90&eye=0-100-100&hdv=0-100-100&hbt=0-100-100&hai=0-100-100
//!   &eys=1&tea=0&har=1&hbl=1&bri=0&gun=0&drl=0&blr=0
//! ```
//!
//! A missing or malformed filter decodes as `0-100-100`, a missing or
//! malformed flag as `0`, so links from schemas with fewer keys stay valid.
//! `suk` marks that a configuration is present at all.
//!
//! The `-` separator leaves no room for a sign, so filters only round-trip
//! when every component is non-negative. A negative component decodes as the
//! default filter.

use std::collections::HashMap;

use url::Url;
use url::form_urlencoded;

use super::{CodecError, ConfigurationCodec};
use crate::configuration::Configuration;
use crate::filter::FilterSpec;
use crate::group::GroupId;
use crate::scene::Toggle;

/// The key whose presence means a configuration is encoded.
pub const SENTINEL_KEY: &str = "suk";

pub fn filter_key(group: GroupId) -> &'static str {
    match group {
        GroupId::Sukumizu => "suk",
        GroupId::Eyes => "eye",
        GroupId::HarnessDevice => "hdv",
        GroupId::HarnessBelt => "hbt",
        GroupId::Hair => "hai",
    }
}

pub fn toggle_key(toggle: Toggle) -> &'static str {
    match toggle {
        Toggle::Eyes => "eys",
        Toggle::Tears => "tea",
        Toggle::Harness => "har",
        Toggle::HarnessBelt => "hbl",
        Toggle::Biribiri => "bri",
        Toggle::Gun => "gun",
        Toggle::DroolingVariant => "drl",
        Toggle::BackgroundBlur => "blr",
    }
}

/// Parses `h-s-b`. Negative components cannot be represented.
fn parse_filter(value: &str) -> Option<FilterSpec> {
    let parts: Vec<f64> = value
        .split('-')
        .map(|p| p.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        &[h, s, b] => Some(FilterSpec::new(h, s, b)),
        _ => None,
    }
}

fn format_filter(filter: FilterSpec) -> String {
    format!("{}-{}-{}", filter.hue, filter.saturation, filter.brightness)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryCodec;

impl QueryCodec {
    fn from_pairs(pairs: &HashMap<String, String>) -> Configuration {
        let mut configuration = Configuration::default();

        for group in GroupId::ALL {
            let key = filter_key(group);
            let filter = match pairs.get(key).map(|v| (v, parse_filter(v))) {
                Some((_, Some(filter))) => filter,
                Some((raw, None)) => {
                    tracing::debug!(key, value = %raw, "malformed filter, using default");
                    FilterSpec::IDENTITY
                }
                None => FilterSpec::IDENTITY,
            };
            configuration.set_filter(group, filter);
        }

        for toggle in Toggle::ALL {
            let value = pairs.get(toggle_key(toggle)).is_some_and(|v| v == "1");
            configuration.toggles.set(toggle, value);
        }

        configuration
    }
}

impl ConfigurationCodec for QueryCodec {
    fn encode(&self, configuration: &Configuration) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for group in GroupId::ALL {
            serializer.append_pair(filter_key(group), &format_filter(configuration.filter(group)));
        }
        for toggle in Toggle::ALL {
            let flag = if configuration.toggles.get(toggle) { "1" } else { "0" };
            serializer.append_pair(toggle_key(toggle), flag);
        }
        serializer.finish()
    }

    fn try_decode(&self, query: &str) -> Result<Configuration, CodecError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs: HashMap<String, String> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        if !pairs.contains_key(SENTINEL_KEY) {
            return Err(CodecError::MissingSentinel(SENTINEL_KEY));
        }
        Ok(Self::from_pairs(&pairs))
    }

    fn write_url(&self, configuration: &Configuration, url: &mut Url) {
        url.set_query(Some(&self.encode(configuration)));
    }

    fn read_url(&self, url: &Url) -> Option<Configuration> {
        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        pairs
            .contains_key(SENTINEL_KEY)
            .then(|| Self::from_pairs(&pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_keys_in_order() {
        let c = Configuration::new()
            .with_filter(GroupId::Sukumizu, FilterSpec::new(10.0, 120.0, 90.0));
        assert_eq!(
            QueryCodec.encode(&c),
            "suk=10-120-90&eye=0-100-100&hdv=0-100-100&hbt=0-100-100&hai=0-100-100\
             &eys=1&tea=0&har=1&hbl=1&bri=0&gun=0&drl=0&blr=0"
        );
    }

    #[test]
    fn missing_fields_take_per_field_defaults() {
        let c = QueryCodec.try_decode("?suk=30-50-60&gun=1").unwrap();
        assert_eq!(c.sukumizu, FilterSpec::new(30.0, 50.0, 60.0));
        assert_eq!(c.eyes, FilterSpec::IDENTITY);
        assert!(c.toggles.gun_visible);
        assert!(!c.toggles.eyes_visible);
        assert!(!c.toggles.harness_visible);
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let c = QueryCodec
            .try_decode("suk=1-2&eye=5-6-7&hai=a-b-c&tea=yes&bri=1")
            .unwrap();
        assert_eq!(c.sukumizu, FilterSpec::IDENTITY);
        assert_eq!(c.eyes, FilterSpec::new(5.0, 6.0, 7.0));
        assert_eq!(c.hair, FilterSpec::IDENTITY);
        assert!(!c.toggles.tears_visible);
        assert!(c.toggles.biribiri_visible);
    }

    #[test]
    fn sentinel_decides_presence() {
        assert!(matches!(
            QueryCodec.try_decode("eye=1-2-3"),
            Err(CodecError::MissingSentinel("suk"))
        ));

        let url = Url::parse("https://example.com/?eye=1-2-3").unwrap();
        assert_eq!(QueryCodec.read_url(&url), None);

        let url = Url::parse("https://example.com/?suk=1-2-3").unwrap();
        assert_eq!(
            QueryCodec.read_url(&url).map(|c| c.sukumizu),
            Some(FilterSpec::new(1.0, 2.0, 3.0))
        );
    }

    #[test]
    fn url_roundtrip() {
        let mut c = Configuration::new()
            .with_filter(GroupId::HarnessDevice, FilterSpec::new(359.0, 0.0, 200.0));
        c.toggles.drooling_variant = true;

        let mut url = Url::parse("https://example.com/index.html").unwrap();
        QueryCodec.write_url(&c, &mut url);
        assert!(url.as_str().starts_with("https://example.com/index.html?suk="));
        assert_eq!(QueryCodec.read_url(&url), Some(c));
    }

    #[test]
    fn negative_components_decode_as_default() {
        let c = Configuration::new()
            .with_filter(GroupId::Eyes, FilterSpec::new(30.0, -20.0, 100.0))
            .with_filter(GroupId::Hair, FilterSpec::new(5.0, 60.0, 70.0));
        let token = QueryCodec.encode(&c);
        assert!(token.contains("eye=30--20-100"));

        let decoded = QueryCodec.decode(&token);
        assert_eq!(decoded.eyes, FilterSpec::IDENTITY);
        assert_eq!(decoded.hair, c.hair);
    }
}
