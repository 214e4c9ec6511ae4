//! Positional base64 token.
//!
//! The token is the comma-joined list of all fields in a fixed order, base64
//! encoded with `+` and `/` replaced by `-` and `_` and the padding stripped.
//!
//! ```text
//!  0- 2 sukumizu h,s,b       15 eyesVisible         19 biribiriVisible
//!  3- 5 eyes h,s,b           16 tearsVisible        20 gunVisible
//!  6- 8 harnessDevice h,s,b  17 harnessVisible      21 droolingVariant
//!  9-11 harnessBelt h,s,b    18 harnessBeltVisible  22 backgroundBlur
//! 12-14 hair h,s,b
//! ```
//!
//! Tokens from the 21-field schema (without the last two flags) still decode.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use url::Url;

use super::{CodecError, ConfigurationCodec};
use crate::configuration::Configuration;
use crate::filter::FilterSpec;
use crate::group::GroupId;
use crate::scene::Toggle;

/// Query key carrying the token.
pub const TOKEN_KEY: &str = "c";

/// Fields in the current schema.
pub const FIELD_COUNT: usize = 23;

/// Fields in the schema without drooling and background blur.
pub const LEGACY_FIELD_COUNT: usize = 21;

const FILTER_FIELDS: usize = 3 * GroupId::ALL.len();

/// Encodes bytes as unpadded base64 using `-` and `_` for `+` and `/`.
pub fn to_url_safe(bytes: &[u8]) -> String {
    STANDARD
        .encode(bytes)
        .replace('+', "-")
        .replace('/', "_")
        .trim_end_matches('=')
        .to_string()
}

/// Reverses [`to_url_safe`], restoring the stripped padding.
pub fn from_url_safe(token: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let mut standard = token.replace('-', "+").replace('_', "/");
    let padding = (4 - standard.len() % 4) % 4;
    standard.extend(std::iter::repeat_n('=', padding));
    STANDARD.decode(standard)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionalCodec;

impl PositionalCodec {
    /// The plain-text fields, before base64.
    pub fn fields(configuration: &Configuration) -> Vec<String> {
        let filters = GroupId::ALL.iter().flat_map(|&group| {
            let f = configuration.filter(group);
            [f.hue, f.saturation, f.brightness]
        });
        let flags = Toggle::ALL
            .iter()
            .map(|&t| if configuration.toggles.get(t) { 1.0 } else { 0.0 });
        filters.chain(flags).map(|v| v.to_string()).collect()
    }

    /// Parses a field list of the current or legacy length.
    pub fn parse_fields(fields: &[&str]) -> Result<Configuration, CodecError> {
        if fields.len() != FIELD_COUNT && fields.len() != LEGACY_FIELD_COUNT {
            return Err(CodecError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        let mut configuration = Configuration::default();
        for (i, &group) in GroupId::ALL.iter().enumerate() {
            let at = 3 * i;
            let filter = FilterSpec::new(
                parse_number(fields, at)?,
                parse_number(fields, at + 1)?,
                parse_number(fields, at + 2)?,
            );
            configuration.set_filter(group, filter);
        }

        for (i, &toggle) in Toggle::ALL.iter().enumerate() {
            let position = FILTER_FIELDS + i;
            let value = match fields.get(position) {
                Some(_) => parse_boolean(fields, position)?,
                None => false,
            };
            configuration.toggles.set(toggle, value);
        }

        Ok(configuration)
    }
}

fn parse_number(fields: &[&str], position: usize) -> Result<f64, CodecError> {
    let raw = fields[position];
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CodecError::InvalidNumber {
            position,
            value: raw.to_string(),
        })
}

fn parse_boolean(fields: &[&str], position: usize) -> Result<bool, CodecError> {
    match fields[position].trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(CodecError::InvalidBoolean {
            position,
            value: other.to_string(),
        }),
    }
}

impl ConfigurationCodec for PositionalCodec {
    fn encode(&self, configuration: &Configuration) -> String {
        to_url_safe(Self::fields(configuration).join(",").as_bytes())
    }

    fn try_decode(&self, token: &str) -> Result<Configuration, CodecError> {
        let bytes = from_url_safe(token.trim())?;
        let text = String::from_utf8(bytes)?;
        let fields: Vec<&str> = text.split(',').collect();
        Self::parse_fields(&fields)
    }

    fn write_url(&self, configuration: &Configuration, url: &mut Url) {
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair(TOKEN_KEY, &self.encode(configuration));
    }

    fn read_url(&self, url: &Url) -> Option<Configuration> {
        url.query_pairs()
            .find(|(key, _)| key == TOKEN_KEY)
            .map(|(_, token)| self.decode(&token))
    }
}
