use std::fmt;

use url::Url;

use super::CodecScheme;
use crate::configuration::Configuration;

/// The page URL with the current configuration in its query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLink {
    url: Url,
    scheme: CodecScheme,
}

impl ShareLink {
    pub fn new(url: Url, scheme: CodecScheme) -> Self {
        Self { url, scheme }
    }

    pub fn parse(input: &str, scheme: CodecScheme) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(input)?, scheme))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn scheme(&self) -> CodecScheme {
        self.scheme
    }

    /// The configuration carried by the link, if any.
    pub fn configuration(&self) -> Option<Configuration> {
        self.scheme.codec().read_url(&self.url)
    }

    /// Rewrites the query to carry `configuration`.
    pub fn update(&mut self, configuration: &Configuration) {
        self.scheme.codec().write_url(configuration, &mut self.url);
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for ShareLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
