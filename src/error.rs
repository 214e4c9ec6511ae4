pub type RendererResult<T> = Result<T, RendererError>;

#[derive(thiserror::Error, Debug)]
pub enum RendererError {
    #[error("failed to decode image asset `{uri}`: {source}")]
    Decode {
        uri: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to rasterize svg asset `{0}`")]
    Svg(String),

    #[error("failed to encode png: {0}")]
    Encode(#[from] image::ImageError),

    #[error("unknown asset `{0}`")]
    UnknownAsset(String),

    #[error("scene is not ready: {pending} resource(s) still loading")]
    NotReady { pending: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RendererError {
    pub fn svg(uri: impl Into<String>) -> Self {
        Self::Svg(uri.into())
    }

    pub fn unknown_asset(name: impl Into<String>) -> Self {
        Self::UnknownAsset(name.into())
    }
}
