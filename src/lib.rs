//! sukumizu-renderer: layered character image customizer
//!
//! This crate composites a fixed stack of character layers with blend modes
//! and per-group hue/saturation/brightness filters, and encodes the whole
//! configuration into a compact share-link token.
//!
//! # Example
//!
//! ```no_run
//! use sukumizu_renderer::{Customizer, CustomizerOptions, DirectoryLoader, GroupId, Toggle};
//!
//! let mut customizer = Customizer::new(CustomizerOptions::default());
//! customizer.load_all(&DirectoryLoader::new("assets"))?;
//!
//! // Adjust a colour group; the whole filter is pushed before rendering
//! customizer.set_hue(GroupId::Sukumizu, 180.0);
//! customizer.toggle_layer_group(Toggle::Tears);
//!
//! let token = customizer.serialize();
//! let png = customizer.download_png()?;
//! # Ok::<(), sukumizu_renderer::RendererError>(())
//! ```
//!
//! # Share Links
//!
//! A [`Configuration`] round-trips through the positional token or the
//! key/value query:
//!
//! ```
//! use sukumizu_renderer::{CodecScheme, Configuration, FilterSpec, GroupId};
//!
//! let configuration = Configuration::new()
//!     .with_filter(GroupId::Sukumizu, FilterSpec::new(10.0, 120.0, 90.0));
//!
//! let token = CodecScheme::Positional.encode(&configuration);
//! assert_eq!(CodecScheme::Positional.decode(&token), configuration);
//!
//! // Malformed tokens decode to the defaults
//! assert_eq!(CodecScheme::Positional.decode("???"), Configuration::default());
//! ```

mod assets;
pub mod codec;
mod configuration;
mod customizer;
mod error;
mod filter;
mod group;
pub mod layer;
mod scene;
mod schedule;
mod surface;

pub use assets::{AssetLoader, AssetSource, DirectoryLoader, LoadGate, MemoryLoader};
pub use codec::{CodecError, CodecScheme, ConfigurationCodec, ShareLink};
pub use configuration::{Configurable, Configuration};
pub use customizer::{Customizer, CustomizerOptions};
pub use error::{RendererError, RendererResult};
pub use filter::FilterSpec;
pub use group::{ControlRanges, GroupId, HsbController};
pub use layer::{BlendMode, ImageResource, Layer, Part, RenderTarget};
pub use scene::{Effect, FeatureSet, Scene, Section, SectionKind, Toggle, Toggles};
pub use schedule::{HueCycle, PeriodicTimer};
pub use surface::{DEFAULT_SURFACE_SIZE, Surface};
