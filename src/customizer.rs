//! The interactive customizer: scene, colour controllers, surface and link.

use std::time::Duration;

use rand::Rng;
use url::Url;

use crate::assets::{AssetLoader, AssetSource, LoadGate};
use crate::codec::{CodecScheme, ShareLink};
use crate::configuration::{Configurable, Configuration};
use crate::error::{RendererError, RendererResult};
use crate::filter::FilterSpec;
use crate::group::{GroupId, HsbController};
use crate::layer::{Part, RenderTarget};
use crate::scene::{Effect, FeatureSet, Scene, Toggle};
use crate::schedule::{HueCycle, PeriodicTimer};
use crate::surface::{DEFAULT_SURFACE_SIZE, Surface};

// ============================================================================
// CustomizerOptions
// ============================================================================

/// Construction-time settings of a [`Customizer`].
#[derive(Debug, Clone, PartialEq)]
pub struct CustomizerOptions {
    /// Logical surface size in pixels.
    pub surface_size: (u32, u32),
    /// Encoding used for the share link and [`Customizer::serialize`].
    pub scheme: CodecScheme,
    /// Optional toggles this variant exposes.
    pub features: FeatureSet,
    /// How often the share link is refreshed.
    pub snapshot_interval: Duration,
    /// How often the hue cycle advances one degree.
    pub hue_cycle_interval: Duration,
}

impl Default for CustomizerOptions {
    fn default() -> Self {
        Self {
            surface_size: DEFAULT_SURFACE_SIZE,
            scheme: CodecScheme::default(),
            features: FeatureSet::default(),
            snapshot_interval: Duration::from_secs(1),
            hue_cycle_interval: Duration::from_millis(1),
        }
    }
}

// ============================================================================
// Customizer
// ============================================================================

/// Application core of the character customizer.
///
/// The customizer owns the [`Scene`], one [`HsbController`] per colour
/// group and the raster [`Surface`]. Every mutation recomposes and pushes the
/// affected state first and renders afterwards, so a frame never shows a
/// half-updated group.
///
/// # Lifecycle
///
/// 1. Construct with [`Customizer::new`], optionally attaching the page URL
///    with [`Customizer::with_link`].
/// 2. Report each decoded asset through [`Customizer::resource_loaded`] (or
///    call [`Customizer::load_all`]). Renders requested before every resource
///    is ready are skipped.
/// 3. When the last resource arrives the customizer starts: it applies the
///    configuration carried by the link, or randomizes the colours if there
///    is none, and renders exactly once.
/// 4. Drive the periodic effects by reporting elapsed time to
///    [`Customizer::advance`].
///
/// # Example
///
/// ```
/// use sukumizu_renderer::{Customizer, CustomizerOptions, GroupId};
///
/// let mut customizer = Customizer::new(CustomizerOptions::default());
/// customizer.set_hue(GroupId::Hair, 200.0);
///
/// // Not started yet: nothing was rendered.
/// assert_eq!(customizer.frames_rendered(), 0);
/// assert!(customizer.serialize().len() > 0);
/// ```
#[derive(Debug)]
pub struct Customizer {
    options: CustomizerOptions,
    scene: Scene,
    controllers: [HsbController; 5],
    surface: Surface,
    gate: LoadGate,
    started: bool,
    initial: Option<Configuration>,
    link: Option<ShareLink>,
    snapshot: PeriodicTimer,
    hue_cycle: HueCycle,
    frames_rendered: u64,
}

impl Customizer {
    /// Creates a customizer with every resource pending.
    pub fn new(options: CustomizerOptions) -> Self {
        let mut scene = Scene::new(options.features);
        let controllers = GroupId::ALL.map(HsbController::for_group);
        for controller in &controllers {
            controller.push(&mut scene);
        }

        let gate = LoadGate::new(scene.layers().map(|l| l.part()));
        let (width, height) = options.surface_size;

        Self {
            scene,
            controllers,
            surface: Surface::new(width, height),
            gate,
            started: false,
            initial: None,
            link: None,
            snapshot: PeriodicTimer::new(options.snapshot_interval),
            hue_cycle: HueCycle::new(options.hue_cycle_interval),
            frames_rendered: 0,
            options,
        }
    }

    /// Attaches the page URL. Its configuration, if any, is applied on start.
    pub fn with_link(mut self, url: Url) -> Self {
        self.link = Some(ShareLink::new(url, self.options.scheme));
        self
    }

    /// Sets the configuration applied on start, ahead of any link.
    pub fn with_initial_configuration(mut self, configuration: Configuration) -> Self {
        self.initial = Some(configuration);
        self
    }

    pub fn options(&self) -> &CustomizerOptions {
        &self.options
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn link(&self) -> Option<&ShareLink> {
        self.link.as_ref()
    }

    pub fn controller(&self, group: GroupId) -> &HsbController {
        &self.controllers[group as usize]
    }

    /// Returns true once every resource is ready and the first frame was drawn.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of frames drawn so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    // ---- Colour ----

    pub fn set_hue(&mut self, group: GroupId, degrees: f64) -> FilterSpec {
        self.update_group(group, |c| c.set_hue(degrees))
    }

    pub fn set_saturation(&mut self, group: GroupId, percent: f64) -> FilterSpec {
        self.update_group(group, |c| c.set_saturation(percent))
    }

    pub fn set_brightness(&mut self, group: GroupId, percent: f64) -> FilterSpec {
        self.update_group(group, |c| c.set_brightness(percent))
    }

    pub fn set_filter(&mut self, group: GroupId, filter: FilterSpec) -> FilterSpec {
        self.update_group(group, |c| c.set_filter(filter))
    }

    fn update_group(
        &mut self,
        group: GroupId,
        update: impl FnOnce(&mut HsbController) -> FilterSpec,
    ) -> FilterSpec {
        let controller = &mut self.controllers[group as usize];
        let filter = update(controller);
        controller.push(&mut self.scene);
        self.render();
        filter
    }

    /// Draws random values for every colour group and renders.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.randomize_groups(rng);
        self.render();
    }

    fn randomize_groups<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for controller in &mut self.controllers {
            controller.randomize(rng);
            controller.push(&mut self.scene);
        }
    }

    // ---- Toggles ----

    /// Flips a toggle and renders. Returns the toggle's new value.
    pub fn toggle_layer_group(&mut self, toggle: Toggle) -> bool {
        let value = self.scene.toggle(toggle);
        self.render();
        value
    }

    pub fn set_toggle(&mut self, toggle: Toggle, value: bool) {
        self.scene.set_toggle(toggle, value);
        self.render();
    }

    pub fn select_effect(&mut self, effect: Effect) {
        self.scene.select_effect(effect);
        self.render();
    }

    /// Starts or stops the continuous sukumizu hue cycle.
    ///
    /// Ignored when the variant does not expose the cycle.
    pub fn set_hue_cycle(&mut self, enabled: bool) {
        if !self.options.features.hue_cycle {
            tracing::debug!("hue cycle ignored: feature disabled");
            return;
        }
        self.hue_cycle.set_enabled(enabled);
    }

    pub fn is_hue_cycle_enabled(&self) -> bool {
        self.hue_cycle.is_enabled()
    }

    // ---- Serialization ----

    /// Encodes the current configuration with the configured scheme.
    pub fn serialize(&self) -> String {
        self.options.scheme.encode(&self.export_configuration())
    }

    /// Decodes `token` and applies it. Malformed tokens apply the defaults.
    ///
    /// Called before start, the decoded configuration is what start applies.
    pub fn deserialize(&mut self, token: &str) {
        let configuration = self.options.scheme.decode(token);
        self.apply_configuration(&configuration);
    }

    fn apply(&mut self, configuration: &Configuration) {
        for (controller, group) in self.controllers.iter_mut().zip(GroupId::ALL) {
            controller.set_filter(configuration.filter(group));
            controller.push(&mut self.scene);
        }

        let mut toggles = configuration.toggles;
        if toggles.biribiri_visible && toggles.gun_visible {
            toggles.gun_visible = false;
        }
        self.scene.set_toggles(toggles);
        tracing::debug!(?configuration, "configuration applied");
    }

    // ---- Rendering ----

    /// Redraws the scene onto the surface.
    ///
    /// Returns false, drawing nothing, until every resource is ready.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn render(&mut self) -> bool {
        if !self.started {
            tracing::trace!(pending = self.gate.pending(), "render skipped");
            return false;
        }
        self.scene.render(&mut self.surface);
        self.frames_rendered += 1;
        true
    }

    /// Renders at twice the logical size and returns the frame as PNG.
    ///
    /// The surface is restored to its logical size and redrawn afterwards.
    pub fn download_png(&mut self) -> RendererResult<Vec<u8>> {
        self.download_with(Surface::to_png)
    }

    /// Like [`Customizer::download_png`], as a `data:image/png;base64,` URI.
    pub fn download_data_uri(&mut self) -> RendererResult<String> {
        self.download_with(Surface::to_data_uri)
    }

    fn download_with<T>(
        &mut self,
        export: impl FnOnce(&Surface) -> RendererResult<T>,
    ) -> RendererResult<T> {
        if !self.started {
            return Err(RendererError::NotReady {
                pending: self.gate.pending(),
            });
        }

        let (width, height) = self.surface.size();
        self.surface.resize(width * 2, height * 2);
        self.scene.render(&mut self.surface);
        let exported = export(&self.surface);

        self.surface.resize(width, height);
        self.render();
        exported
    }

    // ---- Resources ----

    /// Decodes `source` and resolves the resource of `part`.
    ///
    /// Returns true if this was the last outstanding resource, in which case
    /// the customizer has started. A source that fails to decode leaves the
    /// part pending.
    pub fn resource_loaded(&mut self, part: Part, source: &AssetSource) -> RendererResult<bool> {
        let image = source.decode(part.asset_name())?;
        if !self.scene.resolve_resource(part, image)? {
            tracing::warn!(%part, "resource resolved twice, keeping the first image");
        }

        if self.gate.complete(part) {
            self.start();
            return Ok(true);
        }
        Ok(false)
    }

    /// Loads and resolves every pending resource through `loader`.
    pub fn load_all(&mut self, loader: &dyn AssetLoader) -> RendererResult<()> {
        for part in self.scene.pending_parts() {
            let source = loader.load(part)?;
            self.resource_loaded(part, &source)?;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn start(&mut self) {
        self.started = true;

        let configuration = self
            .initial
            .take()
            .or_else(|| self.link.as_ref().and_then(ShareLink::configuration));
        match configuration {
            Some(configuration) => self.apply(&configuration),
            None => {
                tracing::debug!("no saved configuration, randomizing");
                self.randomize_groups(&mut rand::rng());
            }
        }
        self.render();
    }

    // ---- Periodic effects ----

    /// Reports elapsed time to the periodic effects.
    ///
    /// Hue-cycle ticks due within one call are folded into a single hue
    /// change and render. Snapshot ticks refresh the share link without
    /// rendering. Nothing happens before the customizer has started.
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.started {
            return;
        }

        if let Some(delta) = self.hue_cycle.advance(elapsed) {
            let hue = self.controller(GroupId::Sukumizu).filter().hue + delta;
            self.set_hue(GroupId::Sukumizu, hue);
        }

        if self.snapshot.advance(elapsed) > 0 {
            self.snapshot_link();
        }
    }

    fn snapshot_link(&mut self) {
        let configuration = self.export_configuration();
        if let Some(link) = &mut self.link {
            link.update(&configuration);
        }
    }
}

impl Configurable for Customizer {
    /// Applies every filter and toggle, then renders.
    ///
    /// Toggles are taken as given, except that biribiri wins over the gun
    /// when both are set. Before start the configuration also replaces the
    /// initial one, so the first render keeps it instead of randomizing.
    fn apply_configuration(&mut self, configuration: &Configuration) {
        self.apply(configuration);
        if !self.started {
            self.initial = Some(*configuration);
        }
        self.render();
    }

    fn export_configuration(&self) -> Configuration {
        let mut configuration = Configuration::new().with_toggles(self.scene.toggles());
        for controller in &self.controllers {
            configuration.set_filter(controller.group(), controller.filter());
        }
        configuration
    }
}

// ============================================================================
// Tests
// ============================================================================
