use std::sync::Arc;

use crate::{
    assets::decode::{DefaultPhotoDecoder, PhotoDecoder},
    assets::fonts::FontBook,
    encode::image_out::{EncodedStrip, encode},
    engine::config::EngineConfig,
    foundation::core::Canvas,
    foundation::error::{StripError, StripResult},
    layout::resolver::{Geometry, resolve_for_style},
    model::request::StripRequest,
    model::request::StripResponse,
    model::style::StripStyle,
    render::compositor::{DecodeWarning, composite_photos},
    render::surface::Surface,
    render::text::{TextWarning, render_text},
};

/// Position of a run in the strip pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Request accepted, nothing checked yet.
    Pending,
    /// Checking inputs and computing geometry.
    Resolving,
    /// Painting background, borders and photos.
    Compositing,
    /// Drawing cell text and captions.
    TextRendering,
    /// Compressing the surface.
    Encoding,
    /// Output produced.
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Resolving => "resolving",
            Self::Compositing => "compositing",
            Self::TextRendering => "text rendering",
            Self::Encoding => "encoding",
            Self::Done => "done",
        })
    }
}

/// A run that stopped at `stage`.
#[derive(thiserror::Error, Debug)]
#[error("strip run failed while {stage}: {error}")]
pub struct RunFailure {
    /// Stage that was executing.
    pub stage: Stage,
    /// The fatal error.
    #[source]
    pub error: StripError,
}

impl RunFailure {
    fn at(stage: Stage) -> impl FnOnce(StripError) -> Self {
        move |error| Self { stage, error }
    }

    /// Diagnostic text for debug-mode failure responses.
    pub fn details(&self) -> String {
        let chain = match &self.error {
            StripError::Other(e) => format!("{e:#}"),
            other => other.to_string(),
        };
        format!("stage: {}; {chain}", self.stage)
    }

    /// Wire-format failure response; `debug` attaches [`RunFailure::details`].
    pub fn to_response(&self, debug: bool) -> StripResponse {
        StripResponse::failure(self.error.public_message(), debug.then(|| self.details()))
    }
}

/// Composited surface before encoding.
#[derive(Debug)]
pub struct RenderedStrip {
    /// Final pixels.
    pub surface: Surface,
    /// Resolved canvas geometry.
    pub geometry: Geometry,
    /// Photo cells left empty.
    pub decode_warnings: Vec<DecodeWarning>,
    /// Text that could not be drawn.
    pub text_warnings: Vec<TextWarning>,
}

/// Result of a successful run.
#[derive(Clone, Debug)]
pub struct StripOutput {
    /// Encoded image.
    pub encoded: EncodedStrip,
    /// Photo cells left empty.
    pub decode_warnings: Vec<DecodeWarning>,
    /// Text that could not be drawn.
    pub text_warnings: Vec<TextWarning>,
}

impl StripOutput {
    /// Canvas size of the produced image.
    pub fn canvas(&self) -> Canvas {
        self.encoded.canvas
    }

    /// Every warning as display text, decode warnings first.
    pub fn warning_messages(&self) -> Vec<String> {
        self.decode_warnings
            .iter()
            .map(ToString::to_string)
            .chain(self.text_warnings.iter().map(ToString::to_string))
            .collect()
    }

    /// Wire-format success response.
    pub fn to_response(&self) -> StripResponse {
        StripResponse::success(
            self.encoded.to_data_url(),
            self.canvas(),
            self.warning_messages(),
        )
    }
}

/// Strip renderer holding the state shared across runs: fonts, decoder and worker pool.
///
/// Runs take `&self`, so one engine can serve several requests concurrently.
pub struct StripEngine {
    config: EngineConfig,
    default_style: StripStyle,
    fonts: Arc<FontBook>,
    decoder: Arc<dyn PhotoDecoder>,
    pool: rayon::ThreadPool,
}

impl std::fmt::Debug for StripEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripEngine")
            .field("config", &self.config)
            .field("fonts", &self.fonts)
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl StripEngine {
    /// Load fonts and start the decode pool.
    pub fn new(config: EngineConfig) -> StripResult<Self> {
        let fonts = FontBook::load(&config.font_dirs, config.system_fonts);
        if fonts.face_count() == 0 {
            tracing::warn!("no fonts loaded; text will be skipped");
        }
        let decoder: Arc<dyn PhotoDecoder> = match &config.photo_root {
            Some(root) => Arc::new(DefaultPhotoDecoder::with_root(root)),
            None => Arc::new(DefaultPhotoDecoder::new()),
        };
        let pool = build_thread_pool(config.threads)?;
        Ok(Self {
            config,
            default_style: StripStyle::default(),
            fonts: Arc::new(fonts),
            decoder,
            pool,
        })
    }

    /// Replace the photo decoder.
    pub fn with_decoder(mut self, decoder: impl PhotoDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Replace the font book.
    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = Arc::new(fonts);
        self
    }

    /// Settings the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the pipeline and return the encoded strip.
    pub fn render(&self, request: &StripRequest) -> StripResult<StripOutput> {
        self.run(request).map_err(|f| f.error)
    }

    /// Run the pipeline and map the outcome onto the wire response.
    pub fn respond(&self, request: &StripRequest) -> StripResponse {
        match self.run(request) {
            Ok(output) => output.to_response(),
            Err(failure) => failure.to_response(self.config.debug),
        }
    }

    /// Run every stage up to (not including) encoding.
    pub fn render_surface(&self, request: &StripRequest) -> StripResult<RenderedStrip> {
        self.draw(request).map_err(|f| f.error)
    }

    /// Run the pipeline, reporting the stage a failure happened in.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&self, request: &StripRequest) -> Result<StripOutput, RunFailure> {
        let rendered = self.draw(request)?;
        let style = request.dimensions.as_ref().unwrap_or(&self.default_style);

        enter(Stage::Encoding);
        let encoded = encode(&rendered.surface, style.format, style.effective_quality())
            .map_err(RunFailure::at(Stage::Encoding))?;

        enter(Stage::Done);
        Ok(StripOutput {
            encoded,
            decode_warnings: rendered.decode_warnings,
            text_warnings: rendered.text_warnings,
        })
    }

    fn draw(&self, request: &StripRequest) -> Result<RenderedStrip, RunFailure> {
        enter(Stage::Pending);

        enter(Stage::Resolving);
        let checked = request
            .check(&self.default_style)
            .map_err(RunFailure::at(Stage::Resolving))?;
        let geometry = resolve_for_style(checked.layout, checked.style)
            .map_err(RunFailure::at(Stage::Resolving))?;
        tracing::debug!(
            width = geometry.canvas.width,
            height = geometry.canvas.height,
            "canvas resolved"
        );

        enter(Stage::Compositing);
        let mut surface = Surface::new(geometry.canvas, self.config.max_canvas_pixels)
            .map_err(RunFailure::at(Stage::Compositing))?;
        let decoder = self.decoder.as_ref();
        let report = self
            .pool
            .install(|| {
                composite_photos(
                    &mut surface,
                    &geometry,
                    checked.photos,
                    checked.style,
                    decoder,
                )
            })
            .map_err(RunFailure::at(Stage::Compositing))?;

        enter(Stage::TextRendering);
        let text_warnings = render_text(
            &mut surface,
            &geometry,
            checked.text_elements,
            checked.cell_text,
            &self.fonts,
        )
        .map_err(RunFailure::at(Stage::TextRendering))?;

        Ok(RenderedStrip {
            surface,
            geometry,
            decode_warnings: report.warnings,
            text_warnings,
        })
    }
}

/// Render `request` with an engine configured from the environment.
///
/// Builds a fresh engine (and font database) per call; prefer [`StripEngine`] for repeated use.
pub fn generate_strip(request: &StripRequest) -> StripResponse {
    match StripEngine::new(EngineConfig::from_env()) {
        Ok(engine) => engine.respond(request),
        Err(e) => StripResponse::failure(e.public_message(), None),
    }
}

fn enter(stage: Stage) {
    tracing::debug!(%stage, "strip stage");
}

fn build_thread_pool(threads: Option<usize>) -> StripResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StripError::validation("'threads' must be >= 1 when set"));
    }

    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|i| format!("photostrip-decode-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StripError::resource(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/engine/pipeline.rs"]
mod tests;
