//! Failure modes of the starfield. None of them are surfaced to the page:
//! the background either animates or silently stays blank.

use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// No `window` global, e.g. running inside a worker.
    #[error("no window available")]
    NoWindow,

    /// The window has no document attached.
    #[error("no document available")]
    NoDocument,

    /// The canvas refused to hand out a 2D rendering context.
    #[error("2d canvas context unavailable")]
    ContextUnavailable,

    /// A browser call threw.
    #[error("browser call failed: {0}")]
    Js(String),

    /// Zero, negative or non-finite surface dimensions.
    #[error("degenerate viewport {width}x{height}")]
    DegenerateViewport { width: f64, height: f64 },

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
}

impl From<JsValue> for EngineError {
    fn from(value: JsValue) -> Self {
        EngineError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}
