//! Effect parameters: values, schemas and the lifecycle hooks.

pub mod lifecycle;
mod schema;
mod value;

pub use lifecycle::{adjust_colors, interpolate, normalize, rescale};
pub use schema::{ParamDescriptor, ParamUnit, ParameterSchema, ParameterSet};
pub use value::{lerp, lerp_int, ColorRgba, ColorStop, ColorStops, ParamKind, ParamValue};

/// Errors from parameter validation and decoding.
#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("Missing parameter: {0}")]
    MissingKey(String),
    #[error("Unknown parameter: {0}")]
    UnknownKey(String),
    #[error("Parameter {name} should be {expected}, got {found}")]
    KindMismatch {
        name: String,
        expected: ParamKind,
        found: ParamKind,
    },
    #[error("Invalid color code: {0}")]
    InvalidColor(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
