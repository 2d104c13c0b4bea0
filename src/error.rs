//! Error types for dataviz.
//!
//! Every operation validates its inputs up front and fails with one of these
//! variants before producing any output.

use thiserror::Error;

/// The main error type for dataviz operations.
#[derive(Error, Debug)]
pub enum VizError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration (bad option value, oversized step size, palette overflow)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Input data with nothing in it
    #[error("Empty input: {message}")]
    EmptyInput { message: String },

    /// Series that break the one-observation-per-month invariant
    #[error("Invalid series: {message}")]
    InvalidSeries { message: String },

    /// Data not found errors
    #[error("Data not found: {message}")]
    DataNotFound { message: String },

    /// Rendering / encoding errors
    #[error("Render error: {message}")]
    Render { message: String },

    /// Image encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// CSV parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// GeoJSON parsing/conversion errors
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VizError {
    /// Shorthand for a [`VizError::Configuration`]
    pub fn config(message: impl Into<String>) -> Self {
        VizError::Configuration {
            message: message.into(),
        }
    }

    /// Shorthand for a [`VizError::InvalidParameter`]
    pub fn invalid(param: &str, message: impl Into<String>) -> Self {
        VizError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with VizError
pub type Result<T> = std::result::Result<T, VizError>;
