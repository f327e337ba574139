use thiserror::Error;

/// Main error type for the Retrofy library
#[derive(Error, Debug)]
pub enum RetrofyError {
    #[error("Effect processing error: {0}")]
    Effect(#[from] EffectError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised by the effect core
///
/// Most numeric parameters are clamped silently into their documented bounds
/// rather than rejected; only structurally invalid inputs raise.
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Invalid parameter range: {details}")]
    InvalidParameterRange { details: String },

    #[error("Conflicting parameters: {details}")]
    ConflictingParameters { details: String },

    #[error("Unsupported image format: expected RGB or RGBA, got {channels} channel(s)")]
    UnsupportedImageFormat { channels: u8 },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Degenerate source range: {from_min} == {from_max}")]
    DegenerateRange { from_min: f64, from_max: f64 },

    #[error("Buffer shape mismatch: {expected} vs {actual}")]
    ShapeMismatch { expected: String, actual: String },
}

/// Image lifecycle and asset errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to load image: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save image: {path} - {reason}")]
    SaveFailed { path: String, reason: String },

    #[error("No pre-rendered noise-line mask with id {id} in {folder}")]
    AssetNotFound { id: u32, folder: String },

    #[error("Font resource missing: {path}")]
    FontResourceMissing { path: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using RetrofyError
pub type Result<T> = std::result::Result<T, RetrofyError>;

impl RetrofyError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Image(ImageError::LoadFailed { path }) => {
                format!(
                    "Could not load image '{}'. Please check the file exists and is a supported format.",
                    path
                )
            }
            Self::Image(ImageError::AssetNotFound { id, folder }) => {
                format!("No noise-line mask image '{}.png' found in '{}'.", id, folder)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
