//! Error types for tile extraction
//!
//! Three layers of failure exist: configuration problems found before any
//! pixel work ([`ValidationError`], reported as a list), per-tile failures
//! ([`TileError`], either recoverable or critical), and crate-level
//! failures ([`RetileError`]) surfaced through [`RetileResult`].

use std::fmt;
use std::io;

use image::error::{ImageError, LimitErrorKind};
use serde::Serialize;

/// Stable machine-readable codes attached to failed results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationError,
    InvalidConfig,
    ProcessingError,
    ImageProcessingError,
    PartialFailure,
    AccessDenied,
    InsufficientMemory,
    ToolNotFound,
    RegistryError,
    IoError,
}

impl ErrorCode {
    /// The code as it appears in serialized results
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::ProcessingError => "PROCESSING_ERROR",
            ErrorCode::ImageProcessingError => "IMAGE_PROCESSING_ERROR",
            ErrorCode::PartialFailure => "PARTIAL_FAILURE",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::InsufficientMemory => "INSUFFICIENT_MEMORY",
            ErrorCode::ToolNotFound => "TOOL_NOT_FOUND",
            ErrorCode::RegistryError => "REGISTRY_ERROR",
            ErrorCode::IoError => "IO_ERROR",
        }
    }

    /// Inverse of [`as_str`](Self::as_str)
    pub fn parse(code: &str) -> Option<Self> {
        const ALL: [ErrorCode; 10] = [
            ErrorCode::ValidationError,
            ErrorCode::InvalidConfig,
            ErrorCode::ProcessingError,
            ErrorCode::ImageProcessingError,
            ErrorCode::PartialFailure,
            ErrorCode::AccessDenied,
            ErrorCode::InsufficientMemory,
            ErrorCode::ToolNotFound,
            ErrorCode::RegistryError,
            ErrorCode::IoError,
        ];
        ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single configuration problem detected before extraction
///
/// `field` names the offending part of the configuration
/// (e.g. `tile_width`, `coordinates[2]`, `memory`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Failure while producing a single tile
///
/// Critical errors abort the remaining coordinates; recoverable ones are
/// recorded against the tile and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum TileError {
    #[error("{message}")]
    Critical { code: ErrorCode, message: String },

    #[error("{0}")]
    Recoverable(String),
}

impl TileError {
    pub fn recoverable(msg: impl Into<String>) -> Self {
        TileError::Recoverable(msg.into())
    }

    /// Classify an I/O failure
    ///
    /// Permission denial and memory exhaustion are critical, anything
    /// else only affects the current tile.
    pub fn from_io(context: &str, error: &io::Error) -> Self {
        let message = format!("{}: {}", context, error);
        match error.kind() {
            io::ErrorKind::PermissionDenied => TileError::Critical {
                code: ErrorCode::AccessDenied,
                message,
            },
            io::ErrorKind::OutOfMemory => TileError::Critical {
                code: ErrorCode::InsufficientMemory,
                message,
            },
            _ => TileError::Recoverable(message),
        }
    }

    /// Classify an error raised by the image codec
    pub fn from_image(context: &str, error: &ImageError) -> Self {
        match error {
            ImageError::IoError(io_error) => TileError::from_io(context, io_error),
            ImageError::Limits(limit) if matches!(limit.kind(), LimitErrorKind::InsufficientMemory) => {
                TileError::Critical {
                    code: ErrorCode::InsufficientMemory,
                    message: format!("{}: {}", context, error),
                }
            }
            _ => TileError::Recoverable(format!("{}: {}", context, error)),
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, TileError::Critical { .. })
    }

    /// Code of a critical error, `None` for recoverable ones
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            TileError::Critical { code, .. } => Some(*code),
            TileError::Recoverable(_) => None,
        }
    }
}

/// Crate-level error type
#[derive(Debug, thiserror::Error)]
pub enum RetileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("image error: {0}")]
    Image(#[from] ImageError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid output pattern: {0}")]
    Pattern(String),

    #[error("validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("{code}: {message}")]
    Processing { code: ErrorCode, message: String },
}

impl RetileError {
    pub fn config(msg: impl Into<String>) -> Self {
        RetileError::Config(msg.into())
    }

    pub fn pattern(msg: impl Into<String>) -> Self {
        RetileError::Pattern(msg.into())
    }

    /// Code reported when this error ends up in a result
    pub fn code(&self) -> ErrorCode {
        match self {
            RetileError::Io(_) => ErrorCode::IoError,
            RetileError::Image(_) => ErrorCode::ImageProcessingError,
            RetileError::Config(_) | RetileError::Pattern(_) => ErrorCode::InvalidConfig,
            RetileError::Validation(_) => ErrorCode::ValidationError,
            RetileError::ToolNotFound(_) => ErrorCode::ToolNotFound,
            RetileError::Registry(_) => ErrorCode::RegistryError,
            RetileError::Processing { code, .. } => *code,
        }
    }

    /// Short type name used in failure metadata
    pub fn kind_name(&self) -> &'static str {
        match self {
            RetileError::Io(_) => "Io",
            RetileError::Image(_) => "Image",
            RetileError::Config(_) => "Config",
            RetileError::Pattern(_) => "Pattern",
            RetileError::Validation(_) => "Validation",
            RetileError::ToolNotFound(_) => "ToolNotFound",
            RetileError::Registry(_) => "Registry",
            RetileError::Processing { .. } => "Processing",
        }
    }
}

impl From<toml::de::Error> for RetileError {
    fn from(error: toml::de::Error) -> Self {
        RetileError::Config(error.to_string())
    }
}

impl From<serde_json::Error> for RetileError {
    fn from(error: serde_json::Error) -> Self {
        RetileError::Config(format!("serialization failed: {}", error))
    }
}

/// Result type for retile operations
pub type RetileResult<T> = Result<T, RetileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_critical() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        let tile_error = TileError::from_io("write tile", &err);
        assert!(tile_error.is_critical());
        assert_eq!(tile_error.code(), Some(ErrorCode::AccessDenied));
    }

    #[test]
    fn out_of_memory_is_critical() {
        let err = io::Error::from(io::ErrorKind::OutOfMemory);
        let tile_error = TileError::from_io("crop", &err);
        assert_eq!(tile_error.code(), Some(ErrorCode::InsufficientMemory));
    }

    #[test]
    fn other_io_errors_are_recoverable() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        let tile_error = TileError::from_io("write tile", &err);
        assert!(!tile_error.is_critical());
        assert!(tile_error.to_string().starts_with("write tile:"));
    }

    #[test]
    fn image_io_errors_are_classified_by_kind() {
        let err = ImageError::IoError(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(TileError::from_image("encode", &err).is_critical());

        let err = ImageError::IoError(io::Error::from(io::ErrorKind::InvalidData));
        assert!(!TileError::from_image("encode", &err).is_critical());
    }

    #[test]
    fn insufficient_memory_limit_is_critical() {
        let err = ImageError::Limits(image::error::LimitError::from_kind(
            LimitErrorKind::InsufficientMemory,
        ));
        assert_eq!(
            TileError::from_image("decode", &err).code(),
            Some(ErrorCode::InsufficientMemory)
        );
    }

    #[test]
    fn error_codes_render_as_upper_snake_case() {
        assert_eq!(ErrorCode::PartialFailure.to_string(), "PARTIAL_FAILURE");
        assert_eq!(ErrorCode::parse("ACCESS_DENIED"), Some(ErrorCode::AccessDenied));
        assert_eq!(ErrorCode::parse("access_denied"), None);
        assert_eq!(
            serde_json::to_string(&ErrorCode::AccessDenied).unwrap(),
            "\"ACCESS_DENIED\""
        );
    }

    #[test]
    fn validation_error_reports_count() {
        let err = RetileError::Validation(vec![
            ValidationError::new("tile_width", "too large"),
            ValidationError::new("overlap", "too large"),
        ]);
        assert_eq!(err.to_string(), "validation failed with 2 error(s)");
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }
}
