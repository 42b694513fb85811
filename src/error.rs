use thiserror::Error;

/// Errors produced while encoding or rendering a QR code.
///
/// Every failure is local and synchronous: either a complete symbol (or
/// rendering) is returned, or the call fails with one of these.
#[derive(Error, Debug)]
pub enum Error {
    /// The text to encode was empty, or an option string could not be parsed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A requested version number lies outside 1..=40.
    #[error("Invalid version {0}: should be in range from 1 to 40")]
    InvalidVersion(i64),

    /// No admissible version holds the encoded data at the requested level.
    #[error("Data too large: {needed} bits needed, {capacity} bits available")]
    DataTooLarge { needed: usize, capacity: usize },

    /// A requested mask pattern lies outside 0..=7.
    #[error("Invalid mask pattern {0}: should be in range from 0 to 7")]
    InvalidMaskPattern(i64),

    /// A colour could not be parsed as a hex colour.
    #[error("Invalid hex color: {0}")]
    InvalidColor(String),

    /// A character has no Shift-JIS mapping.
    #[error("Unsupported character {0:?}")]
    UnsupportedCharacter(char),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
