use thiserror::Error;

/// Configuration errors raised at startup, before any remote call.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// One or more required settings are absent
    #[error("missing required settings: {0}")]
    MissingSettings(String),

    /// A setting is present but outside its valid range
    #[error("invalid setting {setting}: {message}")]
    InvalidSetting {
        setting: &'static str,
        message: String,
    },

    /// The watermark font file could not be loaded or parsed
    #[error("watermark font unusable: {0}")]
    FontUnusable(String),
}

impl ConfigError {
    /// Build a `MissingSettings` error from the list of absent field names.
    pub fn missing(fields: &[&str]) -> Self {
        ConfigError::MissingSettings(fields.join(", "))
    }
}

/// Errors from object-storage listing and URL signing.
///
/// Transport, auth, and service failures are all collapsed into a single
/// variant: callers surface a generic "failed to load" state and must not
/// assume partial results are usable.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Listing or signing call failed
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Database-level failure from the visitor store.
#[derive(Debug, Clone, Error)]
#[error("database error: {0}")]
pub struct PersistenceError(pub String);

/// Errors from visitor registration.
#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    /// Phone number did not normalize to exactly 10 digits
    #[error("invalid phone number: expected 10 digits, got {digits}")]
    InvalidPhone { digits: usize },

    /// The insert was rejected or returned no row
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Errors from the email dispatcher.
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    /// The email API answered with a non-success status
    #[error("email API returned status {status}")]
    Api { status: u16 },

    /// The request never completed
    #[error("email transport error: {0}")]
    Transport(String),
}

/// Errors from photo watermarking.
#[derive(Debug, Clone, Error)]
pub enum WatermarkError {
    /// The photo could not be fetched (non-success status or transport failure)
    #[error("failed to fetch photo: {0}")]
    Fetch(String),

    /// The fetched bytes are not a decodable image
    #[error("failed to decode photo: {0}")]
    Decode(String),

    /// The overlay text could not be rendered
    #[error("failed to render overlay: {0}")]
    Render(String),

    /// Re-encoding the composited image failed
    #[error("failed to encode photo: {0}")]
    Encode(String),
}
