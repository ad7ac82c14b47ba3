//! Configuration management for gatefold.
//!
//! Configuration comes from command-line arguments via clap, with every
//! option also settable through an environment variable carrying the
//! `GATEFOLD_` prefix. Required connection settings are checked once at
//! startup by [`Config::validate`], which raises a single [`ConfigError`]
//! naming every absent field, before any remote call is attempted.
//!
//! # Environment Variables
//!
//! - `GATEFOLD_HOST` - Server bind address (default: 0.0.0.0)
//! - `GATEFOLD_PORT` - Server port (default: 3000)
//! - `GATEFOLD_S3_BUCKET` - S3 bucket holding the albums (required)
//! - `GATEFOLD_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `GATEFOLD_S3_REGION` - AWS region (default: us-east-1)
//! - `GATEFOLD_SIGNED_URL_TTL` - Signed URL expiry in seconds (default: 3600)
//! - `GATEFOLD_DATABASE_URL` - Postgres connection URL (required)
//! - `GATEFOLD_EMAIL_API_KEY` - Transactional email API key (required)
//! - `GATEFOLD_EMAIL_TO` - Operator address receiving requests (required)
//! - `GATEFOLD_WATERMARK_FONT` - Path to the overlay font file (required)

use clap::Parser;

use crate::error::ConfigError;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default signed-URL expiry in seconds (1 hour).
pub const DEFAULT_SIGNED_URL_TTL: u64 = 3600;

/// Default transactional email endpoint.
pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.resend.com/emails";

/// Default sender identity for outgoing mail.
pub const DEFAULT_EMAIL_FROM: &str = "gatefold <onboarding@resend.dev>";

/// Default watermark overlay text.
pub const DEFAULT_WATERMARK_TEXT: &str = "@gatefold.";

/// Default watermark font size in pixels.
pub const DEFAULT_WATERMARK_FONT_SIZE: f32 = 45.0;

/// Default watermark opacity.
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.8;

/// Default session cookie max-age in seconds (7 days).
pub const DEFAULT_SESSION_MAX_AGE: u64 = 604_800;

// =============================================================================
// CLI Arguments
// =============================================================================

/// gatefold - a gated event photo album server.
///
/// Serves signed photo galleries from albums stored in S3 or S3-compatible
/// storage. Visitors register with name and phone to unlock a gallery and
/// can download watermarked copies of each photo.
#[derive(Parser, Debug, Clone)]
#[command(name = "gatefold")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GATEFOLD_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GATEFOLD_PORT")]
    pub port: u16,

    // =========================================================================
    // S3 Configuration
    // =========================================================================
    /// S3 bucket containing the album objects.
    #[arg(long, env = "GATEFOLD_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    #[arg(long, env = "GATEFOLD_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "GATEFOLD_S3_REGION")]
    pub s3_region: String,

    /// Expiry in seconds for signed photo/audio URLs.
    #[arg(long, default_value_t = DEFAULT_SIGNED_URL_TTL, env = "GATEFOLD_SIGNED_URL_TTL")]
    pub signed_url_ttl: u64,

    // =========================================================================
    // Visitor Store Configuration
    // =========================================================================
    /// Postgres connection URL for the visitor store.
    #[arg(long, env = "GATEFOLD_DATABASE_URL")]
    pub database_url: Option<String>,

    // =========================================================================
    // Email Configuration
    // =========================================================================
    /// API key for the transactional email service.
    #[arg(long, env = "GATEFOLD_EMAIL_API_KEY")]
    pub email_api_key: Option<String>,

    /// Endpoint of the transactional email service.
    #[arg(long, default_value = DEFAULT_EMAIL_ENDPOINT, env = "GATEFOLD_EMAIL_ENDPOINT")]
    pub email_endpoint: String,

    /// Sender identity for outgoing mail.
    #[arg(long, default_value = DEFAULT_EMAIL_FROM, env = "GATEFOLD_EMAIL_FROM")]
    pub email_from: String,

    /// Operator address that receives access and zine requests.
    #[arg(long, env = "GATEFOLD_EMAIL_TO")]
    pub email_to: Option<String>,

    // =========================================================================
    // Watermark Configuration
    // =========================================================================
    /// Text composited onto downloaded photos.
    #[arg(long, default_value = DEFAULT_WATERMARK_TEXT, env = "GATEFOLD_WATERMARK_TEXT")]
    pub watermark_text: String,

    /// Path to a TTF/OTF font file used for the overlay text.
    #[arg(long, env = "GATEFOLD_WATERMARK_FONT")]
    pub watermark_font: Option<String>,

    /// Overlay font size in pixels.
    #[arg(long, default_value_t = DEFAULT_WATERMARK_FONT_SIZE, env = "GATEFOLD_WATERMARK_FONT_SIZE")]
    pub watermark_font_size: f32,

    /// Overlay opacity (0.0 exclusive to 1.0 inclusive).
    #[arg(long, default_value_t = DEFAULT_WATERMARK_OPACITY, env = "GATEFOLD_WATERMARK_OPACITY")]
    pub watermark_opacity: f32,

    // =========================================================================
    // Session Configuration
    // =========================================================================
    /// Session cookie max-age in seconds.
    #[arg(long, default_value_t = DEFAULT_SESSION_MAX_AGE, env = "GATEFOLD_SESSION_MAX_AGE")]
    pub session_max_age: u64,

    /// Mark session cookies Secure (set for production deployments).
    #[arg(long, default_value_t = false, env = "GATEFOLD_SECURE_COOKIES")]
    pub secure_cookies: bool,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "GATEFOLD_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration.
    ///
    /// Required connection settings are enumerated together so an operator
    /// sees every absent field at once rather than one per restart.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing: Vec<&str> = Vec::new();

        if self.s3_bucket.as_deref().map_or(true, str::is_empty) {
            missing.push("s3_bucket");
        }
        if self.database_url.as_deref().map_or(true, str::is_empty) {
            missing.push("database_url");
        }
        if self.email_api_key.as_deref().map_or(true, str::is_empty) {
            missing.push("email_api_key");
        }
        if self.email_to.as_deref().map_or(true, str::is_empty) {
            missing.push("email_to");
        }
        if self.watermark_font.as_deref().map_or(true, str::is_empty) {
            missing.push("watermark_font");
        }

        if !missing.is_empty() {
            return Err(ConfigError::missing(&missing));
        }

        if self.signed_url_ttl == 0 {
            return Err(ConfigError::InvalidSetting {
                setting: "signed_url_ttl",
                message: "must be greater than 0".to_string(),
            });
        }

        if self.session_max_age == 0 {
            return Err(ConfigError::InvalidSetting {
                setting: "session_max_age",
                message: "must be greater than 0".to_string(),
            });
        }

        if !(self.watermark_opacity > 0.0 && self.watermark_opacity <= 1.0) {
            return Err(ConfigError::InvalidSetting {
                setting: "watermark_opacity",
                message: format!("must be in (0, 1], got {}", self.watermark_opacity),
            });
        }

        if self.watermark_font_size <= 0.0 {
            return Err(ConfigError::InvalidSetting {
                setting: "watermark_font_size",
                message: "must be greater than 0".to_string(),
            });
        }

        if self.watermark_text.is_empty() {
            return Err(ConfigError::InvalidSetting {
                setting: "watermark_text",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the bucket name, panicking if not set (call validate() first).
    pub fn bucket(&self) -> String {
        self.s3_bucket.clone().unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
