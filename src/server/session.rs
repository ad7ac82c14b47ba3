//! Session cookie codec.
//!
//! A session is nothing more than the visitor's id carried in a cookie;
//! validity is decided per request by the access gate against the visitor
//! store. The cookie is `HttpOnly` and `SameSite=Strict`, scoped to the
//! whole site, with a 7-day default max-age; `Secure` is added for
//! production deployments.

use http::{header, HeaderMap};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "user_session";

/// Cookie attributes, taken from the validated configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Max-Age in seconds
    pub max_age: u64,

    /// Whether to mark the cookie Secure
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age: crate::config::DEFAULT_SESSION_MAX_AGE,
            secure: false,
        }
    }
}

/// Build the `Set-Cookie` value binding a visitor id to a session.
pub fn build_session_cookie(visitor_id: &Uuid, config: &SessionConfig) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={visitor_id}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
        config.max_age
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract the session cookie value from request headers, if present.
///
/// Handles multiple `Cookie` headers and multiple cookies per header.
pub fn session_value(headers: &HeaderMap) -> Option<String> {
    for header_value in headers.get_all(header::COOKIE) {
        let Ok(raw) = header_value.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let pair = pair.trim();
            if let Some(value) = pair.strip_prefix(SESSION_COOKIE) {
                if let Some(value) = value.strip_prefix('=') {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
