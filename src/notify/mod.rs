//! Transactional email dispatch for access and zine requests.
//!
//! Requests are forwarded to a fixed operator address through an HTTPS
//! JSON email API (Resend-compatible: bearer token, `{from, to, subject,
//! text}` body). A failed send has no durable side effect; the caller
//! surfaces the error and the visitor retries by hand.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::NotificationError;

/// What the visitor is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequest {
    /// Request for the next printed zine
    NewZine,

    /// Request for access to a specific album
    Album { album_url: String },
}

impl AccessRequest {
    /// Subject line for the outgoing mail.
    pub fn subject(&self) -> &'static str {
        match self {
            AccessRequest::NewZine => "New Zine Request",
            AccessRequest::Album { .. } => "Album Access Request",
        }
    }
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Settings for the dispatcher, taken from the validated configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Email API endpoint
    pub endpoint: String,

    /// Bearer token for the API
    pub api_key: String,

    /// Sender identity
    pub from: String,

    /// Operator address receiving every request
    pub to: String,
}

/// Sends access/zine request notifications to the operator.
pub struct Notifier {
    http: reqwest::Client,
    config: NotifierConfig,
}

impl Notifier {
    pub fn new(http: reqwest::Client, config: NotifierConfig) -> Self {
        Self { http, config }
    }

    /// Send one notification.
    ///
    /// Non-success statuses and transport failures both fail the call;
    /// the response body is logged for operators, never surfaced.
    pub async fn notify(
        &self,
        requester_email: &str,
        request: &AccessRequest,
    ) -> Result<(), NotificationError> {
        let text = build_message(requester_email, request, Utc::now());
        let payload = EmailPayload {
            from: &self.config.from,
            to: &self.config.to,
            subject: request.subject(),
            text: &text,
        };

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body, "email API rejected request");
            return Err(NotificationError::Api {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

/// Build the plain-text body for a request notification.
pub fn build_message(
    requester_email: &str,
    request: &AccessRequest,
    sent_at: DateTime<Utc>,
) -> String {
    let timestamp = sent_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    match request {
        AccessRequest::NewZine => format!(
            "New Zine Request:\nUser Email: {requester_email}\nTime: {timestamp}\n"
        ),
        AccessRequest::Album { album_url } => format!(
            "Album Access Request:\nUser Email: {requester_email}\nAlbum URL: {album_url}\nTime: {timestamp}\n"
        ),
    }
}

// =============================================================================
// Tests
// =============================================================================
