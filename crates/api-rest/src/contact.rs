//! Contact form endpoint.
//!
//! Submissions are validated, sanitised and logged; delivery to a mailbox is left to the log
//! pipeline. Each client IP may submit [`CONTACT_LIMIT`] times per [`CONTACT_WINDOW`].

use crate::{failure, AppState, FailureRes};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use nexus_types::NonEmptyText;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::{Duration, Instant};
use utoipa::ToSchema;

pub const CONTACT_LIMIT: u32 = 5;
pub const CONTACT_WINDOW: Duration = Duration::from_secs(60);
pub const MAX_FIELD_CHARS: usize = 5000;

const SUCCESS_MESSAGE: &str = "Your message has been received. We will get back to you shortly.";

// Expired windows are swept once the table grows past this many clients.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Clone, Copy, Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window submission counter keyed by client IP.
#[derive(Debug)]
pub struct ContactThrottle {
    limit: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl Default for ContactThrottle {
    fn default() -> Self {
        Self::new(CONTACT_LIMIT, CONTACT_WINDOW)
    }
}

impl ContactThrottle {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Records a submission from `client` and returns whether it is allowed.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if clients.len() > SWEEP_THRESHOLD {
            clients.retain(|_, w| now.saturating_duration_since(w.started) <= self.window);
        }

        match clients.get_mut(client) {
            Some(w) if now.saturating_duration_since(w.started) <= self.window => {
                if w.count >= self.limit {
                    return false;
                }
                w.count += 1;
                true
            }
            _ => {
                clients.insert(
                    client.to_string(),
                    Window {
                        started: now,
                        count: 1,
                    },
                );
                true
            }
        }
    }
}

/// First entry of `x-forwarded-for`, or `unknown`.
pub fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ContactReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub inquiry_type: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactRes {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("Missing required fields: name, email, inquiry_type, message")]
    MissingFields,
    #[error("Invalid email address")]
    InvalidEmail,
}

/// A validated, sanitised submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: NonEmptyText,
    pub email: NonEmptyText,
    pub company: Option<NonEmptyText>,
    pub inquiry_type: NonEmptyText,
    pub message: NonEmptyText,
}

impl TryFrom<ContactReq> for ContactSubmission {
    type Error = ContactError;

    fn try_from(req: ContactReq) -> Result<Self, Self::Error> {
        let required = |value: Option<String>| {
            value
                .filter(|v| !v.is_empty())
                .ok_or(ContactError::MissingFields)
        };
        let name = required(req.name)?;
        let email = required(req.email)?;
        let inquiry_type = required(req.inquiry_type)?;
        let message = required(req.message)?;

        if !is_valid_email(&email) {
            return Err(ContactError::InvalidEmail);
        }

        // A field made only of whitespace and angle brackets is as good as missing.
        let clean = |value: &str| {
            NonEmptyText::new(sanitize_input(value)).map_err(|_| ContactError::MissingFields)
        };

        Ok(Self {
            name: clean(&name)?,
            email: clean(&email)?,
            company: req
                .company
                .and_then(|c| NonEmptyText::new(sanitize_input(&c)).ok()),
            inquiry_type: clean(&inquiry_type)?,
            message: clean(&message)?,
        })
    }
}

/// Something, `@`, something, `.`, something; no whitespace and a single `@`.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Trims, strips `<` and `>`, and caps the result at [`MAX_FIELD_CHARS`] characters.
pub fn sanitize_input(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .take(MAX_FIELD_CHARS)
        .collect()
}

#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactReq,
    responses(
        (status = 200, description = "Submission accepted", body = ContactRes),
        (status = 400, description = "Missing fields, invalid email or malformed body", body = FailureRes),
        (status = 429, description = "Too many submissions from this client", body = FailureRes)
    )
)]
/// Accepts a contact form submission.
#[axum::debug_handler]
pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ContactReq>, JsonRejection>,
) -> Result<Json<ContactRes>, (StatusCode, Json<FailureRes>)> {
    let ip = client_ip(&headers);
    if !state.contact_throttle.check(&ip) {
        tracing::warn!(%ip, "contact form rate limit exceeded");
        return Err(failure(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        ));
    }

    let Json(req) = payload.map_err(|e| {
        tracing::warn!(%ip, error = %e, "malformed contact form body");
        failure(StatusCode::BAD_REQUEST, "Invalid request body")
    })?;

    let submission = ContactSubmission::try_from(req)
        .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?;

    tracing::info!(
        name = %submission.name,
        email = %submission.email,
        company = submission.company.as_ref().map(NonEmptyText::as_str),
        inquiry_type = %submission.inquiry_type,
        message_chars = submission.message.as_str().chars().count(),
        submitted_at = %Utc::now().to_rfc3339(),
        %ip,
        "contact form submission received"
    );

    Ok(Json(ContactRes {
        success: true,
        message: SUCCESS_MESSAGE.into(),
    }))
}
