//! Core data types for company listings and browser cookies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder stored when a field cannot be extracted from the page.
pub const NOT_AVAILABLE: &str = "N/A";

/// A company listing persisted in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub description: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A company listing extracted from a page snapshot, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDraft {
    pub name: String,
    pub location: String,
    pub description: String,
    pub link: String,
}

impl CompanyDraft {
    /// Build a draft, trimming every field and substituting [`NOT_AVAILABLE`]
    /// for blank ones.
    pub fn new(
        name: impl AsRef<str>,
        location: Option<&str>,
        description: Option<&str>,
        link: Option<&str>,
    ) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            location: or_sentinel(location),
            description: or_sentinel(description),
            link: or_sentinel(link),
        }
    }
}

/// Trim `value`, falling back to [`NOT_AVAILABLE`] when it is missing or blank.
pub fn or_sentinel(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Same-site policy understood by the browser engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SameSite {
    #[default]
    None,
    Lax,
    Strict,
}

impl SameSite {
    /// Map the browser-extension export vocabulary onto a policy.
    ///
    /// `no_restriction`, a missing value, and anything unrecognised all map to
    /// [`SameSite::None`].
    pub fn from_export(raw: Option<&str>) -> Self {
        match raw {
            Some("lax") => Self::Lax,
            Some("strict") => Self::Strict,
            _ => Self::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Lax => "Lax",
            Self::Strict => "Strict",
        }
    }
}

/// A normalized authentication cookie ready to attach to a browser context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    /// Expiry in whole epoch seconds.
    pub expires: Option<i64>,
}

/// Errors that can occur in the scout core library.
#[derive(thiserror::Error, Debug)]
pub enum ScoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A write violated a store constraint. The transaction was rolled back.
    #[error("{entity}({key}) failed integrity check: {source}")]
    Integrity {
        entity: &'static str,
        key: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Invalid cookie: {0}")]
    InvalidCookie(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ScoutError {
    /// Whether this error is a constraint violation on insert.
    pub fn is_integrity(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }
}

/// Convenience result type.
pub type ScoutResult<T> = Result<T, ScoutError>;
