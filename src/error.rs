//! Raffle error types with HTTP status code mapping.
//!
//! [`RecordError`] describes why a single CSV row could not be turned into
//! a record. [`RaffleError`] is the central error type of the crate: load
//! failures, draw failures and persistence failures. Each variant maps to
//! a numeric code and an HTTP status for the REST layer.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::UserId;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "no eligible participants left to draw"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// A single row could not be parsed into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// The row is shorter than the record layout.
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields {
        /// Fields the layout requires.
        expected: usize,
        /// Fields present in the row.
        found: usize,
    },

    /// A numeric field holds something that is not a number.
    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// Raw field content.
        value: String,
    },
}

/// Crate-wide error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category    | HTTP Status               |
/// |-----------|-------------|---------------------------|
/// | 1000–1999 | Load        | 500 Internal Server Error |
/// | 2000–2999 | Draw state  | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Storage     | 500 Internal Server Error |
#[derive(Debug, thiserror::Error)]
pub enum RaffleError {
    /// A source row has too few fields or an unparsable value.
    #[error("malformed record at {}:{line}: {source}", .path.display())]
    MalformedRecord {
        /// File the row came from.
        path: PathBuf,
        /// 1-based line number of the row.
        line: u64,
        /// What was wrong with the row.
        #[source]
        source: RecordError,
    },

    /// A source file could not be opened or read, or lacks its header row.
    #[error("cannot read {}: {source}", .path.display())]
    SourceUnavailable {
        /// File that failed.
        path: PathBuf,
        /// Underlying reader error.
        #[source]
        source: csv::Error,
    },

    /// A draw was requested with nobody left in the pool.
    #[error("no eligible participants left to draw")]
    EmptyPool,

    /// The winner file could not be written. In-memory state has been
    /// rolled back to what is on disk.
    #[error("failed to persist winners to {}: {source}", .path.display())]
    Persistence {
        /// Winner file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The given user is not in the winner set.
    #[error("winner not found: {0}")]
    WinnerNotFound(UserId),
}

impl RaffleError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MalformedRecord { .. } => 1001,
            Self::SourceUnavailable { .. } => 1002,
            Self::EmptyPool => 2001,
            Self::WinnerNotFound(_) => 2002,
            Self::Persistence { .. } => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyPool => StatusCode::CONFLICT,
            Self::WinnerNotFound(_) => StatusCode::NOT_FOUND,
            Self::MalformedRecord { .. }
            | Self::SourceUnavailable { .. }
            | Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RaffleError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
