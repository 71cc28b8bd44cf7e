//! Error types for turntable.
//!
//! One unified error type with explicit variants for validation,
//! authentication, transport and backend failures. Backend failures are
//! classified by HTTP status so callers can match on them without looking
//! at message text.

use std::fmt;
use thiserror::Error;

/// The unified error type for turntable operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required identifier was missing or malformed. Raised before any
    /// network call is made.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Authentication failed, including after a token refresh attempt.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The addressed collection, item or record does not exist.
    #[error("not found: {0}")]
    NotFound(ApiError),

    /// The backend refused the change because it would violate one of its
    /// membership invariants.
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// Network transport errors (connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// 5xx responses and response bodies that could not be decoded.
    #[error("server error: {0}")]
    Server(ApiError),

    /// Any other non-success response.
    #[error("request rejected: {0}")]
    Api(ApiError),
}

/// Flat classification of [`Error`] for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    NotFound,
    Conflict(ConflictKind),
    Network,
    Server,
    Rejected,
}

impl Error {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) => ErrorKind::Validation,
            Error::Auth(_) => ErrorKind::Auth,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict(c) => ErrorKind::Conflict(c.kind),
            Error::Transport(_) => ErrorKind::Network,
            Error::Server(_) => ErrorKind::Server,
            Error::Api(_) => ErrorKind::Rejected,
        }
    }

    /// Returns true if this is a conflict of the given kind.
    pub fn is_conflict(&self, kind: ConflictKind) -> bool {
        matches!(self, Error::Conflict(c) if c.kind == kind)
    }

    /// Returns the HTTP status the backend answered with, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound(e) | Error::Server(e) | Error::Api(e) => Some(e.status),
            Error::Conflict(c) => Some(c.status),
            _ => None,
        }
    }

    /// Build a server error for a response that could not be decoded.
    pub fn malformed(status: u16, message: impl Into<String>) -> Self {
        Error::Server(ApiError::new(status, None, Some(message.into())))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials provided.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No access token is available; the user is not logged in.
    #[error("not logged in")]
    MissingToken,

    /// The stored token cannot be sent in a header.
    #[error("stored token is not a valid header value")]
    InvalidToken,

    /// Refresh token is missing, invalid or expired.
    #[error("refresh token invalid")]
    RefreshTokenInvalid,

    /// The request was still rejected after refreshing. Stored credentials
    /// have been cleared.
    #[error("session expired")]
    SessionExpired,
}

/// A non-success response from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code, if the backend sent one.
    pub code: Option<String>,
    /// Human-readable message (`detail`) from the backend.
    pub message: Option<String>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// The membership invariant a conflict refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    /// The record is already on the wishlist.
    AlreadyInWishlist,
    /// At least one copy of the record is already in the collection.
    AlreadyInCollection,
    /// Any other conflict.
    Other,
}

impl ConflictKind {
    /// Wire code used by the backend for this kind.
    pub fn code(self) -> &'static str {
        match self {
            ConflictKind::AlreadyInWishlist => "already_in_wishlist",
            ConflictKind::AlreadyInCollection => "already_in_collection",
            ConflictKind::Other => "conflict",
        }
    }

    /// Parse a wire code. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "already_in_wishlist" => Some(ConflictKind::AlreadyInWishlist),
            "already_in_collection" => Some(ConflictKind::AlreadyInCollection),
            "conflict" => Some(ConflictKind::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A membership conflict reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (HTTP {status}){}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct ConflictError {
    pub kind: ConflictKind,
    pub status: u16,
    pub message: Option<String>,
}

impl ConflictError {
    pub fn new(kind: ConflictKind, status: u16, message: Option<String>) -> Self {
        Self {
            kind,
            status,
            message,
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Malformed or empty identifier.
    #[error("invalid {what} '{value}': {reason}")]
    Identifier {
        what: &'static str,
        value: String,
        reason: String,
    },

    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// No default collection has been resolved yet.
    #[error("no default collection available")]
    NoDefaultCollection,

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
