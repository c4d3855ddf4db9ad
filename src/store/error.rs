//! Document-store error type.
//!
//! Failures are tagged with a kind at the place they are observed (the
//! transport layer), so downstream code switches on the kind instead of
//! re-parsing message text. Free-text messages from outside the crate are
//! classified once, at entry, by `StoreError::from_message`.

use std::borrow::Cow;
use thiserror::Error;

/// Substrings marking a transient connectivity failure in free text.
const CONNECTIVITY_MARKERS: [&str; 4] = ["unreachable", "network error", "offline", "fetch fail"];

/// Classification of a store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// Transport-level failure (connect, timeout, DNS, gateway errors).
    /// The only kind the retrier acts on.
    Connectivity,
    PermissionDenied,
    NotFound,
    AlreadyExists,
    /// Anything else; surfaced with its original message.
    Other,
}

impl StoreErrorKind {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::Connectivity => "connectivity",
            StoreErrorKind::PermissionDenied => "permission_denied",
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::AlreadyExists => "already_exists",
            StoreErrorKind::Other => "other",
        }
    }
}

/// Error from a document-store operation.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct StoreError {
    kind: StoreErrorKind,
    message: Cow<'static, str>,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connectivity(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StoreErrorKind::Connectivity, message)
    }

    /// Classify a free-text failure message by its markers.
    ///
    /// Matching is case-insensitive. Used only where text from outside the
    /// crate enters; structured origins tag kinds directly.
    pub fn from_message(message: impl Into<Cow<'static, str>>) -> Self {
        let message = message.into();
        let lowered = message.to_lowercase();

        let kind = if CONNECTIVITY_MARKERS.iter().any(|m| lowered.contains(m)) {
            StoreErrorKind::Connectivity
        } else if lowered.contains("permission denied") || lowered.contains("permission-denied") {
            StoreErrorKind::PermissionDenied
        } else if lowered.contains("not found") || lowered.contains("not-found") {
            StoreErrorKind::NotFound
        } else if lowered.contains("already exists") || lowered.contains("already-exists") {
            StoreErrorKind::AlreadyExists
        } else {
            StoreErrorKind::Other
        };

        Self { kind, message }
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for failures worth retrying.
    pub fn is_connectivity(&self) -> bool {
        self.kind == StoreErrorKind::Connectivity
    }

    /// Fixed user-facing message for display surfaces.
    ///
    /// Recognized kinds map to stable copy; unclassified failures pass the
    /// original message through.
    pub fn user_message(&self) -> Cow<'static, str> {
        match self.kind {
            StoreErrorKind::Connectivity => Cow::Borrowed(
                "Unable to connect to the server. Please check your internet connection and try again.",
            ),
            StoreErrorKind::PermissionDenied => {
                Cow::Borrowed("You don't have permission to perform this action.")
            }
            StoreErrorKind::NotFound => Cow::Borrowed("The requested item could not be found."),
            StoreErrorKind::AlreadyExists => Cow::Borrowed("This item already exists."),
            StoreErrorKind::Other => Cow::Owned(self.message.clone().into_owned()),
        }
    }
}
