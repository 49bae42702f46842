//! Application-wide error types.
//!
//! This module provides a unified error hierarchy for the application.
//! Subsystems use specific error types via `thiserror`, while the CLI uses
//! `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level application error enum
//! - Module-specific errors ([`EnrichmentError`], [`ActionError`],
//!   [`DeliveryError`]) for detailed handling
//! - [`sanitize`] / [`user_message`] for anything shown to a user
//!
//! [`EnrichmentError`]: crate::enrichment::EnrichmentError
//! [`ActionError`]: crate::navigation::ActionError
//! [`DeliveryError`]: crate::channel::DeliveryError

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Longest error detail shown to a user.
pub const MAX_USER_ERROR_LEN: usize = 150;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Metadata provider error
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] crate::enrichment::EnrichmentError),

    /// Malformed or oversized action identifier
    #[error("Invalid action: {0}")]
    Action(#[from] crate::navigation::ActionError),

    /// Sending an item to the user failed
    #[error("Delivery error: {0}")]
    Delivery(#[from] crate::channel::DeliveryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// Whether this is (or wraps) a duplicate-key violation.
    pub fn is_duplicate(&self) -> bool {
        match self {
            Error::Database(e) => crate::db::is_unique_violation(e),
            Error::WithContext { source, .. } => source.is_duplicate(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

/// Strip markup, collapse whitespace and cap the length of error text.
pub fn sanitize(text: &str, max_len: usize) -> String {
    let mut stripped = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > max_len {
        let keep = max_len.saturating_sub(3);
        let mut truncated: String = collapsed.chars().take(keep).collect();
        truncated.push_str("...");
        truncated
    } else {
        collapsed
    }
}

/// Generic failure text for a user, with a sanitized detail line.
pub fn user_message(err: &Error, context: &str) -> String {
    if err.is_duplicate() {
        return "⚠️ Duplicate entry\n\nThis item already exists in the catalog.".to_string();
    }

    format!(
        "❌ Error during {}\n\n{}\n\nPlease try again later.",
        context,
        sanitize(&err.to_string(), MAX_USER_ERROR_LEN)
    )
}
