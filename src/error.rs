//! Unified error handling for the wikireel crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`ClassifiedError`] - Common interface implemented by all error types
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors

use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::utils::error::{
    CrawlerError, FetchError, ProviderError, ServiceError, SkipReason, StorageError,
};

/// Common trait for wikireel error types
pub trait ClassifiedError: std::error::Error {
    /// Check if this error is transient (a later run may succeed)
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Unexpected response shapes and serialization
    Parsing,
    /// Database errors
    Storage,
    /// Hosted AI / media provider errors
    Provider,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    /// Short label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Parsing => "parsing",
            Self::Storage => "storage",
            Self::Provider => "provider",
            Self::Config => "config",
        }
    }
}

impl ClassifiedError for FetchError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(status) => *status == 429 || *status >= 500,
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Decode(_) => ErrorCategory::Parsing,
            _ => ErrorCategory::Network,
        }
    }
}

impl ClassifiedError for ProviderError {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse { .. } | Self::MissingCredential { .. } => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Http { .. } => ErrorCategory::Network,
            Self::MissingCredential { .. } => ErrorCategory::Config,
            Self::Status { .. } | Self::InvalidResponse { .. } => ErrorCategory::Provider,
        }
    }
}

/// Unified error type for the wikireel crate
#[derive(Error, Debug)]
pub enum Error {
    /// Crawler-related errors
    #[error("Crawler error: {0}")]
    Crawler(#[from] CrawlerError),

    /// Wikipedia fetch errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Vendor API errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Summarization chain errors
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Database errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ClassifiedError for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Crawler(CrawlerError::Fetch(e)) | Self::Fetch(e) => e.is_recoverable(),
            Self::Crawler(_) => false,
            Self::Provider(e) | Self::Service(ServiceError::Provider(e)) => e.is_recoverable(),
            Self::Service(_) => true,
            Self::Storage(StorageError::Pool(_)) => true,
            Self::Storage(StorageError::Rest(e)) => e.is_recoverable(),
            Self::Storage(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Crawler(CrawlerError::InvalidLimits(_)) => ErrorCategory::Config,
            Self::Crawler(_) => ErrorCategory::Network,
            Self::Fetch(e) => e.category(),
            Self::Provider(e) | Self::Service(ServiceError::Provider(e)) => e.category(),
            Self::Service(_) => ErrorCategory::Provider,
            Self::Storage(StorageError::NotConfigured(_)) => ErrorCategory::Config,
            Self::Storage(_) => ErrorCategory::Storage,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
