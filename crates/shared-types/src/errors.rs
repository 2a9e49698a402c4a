//! # Error Types
//!
//! Defines error types used across services.

use thiserror::Error;

use crate::service::ServiceId;

/// Errors constructing domain entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// Address is not `0x` followed by 40 hex digits.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Categories of service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Service failed to initialize.
    InitializationFailed,
    /// A request operation failed.
    RequestFailed,
    /// The requested item does not exist.
    NotFound,
    /// Input rejected by the service.
    InvalidInput,
}

/// Error returned by a service operation or launch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[{service}] {kind:?}: {message}")]
pub struct ServiceError {
    /// The service that failed.
    pub service: ServiceId,
    pub kind: ServiceErrorKind,
    /// Human-readable error message.
    pub message: String,
}

impl ServiceError {
    pub fn new(service: ServiceId, kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            service,
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an initialization failure.
    pub fn init_failed(service: ServiceId, message: impl Into<String>) -> Self {
        Self::new(service, ServiceErrorKind::InitializationFailed, message)
    }

    /// Shorthand for a failed request.
    pub fn request_failed(service: ServiceId, message: impl Into<String>) -> Self {
        Self::new(service, ServiceErrorKind::RequestFailed, message)
    }
}
