//! Domain-level error type used across services and the engine.
//!
//! This error type is HTTP-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.
//!
//! Rejected table actions (an illegal card, a bid below the floor) are not
//! errors: the engine answers them with `false`. `DomainError` is reserved for
//! authorization, resource exhaustion, conflicts and malformed input.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Validation error kinds for malformed input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    ParseCard,
    InvalidName,
    InvalidReservation,
    InvalidState,
    PhaseMismatch,
    OutOfTurn,
    CardNotInHand,
    MustFollowSuit,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Persistence,
    DataCorruption,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Session,
    Reservation,
    Player,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    NameTaken,
    TableFull,
    RoundInProgress,
    TableReserved,
    ReservationOverlap,
    Other(String),
}

/// Exhausted shared resources; carries a retry hint for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResourceKind {
    TooManyWaiters { retry_after_secs: u64 },
}

/// Authorization failures surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthKind {
    /// No valid session ticket or bearer token
    Unauthenticated,
    /// Authenticated but lacking the required role or ownership
    Forbidden,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input validation
    Validation(ValidationKind, String),
    /// Semantic conflict with current table or reservation state
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Missing or insufficient credentials
    Auth(AuthKind, String),
    /// Bounded resource exhausted
    Resource(ResourceKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Auth(kind, d) => write!(f, "auth {kind:?}: {d}"),
            DomainError::Resource(kind, d) => write!(f, "resource {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn auth(kind: AuthKind, detail: impl Into<String>) -> Self {
        Self::Auth(kind, detail.into())
    }
    pub fn resource(kind: ResourceKind, detail: impl Into<String>) -> Self {
        Self::Resource(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }
}
