//! Error codes for the Skat backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that appear
//! in HTTP responses.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    /// Authentication required
    Unauthorized,
    /// Missing or unknown session ticket
    InvalidTicket,
    /// Access denied
    Forbidden,

    // Request Validation
    /// Malformed card token
    ParseCard,
    /// Player name empty, too long or otherwise unusable
    InvalidName,
    /// Reservation request outside the accepted window or shape
    InvalidReservation,
    /// Serialized computer-game state could not be decoded
    InvalidState,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Reservation not found
    ReservationNotFound,
    /// Player not found
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Player name already seated
    NameTaken,
    /// Four players already seated
    TableFull,
    /// Round in progress; no joins allowed
    RoundInProgress,
    /// Table reserved for other players
    TableAlreadyReserved,
    /// Reservation overlaps an existing one
    ReservationOverlap,
    /// Generic conflict
    Conflict,

    // Resource exhaustion
    /// Too many concurrent long-poll waiters
    TooManyWaiters,

    // System Errors
    /// Persistence collaborator failed
    PersistenceError,
    /// Data corruption detected
    DataCorruption,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidTicket => "INVALID_TICKET",
            Self::Forbidden => "FORBIDDEN",
            Self::ParseCard => "PARSE_CARD",
            Self::InvalidName => "INVALID_NAME",
            Self::InvalidReservation => "INVALID_RESERVATION",
            Self::InvalidState => "INVALID_STATE",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ReservationNotFound => "RESERVATION_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",
            Self::NameTaken => "NAME_TAKEN",
            Self::TableFull => "TABLE_FULL",
            Self::RoundInProgress => "ROUND_IN_PROGRESS",
            Self::TableAlreadyReserved => "TABLE_ALREADY_RESERVED",
            Self::ReservationOverlap => "RESERVATION_OVERLAP",
            Self::Conflict => "CONFLICT",
            Self::TooManyWaiters => "TOO_MANY_WAITERS",
            Self::PersistenceError => "PERSISTENCE_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
