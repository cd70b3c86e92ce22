//! Error types for the medsched_core library.

use crate::db::DbError;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for medsched operations.
///
/// Validation errors always surface synchronously to the caller; the one
/// exception to that rule is notification delivery, which is handled inside
/// the [`crate::notify::Notifier`] implementations and never reaches here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not enough stock to cover a dose
    #[error("not enough '{name}' in stock: requested {requested}, available {available}")]
    InsufficientStock {
        name: String,
        requested: i64,
        available: i64,
    },

    /// A ledger entry for this medicine already exists
    #[error("medicine '{0}' is already stocked")]
    DuplicateMedicine(String),

    /// The medicine has never been stocked
    #[error("medicine '{0}' is not in the inventory")]
    UnknownMedicine(String),

    /// Blank medicine name
    #[error("medicine name must not be blank")]
    EmptyName,

    /// Dosage must be a positive integer
    #[error("dosage must be positive, got {0}")]
    InvalidDosage(i64),

    /// Stock quantity must be a positive integer
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// Scheduled time is earlier than the current time
    #[error("scheduled time {0} is in the past")]
    PastSchedule(chrono::NaiveDateTime),

    /// Repeat offset is zero or not representable
    #[error("repeat offset must be a nonzero, representable duration")]
    InvalidOffset,

    /// No dose or log record with the given id
    #[error("no record with id '{0}'")]
    NotFound(String),

    /// The shared-state lock was poisoned by a panicking holder
    #[error("shared state lock poisoned")]
    Poisoned,

    /// Underlying storage failure
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::Poisoned
    }
}
