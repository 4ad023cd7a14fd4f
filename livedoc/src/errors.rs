use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for livedoc operations.
///
/// Each kind describes a category of failure so callers can branch on it
/// without matching error messages.
///
/// # Examples
///
/// ```rust,ignore
/// use livedoc::errors::{LiveDocError, ErrorKind, LiveDocResult};
///
/// fn example() -> LiveDocResult<()> {
///     Err(LiveDocError::new("Collection not found", ErrorKind::CollectionNotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Query Errors
    /// Error while building or parsing a predicate
    FilterError,

    // Population Errors
    /// The population specification could not be parsed
    PopulateError,

    // Lookup Errors
    /// Collection does not exist
    CollectionNotFound,
    /// Document does not exist
    DocumentNotFound,
    /// The document was already removed from its collection
    DocumentDeleted,
    /// The provided id is invalid
    InvalidId,

    // Operation Errors
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Generic validation error
    ValidationError,

    // Storage Errors
    /// The storage provider rejected an operation
    StorageError,

    // Event Errors
    /// Error in event processing
    EventError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::PopulateError => write!(f, "Populate error"),
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::DocumentNotFound => write!(f, "Document not found"),
            ErrorKind::DocumentDeleted => write!(f, "Document deleted"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::StorageError => write!(f, "Storage error"),
            ErrorKind::EventError => write!(f, "Event error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom livedoc error type.
///
/// `LiveDocError` carries the message, the kind and an optional cause, and
/// captures a backtrace at construction for debugging.
///
/// ```rust,ignore
/// use livedoc::errors::{LiveDocError, ErrorKind};
///
/// let cause = LiveDocError::new("save rejected", ErrorKind::StorageError);
/// let err = LiveDocError::new_with_cause("Insert failed", ErrorKind::StorageError, cause);
/// ```
#[derive(Clone)]
pub struct LiveDocError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<LiveDocError>>,
    backtrace: Atomic<Backtrace>,
}

impl LiveDocError {
    /// Creates a new `LiveDocError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        LiveDocError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `LiveDocError` that wraps the error which caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: LiveDocError) -> Self {
        LiveDocError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&LiveDocError> {
        self.cause.as_deref()
    }
}

impl Display for LiveDocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for LiveDocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // message with stack trace, or the cause chain when there is one
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for LiveDocError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for livedoc operations.
pub type LiveDocResult<T> = Result<T, LiveDocError>;

impl From<String> for LiveDocError {
    fn from(msg: String) -> Self {
        LiveDocError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for LiveDocError {
    fn from(msg: &str) -> Self {
        LiveDocError::new(msg, ErrorKind::InternalError)
    }
}
