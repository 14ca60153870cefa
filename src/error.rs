//! Error taxonomy for the intake engine.
//!
//! Nothing here is fatal to the process: every failure returns control to
//! the operator, who retries by re-submitting. Validation errors carry the
//! offending field or row and are surfaced verbatim; remote errors are
//! logged in full and shown only as a generic retry notice.

use thiserror::Error;

/// A catalog call failed at the service or network level.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered 200 but reported query/mutation errors.
    #[error("service error: {0}")]
    Api(String),

    /// The response body did not have the expected shape.
    #[error("malformed response: {0}")]
    Shape(String),
}

/// A relation-column payload could not be normalized to an id list.
///
/// Never propagated out of the client: the affected column degrades to an
/// empty id list and the error is logged.
#[derive(Debug, Error)]
#[error("cannot decode relation payload for column {column}: {reason}")]
pub struct DecodeError {
    pub column: String,
    pub reason: String,
}

/// A local form-state rule was violated. Evaluated before any remote call;
/// never sent to the service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("project, building and apartment must all be selected")]
    IncompleteSelection,

    #[error("the primary buyer row is empty")]
    MissingPrimaryBuyer,

    #[error("buyer row {row} is missing required fields")]
    IncompleteRow { row: usize },

    #[error("buyer row {row}: national ID fails the checksum")]
    BadNationalId { row: usize },

    #[error("buyer row {row}: phone number is not valid")]
    BadPhone { row: usize },

    #[error("buyer row {row}: email address is not valid")]
    BadEmail { row: usize },
}

/// Failure of a whole submission attempt.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reconciliation succeeded for some rows but failed for `row`.
    /// Already-created buyer records are not retracted; the operator
    /// retries the entire submission.
    #[error("buyer row {row} could not be saved: {source}")]
    PartialFailure {
        row: usize,
        #[source]
        source: RemoteError,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl SubmitError {
    /// Whether the failure is purely local (nothing was sent remotely).
    pub fn is_validation(&self) -> bool {
        matches!(self, SubmitError::Validation(_))
    }
}
