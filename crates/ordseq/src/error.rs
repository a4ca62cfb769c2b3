use crate::gateway::GatewayError;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures surfaced by the submission loop.
///
/// Everything else the crate encounters (an unavailable listing endpoint, an
/// unparseable identifier in the scan) is absorbed locally and never reaches
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The backend rejected a creation attempt for a non-duplicate reason
    /// (validation, authorization, transport). Never retried: repeating the
    /// same request would not change the outcome.
    #[error("order creation rejected: {0}")]
    Rejected(GatewayError),

    /// Every attempt in the budget collided with an existing identifier.
    /// Carries the last collision the backend reported.
    #[error("identifier conflict persisted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: GatewayError },
}

impl Error {
    /// The underlying gateway failure.
    pub fn gateway_error(&self) -> &GatewayError {
        match self {
            Self::Rejected(err) => err,
            Self::RetriesExhausted { last, .. } => last,
        }
    }
}
