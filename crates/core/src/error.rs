//! Error taxonomy for rate lookups.

/// Result type for rate lookup operations.
pub type RateResult<T> = Result<T, RateError>;

/// Errors a rate lookup can produce.
///
/// Every failure mode of the upstream call folds into one of these three
/// variants; anything unexpected (malformed body, transport failure) is
/// reported as `UpstreamUnavailable` without a status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateError {
    /// Malformed or missing request fields. Raised before any HTTP call.
    #[error("{0}")]
    InvalidArgument(String),

    /// The provider answered with a non-success status, or could not be
    /// reached at all (`status: None`).
    #[error("exchange rate provider unavailable (status: {status:?})")]
    UpstreamUnavailable { status: Option<u16> },

    /// The provider did not recognize the requested target currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),
}

impl RateError {
    pub fn upstream(status: u16) -> Self {
        Self::UpstreamUnavailable {
            status: Some(status),
        }
    }

    pub fn upstream_generic() -> Self {
        Self::UpstreamUnavailable { status: None }
    }
}
