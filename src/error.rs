use thiserror::Error;

/// Errors raised while building or feeding an indicator.
///
/// Configuration errors are only ever returned by constructors. Ingestion
/// errors are returned by the tick call that caused them and leave the
/// indicator state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// The indicator can not be built with the requested parameters
    #[error("invalid configuration for period {period}: {reason}")]
    InvalidConfiguration {
        /// Requested window period
        period: usize,
        /// Why the period was rejected
        reason: &'static str,
    },

    /// A tick arrived with an index not strictly greater than the previous one
    #[error("out of order input: tick {received} received after tick {previous}")]
    OutOfOrderInput {
        /// Index of the last accepted tick
        previous: usize,
        /// Index of the rejected tick
        received: usize,
    },

    /// A NaN or infinite value was fed to the indicator
    #[error("non-finite input at tick {index}")]
    NonFiniteInput {
        /// Index of the rejected tick
        index: usize,
    },
}

impl IndicatorError {
    /// Creates an `InvalidConfiguration` error
    ///
    /// # Arguments
    ///
    /// * `period` - The rejected period
    /// * `reason` - Why it was rejected
    pub const fn invalid_configuration(period: usize, reason: &'static str) -> Self {
        Self::InvalidConfiguration { period, reason }
    }
}

/// Result type for indicator operations
pub type Result<T> = core::result::Result<T, IndicatorError>;
