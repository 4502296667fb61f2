use std::time::Duration;

/// Errors produced while constructing a limiter.
///
/// Admission checks themselves never fail; only invalid construction
/// parameters are reported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitError {
    /// Capacity must be strictly positive.
    #[error("capacity must be greater than zero, got {0}")]
    InvalidCapacity(i64),

    /// The fill interval cannot be represented as `i64` nanoseconds.
    #[error("fill interval {0:?} does not fit in i64 nanoseconds")]
    IntervalOverflow(Duration),
}

/// Validates construction parameters, returning the interval in nanoseconds.
pub(crate) fn validate(fill_interval: Duration, capacity: i64) -> Result<i64, LimitError> {
    if capacity <= 0 {
        return Err(LimitError::InvalidCapacity(capacity));
    }
    i64::try_from(fill_interval.as_nanos()).map_err(|_| LimitError::IntervalOverflow(fill_interval))
}
