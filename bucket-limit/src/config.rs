use std::time::Duration;

use crate::LeakyBucket;
use crate::LimitError;
use crate::Limiter;
use crate::TokenBucket;

/// The limiting algorithm to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LimiterKind {
    LeakyBucket,
    TokenBucket,
}

/// Declarative limiter construction.
///
/// Lets callers pick an algorithm at runtime and hold the result as a
/// `dyn Limiter`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LimiterConfig {
    pub kind: LimiterKind,
    pub fill_interval: Duration,
    pub capacity: i64,
}

impl LimiterConfig {
    pub fn leaky_bucket(fill_interval: Duration, capacity: i64) -> Self {
        Self {
            kind: LimiterKind::LeakyBucket,
            fill_interval,
            capacity,
        }
    }

    pub fn token_bucket(fill_interval: Duration, capacity: i64) -> Self {
        Self {
            kind: LimiterKind::TokenBucket,
            fill_interval,
            capacity,
        }
    }

    /// Builds the configured limiter, seeded at the current wall clock time.
    ///
    /// # Errors
    ///
    /// Returns [`LimitError`] if the capacity or interval is invalid.
    pub fn build(&self) -> Result<Box<dyn Limiter>, LimitError> {
        let limiter: Box<dyn Limiter> = match self.kind {
            LimiterKind::LeakyBucket => {
                Box::new(LeakyBucket::new(self.fill_interval, self.capacity)?)
            }
            LimiterKind::TokenBucket => {
                Box::new(TokenBucket::new(self.fill_interval, self.capacity)?)
            }
        };
        Ok(limiter)
    }
}
