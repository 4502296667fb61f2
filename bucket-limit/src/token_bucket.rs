use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tracing::debug;
use tracing::trace;

use crate::Limiter;
use crate::WallClock;
use crate::error::LimitError;
use crate::error::validate;

/// An immutable view of a [`TokenBucket`]'s scheduling state.
///
/// A fresh snapshot is published on every admission and is never modified
/// afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBucketSnapshot {
    next_token_timestamp: i64,
    keep_capacity: i64,
}

impl TokenBucketSnapshot {
    /// End of the current window, in nanoseconds since the Unix epoch.
    pub fn next_token_timestamp(&self) -> i64 {
        self.next_token_timestamp
    }

    /// Burst credit remaining in the current window.
    pub fn keep_capacity(&self) -> i64 {
        self.keep_capacity
    }
}

/// A windowed token bucket limiter.
///
/// Up to `capacity` requests are admitted per `fill_interval` window. Once the
/// window's credit is spent, requests are rejected until a call observes that
/// the window has expired. That call is admitted and opens the next window with
/// `capacity - 1` credit left.
///
/// A rollover advances the window by exactly one `fill_interval`, however many
/// intervals have actually elapsed. After a long idle period each of the next
/// few calls rolls over again, so the first burst can exceed `capacity`.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: i64,
    fill_interval: i64,
    state: ArcSwap<TokenBucketSnapshot>,
    clock: WallClock,
}

impl Limiter for TokenBucket {
    fn take_available_with_now(&self, now: i64) -> bool {
        let mut current = self.state.load();

        loop {
            let next = if now > current.next_token_timestamp {
                TokenBucketSnapshot {
                    next_token_timestamp: current
                        .next_token_timestamp
                        .saturating_add(self.fill_interval),
                    keep_capacity: self.capacity - 1,
                }
            } else if current.keep_capacity <= 0 {
                return false;
            } else {
                TokenBucketSnapshot {
                    next_token_timestamp: current.next_token_timestamp,
                    keep_capacity: current.keep_capacity - 1,
                }
            };

            let previous = self.state.compare_and_swap(&current, Arc::new(next));
            if Arc::ptr_eq(&*previous, &*current) {
                return true;
            }
            trace!(
                expected = ?*current,
                current = ?*previous,
                "token bucket CAS lost, retrying"
            );
            current = previous;
        }
    }

    fn take_available(&self) -> bool {
        self.take_available_with_now(self.clock.now_nanos())
    }

    fn get_capacity(&self) -> i64 {
        self.capacity
    }

    /// Point-in-time read of the remaining burst credit. It may be stale by
    /// the time the caller looks at it.
    fn get_legacy_capacity(&self) -> i64 {
        self.state.load().keep_capacity
    }
}

impl TokenBucket {
    /// Creates a new `TokenBucket` with full credit, its first window ending
    /// at the current wall clock time.
    ///
    /// # Arguments
    ///
    /// * `fill_interval` - The length of one window.
    /// * `capacity` - Admissions per window. Must be positive.
    ///
    /// # Errors
    ///
    /// Returns [`LimitError`] if `capacity <= 0` or `fill_interval` overflows `i64` nanoseconds.
    pub fn new(fill_interval: Duration, capacity: i64) -> Result<Self, LimitError> {
        Self::with_clock(fill_interval, capacity, WallClock::new())
    }

    /// Creates a new `TokenBucket` that samples time from `clock`.
    pub fn with_clock(
        fill_interval: Duration,
        capacity: i64,
        clock: WallClock,
    ) -> Result<Self, LimitError> {
        let fill_interval = validate(fill_interval, capacity)?;
        let seed = clock.now_nanos();

        debug!(capacity, fill_interval, seed, "token bucket created");

        Ok(Self {
            capacity,
            fill_interval,
            state: ArcSwap::from_pointee(TokenBucketSnapshot {
                next_token_timestamp: seed,
                keep_capacity: capacity,
            }),
            clock,
        })
    }

    /// A copy of the live state, taken from a single atomic load.
    pub fn snapshot(&self) -> TokenBucketSnapshot {
        **self.state.load()
    }

    /// The configured fill interval, in nanoseconds.
    pub fn fill_interval(&self) -> i64 {
        self.fill_interval
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TokenBucket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let snapshot = self.snapshot();
        let mut state = serializer.serialize_struct("TokenBucket", 2)?;
        state.serialize_field("capacity", &self.capacity)?;
        state.serialize_field("keepCapacity", &snapshot.keep_capacity)?;
        state.end()
    }
}
