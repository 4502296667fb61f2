use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tracing::debug;
use tracing::trace;

use crate::Limiter;
use crate::WallClock;
use crate::error::LimitError;
use crate::error::validate;

/// A leaky bucket limiter.
///
/// Admits at most one request per `fill_interval / capacity`, with no burst.
/// The state is the clock value of the most recent admission's logical slot.
/// Every admission advances it by exactly one slot, never straight to `now`,
/// so installed timestamps form a strictly increasing sequence and no two
/// admissions ever share a slot.
#[derive(Debug)]
pub struct LeakyBucket {
    capacity: i64,
    fill_interval: i64,
    per_request: i64,
    last_token_timestamp: AtomicI64,
    clock: WallClock,
}

impl Limiter for LeakyBucket {
    #[inline]
    fn take_available_with_now(&self, now: i64) -> bool {
        let mut last = self.last_token_timestamp.load(Ordering::Acquire);

        loop {
            // A slot past i64::MAX never opens.
            let Some(candidate) = last.checked_add(self.per_request) else {
                return false;
            };
            if now < candidate {
                return false;
            }

            match self.last_token_timestamp.compare_exchange_weak(
                last,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return true,
                Err(current) => {
                    trace!(expected = last, current, "leaky bucket CAS lost, retrying");
                    last = current;
                }
            }
        }
    }

    fn take_available(&self) -> bool {
        self.take_available_with_now(self.clock.now_nanos())
    }

    fn get_capacity(&self) -> i64 {
        self.capacity
    }

    fn get_legacy_capacity(&self) -> i64 {
        -1
    }
}

impl LeakyBucket {
    /// Creates a new `LeakyBucket` seeded at the current wall clock time.
    ///
    /// # Arguments
    ///
    /// * `fill_interval` - The window over which `capacity` admissions are permitted.
    /// * `capacity` - Admissions per window. Must be positive.
    ///
    /// # Errors
    ///
    /// Returns [`LimitError`] if `capacity <= 0` or `fill_interval` overflows `i64` nanoseconds.
    pub fn new(fill_interval: Duration, capacity: i64) -> Result<Self, LimitError> {
        Self::with_clock(fill_interval, capacity, WallClock::new())
    }

    /// Creates a new `LeakyBucket` that samples time from `clock`.
    pub fn with_clock(
        fill_interval: Duration,
        capacity: i64,
        clock: WallClock,
    ) -> Result<Self, LimitError> {
        let fill_interval = validate(fill_interval, capacity)?;
        let per_request = fill_interval / capacity;
        let seed = clock.now_nanos();

        debug!(capacity, fill_interval, per_request, seed, "leaky bucket created");

        Ok(Self {
            capacity,
            fill_interval,
            per_request,
            last_token_timestamp: AtomicI64::new(seed),
            clock,
        })
    }

    /// The minimum spacing between two admissions, in nanoseconds.
    pub fn per_request(&self) -> i64 {
        self.per_request
    }

    /// The configured fill interval, in nanoseconds.
    pub fn fill_interval(&self) -> i64 {
        self.fill_interval
    }

    #[cfg(test)]
    pub(crate) fn last_token_timestamp(&self) -> i64 {
        self.last_token_timestamp.load(Ordering::Acquire)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for LeakyBucket {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("LeakyBucket", 1)?;
        state.serialize_field("capacity", &self.capacity)?;
        state.end()
    }
}
