use std::sync::OnceLock;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use quanta::Clock;
use quanta::Instant;

/// Nanosecond wall clock used by [`Limiter::take_available`](crate::Limiter::take_available).
///
/// The Unix time is sampled once, at creation. Later readings add the
/// monotonic `quanta` elapsed time to it, so the clock never runs backwards.
///
/// Readings are not re-synchronised with `SystemTime`. If the system clock is
/// stepped or slewed (NTP), a long-lived `WallClock` drifts away from
/// `SystemTime`-based values passed to `take_available_with_now`. Limiters
/// built with [`WallClock::new`] share one process-wide clock, so they at least
/// agree with each other.
#[derive(Debug, Clone)]
pub struct WallClock {
    clock: Clock,
    /// A fixed point in time (TSC tick) to calculate deltas from.
    anchor: Instant,
    epoch_nanos: i64,
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: OnceLock<WallClock> = OnceLock::new();

impl WallClock {
    /// The process-wide clock, anchored on first use.
    pub fn new() -> Self {
        SHARED.get_or_init(|| Self::from_clock(Clock::new())).clone()
    }

    /// Wraps an existing `quanta` clock, anchored at the current Unix time.
    pub fn from_clock(clock: Clock) -> Self {
        let epoch_nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| i64::try_from(since.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        Self::with_epoch(clock, epoch_nanos)
    }

    /// Wraps an existing `quanta` clock whose creation instant reads as `epoch_nanos`.
    ///
    /// Combined with `Clock::mock()` this gives a fully deterministic timeline.
    pub fn with_epoch(clock: Clock, epoch_nanos: i64) -> Self {
        let anchor = clock.now();
        Self {
            clock,
            anchor,
            epoch_nanos,
        }
    }

    /// Current time in nanoseconds since the Unix epoch.
    #[inline]
    pub fn now_nanos(&self) -> i64 {
        let elapsed = self.clock.now().duration_since(self.anchor).as_nanos();
        self.epoch_nanos
            .saturating_add(i64::try_from(elapsed).unwrap_or(i64::MAX))
    }
}
