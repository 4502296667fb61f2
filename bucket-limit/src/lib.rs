//! # bucket-limit
//!
//! `bucket-limit` provides two lock-free, non-blocking admission limiters behind one
//! shared contract.
//!
//! ## Core Philosophy
//!
//! A caller asks "may I proceed now?" and gets an immediate `bool`. No call ever waits,
//! sleeps or yields. Each limiter holds a single piece of scheduling state which is
//! updated with a Compare-And-Swap (CAS) retry loop, so concurrent callers never lose
//! an update and never double-grant an admission.
//!
//! ## Key Concepts
//!
//! * **Leaky Bucket**: at most one admission per `fill_interval / capacity`. No burst.
//! * **Token Bucket**: up to `capacity` admissions per `fill_interval` window, then
//!   rejections until the window rolls over.
//! * **Lazy Evaluation**: window boundaries are observed at the moment of the request,
//!   there are no background timers.
//! * **Limiter Trait**: a unified, object safe interface for both algorithms.
//!
//! ## Example
//!
//! ```rust
//! use bucket_limit::Limiter;
//! use bucket_limit::TokenBucket;
//! use std::time::Duration;
//!
//! let bucket = TokenBucket::new(Duration::from_secs(60), 100).unwrap();
//!
//! if bucket.take_available() {
//!     // Request allowed
//! }
//! assert_eq!(bucket.get_capacity(), 100);
//! ```

use std::fmt::Debug;

mod clock;
mod config;
mod error;
mod leaky_bucket;
mod token_bucket;


pub use clock::WallClock;
pub use config::LimiterConfig;
pub use config::LimiterKind;
pub use error::LimitError;
pub use leaky_bucket::LeakyBucket;
pub use token_bucket::TokenBucket;
pub use token_bucket::TokenBucketSnapshot;

/// The admission contract shared by every limiter.
///
/// Limiters are `Send` and `Sync` so a single instance can be shared across
/// threads via `Arc`.
pub trait Limiter: Debug + Send + Sync {
    /// Attempts one admission at the caller supplied clock value `now`
    /// (nanoseconds since the Unix epoch).
    ///
    /// Never blocks and never fails. A `now` earlier than a previously
    /// observed value simply results in a rejection.
    fn take_available_with_now(&self, now: i64) -> bool;

    /// Attempts one admission at the limiter's current wall clock time.
    fn take_available(&self) -> bool;

    /// The configured number of admissions per fill interval.
    fn get_capacity(&self) -> i64;

    /// Remaining burst credit for limiters that have one, `-1` otherwise.
    fn get_legacy_capacity(&self) -> i64;
}
