//! Token-bucket rate limiting shared by every call on a client.
//!
//! Admission is delegated to a `governor` GCRA limiter read through the crate's [`Clock`], so
//! paused `tokio` time drives it in tests. A bucket of capacity `burst` refilling at `qps`
//! tokens per second admits `N` sequential calls no faster than `(N - burst) / qps` seconds.
//! A cell is consumed only when admission succeeds, so canceled waiters never spend one.

mod clock;

pub use clock::*;

// std
use std::num::NonZeroU32;
// crates.io
use governor::{
	Quota, RateLimiter as GovernorRateLimiter,
	clock::Clock as GovernorClock,
	middleware::NoOpMiddleware,
	state::{InMemoryState, NotKeyed},
};
// self
use crate::{
	_prelude::*,
	cancel::{CancelReason, CancelSignal},
	error::ConfigError,
};

type DirectLimiter =
	GovernorRateLimiter<NotKeyed, InMemoryState, LimiterClock, NoOpMiddleware<Instant>>;

/// Request-rate configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RateLimit {
	/// No limiting.
	Unlimited,
	/// At most `qps` requests per second with bursts of `burst`.
	PerSecond {
		/// Queries per second.
		qps: f64,
		/// Bucket capacity.
		burst: u32,
	},
}
impl RateLimit {
	/// Free-tier ceiling of the mapping services.
	pub const DEFAULT_QPS: f64 = 50.0;

	/// Validates and builds a per-second limit.
	pub fn per_second(qps: f64, burst: u32) -> Result<Self, ConfigError> {
		let limit = Self::PerSecond { qps, burst };

		limit.quota()?;

		Ok(limit)
	}

	/// Spacing between tokens, or `None` when unlimited.
	pub fn interval(&self) -> Option<StdDuration> {
		match self {
			Self::Unlimited => None,
			Self::PerSecond { qps, .. } => StdDuration::try_from_secs_f64(1.0 / qps).ok(),
		}
	}

	/// Lowers the limit into a `governor` quota, or `None` when unlimited.
	///
	/// The whole burst window (`burst` intervals) must fit in `u64` nanoseconds.
	pub fn quota(&self) -> Result<Option<Quota>, ConfigError> {
		let Self::PerSecond { qps, burst } = *self else {
			return Ok(None);
		};

		if !qps.is_finite() || qps <= 0.0 {
			return Err(ConfigError::InvalidRateLimit(qps));
		}

		let burst = NonZeroU32::new(burst).ok_or(ConfigError::InvalidBurst)?;
		let interval = StdDuration::try_from_secs_f64(1.0 / qps)
			.ok()
			.filter(|interval| !interval.is_zero())
			.ok_or(ConfigError::InvalidRateLimit(qps))?;
		let window_fits = interval
			.checked_mul(burst.get())
			.is_some_and(|window| u64::try_from(window.as_nanos()).is_ok());

		if !window_fits {
			return Err(ConfigError::BurstTooLarge(burst.get()));
		}

		let quota = Quota::with_period(interval).ok_or(ConfigError::InvalidRateLimit(qps))?;

		Ok(Some(quota.allow_burst(burst)))
	}
}
impl Default for RateLimit {
	fn default() -> Self {
		Self::PerSecond { qps: Self::DEFAULT_QPS, burst: 1 }
	}
}

/// Feeds the crate's [`Clock`] into `governor`.
#[derive(Clone)]
struct LimiterClock(Arc<dyn Clock>);
impl GovernorClock for LimiterClock {
	type Instant = Instant;

	fn now(&self) -> Instant {
		self.0.now()
	}
}

/// Token bucket shared across concurrent callers.
pub struct RateLimiter {
	quota: Option<Quota>,
	limiter: Option<DirectLimiter>,
	clock: Arc<dyn Clock>,
}
impl RateLimiter {
	/// Creates a limiter admitting calls at `quota` (unlimited when `None`), driven by `clock`.
	pub fn new(quota: Option<Quota>, clock: Arc<dyn Clock>) -> Self {
		let limiter = quota
			.map(|quota| GovernorRateLimiter::direct_with_clock(quota, LimiterClock(clock.clone())));

		Self { quota, limiter, clock }
	}

	/// Takes one token if one is available right now.
	///
	/// Returns the instant the next token becomes available otherwise.
	pub fn try_acquire(&self) -> Result<(), Instant> {
		let Some(limiter) = &self.limiter else {
			return Ok(());
		};

		limiter.check().map_err(|not_until| not_until.earliest_possible())
	}

	/// Waits for one token or until `cancel` fires, whichever comes first.
	///
	/// A signal that has already fired returns immediately. Waiting never holds a token, so a
	/// signal that fires mid-wait leaves the bucket untouched.
	pub async fn acquire(&self, cancel: &CancelSignal) -> Result<(), CancelReason> {
		loop {
			if let Some(reason) = cancel.check(self.clock.now()) {
				return Err(reason);
			}

			let ready_at = match self.try_acquire() {
				Ok(()) => return Ok(()),
				Err(ready_at) => ready_at,
			};

			#[cfg(feature = "tracing")]
			tracing::debug!(
				wait_ms = ready_at.saturating_duration_since(self.clock.now()).as_millis() as u64,
				"waiting for rate limit token"
			);

			tokio::select! {
				biased;

				reason = cancel.fired(self.clock.as_ref()) => return Err(reason),
				_ = self.clock.sleep_until(ready_at) => (),
			}
		}
	}
}
impl Debug for RateLimiter {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RateLimiter").field("quota", &self.quota).finish()
	}
}
