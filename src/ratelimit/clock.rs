// self
use crate::_prelude::*;

/// Boxed sleep future returned by [`Clock::sleep_until`].
pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Monotonic time source used by the rate limiter and cancellation deadlines.
pub trait Clock
where
	Self: 'static + Send + Sync,
{
	/// Current instant.
	fn now(&self) -> Instant;

	/// Resolves once `deadline` has been reached.
	fn sleep_until(&self, deadline: Instant) -> Sleep;
}

/// [`Clock`] backed by `tokio::time`, so tests can pause and auto-advance time.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioClock;
impl Clock for TokioClock {
	fn now(&self) -> Instant {
		tokio::time::Instant::now().into_std()
	}

	fn sleep_until(&self, deadline: Instant) -> Sleep {
		Box::pin(tokio::time::sleep_until(deadline.into()))
	}
}
