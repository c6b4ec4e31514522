//! Caller-supplied cancellation and deadlines.

// crates.io
use tokio::sync::watch;
// self
use crate::{_prelude::*, ratelimit::Clock};

/// Why a call was canceled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CancelReason {
	/// The caller canceled the signal.
	Caller,
	/// The call's deadline elapsed.
	Deadline,
}
impl CancelReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CancelReason::Caller => "caller",
			CancelReason::Deadline => "deadline",
		}
	}
}
impl Display for CancelReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Cancellation signal accepted by every call.
///
/// Combines a shared cancel flag with an optional deadline. Clones share the flag, so one
/// signal can cancel any number of concurrent calls.
#[derive(Clone, Debug)]
pub struct CancelSignal {
	flag: Arc<watch::Sender<bool>>,
	deadline: Option<Instant>,
}
impl CancelSignal {
	/// Creates a signal that only fires when [`CancelSignal::cancel`] is called.
	pub fn new() -> Self {
		let (flag, _) = watch::channel(false);

		Self { flag: Arc::new(flag), deadline: None }
	}

	/// Fires at `deadline` unless canceled earlier.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(self.deadline.map_or(deadline, |current| current.min(deadline)));

		self
	}

	/// Fires `timeout` after `clock`'s current instant unless canceled earlier.
	pub fn with_timeout(self, clock: &dyn Clock, timeout: StdDuration) -> Self {
		let deadline = clock.now() + timeout;

		self.with_deadline(deadline)
	}

	/// Fires the signal.
	pub fn cancel(&self) {
		self.flag.send_replace(true);
	}

	/// Returns `true` once [`CancelSignal::cancel`] has been called on any clone.
	pub fn is_canceled(&self) -> bool {
		*self.flag.borrow()
	}

	/// Configured deadline, if any.
	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	/// Returns the reason the signal has already fired at `now`, if it has.
	pub fn check(&self, now: Instant) -> Option<CancelReason> {
		if self.is_canceled() {
			return Some(CancelReason::Caller);
		}

		match self.deadline {
			Some(deadline) if deadline <= now => Some(CancelReason::Deadline),
			_ => None,
		}
	}

	/// Resolves once the signal fires.
	pub async fn fired(&self, clock: &dyn Clock) -> CancelReason {
		match self.deadline {
			Some(deadline) => tokio::select! {
				biased;

				_ = self.canceled() => CancelReason::Caller,
				_ = clock.sleep_until(deadline) => CancelReason::Deadline,
			},
			None => {
				self.canceled().await;

				CancelReason::Caller
			},
		}
	}

	async fn canceled(&self) {
		let mut rx = self.flag.subscribe();

		// `self` keeps the sender alive, so the wait only ends once the flag is set.
		if rx.wait_for(|canceled| *canceled).await.is_err() {
			std::future::pending::<()>().await;
		}
	}
}
impl Default for CancelSignal {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::ratelimit::TokioClock;

	#[tokio::test(start_paused = true)]
	async fn deadline_fires_on_the_clock() {
		let clock = TokioClock;
		let signal = CancelSignal::new().with_timeout(&clock, StdDuration::from_millis(250));
		let start = clock.now();

		assert_eq!(signal.check(start), None);
		assert_eq!(signal.fired(&clock).await, CancelReason::Deadline);
		assert!(clock.now() - start >= StdDuration::from_millis(250));
		assert_eq!(signal.check(clock.now()), Some(CancelReason::Deadline));
	}

	#[tokio::test(start_paused = true)]
	async fn caller_cancellation_wins_over_later_deadline() {
		let clock = TokioClock;
		let signal = CancelSignal::new().with_timeout(&clock, StdDuration::from_secs(60));
		let clone = signal.clone();

		assert!(!signal.is_canceled());

		clone.cancel();

		assert!(signal.is_canceled());

		assert_eq!(signal.check(clock.now()), Some(CancelReason::Caller));
		assert_eq!(signal.fired(&clock).await, CancelReason::Caller);
	}

	#[test]
	fn earliest_deadline_is_kept() {
		let now = Instant::now();
		let signal = CancelSignal::new()
			.with_deadline(now + StdDuration::from_secs(5))
			.with_deadline(now + StdDuration::from_secs(1))
			.with_deadline(now + StdDuration::from_secs(9));

		assert_eq!(signal.deadline(), Some(now + StdDuration::from_secs(1)));
	}
}
