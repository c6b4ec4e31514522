//! Optional observability helpers for service calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `maps_transport.call` with the
//!   `endpoint` (descriptor name) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `maps_transport_call_total` counter for every finished
//!   call, labeled by `endpoint` + `outcome`, and to record its latency in the
//!   `maps_transport_call_latency_seconds` histogram.
//!
//! Independently of the features, every finished call is handed to the client's
//! [`CallReporter`].

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each finished call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// The service answered and the response classified as success.
	Success,
	/// The call was canceled or its deadline elapsed.
	Canceled,
	/// The transport failed before a response arrived.
	TransportFailure,
	/// The service answered with an error status or an undecodable body.
	ServiceFailure,
	/// The call was rejected locally (credentials or configuration).
	Rejected,
}
impl CallOutcome {
	/// Classifies a call result.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Success,
			Err(Error::Canceled(_)) => Self::Canceled,
			Err(Error::Transport(_)) => Self::TransportFailure,
			Err(Error::Credential(_) | Error::Config(_)) => Self::Rejected,
			Err(Error::Api { .. } | Error::Decode(_) | Error::QuotaExceeded) => Self::ServiceFailure,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Success => "success",
			CallOutcome::Canceled => "canceled",
			CallOutcome::TransportFailure => "transport_failure",
			CallOutcome::ServiceFailure => "service_failure",
			CallOutcome::Rejected => "rejected",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Summary of one finished call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
	/// Descriptor name of the endpoint.
	pub endpoint: String,
	/// Wall time from entry (including rate-limit waits) to classification.
	pub latency: StdDuration,
	/// Classified outcome.
	pub outcome: CallOutcome,
}

/// External sink for per-call metrics.
pub trait CallReporter
where
	Self: Send + Sync,
{
	/// Receives the record of one finished call.
	fn report(&self, record: &CallRecord);
}

/// Reporter that drops every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopReporter;
impl CallReporter for NoopReporter {
	fn report(&self, _: &CallRecord) {}
}
