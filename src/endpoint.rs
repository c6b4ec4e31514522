//! Endpoint descriptors (immutable data) and the standard catalog.
//!
//! A descriptor names a remote service's host and path, whether it accepts enterprise
//! (client ID + signature) credentials, and how its `ZERO_RESULTS` status is classified.
//! Descriptors are validated once by [`EndpointDescriptorBuilder`] and only ever borrowed
//! afterwards.

/// Builder API for assembling endpoint descriptors.
pub mod builder;
/// Standard catalog of mapping service endpoints.
pub mod catalog;

pub use builder::*;
pub use catalog::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// How a `ZERO_RESULTS` status is classified for an endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ZeroResultsPolicy {
	/// `ZERO_RESULTS` is a successful, empty answer.
	#[default]
	Success,
	/// `ZERO_RESULTS` surfaces as an [`Error::Api`].
	Error,
}

/// Immutable descriptor for one remote service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointDescriptor {
	/// Stable name used in logs, spans, and metrics.
	pub name: String,
	/// Scheme + authority serving the endpoint.
	pub host: Url,
	/// Absolute request path (signed verbatim for enterprise credentials).
	pub path: String,
	/// Whether client ID + signature credentials are accepted.
	pub accepts_enterprise_auth: bool,
	/// Classification of the `ZERO_RESULTS` status.
	pub zero_results: ZeroResultsPolicy,
}
impl EndpointDescriptor {
	/// Creates a new builder for the provided name.
	pub fn builder(name: impl Into<String>) -> EndpointDescriptorBuilder {
		EndpointDescriptorBuilder::new(name)
	}

	/// Returns `true` when `ZERO_RESULTS` counts as success.
	pub fn zero_results_ok(&self) -> bool {
		matches!(self.zero_results, ZeroResultsPolicy::Success)
	}

	/// Assembles the request URL for `query`, optionally routed to `base` instead of the
	/// descriptor host.
	///
	/// The query is attached as already-encoded text so the transmitted bytes match the
	/// signed bytes.
	pub fn request_url(&self, base: Option<&Url>, query: &str) -> Result<Url, ConfigError> {
		let origin = base.unwrap_or(&self.host);
		let joined = format!("{}{}", origin.as_str().trim_end_matches('/'), self.path);
		let mut url = Url::parse(&joined).map_err(|source| ConfigError::InvalidRequestUrl { source })?;

		url.set_query(if query.is_empty() { None } else { Some(query) });

		Ok(url)
	}
}
