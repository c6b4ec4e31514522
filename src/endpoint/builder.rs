// self
use crate::{
	_prelude::*,
	endpoint::{EndpointDescriptor, ZeroResultsPolicy},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum EndpointDescriptorError {
	/// Descriptor names must be non-empty.
	#[error("Endpoint name cannot be empty.")]
	EmptyName,
	/// Host is mandatory.
	#[error("Endpoint `{name}` is missing a host.")]
	MissingHost {
		/// Descriptor name.
		name: String,
	},
	/// Path is mandatory.
	#[error("Endpoint `{name}` is missing a path.")]
	MissingPath {
		/// Descriptor name.
		name: String,
	},
	/// Hosts must use HTTPS.
	#[error("Endpoint `{name}` host must use HTTPS: {url}.")]
	InsecureHost {
		/// Descriptor name.
		name: String,
		/// Host URL that failed validation.
		url: String,
	},
	/// Hosts must be a bare origin without path, query, or fragment.
	#[error("Endpoint `{name}` host must be a bare origin: {url}.")]
	HostNotOrigin {
		/// Descriptor name.
		name: String,
		/// Host URL that failed validation.
		url: String,
	},
	/// Paths must be absolute and free of query strings.
	#[error("Endpoint `{name}` path must start with `/` and carry no query: {path}.")]
	InvalidPath {
		/// Descriptor name.
		name: String,
		/// Path that failed validation.
		path: String,
	},
}

/// Builder for [`EndpointDescriptor`] values.
#[derive(Debug)]
pub struct EndpointDescriptorBuilder {
	/// Name for the descriptor being constructed.
	pub name: String,
	/// Host serving the endpoint.
	pub host: Option<Url>,
	/// Request path.
	pub path: Option<String>,
	/// Whether enterprise credentials are accepted.
	pub accepts_enterprise_auth: bool,
	/// Classification of `ZERO_RESULTS`.
	pub zero_results: ZeroResultsPolicy,
}
impl EndpointDescriptorBuilder {
	/// Creates a new builder seeded with the provided name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			host: None,
			path: None,
			accepts_enterprise_auth: false,
			zero_results: ZeroResultsPolicy::default(),
		}
	}

	/// Sets the host origin.
	pub fn host(mut self, url: Url) -> Self {
		self.host = Some(url);

		self
	}

	/// Sets the request path.
	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = Some(path.into());

		self
	}

	/// Marks enterprise credentials as accepted (or not).
	pub fn accepts_enterprise_auth(mut self, accepted: bool) -> Self {
		self.accepts_enterprise_auth = accepted;

		self
	}

	/// Overrides the `ZERO_RESULTS` policy.
	pub fn zero_results(mut self, policy: ZeroResultsPolicy) -> Self {
		self.zero_results = policy;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<EndpointDescriptor, EndpointDescriptorError> {
		if self.name.trim().is_empty() {
			return Err(EndpointDescriptorError::EmptyName);
		}

		let host =
			self.host.ok_or_else(|| EndpointDescriptorError::MissingHost { name: self.name.clone() })?;
		let path =
			self.path.ok_or_else(|| EndpointDescriptorError::MissingPath { name: self.name.clone() })?;
		let descriptor = EndpointDescriptor {
			name: self.name,
			host,
			path,
			accepts_enterprise_auth: self.accepts_enterprise_auth,
			zero_results: self.zero_results,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl EndpointDescriptor {
	fn validate(&self) -> Result<(), EndpointDescriptorError> {
		if self.host.scheme() != "https" {
			return Err(EndpointDescriptorError::InsecureHost {
				name: self.name.clone(),
				url: self.host.to_string(),
			});
		}
		if self.host.path() != "/" || self.host.query().is_some() || self.host.fragment().is_some()
		{
			return Err(EndpointDescriptorError::HostNotOrigin {
				name: self.name.clone(),
				url: self.host.to_string(),
			});
		}
		if !self.path.starts_with('/') || self.path.contains(['?', '#']) {
			return Err(EndpointDescriptorError::InvalidPath {
				name: self.name.clone(),
				path: self.path.clone(),
			});
		}

		Ok(())
	}
}
