//! Client configuration and its validating builder.
//!
//! Everything that can be wrong with a configuration is rejected by
//! [`ClientConfigBuilder::build`]; a constructed [`ClientConfig`] never fails a call for
//! configuration reasons.

// crates.io
use governor::Quota;
// self
use crate::{
	_prelude::*,
	auth::Credentials,
	client::USER_AGENT,
	error::{ConfigError, CredentialError},
	ratelimit::RateLimit,
};

/// Validated, immutable client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	credentials: Credentials,
	channel: Option<String>,
	rate_limit: RateLimit,
	quota: Option<Quota>,
	base_url: Option<Url>,
	experience_ids: Vec<String>,
	user_agent: String,
}
impl ClientConfig {
	/// Creates an empty builder.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}

	/// Configured credential form.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Enterprise usage-reporting channel, if any.
	pub fn channel(&self) -> Option<&str> {
		self.channel.as_deref()
	}

	/// Request-rate configuration shared by every call.
	pub fn rate_limit(&self) -> RateLimit {
		self.rate_limit
	}

	/// Validated limiter quota for [`Self::rate_limit`], `None` when unlimited.
	pub fn quota(&self) -> Option<Quota> {
		self.quota
	}

	/// Origin overriding every descriptor host, if any.
	pub fn base_url(&self) -> Option<&Url> {
		self.base_url.as_ref()
	}

	/// Experience IDs sent with every request.
	pub fn experience_ids(&self) -> &[String] {
		&self.experience_ids
	}

	/// Full `User-Agent` value, always ending in the library identifier.
	pub fn user_agent(&self) -> &str {
		&self.user_agent
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	api_key: Option<String>,
	client_id: Option<String>,
	signing_key: Option<String>,
	channel: Option<String>,
	qps: Option<f64>,
	burst: Option<u32>,
	unlimited: bool,
	base_url: Option<String>,
	experience_ids: Vec<String>,
	user_agent: Option<String>,
}
impl ClientConfigBuilder {
	/// Authenticates with a static API key.
	pub fn api_key(mut self, key: impl Into<String>) -> Self {
		self.api_key = Some(key.into());

		self
	}

	/// Sets the enterprise client ID.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the base64url-encoded enterprise signing key.
	pub fn signing_key(mut self, signing_key: impl Into<String>) -> Self {
		self.signing_key = Some(signing_key.into());

		self
	}

	/// Authenticates with an enterprise client ID and signing key.
	pub fn enterprise(self, client_id: impl Into<String>, signing_key: impl Into<String>) -> Self {
		self.client_id(client_id).signing_key(signing_key)
	}

	/// Tags every request with an enterprise usage-reporting channel.
	pub fn channel(mut self, channel: impl Into<String>) -> Self {
		self.channel = Some(channel.into());

		self
	}

	/// Overrides the target request rate (queries per second).
	pub fn rate_limit(mut self, qps: f64) -> Self {
		self.qps = Some(qps);
		self.unlimited = false;

		self
	}

	/// Overrides the burst size (bucket capacity).
	pub fn burst(mut self, burst: u32) -> Self {
		self.burst = Some(burst);

		self
	}

	/// Disables rate limiting.
	pub fn unlimited_rate(mut self) -> Self {
		self.unlimited = true;

		self
	}

	/// Routes every request to `base_url` instead of the descriptor host.
	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());

		self
	}

	/// Adds an experience ID sent in the experience-ID header.
	pub fn experience_id(mut self, id: impl Into<String>) -> Self {
		self.experience_ids.push(id.into());

		self
	}

	/// Places an application identifier ahead of the library identifier in `User-Agent`.
	///
	/// Every request sets `User-Agent` itself, which supersedes a user agent configured on
	/// the underlying HTTP client; configure it here instead.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig> {
		let credentials = resolve_credentials(self.api_key, self.client_id, self.signing_key)?;
		let channel = self.channel.map(validate_channel).transpose()?;
		let rate_limit = if self.unlimited {
			RateLimit::Unlimited
		} else {
			RateLimit::per_second(self.qps.unwrap_or(RateLimit::DEFAULT_QPS), self.burst.unwrap_or(1))?
		};
		let quota = rate_limit.quota()?;
		let base_url = self.base_url.as_deref().map(parse_base_url).transpose()?;
		let experience_ids = self
			.experience_ids
			.into_iter()
			.map(|id| validate_header_value(id, ConfigError::InvalidExperienceId))
			.collect::<Result<_, _>>()?;
		let user_agent = match self.user_agent {
			Some(app) => format!(
				"{} {USER_AGENT}",
				validate_header_value(app, ConfigError::InvalidUserAgent)?.trim()
			),
			None => USER_AGENT.to_owned(),
		};

		Ok(ClientConfig {
			credentials,
			channel,
			rate_limit,
			quota,
			base_url,
			experience_ids,
			user_agent,
		})
	}
}

fn resolve_credentials(
	api_key: Option<String>,
	client_id: Option<String>,
	signing_key: Option<String>,
) -> Result<Credentials, CredentialError> {
	match (api_key, client_id, signing_key) {
		(Some(_), Some(_), _) | (Some(_), _, Some(_)) =>
			Err(CredentialError::AmbiguousCredentials),
		(Some(key), None, None) => Credentials::api_key(key),
		(None, Some(client_id), Some(signing_key)) =>
			Credentials::enterprise(client_id, &signing_key),
		(None, Some(_), None) => Err(CredentialError::MissingSigningKey),
		(None, None, Some(_)) => Err(CredentialError::MissingClientId),
		(None, None, None) => Err(CredentialError::MissingCredentials),
	}
}

fn validate_channel(channel: String) -> Result<String, ConfigError> {
	let valid = !channel.is_empty()
		&& channel.bytes().all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));

	if valid { Ok(channel) } else { Err(ConfigError::InvalidChannel(channel)) }
}

fn validate_header_value(
	value: String,
	invalid: fn(String) -> ConfigError,
) -> Result<String, ConfigError> {
	let valid =
		!value.trim().is_empty() && value.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b));

	if valid { Ok(value) } else { Err(invalid(value)) }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let invalid = |reason: &str| ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason: reason.to_owned() };
	let url = Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(invalid("scheme must be http or https"));
	}
	if url.host_str().is_none() {
		return Err(invalid("host is required"));
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(invalid("query and fragment are not allowed"));
	}

	Ok(url)
}
