//! Crate-level error taxonomy shared by the builder, dispatcher, and decoder.

// self
use crate::{_prelude::*, cancel::CancelReason};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Nothing inside the crate retries or recovers; every variant reaches the caller unmodified.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credentials are missing, malformed, or not accepted by the endpoint.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Response body could not be parsed.
	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The caller canceled the call or its deadline elapsed.
	#[error("Request was canceled: {0}.")]
	Canceled(CancelReason),
	/// The service reported a status other than `OK` (or an accepted `ZERO_RESULTS`).
	#[error("Service returned {status}: {message}.")]
	Api {
		/// Verbatim status string reported by the service.
		status: String,
		/// Verbatim `error_message` (or response body text for binary endpoints).
		message: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// A binary endpoint answered HTTP 403.
	#[error("Quota exceeded for the binary endpoint.")]
	QuotaExceeded,
}
impl Error {
	/// Returns `true` when the failure was caused by cancellation or a deadline.
	pub fn is_canceled(&self) -> bool {
		matches!(self, Self::Canceled(_))
	}

	/// Returns the service status string for [`Error::Api`] failures.
	pub fn api_status(&self) -> Option<&str> {
		match self {
			Self::Api { status, .. } => Some(status),
			_ => None,
		}
	}

	/// Stable outcome label used by metrics and reporters.
	pub fn label(&self) -> &'static str {
		match self {
			Self::Credential(_) => "credential",
			Self::Config(_) => "config",
			Self::Transport(_) => "transport",
			Self::Decode(_) => "decode",
			Self::Canceled(_) => "canceled",
			Self::Api { .. } => "api",
			Self::QuotaExceeded => "quota_exceeded",
		}
	}
}

impl From<crate::endpoint::EndpointDescriptorError> for Error {
	fn from(e: crate::endpoint::EndpointDescriptorError) -> Self {
		Self::Config(e.into())
	}
}

/// Credential failures raised at configuration or query-building time.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum CredentialError {
	/// Neither an API key nor an enterprise client ID was supplied.
	#[error("No credentials configured.")]
	MissingCredentials,
	/// Both an API key and an enterprise client ID were supplied.
	#[error("Configure either an API key or an enterprise client ID, not both.")]
	AmbiguousCredentials,
	/// A client ID was supplied without a signing key.
	#[error("Enterprise client ID requires a signing key.")]
	MissingSigningKey,
	/// A signing key was supplied without a client ID.
	#[error("Signing key requires an enterprise client ID.")]
	MissingClientId,
	/// A credential string was empty or whitespace.
	#[error("The {field} credential must not be empty.")]
	Empty {
		/// Which credential failed validation.
		field: &'static str,
	},
	/// The signing key is not valid base64url.
	#[error("Signing key is not valid base64url: {reason}.")]
	InvalidSigningKey {
		/// Decoder failure message.
		reason: String,
	},
	/// The endpoint only accepts API keys.
	#[error("Endpoint `{endpoint}` does not accept enterprise credentials.")]
	EnterpriseNotAccepted {
		/// Descriptor name.
		endpoint: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL override cannot be parsed or is not a bare origin.
	#[error("Base URL `{url}` is invalid: {reason}.")]
	InvalidBaseUrl {
		/// Offending value.
		url: String,
		/// Why the value was rejected.
		reason: String,
	},
	/// Final request URL could not be assembled.
	#[error("Request URL is invalid.")]
	InvalidRequestUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Enterprise channel contains characters outside `[A-Za-z0-9._-]`.
	#[error("Channel `{0}` must be non-empty ASCII alphanumerics, `.`, `_`, or `-`.")]
	InvalidChannel(String),
	/// Experience ID is empty or contains characters not allowed in a header value.
	#[error("Experience ID `{0}` is not a valid header value.")]
	InvalidExperienceId(String),
	/// Application user agent is empty or contains characters not allowed in a header value.
	#[error("User agent `{0}` is not a valid header value.")]
	InvalidUserAgent(String),
	/// Requests-per-second is out of range.
	#[error("Rate limit must be a positive finite number of queries per second, got {0}.")]
	InvalidRateLimit(f64),
	/// Burst size must be at least one.
	#[error("Rate limit burst must be at least 1.")]
	InvalidBurst,
	/// Burst window (`burst` token intervals) is too long to track.
	#[error("Rate limit burst {0} spans a longer window than the limiter can track.")]
	BurstTooLarge(u32),
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[source] serde_json::Error),
	/// Endpoint descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::endpoint::EndpointDescriptorError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client gave up waiting.
	#[error("Request timed out while calling the service.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Response bodies that could not be parsed.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// JSON body was malformed or did not match the expected shape.
	#[error("Service returned malformed JSON (HTTP {status}).")]
	Json {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl DecodeError {
	/// JSON path at which parsing failed.
	pub fn path(&self) -> String {
		match self {
			Self::Json { source, .. } => source.path().to_string(),
		}
	}
}
