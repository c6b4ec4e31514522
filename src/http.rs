//! Transport primitives for mapping service calls.
//!
//! The module exposes [`MapsHttpClient`] alongside [`HttpRequest`] and [`RawResponse`] so
//! downstream crates can plug in custom HTTP stacks (or test doubles) without losing the
//! dispatcher's rate limiting, cancellation, and classification. Implementations must read
//! the response body eagerly: the connection is released before the decoder runs.

// std
use std::borrow::Cow;
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`MapsHttpClient::execute`].
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + 'a + Send>>;

/// HTTP verbs used by the mapping services.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
	/// Query-only request.
	Get,
	/// Request with a JSON body.
	Post,
}
impl Verb {
	/// Returns the method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Verb::Get => "GET",
			Verb::Post => "POST",
		}
	}
}
impl Display for Verb {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully-assembled request handed to the transport.
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP verb.
	pub verb: Verb,
	/// Final URL including the authenticated query.
	pub url: Url,
	/// Extra headers (user agent, experience IDs, content type).
	pub headers: Vec<(String, String)>,
	/// Request body for POST calls.
	pub body: Option<Vec<u8>>,
}
impl HttpRequest {
	/// Returns the value of the first header named `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

/// Raw response captured by the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Declared `Content-Type`, if any.
	pub content_type: Option<String>,
	/// Body bytes, read eagerly.
	pub body: Vec<u8>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}
impl RawResponse {
	/// Builds a JSON response with the given status.
	pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			content_type: Some("application/json; charset=UTF-8".into()),
			body: body.into(),
			retry_after: None,
		}
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` when the declared content type is an image.
	pub fn is_image(&self) -> bool {
		self.content_type
			.as_deref()
			.is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("image/"))
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn body_text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}
}

/// Abstraction over HTTP transports capable of executing mapping service calls.
///
/// The trait is the dispatcher's only dependency on an HTTP stack. Implementations must be
/// `Send + Sync + 'static` so one transport can be shared by every call on a client, and
/// the returned future must be `Send`. Dropping the future must abort the request and
/// release its connection; the dispatcher relies on that for cancellation.
pub trait MapsHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes `request`, reading the full body before resolving.
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client with a total per-request timeout.
	pub fn with_timeout(timeout: StdDuration) -> Result<Self> {
		let client =
			ReqwestClient::builder().timeout(timeout).build().map_err(crate::error::ConfigError::from)?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl MapsHttpClient for ReqwestHttpClient {
	fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.verb {
				Verb::Get => reqwest::Method::GET,
				Verb::Post => reqwest::Method::POST,
			};
			let mut builder = client.request(method, request.url);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if let Some(body) = request.body {
				builder = builder.header(CONTENT_TYPE, "application/json").body(body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let headers = response.headers();
			let content_type =
				headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()).map(str::to_owned);
			let retry_after = parse_retry_after(headers);
			let body = response.bytes().await?.to_vec();

			Ok::<_, TransportError>(RawResponse { status, content_type, body, retry_after })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).ok()?));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
