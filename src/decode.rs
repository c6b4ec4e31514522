//! Response decoding and status classification.
//!
//! JSON services report their outcome in a `status` field (with an optional
//! `error_message`), while the newer services wrap failures in an `error` object. Both are
//! folded into the crate's error taxonomy here; endpoint wrappers only ever see their typed
//! payload or an [`Error`].

// self
use crate::{
	_prelude::*,
	endpoint::EndpointDescriptor,
	error::DecodeError,
	http::RawResponse,
};

/// Status reported by successful calls.
pub const STATUS_OK: &str = "OK";
/// Status reported when a query matched nothing.
pub const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";

/// Image payload returned by binary endpoints (place photos, static maps).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryResponse {
	/// Declared image content type.
	pub content_type: String,
	/// Image bytes.
	pub body: Vec<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct CommonEnvelope {
	#[serde(default)]
	status: Option<String>,
	#[serde(default)]
	error_message: Option<String>,
	#[serde(default)]
	error: Option<RpcStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct RpcStatus {
	#[serde(default)]
	code: Option<u16>,
	#[serde(default)]
	message: Option<String>,
	#[serde(default)]
	status: Option<String>,
}

/// Decodes a JSON response into `T` after classifying its status.
///
/// `ZERO_RESULTS` succeeds only when `endpoint` says so. The empty-list answer relies on
/// `T` marking its list fields `#[serde(default)]`: a required list field absent from a
/// `ZERO_RESULTS` body fails with [`Error::Decode`].
pub fn decode_json<T>(raw: &RawResponse, endpoint: &EndpointDescriptor) -> Result<T>
where
	T: DeserializeOwned,
{
	let envelope = parse::<CommonEnvelope>(raw)?;

	classify(envelope, raw, endpoint)?;

	Ok(parse::<T>(raw)?)
}

/// Classifies a binary (image) response.
pub fn decode_binary(raw: RawResponse) -> Result<BinaryResponse> {
	match raw.status {
		200 if raw.is_image() => Ok(BinaryResponse {
			content_type: raw.content_type.unwrap_or_default(),
			body: raw.body,
		}),
		200 => Err(Error::Api {
			status: "INVALID_CONTENT_TYPE".into(),
			message: format!(
				"expected an image but received `{}`: {}",
				raw.content_type.as_deref().unwrap_or("<none>"),
				raw.body_text()
			),
			retry_after: raw.retry_after,
		}),
		403 => Err(Error::QuotaExceeded),
		status => Err(Error::Api {
			status: http_status_label(status),
			message: raw.body_text().into_owned(),
			retry_after: raw.retry_after,
		}),
	}
}

fn classify(envelope: CommonEnvelope, raw: &RawResponse, endpoint: &EndpointDescriptor) -> Result<()> {
	if let Some(error) = envelope.error {
		return Err(Error::Api {
			status: error
				.status
				.unwrap_or_else(|| http_status_label(error.code.unwrap_or(raw.status))),
			message: error.message.unwrap_or_default(),
			retry_after: raw.retry_after,
		});
	}

	match envelope.status.as_deref() {
		Some(STATUS_OK) => Ok(()),
		Some(STATUS_ZERO_RESULTS) if endpoint.zero_results_ok() => Ok(()),
		Some(status) => Err(Error::Api {
			status: status.to_owned(),
			message: envelope.error_message.unwrap_or_default(),
			retry_after: raw.retry_after,
		}),
		None if raw.is_success() => Ok(()),
		None => Err(Error::Api {
			status: http_status_label(raw.status),
			message: raw.body_text().into_owned(),
			retry_after: raw.retry_after,
		}),
	}
}

fn parse<T>(raw: &RawResponse) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(&raw.body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| DecodeError::Json { source, status: raw.status })
}

fn http_status_label(status: u16) -> String {
	format!("HTTP_{status}")
}
