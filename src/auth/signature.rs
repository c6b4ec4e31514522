//! HMAC-SHA1 request signing for enterprise (client ID) credentials.
//!
//! The signed message is `path + "?" + canonical_query`, and the digest is base64url encoded
//! with padding. The remote service recomputes the same digest over the query it receives,
//! so the message must be byte-identical to what is transmitted.

// crates.io
use base64::{
	DecodeError, Engine, alphabet,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::URL_SAFE},
};
use hmac::{Hmac, Mac};
use sha1::Sha1;
// self
use crate::error::CredentialError;

type HmacSha1 = Hmac<Sha1>;

const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&alphabet::URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Signs `message` with `signing_key`, returning the base64url digest.
pub fn sign(signing_key: &[u8], message: &str) -> Result<String, CredentialError> {
	let mut mac = HmacSha1::new_from_slice(signing_key)
		.map_err(|e| CredentialError::InvalidSigningKey { reason: e.to_string() })?;

	mac.update(message.as_bytes());

	Ok(URL_SAFE.encode(mac.finalize().into_bytes()))
}

/// Builds the message signed for a request to `path` carrying `encoded_query`.
pub fn signing_message(path: &str, encoded_query: &str) -> String {
	format!("{path}?{encoded_query}")
}

pub(crate) fn decode_key(encoded: &str) -> Result<Vec<u8>, DecodeError> {
	KEY_ENGINE.decode(encoded)
}
