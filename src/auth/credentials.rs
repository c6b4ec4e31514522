//! Credential values that keep sensitive material out of logs.

// self
use crate::{_prelude::*, auth::signature, error::CredentialError};

/// Static API key appended as the `key` query parameter.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);
impl ApiKey {
	/// Wraps an API key after rejecting empty values.
	pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
		let value = value.into();

		if value.trim().is_empty() {
			return Err(CredentialError::Empty { field: "api_key" });
		}

		Ok(Self(value))
	}

	/// Returns the inner key. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ApiKey").field(&"<redacted>").finish()
	}
}
impl Display for ApiKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Enterprise account identifier sent as the `client` query parameter.
///
/// Client IDs are not secret, so they format verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientId(String);
impl ClientId {
	/// Wraps a client ID after rejecting empty values.
	pub fn new(value: impl Into<String>) -> Result<Self, CredentialError> {
		let value = value.into();

		if value.trim().is_empty() {
			return Err(CredentialError::Empty { field: "client_id" });
		}

		Ok(Self(value))
	}
}
impl AsRef<str> for ClientId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for ClientId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Decoded HMAC key used to sign enterprise requests.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey(Vec<u8>);
impl SigningKey {
	/// Decodes the platform-issued base64url credential string.
	///
	/// Padding is optional; any other decode failure surfaces as
	/// [`CredentialError::InvalidSigningKey`].
	pub fn decode(encoded: &str) -> Result<Self, CredentialError> {
		let encoded = encoded.trim();

		if encoded.is_empty() {
			return Err(CredentialError::Empty { field: "signing_key" });
		}

		let bytes = signature::decode_key(encoded)
			.map_err(|e| CredentialError::InvalidSigningKey { reason: e.to_string() })?;

		if bytes.is_empty() {
			return Err(CredentialError::Empty { field: "signing_key" });
		}

		Ok(Self(bytes))
	}

	/// Wraps raw key bytes without decoding.
	pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
		Self(bytes.into())
	}

	/// Returns the raw key bytes. Callers must avoid logging them.
	pub fn expose(&self) -> &[u8] {
		&self.0
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningKey").field(&"<redacted>").finish()
	}
}

/// The credential form a client authenticates with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
	/// Static API key.
	ApiKey(ApiKey),
	/// Enterprise client ID plus signing key.
	Enterprise {
		/// Account identifier.
		client_id: ClientId,
		/// Decoded signing key.
		signing_key: SigningKey,
	},
}
impl Credentials {
	/// Builds API-key credentials.
	pub fn api_key(key: impl Into<String>) -> Result<Self, CredentialError> {
		Ok(Self::ApiKey(ApiKey::new(key)?))
	}

	/// Builds enterprise credentials, decoding the base64url signing key.
	pub fn enterprise(
		client_id: impl Into<String>,
		signing_key: &str,
	) -> Result<Self, CredentialError> {
		Ok(Self::Enterprise {
			client_id: ClientId::new(client_id)?,
			signing_key: SigningKey::decode(signing_key)?,
		})
	}

	/// Stable label for logs and spans.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::ApiKey(_) => "api_key",
			Self::Enterprise { .. } => "enterprise",
		}
	}
}
