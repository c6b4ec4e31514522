// self
use crate::{
	auth::{Credentials, signature},
	config::ClientConfig,
	endpoint::EndpointDescriptor,
	error::CredentialError,
	request::ParamSet,
};

/// Produces the final, authenticated query string for `descriptor`.
///
/// API-key credentials add `key`. Enterprise credentials add `client`, encode the set once,
/// sign `path?query`, and append `&signature=` to that same encoded text so the signed and
/// transmitted bytes never diverge.
pub fn build_query(
	descriptor: &EndpointDescriptor,
	mut params: ParamSet,
	config: &ClientConfig,
) -> Result<String, CredentialError> {
	params.remove("signature");

	if let Some(channel) = config.channel() {
		params.set("channel", channel);
	}

	match config.credentials() {
		Credentials::ApiKey(key) => {
			params.remove("client");
			params.set("key", key.expose());

			Ok(params.encode())
		},
		Credentials::Enterprise { client_id, signing_key } => {
			if !descriptor.accepts_enterprise_auth {
				return Err(CredentialError::EnterpriseNotAccepted {
					endpoint: descriptor.name.clone(),
				});
			}

			params.remove("key");
			params.set("client", client_id.as_ref());

			let encoded = params.encode();
			let message = signature::signing_message(&descriptor.path, &encoded);
			let signature = signature::sign(signing_key.expose(), &message)?;

			Ok(format!("{encoded}&signature={signature}"))
		},
	}
}
