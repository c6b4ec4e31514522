//! Outbound request model, canonical parameters, and the authenticated query builder.

mod authenticate;
mod params;

pub use authenticate::*;
pub use params::*;

// self
use crate::{_prelude::*, endpoint::EndpointDescriptor, error::ConfigError, http::Verb};

/// Capability interface implemented by every endpoint request type.
pub trait ServiceRequest
where
	Self: Send + Sync,
{
	/// Produces the query parameters for this request.
	fn query_params(&self) -> ParamSet;

	/// Whether the request is sent as a POST with a JSON body.
	fn uses_post(&self) -> bool {
		false
	}

	/// JSON body for POST requests.
	fn json_body(&self) -> Option<serde_json::Value> {
		None
	}
}

/// One logical call: verb, borrowed endpoint descriptor, parameters, and optional body.
#[derive(Clone, Debug)]
pub struct OutboundRequest<'a> {
	/// HTTP verb.
	pub verb: Verb,
	/// Endpoint the request targets.
	pub endpoint: &'a EndpointDescriptor,
	/// Unauthenticated query parameters.
	pub params: ParamSet,
	/// Serialized JSON body for POST requests.
	pub body: Option<Vec<u8>>,
}
impl<'a> OutboundRequest<'a> {
	/// Creates a GET request.
	pub fn get(endpoint: &'a EndpointDescriptor, params: ParamSet) -> Self {
		Self { verb: Verb::Get, endpoint, params, body: None }
	}

	/// Creates a POST request carrying `body` as JSON.
	pub fn post(endpoint: &'a EndpointDescriptor, params: ParamSet, body: Vec<u8>) -> Self {
		Self { verb: Verb::Post, endpoint, params, body: Some(body) }
	}

	/// Lowers a [`ServiceRequest`] into an outbound request for `endpoint`.
	pub fn from_service<R>(endpoint: &'a EndpointDescriptor, request: &R) -> Result<Self>
	where
		R: ?Sized + ServiceRequest,
	{
		let params = request.query_params();

		if !request.uses_post() {
			return Ok(Self::get(endpoint, params));
		}

		let body = match request.json_body() {
			Some(value) => serde_json::to_vec(&value).map_err(ConfigError::RequestBody)?,
			None => b"{}".to_vec(),
		};

		Ok(Self::post(endpoint, params, body))
	}
}
