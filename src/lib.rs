//! Authenticated, rate-limited, cancellable transport for mapping web services: request
//! signing, status classification, and the encoded polyline codec in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cancel;
pub mod client;
pub mod config;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod obs;
pub mod polyline;
pub mod ratelimit;
pub mod request;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// self
	#[cfg(feature = "reqwest")] use crate::{client::Client, http::ReqwestHttpClient};
	use crate::{
		config::ClientConfig,
		endpoint::{EndpointDescriptor, ZeroResultsPolicy},
	};

	/// Client type alias used by reqwest-backed tests.
	#[cfg(feature = "reqwest")]
	pub type ReqwestTestClient = Client<ReqwestHttpClient>;

	/// Builds a plain reqwest HTTP client suitable for talking to `httpmock` servers.
	#[cfg(feature = "reqwest")]
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.build()
			.expect("Failed to build Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds an unlimited API-key configuration whose requests are routed to `base_url`.
	pub fn test_config(base_url: &str, api_key: &str) -> ClientConfig {
		ClientConfig::builder()
			.api_key(api_key)
			.base_url(base_url)
			.unlimited_rate()
			.build()
			.expect("Failed to build client configuration for tests.")
	}

	/// Builds an API-key client whose requests are routed to `base_url`.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(base_url: &str, api_key: &str) -> ReqwestTestClient {
		Client::with_http_client(test_config(base_url, api_key), test_reqwest_http_client())
	}

	/// Descriptor for a JSON endpoint served from `path`, accepting enterprise auth.
	pub fn test_json_endpoint(path: &str) -> EndpointDescriptor {
		EndpointDescriptor::builder("test-json")
			.host(Url::parse("https://maps.example.com").expect("Failed to parse test host."))
			.path(path)
			.accepts_enterprise_auth(true)
			.zero_results(ZeroResultsPolicy::Success)
			.build()
			.expect("Failed to build test endpoint descriptor.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::{Duration as StdDuration, Instant},
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
