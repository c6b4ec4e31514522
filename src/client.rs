//! The shared client: rate-limited, cancellable dispatch plus response classification.

// self
use crate::{
	_prelude::*,
	cancel::CancelSignal,
	config::ClientConfig,
	decode::{self, BinaryResponse},
	endpoint::EndpointDescriptor,
	http::{HttpRequest, MapsHttpClient, RawResponse},
	obs::{self, CallOutcome, CallRecord, CallReporter, CallSpan, NoopReporter},
	ratelimit::{Clock, RateLimiter, TokioClock},
	request::{OutboundRequest, ServiceRequest, build_query},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Library identifier sent in the `User-Agent` header.
pub const USER_AGENT: &str = concat!("maps-transport-rs/", env!("CARGO_PKG_VERSION"));
/// Header carrying the configured experience IDs.
pub const EXPERIENCE_ID_HEADER: &str = "X-Goog-Maps-Experience-ID";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestMapsClient = Client<ReqwestHttpClient>;

/// Issues authenticated service calls through one shared rate limiter.
///
/// The client owns the validated configuration, the transport, the token bucket, and the
/// call reporter. It is cheap to clone (every clone shares the same bucket) and safe to use
/// from any number of tasks at once.
pub struct Client<C>
where
	C: ?Sized + MapsHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	config: Arc<ClientConfig>,
	limiter: Arc<RateLimiter>,
	clock: Arc<dyn Clock>,
	reporter: Arc<dyn CallReporter>,
}
impl<C> Client<C>
where
	C: ?Sized + MapsHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: ClientConfig, http_client: impl Into<Arc<C>>) -> Self {
		let clock: Arc<dyn Clock> = Arc::new(TokioClock);

		Self {
			http_client: http_client.into(),
			limiter: Arc::new(RateLimiter::new(config.quota(), clock.clone())),
			config: Arc::new(config),
			clock,
			reporter: Arc::new(NoopReporter),
		}
	}

	/// Replaces the time source driving the rate limiter and deadlines.
	///
	/// Resets the token bucket, so call this before the client is shared.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.limiter = Arc::new(RateLimiter::new(self.config.quota(), clock.clone()));
		self.clock = clock;

		self
	}

	/// Sends every finished call's record to `reporter`.
	pub fn with_reporter(mut self, reporter: Arc<dyn CallReporter>) -> Self {
		self.reporter = reporter;

		self
	}

	/// Validated configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Time source shared by the limiter and deadlines.
	pub fn clock(&self) -> &dyn Clock {
		self.clock.as_ref()
	}

	/// Sends `request` and returns the raw response without classifying it.
	///
	/// The query is authenticated first, so credential failures never consume a rate-limit
	/// token. A signal that fires before or during the token wait means no transport call
	/// is made; a signal that fires while the transport call is in flight drops it.
	pub async fn dispatch(
		&self,
		request: OutboundRequest<'_>,
		cancel: &CancelSignal,
	) -> Result<RawResponse> {
		let endpoint = request.endpoint;

		self.observe(&endpoint.name, "dispatch", self.send(request, cancel)).await
	}

	/// Calls a JSON endpoint and decodes its payload into `T`.
	pub async fn call_json<T, R>(
		&self,
		endpoint: &EndpointDescriptor,
		request: &R,
		cancel: &CancelSignal,
	) -> Result<T>
	where
		T: DeserializeOwned,
		R: ?Sized + ServiceRequest,
	{
		self.observe(&endpoint.name, "call_json", async move {
			let outbound = OutboundRequest::from_service(endpoint, request)?;
			let raw = self.send(outbound, cancel).await?;

			decode::decode_json(&raw, endpoint)
		})
		.await
	}

	/// Calls an image endpoint and returns its bytes.
	pub async fn call_binary<R>(
		&self,
		endpoint: &EndpointDescriptor,
		request: &R,
		cancel: &CancelSignal,
	) -> Result<BinaryResponse>
	where
		R: ?Sized + ServiceRequest,
	{
		self.observe(&endpoint.name, "call_binary", async move {
			let outbound = OutboundRequest::from_service(endpoint, request)?;
			let raw = self.send(outbound, cancel).await?;

			decode::decode_binary(raw)
		})
		.await
	}

	async fn send(&self, request: OutboundRequest<'_>, cancel: &CancelSignal) -> Result<RawResponse> {
		let OutboundRequest { verb, endpoint, params, body } = request;
		let query = build_query(endpoint, params, &self.config)?;
		let url = endpoint.request_url(self.config.base_url(), &query)?;
		let http_request = HttpRequest { verb, url, headers: self.headers(), body };

		self.limiter.acquire(cancel).await.map_err(Error::Canceled)?;

		tokio::select! {
			biased;

			reason = cancel.fired(self.clock.as_ref()) => Err(Error::Canceled(reason)),
			response = self.http_client.execute(http_request) => Ok(response?),
		}
	}

	fn headers(&self) -> Vec<(String, String)> {
		let mut headers = vec![("User-Agent".to_owned(), self.config.user_agent().to_owned())];
		let experience_ids = self.config.experience_ids();

		if !experience_ids.is_empty() {
			headers.push((EXPERIENCE_ID_HEADER.to_owned(), experience_ids.join(",")));
		}

		headers
	}

	async fn observe<T, F>(&self, endpoint: &str, stage: &'static str, fut: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		let started = self.clock.now();
		let result = CallSpan::new(endpoint, stage).instrument(fut).await;
		let record = CallRecord {
			endpoint: endpoint.to_owned(),
			latency: self.clock.now().saturating_duration_since(started),
			outcome: CallOutcome::of(&result),
		};

		#[cfg(feature = "tracing")]
		{
			if let Err(e) = &result {
				tracing::debug!(
					endpoint,
					stage,
					outcome = record.outcome.as_str(),
					error = %e,
					"call failed"
				);
			}
		}

		obs::record_call(&record.endpoint, record.outcome, record.latency);
		self.reporter.report(&record);

		result
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Creates a client backed by a default reqwest transport.
	pub fn new(config: ClientConfig) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Clone for Client<C>
where
	C: ?Sized + MapsHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			limiter: self.limiter.clone(),
			clock: self.clock.clone(),
			reporter: self.reporter.clone(),
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ?Sized + MapsHttpClient,
{
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.config)
			.field("limiter", &self.limiter)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use parking_lot::Mutex;
	// self
	use super::*;
	use crate::{_preludet, cancel::CancelReason, error::CredentialError, http::HttpFuture, request::ParamSet};

	#[derive(Default)]
	struct StubTransport {
		calls: AtomicUsize,
		seen: Mutex<Vec<HttpRequest>>,
	}
	impl MapsHttpClient for StubTransport {
		fn execute(&self, request: HttpRequest) -> HttpFuture<'_> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.seen.lock().push(request);

			Box::pin(async { Ok(RawResponse::json(200, r#"{"status":"OK","results":[]}"#)) })
		}
	}

	#[derive(Default)]
	struct Recorder(Mutex<Vec<CallRecord>>);
	impl CallReporter for Recorder {
		fn report(&self, record: &CallRecord) {
			self.0.lock().push(record.clone());
		}
	}

	struct Geocode;
	impl ServiceRequest for Geocode {
		fn query_params(&self) -> ParamSet {
			ParamSet::new().with("address", "Sydney")
		}
	}

	fn endpoint() -> EndpointDescriptor {
		_preludet::test_json_endpoint("/maps/api/geocode/json")
	}

	fn client(config: ClientConfig) -> (Client<StubTransport>, Arc<StubTransport>) {
		let transport = Arc::new(StubTransport::default());

		(Client::with_http_client(config, transport.clone()), transport)
	}

	#[tokio::test]
	async fn requests_carry_user_agent_and_experience_ids() {
		let config = ClientConfig::builder()
			.api_key("AIza")
			.experience_id("exp-1")
			.experience_id("exp-2")
			.build()
			.expect("Config should build.");
		let (client, transport) = client(config);

		client
			.call_json::<serde_json::Value, _>(&endpoint(), &Geocode, &CancelSignal::new())
			.await
			.expect("Stubbed call should succeed.");

		let seen = transport.seen.lock();

		assert_eq!(seen[0].header("user-agent"), Some(USER_AGENT));
		assert!(USER_AGENT.starts_with("maps-transport-rs/"));
		assert_eq!(seen[0].header(EXPERIENCE_ID_HEADER), Some("exp-1,exp-2"));
		assert_eq!(
			seen[0].url.as_str(),
			"https://maps.example.com/maps/api/geocode/json?address=Sydney&key=AIza"
		);
	}

	#[tokio::test]
	async fn application_user_agent_keeps_library_identifier_last() {
		let config = ClientConfig::builder()
			.api_key("AIza")
			.user_agent("fleet-tracker/2.1")
			.build()
			.expect("Config should build.");
		let (client, transport) = client(config);

		client
			.call_json::<serde_json::Value, _>(&endpoint(), &Geocode, &CancelSignal::new())
			.await
			.expect("Stubbed call should succeed.");

		let seen = transport.seen.lock();
		let user_agent = seen[0].header("user-agent").expect("User-Agent should be set.");

		assert!(user_agent.starts_with("fleet-tracker/2.1 "));
		assert!(user_agent.ends_with(USER_AGENT));
	}

	#[tokio::test]
	async fn pre_canceled_calls_never_reach_the_transport() {
		let config = ClientConfig::builder().api_key("AIza").build().expect("Config should build.");
		let (client, transport) = client(config);
		let recorder = Arc::new(Recorder::default());
		let client = client.with_reporter(recorder.clone());
		let signal = CancelSignal::new();

		signal.cancel();

		let err = client
			.call_json::<serde_json::Value, _>(&endpoint(), &Geocode, &signal)
			.await
			.expect_err("Canceled calls should fail.");

		assert!(matches!(err, Error::Canceled(CancelReason::Caller)));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

		let records = recorder.0.lock();

		assert_eq!(records.len(), 1);
		assert_eq!(records[0].endpoint, "test-json");
		assert_eq!(records[0].outcome, CallOutcome::Canceled);
	}

	#[tokio::test]
	async fn credential_failures_are_reported_before_any_transport_call() {
		let config = ClientConfig::builder()
			.enterprise("gme-acme", "vNIXE0xscrmjlyV-12Nj_BvUPaw=")
			.build()
			.expect("Config should build.");
		let (client, transport) = client(config);
		let key_only = EndpointDescriptor::builder("roads")
			.host(Url::parse("https://roads.example.com").expect("Failed to parse host."))
			.path("/v1/snapToRoads")
			.build()
			.expect("Failed to build descriptor.");
		let err = client
			.call_json::<serde_json::Value, _>(&key_only, &Geocode, &CancelSignal::new())
			.await
			.expect_err("Key-only endpoints should reject enterprise credentials.");

		assert!(matches!(
			err,
			Error::Credential(CredentialError::EnterpriseNotAccepted { ref endpoint }) if endpoint == "roads"
		));
		assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn sequential_calls_respect_the_configured_rate() {
		let config = ClientConfig::builder()
			.api_key("AIza")
			.rate_limit(5.0)
			.build()
			.expect("Config should build.");
		let (client, transport) = client(config);
		let start = client.clock().now();

		for _ in 0..6 {
			client
				.dispatch(
					OutboundRequest::get(&endpoint(), ParamSet::new()),
					&CancelSignal::new(),
				)
				.await
				.expect("Stubbed dispatch should succeed.");
		}

		assert_eq!(transport.calls.load(Ordering::SeqCst), 6);
		assert!(client.clock().now() - start >= StdDuration::from_secs(1));
	}

	#[cfg(feature = "reqwest")]
	#[tokio::test]
	async fn reqwest_transport_sends_the_authenticated_query() {
		// crates.io
		use httpmock::prelude::*;

		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/maps/api/geocode/json")
					.query_param("address", "Sydney")
					.query_param("key", "AIza-test")
					.header("user-agent", USER_AGENT);
				then.status(200)
					.header("content-type", "application/json")
					.body(r#"{"status":"OK","results":[]}"#);
			})
			.await;
		let client = _preludet::build_reqwest_test_client(&server.base_url(), "AIza-test");
		let value = client
			.call_json::<serde_json::Value, _>(&endpoint(), &Geocode, &CancelSignal::new())
			.await
			.expect("Mocked call should succeed.");

		assert_eq!(value["status"], "OK");

		mock.assert_async().await;
	}
}
