#![cfg(feature = "reqwest")]

// std
use std::time::{Duration, Instant};
// crates.io
use httpmock::prelude::*;
use serde::Deserialize;
// self
use maps_transport::{
	cancel::{CancelReason, CancelSignal},
	client::{Client, ReqwestMapsClient, USER_AGENT},
	config::ClientConfig,
	endpoint::{EndpointCatalog, EndpointDescriptor},
	error::Error,
	http::ReqwestHttpClient,
	request::{ParamSet, ServiceRequest},
};

const API_KEY: &str = "AIza-integration";

struct Query(ParamSet);
impl ServiceRequest for Query {
	fn query_params(&self) -> ParamSet {
		self.0.clone()
	}
}

struct Geolocate;
impl ServiceRequest for Geolocate {
	fn query_params(&self) -> ParamSet {
		ParamSet::new()
	}

	fn uses_post(&self) -> bool {
		true
	}

	fn json_body(&self) -> Option<serde_json::Value> {
		Some(serde_json::json!({ "considerIp": true }))
	}
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
	#[serde(default)]
	results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
	formatted_address: String,
}

fn catalog() -> EndpointCatalog {
	EndpointCatalog::standard().expect("Standard catalog should build.")
}

fn build_client(server: &MockServer) -> ReqwestMapsClient {
	build_client_with(server, ClientConfig::builder().api_key(API_KEY).unlimited_rate())
}

fn build_client_with(
	server: &MockServer,
	builder: maps_transport::config::ClientConfigBuilder,
) -> ReqwestMapsClient {
	let config =
		builder.base_url(server.base_url()).build().expect("Test configuration should build.");

	Client::with_http_client(config, ReqwestHttpClient::default())
}

fn address(value: &str) -> Query {
	Query(ParamSet::new().with("address", value))
}

#[tokio::test]
async fn geocode_sends_key_and_user_agent() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/maps/api/geocode/json")
				.query_param("address", "1600 Amphitheatre Parkway")
				.query_param("key", API_KEY)
				.header("user-agent", USER_AGENT);
			then.status(200).header("content-type", "application/json").body(
				r#"{"status":"OK","results":[{"formatted_address":"1600 Amphitheatre Pkwy, Mountain View, CA"}]}"#,
			);
		})
		.await;
	let client = build_client(&server);
	let response: GeocodeResponse = client
		.call_json(&catalog().geocode, &address("1600 Amphitheatre Parkway"), &CancelSignal::new())
		.await
		.expect("Geocode should succeed.");

	assert_eq!(response.results[0].formatted_address, "1600 Amphitheatre Pkwy, Mountain View, CA");

	mock.assert_async().await;
}

#[tokio::test]
async fn enterprise_requests_carry_client_and_signature() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/maps/api/geocode/json")
				.query_param("address", "New York")
				.query_param("client", "clientID")
				.query_param("signature", "chaRF2hTJKOScPr-RQCEhZbSzIE=");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"status":"OK","results":[]}"#);
		})
		.await;
	let client = build_client_with(
		&server,
		ClientConfig::builder().enterprise("clientID", "vNIXE0xscrmjlyV-12Nj_BvUPaw="),
	);
	let response: GeocodeResponse = client
		.call_json(&catalog().geocode, &address("New York"), &CancelSignal::new())
		.await
		.expect("Signed geocode should succeed.");

	assert!(response.results.is_empty());

	mock.assert_async().await;
}

#[tokio::test]
async fn zero_results_decodes_as_empty_list() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/maps/api/geocode/json");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"status":"ZERO_RESULTS","results":[]}"#);
		})
		.await;
	let client = build_client(&server);
	let response: GeocodeResponse = client
		.call_json(&catalog().geocode, &address("Atlantis"), &CancelSignal::new())
		.await
		.expect("ZERO_RESULTS should be an empty success for geocode.");

	assert!(response.results.is_empty());
}

#[tokio::test]
async fn over_query_limit_surfaces_status_message_and_retry_hint() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/maps/api/geocode/json");
			then.status(200)
				.header("content-type", "application/json")
				.header("retry-after", "3")
				.body(r#"{"status":"OVER_QUERY_LIMIT","error_message":"exceeded","results":[]}"#);
		})
		.await;
	let client = build_client(&server);
	let err = client
		.call_json::<GeocodeResponse, _>(&catalog().geocode, &address("Sydney"), &CancelSignal::new())
		.await
		.expect_err("OVER_QUERY_LIMIT should fail.");

	match err {
		Error::Api { status, message, retry_after } => {
			assert_eq!(status, "OVER_QUERY_LIMIT");
			assert_eq!(message, "exceeded");
			assert_eq!(retry_after, Some(time::Duration::seconds(3)));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn malformed_bodies_are_decode_errors() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/maps/api/geocode/json");
			then.status(200).header("content-type", "application/json").body("<html>oops</html>");
		})
		.await;
	let client = build_client(&server);
	let err = client
		.call_json::<GeocodeResponse, _>(&catalog().geocode, &address("Sydney"), &CancelSignal::new())
		.await
		.expect_err("HTML bodies should not decode.");

	assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test]
async fn geolocation_posts_json_body() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/geolocation/v1/geolocate")
				.query_param("key", API_KEY)
				.json_body(serde_json::json!({ "considerIp": true }));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"location":{"lat":37.42,"lng":-122.08},"accuracy":20.0}"#);
		})
		.await;
	let client = build_client(&server);
	let value: serde_json::Value = client
		.call_json(&catalog().geolocation, &Geolocate, &CancelSignal::new())
		.await
		.expect("Geolocation should succeed.");

	assert_eq!(value["accuracy"], 20.0);

	mock.assert_async().await;
}

#[tokio::test]
async fn binary_endpoints_classify_by_http_status() {
	let server = MockServer::start_async().await;
	let catalog = catalog();
	let photo_path = catalog.place_photo.path.clone();
	let map_path = catalog.static_map.path.clone();
	let _ok = server
		.mock_async(|when, then| {
			when.method(GET).path(photo_path.as_str()).query_param("photo_reference", "ok");
			then.status(200).header("content-type", "image/jpeg").body([0xff, 0xd8, 0xff]);
		})
		.await;
	let _quota = server
		.mock_async(|when, then| {
			when.method(GET).path(photo_path.as_str()).query_param("photo_reference", "quota");
			then.status(403).body("quota");
		})
		.await;
	let _broken = server
		.mock_async(|when, then| {
			when.method(GET).path(map_path.as_str());
			then.status(500).header("content-type", "text/plain").body("renderer unavailable");
		})
		.await;
	let client = build_client(&server);
	let photo = |reference: &str| Query(ParamSet::new().with("photo_reference", reference));
	let image = client
		.call_binary(&catalog.place_photo, &photo("ok"), &CancelSignal::new())
		.await
		.expect("Photo should download.");

	assert_eq!(image.content_type, "image/jpeg");
	assert_eq!(image.body, vec![0xff, 0xd8, 0xff]);

	let quota = client
		.call_binary(&catalog.place_photo, &photo("quota"), &CancelSignal::new())
		.await
		.expect_err("403 should fail.");

	assert!(matches!(quota, Error::QuotaExceeded));

	let broken = client
		.call_binary(&catalog.static_map, &Query(ParamSet::new()), &CancelSignal::new())
		.await
		.expect_err("500 should fail.");

	match broken {
		Error::Api { status, message, .. } => {
			assert_eq!(status, "HTTP_500");
			assert!(message.contains("renderer unavailable"));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn slow_responses_are_abandoned_at_the_deadline() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/maps/api/geocode/json");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"status":"OK","results":[]}"#)
				.delay(Duration::from_secs(5));
		})
		.await;
	let client = build_client(&server);
	let signal = CancelSignal::new().with_timeout(client.clock(), Duration::from_millis(150));
	let started = Instant::now();
	let err = client
		.call_json::<GeocodeResponse, _>(&catalog().geocode, &address("Sydney"), &signal)
		.await
		.expect_err("Deadline should cancel the in-flight call.");

	assert!(matches!(err, Error::Canceled(CancelReason::Deadline)));
	assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn custom_descriptors_route_through_the_base_url() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v2/custom").query_param("key", API_KEY);
			then.status(200).header("content-type", "application/json").body(r#"{"status":"OK"}"#);
		})
		.await;
	let descriptor = EndpointDescriptor::builder("custom")
		.host(url::Url::parse("https://custom.example.com").expect("Host should parse."))
		.path("/v2/custom")
		.build()
		.expect("Custom descriptor should build.");
	let client = build_client(&server);
	let value: serde_json::Value = client
		.call_json(&descriptor, &Query(ParamSet::new()), &CancelSignal::new())
		.await
		.expect("Custom endpoint should succeed.");

	assert_eq!(value["status"], "OK");

	mock.assert_async().await;
}
