// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use bearer_relay::{
	client::AuthClient,
	config::{ClientConfig, CredentialPolicy},
	error::Error,
	reqwest::{
		StatusCode,
		header::{HeaderName, HeaderValue},
	},
	session::RecordingNavigator,
	source::SourceError,
	url::Url,
};

fn client(server: &MockServer, policy: CredentialPolicy) -> AuthClient {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");
	let config = ClientConfig::builder(base)
		.credential_policy(policy)
		.build()
		.expect("Configuration should be valid.");

	AuthClient::new(config, Arc::new(RecordingNavigator::default()))
		.expect("Reqwest client should build for integration tests.")
}

#[tokio::test]
async fn current_credential_is_attached_with_caller_headers() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(200).json_body(json!({ "token": "abc123" }));
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/me")
				.header("authorization", "Bearer abc123")
				.header("x-request-id", "r-1");
			then.status(200);
		})
		.await;
	let response = client(&server, CredentialPolicy::FailOpen)
		.get("/api/me")
		.header(HeaderName::from_static("x-request-id"), HeaderValue::from_static("r-1"))
		.send()
		.await
		.expect("Decorated call should succeed.");

	assert_eq!(response.status(), StatusCode::OK);

	profile.assert_calls_async(1).await;
}

#[tokio::test]
async fn missing_token_sends_request_unauthenticated() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(200).json_body(json!({ "token": null }));
		})
		.await;
	let catalog = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/components").header_missing("authorization");
			then.status(200);
		})
		.await;

	client(&server, CredentialPolicy::FailClosed)
		.get("/api/components")
		.send()
		.await
		.expect("A session without a token should still reach public endpoints.");

	catalog.assert_calls_async(1).await;
}

#[tokio::test]
async fn fail_open_proceeds_when_the_token_endpoint_fails() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(500);
		})
		.await;
	let catalog = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/components").header_missing("authorization");
			then.status(200);
		})
		.await;

	client(&server, CredentialPolicy::FailOpen)
		.get("/api/components")
		.send()
		.await
		.expect("Fail-open should send the call without a credential.");

	catalog.assert_calls_async(1).await;
}

#[tokio::test]
async fn fail_closed_rejects_before_the_network() {
	let server = MockServer::start_async().await;
	let _token = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(200).body("<html>oops</html>");
		})
		.await;
	let orders = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/orders");
			then.status(200);
		})
		.await;
	let err = client(&server, CredentialPolicy::FailClosed)
		.get("/api/orders")
		.send()
		.await
		.expect_err("Fail-closed should reject the call.");

	assert!(
		matches!(err, Error::CredentialUnavailable(SourceError::Malformed { .. })),
		"Unexpected error: {err:?}."
	);

	orders.assert_calls_async(0).await;
}

#[tokio::test]
async fn anonymous_calls_skip_the_token_endpoint() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(200).json_body(json!({ "token": "abc123" }));
		})
		.await;
	let send_otp = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/send-otp").header_missing("authorization");
			then.status(204);
		})
		.await;
	let response = client(&server, CredentialPolicy::FailOpen)
		.post("/api/auth/send-otp")
		.json(&json!({ "phone": "+15550100" }))
		.anonymous()
		.send()
		.await
		.expect("Anonymous call should succeed.");

	assert_eq!(response.status(), StatusCode::NO_CONTENT);

	token.assert_calls_async(0).await;
	send_otp.assert_calls_async(1).await;
}
