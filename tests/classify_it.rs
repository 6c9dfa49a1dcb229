// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use bearer_relay::{
	client::AuthClient, config::ClientConfig, error::Error, session::RecordingNavigator, url::Url,
};

fn client(server: &MockServer) -> (AuthClient, Arc<RecordingNavigator>) {
	let base = Url::parse(&server.base_url()).expect("Mock server URL should parse.");
	let config = ClientConfig::builder(base)
		.auth_failure_statuses([401, 419])
		.build()
		.expect("Configuration should be valid.");
	let navigator = Arc::new(RecordingNavigator::default());
	let client = AuthClient::new(config, navigator.clone())
		.expect("Reqwest client should build for integration tests.");

	(client, navigator)
}

async fn mock_token(server: &MockServer) {
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/auth/token");
			then.status(200).json_body(json!({ "token": "stale" }));
		})
		.await;
}

#[tokio::test]
async fn unauthorized_refresh_endpoint_is_not_refreshed() {
	let server = MockServer::start_async().await;

	mock_token(&server).await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(401);
		})
		.await;
	let (client, navigator) = client(&server);
	let err = client.post("/api/auth/refresh").send().await.expect_err("401 should propagate.");

	assert_eq!(err.status(), Some(401));
	assert!(matches!(err, Error::Status(_)));
	assert_eq!(client.metrics().attempts(), 0);
	assert!(navigator.redirects().is_empty());

	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn otp_verification_failure_passes_through() {
	let server = MockServer::start_async().await;

	mock_token(&server).await;

	let verify = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/verify-otp");
			then.status(401).json_body(json!({ "message": "Invalid code" }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200).json_body(json!({ "success": true, "access_token": "fresh" }));
		})
		.await;
	let (client, navigator) = client(&server);
	let err = client
		.post("/api/auth/verify-otp")
		.json(&json!({ "code": "000000" }))
		.send()
		.await
		.expect_err("A wrong OTP should surface to the caller.");

	match err {
		Error::Status(status) => {
			assert_eq!(status.status, 401);
			assert!(status.body.contains("Invalid code"));
		},
		other => panic!("Expected a pass-through status error, got {other:?}."),
	}

	verify.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;

	assert!(navigator.redirects().is_empty());
}

#[tokio::test]
async fn unrelated_statuses_pass_through_untouched() {
	let server = MockServer::start_async().await;

	mock_token(&server).await;

	let missing = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/products/999");
			then.status(404).body("not found");
		})
		.await;
	let forbidden = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/admin/users/1");
			then.status(403);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200).json_body(json!({ "success": true, "access_token": "fresh" }));
		})
		.await;
	let (client, _) = client(&server);
	let not_found = client.get("/api/products/999").send().await.expect_err("404 should surface.");
	let denied = client.delete("/api/admin/users/1").send().await.expect_err("403 should surface.");

	assert_eq!(not_found.status(), Some(404));
	assert_eq!(denied.status(), Some(403));

	missing.assert_calls_async(1).await;
	forbidden.assert_calls_async(1).await;
	refresh.assert_calls_async(0).await;
}

#[tokio::test]
async fn configured_statuses_enter_the_refresh_path() {
	let server = MockServer::start_async().await;

	mock_token(&server).await;

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/auth/refresh");
			then.status(200).json_body(json!({ "success": true, "access_token": "fresh" }));
		})
		.await;
	let _expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/me").header("authorization", "Bearer stale");
			then.status(419);
		})
		.await;
	let _fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/me").header("authorization", "Bearer fresh");
			then.status(200);
		})
		.await;
	let (client, _) = client(&server);

	client.get("/api/me").send().await.expect("A 419 should be recovered like a 401.");

	refresh.assert_calls_async(1).await;
}
