//! Client configuration shared by every component.
//!
//! The module exposes a validated [`ClientConfig`] plus its builder so applications can
//! describe where the session endpoints live and which calls must never enter the refresh
//! path, without touching the HTTP stack.

/// Builder API for assembling client configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Reaction to a credential source failure before an authenticated call is sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialPolicy {
	#[default]
	/// Send the call without a credential and let the server reject it.
	FailOpen,
	/// Fail the call with [`Error::CredentialUnavailable`](crate::error::Error).
	FailClosed,
}

/// Session endpoint paths, relative to the base URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEndpoints {
	/// `GET` endpoint returning `{ "token": string | null }`.
	pub token: String,
	/// `POST` endpoint returning `{ "success": bool, "access_token"?: string }`.
	pub refresh: String,
	/// Login route the session terminator navigates to.
	pub login: String,
}
impl Default for AuthEndpoints {
	fn default() -> Self {
		Self {
			token: "/api/auth/token".into(),
			refresh: "/api/auth/refresh".into(),
			login: "/login".into(),
		}
	}
}

/// Immutable client configuration consumed by [`AuthClient`](crate::client::AuthClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Origin every relative request path is resolved against.
	pub base_url: Url,
	/// Session endpoints.
	pub endpoints: AuthEndpoints,
	/// Credential-issuance paths (OTP dispatch/verification) that never trigger a refresh.
	pub excluded_paths: Vec<String>,
	/// Statuses treated as authorization failures.
	pub auth_failure_statuses: BTreeSet<u16>,
	/// Upper bound for a single refresh call.
	pub refresh_timeout: Duration,
	/// Behavior when the credential source fails before a call.
	pub credential_policy: CredentialPolicy,
}
impl ClientConfig {
	/// Creates a new builder rooted at `base_url`.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Resolves a path (or absolute URL) against the base URL.
	pub fn resolve(&self, target: &str) -> Result<Url, ConfigError> {
		self.base_url
			.join(target)
			.map_err(|source| ConfigError::InvalidTarget { target: target.to_owned(), source })
	}

	/// Absolute login URL used for the terminal redirect.
	pub fn login_url(&self) -> Result<Url, ConfigError> {
		self.resolve(&self.endpoints.login)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn resolve_keeps_requests_same_origin() {
		let config = ClientConfig::builder(
			Url::parse("https://shop.example.com/").expect("Base URL should parse."),
		)
		.build()
		.expect("Default configuration should be valid.");
		let url = config.resolve("/api/cart?page=2").expect("Relative path should resolve.");

		assert_eq!(url.as_str(), "https://shop.example.com/api/cart?page=2");
		assert_eq!(
			config.login_url().expect("Login route should resolve.").as_str(),
			"https://shop.example.com/login"
		);
	}

	#[test]
	fn config_round_trips_through_json() {
		let config = ClientConfig::builder(
			Url::parse("http://localhost:3000").expect("Base URL should parse."),
		)
		.credential_policy(CredentialPolicy::FailClosed)
		.build()
		.expect("Configuration should be valid.");
		let payload = serde_json::to_string(&config).expect("Config should serialize to JSON.");
		let decoded: ClientConfig =
			serde_json::from_str(&payload).expect("Serialized config should deserialize.");

		assert!(payload.contains("\"fail_closed\""));
		assert_eq!(decoded, config);
	}
}
