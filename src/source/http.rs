//! Same-origin HTTP credential source.
//!
//! The token endpoint answers `GET` with `{ "token": string | null }`; the refresh endpoint
//! answers `POST` with `{ "success": bool, "access_token"?: string }`. Both calls are issued
//! straight through reqwest, never through the authenticated client, so a failing refresh can
//! not loop back into the coordinator.

// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	credential::Credential,
	error::ConfigError,
	source::{CredentialSource, SourceError, SourceFuture},
};

#[derive(Debug, Deserialize)]
struct TokenEnvelope {
	#[serde(default)]
	token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefreshEnvelope {
	success: bool,
	#[serde(default)]
	access_token: Option<String>,
}

/// Reqwest-backed [`CredentialSource`] talking to the session endpoints of the API origin.
#[derive(Clone, Debug)]
pub struct HttpCredentialSource {
	http: ReqwestClient,
	token_url: Url,
	refresh_url: Url,
}
impl HttpCredentialSource {
	/// Creates a source that calls the provided endpoints.
	pub fn new(http: ReqwestClient, token_url: Url, refresh_url: Url) -> Self {
		Self { http, token_url, refresh_url }
	}

	/// Creates a source for the token + refresh endpoints declared in `config`.
	pub fn from_config(http: ReqwestClient, config: &ClientConfig) -> Result<Self, ConfigError> {
		let token_url = config.resolve(&config.endpoints.token)?;
		let refresh_url = config.resolve(&config.endpoints.refresh)?;

		Ok(Self::new(http, token_url, refresh_url))
	}

	/// Token endpoint URL.
	pub fn token_url(&self) -> &Url {
		&self.token_url
	}

	/// Refresh endpoint URL.
	pub fn refresh_url(&self) -> &Url {
		&self.refresh_url
	}

	async fn fetch_current(&self) -> Result<Option<Credential>, SourceError> {
		let response =
			self.http.get(self.token_url.clone()).send().await.map_err(network_failure)?;
		let envelope: TokenEnvelope = read_envelope(response).await?;

		Ok(envelope.token.filter(|token| !token.is_empty()).map(Credential::new))
	}

	async fn perform_refresh(&self) -> Result<Credential, SourceError> {
		let response =
			self.http.post(self.refresh_url.clone()).send().await.map_err(network_failure)?;
		let envelope: RefreshEnvelope = read_envelope(response).await?;

		if !envelope.success {
			return Err(SourceError::Declined);
		}

		envelope
			.access_token
			.filter(|token| !token.is_empty())
			.map(Credential::new)
			.ok_or(SourceError::MissingToken)
	}
}
impl CredentialSource for HttpCredentialSource {
	fn current(&self) -> SourceFuture<'_, Option<Credential>> {
		Box::pin(self.fetch_current())
	}

	fn refresh(&self) -> SourceFuture<'_, Credential> {
		Box::pin(self.perform_refresh())
	}
}

async fn read_envelope<T>(response: Response) -> Result<T, SourceError>
where
	T: for<'de> Deserialize<'de>,
{
	let status = response.status();

	if !status.is_success() {
		return Err(SourceError::Status { status: status.as_u16() });
	}

	let bytes = response.bytes().await.map_err(network_failure)?;
	let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|err| SourceError::Malformed { message: err.to_string() })
}

fn network_failure(err: ReqwestError) -> SourceError {
	SourceError::Unreachable { message: err.to_string() }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn parse<T>(raw: &str) -> Result<T, SourceError>
	where
		T: for<'de> Deserialize<'de>,
	{
		let mut deserializer = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|err| SourceError::Malformed { message: err.to_string() })
	}

	#[test]
	fn token_envelope_accepts_null_and_missing_token() {
		let null: TokenEnvelope = parse("{\"token\":null}").expect("Null token should parse.");
		let missing: TokenEnvelope = parse("{}").expect("Missing token should parse.");

		assert!(null.token.is_none());
		assert!(missing.token.is_none());
	}

	#[test]
	fn refresh_envelope_reports_failing_path() {
		let err = parse::<RefreshEnvelope>("{\"success\":\"yes\"}")
			.expect_err("A string success flag should be rejected.");

		match err {
			SourceError::Malformed { message } => assert!(message.starts_with("success")),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}
}
