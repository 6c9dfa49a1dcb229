// std
use std::iter::IntoIterator;
// self
use crate::{
	_prelude::*,
	config::{AuthEndpoints, ClientConfig, CredentialPolicy},
};

/// Errors raised while constructing or validating client configurations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClientConfigError {
	/// The base URL cannot have paths joined onto it (e.g. `mailto:`).
	#[error("Base URL cannot serve as a request origin: {url}.")]
	InvalidBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Endpoint and excluded paths must be absolute paths.
	#[error("The {endpoint} path must start with '/': {path}.")]
	RelativePath {
		/// Which path failed validation.
		endpoint: &'static str,
		/// Offending path.
		path: String,
	},
	/// At least one authorization-failure status is required.
	#[error("At least one authorization failure status must be configured.")]
	NoAuthFailureStatuses,
	/// Authorization-failure statuses must be HTTP error statuses.
	#[error("Status {status} is not an HTTP error status.")]
	InvalidStatus {
		/// Offending status code.
		status: u16,
	},
	/// The refresh timeout must be positive.
	#[error("The refresh timeout must be positive.")]
	NonPositiveRefreshTimeout,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Origin every relative request path is resolved against.
	pub base_url: Url,
	/// Session endpoint paths.
	pub endpoints: AuthEndpoints,
	/// Credential-issuance paths that never trigger a refresh.
	pub excluded_paths: Vec<String>,
	/// Statuses treated as authorization failures.
	pub auth_failure_statuses: BTreeSet<u16>,
	/// Upper bound for a single refresh call.
	pub refresh_timeout: Duration,
	/// Behavior when the credential source fails before a call.
	pub credential_policy: CredentialPolicy,
}
impl ClientConfigBuilder {
	const DEFAULT_EXCLUDED_PATHS: [&'static str; 2] =
		["/api/auth/send-otp", "/api/auth/verify-otp"];
	const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::seconds(15);

	/// Creates a new builder seeded with defaults for the provided origin.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			endpoints: AuthEndpoints::default(),
			excluded_paths: Self::DEFAULT_EXCLUDED_PATHS.iter().map(|path| (*path).into()).collect(),
			auth_failure_statuses: BTreeSet::from([StatusCode::UNAUTHORIZED.as_u16()]),
			refresh_timeout: Self::DEFAULT_REFRESH_TIMEOUT,
			credential_policy: CredentialPolicy::default(),
		}
	}

	/// Sets the token endpoint path.
	pub fn token_endpoint(mut self, path: impl Into<String>) -> Self {
		self.endpoints.token = path.into();

		self
	}

	/// Sets the refresh endpoint path.
	pub fn refresh_endpoint(mut self, path: impl Into<String>) -> Self {
		self.endpoints.refresh = path.into();

		self
	}

	/// Sets the login route used for the terminal redirect.
	pub fn login_route(mut self, path: impl Into<String>) -> Self {
		self.endpoints.login = path.into();

		self
	}

	/// Adds a credential-issuance path that must never trigger a refresh.
	pub fn exclude_path(mut self, path: impl Into<String>) -> Self {
		self.excluded_paths.push(path.into());

		self
	}

	/// Replaces the excluded paths.
	pub fn excluded_paths<I, P>(mut self, paths: I) -> Self
	where
		I: IntoIterator<Item = P>,
		P: Into<String>,
	{
		self.excluded_paths = paths.into_iter().map(Into::into).collect();

		self
	}

	/// Replaces the statuses treated as authorization failures.
	pub fn auth_failure_statuses<I>(mut self, statuses: I) -> Self
	where
		I: IntoIterator<Item = u16>,
	{
		self.auth_failure_statuses = statuses.into_iter().collect();

		self
	}

	/// Overrides the refresh timeout (defaults to 15 seconds).
	pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
		self.refresh_timeout = timeout;

		self
	}

	/// Overrides the credential policy (defaults to [`CredentialPolicy::FailOpen`]).
	pub fn credential_policy(mut self, policy: CredentialPolicy) -> Self {
		self.credential_policy = policy;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		let config = ClientConfig {
			base_url: self.base_url,
			endpoints: self.endpoints,
			excluded_paths: self.excluded_paths,
			auth_failure_statuses: self.auth_failure_statuses,
			refresh_timeout: self.refresh_timeout,
			credential_policy: self.credential_policy,
		};

		config.validate()?;

		Ok(config)
	}
}

impl ClientConfig {
	/// Validates invariants for the configuration.
	///
	/// [`build`](ClientConfigBuilder::build) runs this automatically. Configurations decoded from
	/// serde or edited through their public fields are checked again by
	/// [`AuthClient`](crate::client::AuthClient) constructors.
	pub fn validate(&self) -> Result<(), ClientConfigError> {
		if self.base_url.cannot_be_a_base() {
			return Err(ClientConfigError::InvalidBaseUrl { url: self.base_url.to_string() });
		}

		validate_path("token", &self.endpoints.token)?;
		validate_path("refresh", &self.endpoints.refresh)?;
		validate_path("login", &self.endpoints.login)?;

		for path in &self.excluded_paths {
			validate_path("excluded", path)?;
		}

		if self.auth_failure_statuses.is_empty() {
			return Err(ClientConfigError::NoAuthFailureStatuses);
		}
		if let Some(&status) =
			self.auth_failure_statuses.iter().find(|status| !(400..=599).contains(*status))
		{
			return Err(ClientConfigError::InvalidStatus { status });
		}
		if !self.refresh_timeout.is_positive() {
			return Err(ClientConfigError::NonPositiveRefreshTimeout);
		}

		Ok(())
	}
}

fn validate_path(name: &'static str, path: &str) -> Result<(), ClientConfigError> {
	if path.starts_with('/') {
		Ok(())
	} else {
		Err(ClientConfigError::RelativePath { endpoint: name, path: path.to_owned() })
	}
}
