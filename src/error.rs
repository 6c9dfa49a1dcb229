//! Client-level error types shared across the decorator, coordinator, and replay paths.

// self
use crate::{_prelude::*, config::ClientConfigError, source::SourceError};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Callers only ever see terminal outcomes: an authorization failure that was recovered by a
/// refresh never surfaces here.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The server answered with a non-success status that was not recovered.
	#[error(transparent)]
	Status(#[from] StatusError),
	/// The request was still rejected after one refresh-and-replay cycle.
	#[error("Request remained unauthorized after a credential refresh: {0}")]
	RetryExhausted(#[source] StatusError),
	/// The shared credential refresh failed; the session has been terminated.
	#[error("Session ended because the credential refresh failed.")]
	Refresh(
		#[from]
		#[source]
		RefreshError,
	),
	/// Credential retrieval failed while the client is configured to fail closed.
	#[error("Credential is unavailable for an authenticated request.")]
	CredentialUnavailable(#[source] SourceError),
	/// The session was terminated earlier; authenticated requests are refused until resumed.
	#[error("Session has ended; sign in again before issuing authenticated requests.")]
	SessionEnded,
}
impl Error {
	/// Returns the HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status(err) | Self::RetryExhausted(err) => Some(err.status),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client configuration failed validation.
	#[error(transparent)]
	Invalid(#[from] ClientConfigError),
	/// Request path cannot be joined onto the base URL.
	#[error("Request target `{target}` cannot be resolved against the base URL.")]
	InvalidTarget {
		/// Path or URL supplied by the caller.
		target: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized to JSON.")]
	Body(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {url}.")]
	Network {
		/// Target of the failed call.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error for the provided target.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

/// Non-success HTTP response captured for the caller.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("{method} {url} returned HTTP {status}.")]
pub struct StatusError {
	/// Method of the failed request.
	pub method: Method,
	/// Target of the failed request.
	pub url: Url,
	/// HTTP status code returned by the server.
	pub status: u16,
	/// Response body preview (truncated).
	pub body: String,
}

/// Failure of a shared refresh cycle, broadcast to the driver and every queued waiter.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// Credential source rejected or failed the refresh call.
	#[error("Credential source failed to refresh the session.")]
	Source(
		#[from]
		#[source]
		SourceError,
	),
	/// Refresh call exceeded the configured timeout.
	#[error("Credential refresh did not complete within {after}.")]
	TimedOut {
		/// Timeout that elapsed.
		after: Duration,
	},
	/// The task driving the refresh was dropped before the cycle settled.
	#[error("Credential refresh was abandoned before it completed.")]
	Abandoned,
}
