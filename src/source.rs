//! Credential source contracts and built-in implementations.
//!
//! A [`CredentialSource`] is the only collaborator the client asks for bearer material. It
//! answers two questions: "what is the current credential?" (asked before every authenticated
//! call) and "please mint a new one" (asked at most once per refresh cycle by the coordinator).

pub mod http;
pub mod memory;

pub use http::HttpCredentialSource;
pub use memory::MemoryCredentialSource;

// self
use crate::{_prelude::*, credential::Credential};

/// Boxed future returned by [`CredentialSource`] methods.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + 'a + Send>>;

/// Supplier of the bearer credential for the active session.
pub trait CredentialSource
where
	Self: Send + Sync,
{
	/// Returns the current credential, or `None` when the session has no token.
	fn current(&self) -> SourceFuture<'_, Option<Credential>>;

	/// Exchanges the stored session artifact for a new short-lived credential.
	fn refresh(&self) -> SourceFuture<'_, Credential>;
}
impl<T> CredentialSource for Arc<T>
where
	T: ?Sized + CredentialSource,
{
	fn current(&self) -> SourceFuture<'_, Option<Credential>> {
		(**self).current()
	}

	fn refresh(&self) -> SourceFuture<'_, Credential> {
		(**self).refresh()
	}
}

/// Error type produced by [`CredentialSource`] implementations.
///
/// Values are cloneable so a single refresh failure can be delivered to every waiter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum SourceError {
	/// The credential endpoint could not be reached.
	#[error("Credential endpoint could not be reached: {message}.")]
	Unreachable {
		/// Human-readable transport failure.
		message: String,
	},
	/// The credential endpoint answered with a non-success status.
	#[error("Credential endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// The credential endpoint answered with a body that could not be parsed.
	#[error("Credential endpoint returned malformed JSON: {message}.")]
	Malformed {
		/// Parser message including the failing JSON path.
		message: String,
	},
	/// The refresh endpoint reported `success: false`.
	#[error("Credential endpoint declined to refresh the session.")]
	Declined,
	/// The refresh endpoint reported success without returning a token.
	#[error("Credential endpoint reported success without an access token.")]
	MissingToken,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn source_error_converts_into_refresh_error_with_source() {
		let source_error = SourceError::Status { status: 503 };
		let refresh_error: crate::error::RefreshError = source_error.clone().into();
		let source = StdError::source(&refresh_error)
			.expect("Refresh error should expose the original source error.");

		assert_eq!(source.to_string(), source_error.to_string());
	}

	#[test]
	fn source_error_can_be_serialized() {
		let payload = serde_json::to_string(&SourceError::Declined)
			.expect("SourceError should serialize to JSON.");

		assert_eq!(payload, "\"Declined\"");
	}
}
