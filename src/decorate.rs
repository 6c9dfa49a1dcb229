//! Request Decorator: attaches the current credential before the first transmission.

// self
use crate::{
	_prelude::*,
	config::CredentialPolicy,
	request::AuthRequest,
	source::{CredentialSource, SourceError},
};

/// Produces the transmittable form of `request`, attaching the source's current credential
/// when the request requires authentication.
pub async fn decorate<S>(
	request: &AuthRequest,
	source: &S,
	policy: CredentialPolicy,
) -> Result<reqwest::Request>
where
	S: ?Sized + CredentialSource,
{
	if !request.requires_auth() {
		return Ok(request.to_reqwest(None));
	}

	let header = resolve_credential(source, policy).await?;

	Ok(request.to_reqwest(header.as_ref()))
}

/// Looks up the current credential and encodes it as an `Authorization` value.
///
/// A session without a token yields `None`. Source failures (and tokens that cannot be
/// encoded) are handled according to `policy`.
pub async fn resolve_credential<S>(
	source: &S,
	policy: CredentialPolicy,
) -> Result<Option<HeaderValue>>
where
	S: ?Sized + CredentialSource,
{
	match source.current().await {
		Ok(Some(credential)) => match credential.bearer_header() {
			Ok(value) => Ok(Some(value)),
			Err(err) =>
				on_source_failure(policy, SourceError::Malformed { message: err.to_string() }),
		},
		Ok(None) => {
			tracing::debug!("No credential available; sending request unauthenticated.");

			Ok(None)
		},
		Err(err) => on_source_failure(policy, err),
	}
}

/// Replaces the `Authorization` header of an outgoing request.
pub fn attach(request: &mut reqwest::Request, value: HeaderValue) {
	request.headers_mut().insert(AUTHORIZATION, value);
}

fn on_source_failure(policy: CredentialPolicy, err: SourceError) -> Result<Option<HeaderValue>> {
	match policy {
		CredentialPolicy::FailOpen => {
			tracing::warn!(
				error = %err,
				"Credential source failed; sending request without a credential."
			);

			Ok(None)
		},
		CredentialPolicy::FailClosed => Err(Error::CredentialUnavailable(err)),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::source::MemoryCredentialSource;

	fn template(requires_auth: bool) -> AuthRequest {
		AuthRequest::new(
			Method::GET,
			Url::parse("https://api.example.com/api/me").expect("Fixture URL should parse."),
		)
		.with_auth(requires_auth)
	}

	#[tokio::test]
	async fn attaches_current_credential() {
		let source = MemoryCredentialSource::default().with_current("token-a");
		let request = decorate(&template(true), &source, CredentialPolicy::FailOpen)
			.await
			.expect("Decoration should succeed.");
		let header = request.headers().get(AUTHORIZATION).expect("Header should be attached.");

		assert_eq!(header.to_str().expect("Header should be ASCII."), "Bearer token-a");
		assert!(header.is_sensitive());
	}

	#[tokio::test]
	async fn anonymous_requests_skip_the_source() {
		let source = MemoryCredentialSource::default().with_current("token-a");
		let request = decorate(&template(false), &source, CredentialPolicy::FailClosed)
			.await
			.expect("Anonymous decoration should succeed.");

		assert!(request.headers().get(AUTHORIZATION).is_none());
		assert_eq!(source.current_calls(), 0);
	}

	#[tokio::test]
	async fn fail_open_proceeds_without_credential() {
		let source = MemoryCredentialSource::default().with_current("token-a");

		source.fail_current(Some(SourceError::Unreachable { message: "refused".into() }));

		let request = decorate(&template(true), &source, CredentialPolicy::FailOpen)
			.await
			.expect("Fail-open decoration should succeed.");

		assert!(request.headers().get(AUTHORIZATION).is_none());
	}

	#[tokio::test]
	async fn fail_closed_surfaces_source_error() {
		let source = MemoryCredentialSource::default();

		source.fail_current(Some(SourceError::Status { status: 500 }));

		let err = decorate(&template(true), &source, CredentialPolicy::FailClosed)
			.await
			.expect_err("Fail-closed decoration should reject.");

		assert!(matches!(
			err,
			Error::CredentialUnavailable(SourceError::Status { status: 500 })
		));
	}

	#[tokio::test]
	async fn unencodable_token_follows_policy() {
		let source = MemoryCredentialSource::default().with_current("bad\ntoken");
		let open = resolve_credential(&source, CredentialPolicy::FailOpen)
			.await
			.expect("Fail-open should tolerate an unencodable token.");
		let closed = resolve_credential(&source, CredentialPolicy::FailClosed).await;

		assert!(open.is_none());
		assert!(matches!(closed, Err(Error::CredentialUnavailable(SourceError::Malformed { .. }))));
	}
}
