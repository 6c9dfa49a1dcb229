//! Retry Executor: replays a request exactly once with a refreshed credential.

// self
use crate::{
	_prelude::*,
	classify::FailureClassifier,
	credential::Credential,
	http,
	obs::{Stage, StageSpan},
	request::AuthRequest,
	source::SourceError,
};

/// Replays `request` with `credential`, consuming its single retry.
///
/// An authorization failure on the replay becomes [`Error::RetryExhausted`]; success and every
/// other failure are returned as the transport produced them.
pub async fn replay(
	http: &ReqwestClient,
	mut request: AuthRequest,
	credential: &Credential,
	classifier: &FailureClassifier,
) -> Result<Response> {
	let header = credential.bearer_header().map_err(|err| {
		Error::CredentialUnavailable(SourceError::Malformed { message: err.to_string() })
	})?;

	request.mark_retried();

	let span = StageSpan::enter(Stage::Replay, "replay");
	let outcome = span.instrument(http::dispatch(http, request.to_reqwest(Some(&header)))).await;

	span.settle(&outcome);

	match outcome {
		Err(Error::Status(err)) if classifier.is_auth_failure(err.status) => {
			tracing::warn!(
				method = %err.method,
				url = %err.url,
				status = err.status,
				"Replayed request was rejected again; giving up."
			);

			Err(Error::RetryExhausted(err))
		},
		other => other,
	}
}
