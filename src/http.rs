//! Transport dispatch for decorated requests.
//!
//! [`dispatch`] is the single place where a `reqwest::Request` hits the network. Success
//! responses are handed back untouched; every non-2xx response becomes a [`StatusError`]
//! holding at most [`BODY_PREVIEW_LIMIT`] bytes of its body, so the classifier can reason about
//! it and the caller receives a typed rejection.

// self
use crate::{
	_prelude::*,
	error::{StatusError, TransportError},
};

/// Maximum number of body bytes retained in a [`StatusError`].
pub const BODY_PREVIEW_LIMIT: usize = 512;

/// Sends `request` once and maps non-success statuses to [`Error::Status`].
pub async fn dispatch(http: &ReqwestClient, request: reqwest::Request) -> Result<Response> {
	let method = request.method().clone();
	let url = request.url().clone();
	let response =
		http.execute(request).await.map_err(|err| TransportError::network(&url, err))?;

	if response.status().is_success() {
		return Ok(response);
	}

	Err(status_error(method, url, response).await.into())
}

async fn status_error(method: Method, url: Url, mut response: Response) -> StatusError {
	let status = response.status().as_u16();
	let mut preview = Vec::with_capacity(BODY_PREVIEW_LIMIT);

	// Stop at the limit so large error pages are never buffered; a read failure keeps what
	// arrived so far.
	while preview.len() < BODY_PREVIEW_LIMIT {
		match response.chunk().await {
			Ok(Some(chunk)) => append_preview(&mut preview, &chunk),
			Ok(None) | Err(_) => break,
		}
	}

	StatusError { method, url, status, body: String::from_utf8_lossy(&preview).into_owned() }
}

fn append_preview(preview: &mut Vec<u8>, chunk: &[u8]) {
	let room = BODY_PREVIEW_LIMIT.saturating_sub(preview.len());

	preview.extend_from_slice(&chunk[..chunk.len().min(room)]);
}
