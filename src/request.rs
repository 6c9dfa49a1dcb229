//! Replayable request templates and the caller-facing request builder.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	client::AuthClient,
	decorate,
	error::ConfigError,
	source::CredentialSource,
};

/// Owned description of one outgoing call that can be transmitted more than once.
///
/// The template keeps the body buffered so the Retry Executor can reissue the exact same
/// method, target, headers, and payload with a different credential.
#[derive(Clone, Debug)]
pub struct AuthRequest {
	method: Method,
	url: Url,
	headers: HeaderMap,
	body: Option<Vec<u8>>,
	timeout: Option<StdDuration>,
	requires_auth: bool,
	retried: bool,
}
impl AuthRequest {
	/// Creates an authenticated request template.
	pub fn new(method: Method, url: Url) -> Self {
		Self {
			method,
			url,
			headers: HeaderMap::new(),
			body: None,
			timeout: None,
			requires_auth: true,
			retried: false,
		}
	}

	/// Overrides whether the decorator attaches a credential.
	pub fn with_auth(mut self, requires_auth: bool) -> Self {
		self.requires_auth = requires_auth;

		self
	}

	/// Adds or replaces a header.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets a buffered body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// HTTP method.
	pub fn method(&self) -> &Method {
		&self.method
	}

	/// Absolute target URL.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Caller-supplied headers (without the credential).
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Buffered request body.
	pub fn body(&self) -> Option<&[u8]> {
		self.body.as_deref()
	}

	/// Whether the decorator attaches a credential before the first transmission.
	pub fn requires_auth(&self) -> bool {
		self.requires_auth
	}

	/// Whether the request has already been replayed once.
	pub fn is_retried(&self) -> bool {
		self.retried
	}

	pub(crate) fn mark_retried(&mut self) {
		self.retried = true;
	}

	/// Materializes a transmittable request, attaching `credential` when present.
	///
	/// Any `Authorization` header set by the caller is replaced by the credential.
	pub fn to_reqwest(&self, credential: Option<&HeaderValue>) -> reqwest::Request {
		let mut request = reqwest::Request::new(self.method.clone(), self.url.clone());

		*request.headers_mut() = self.headers.clone();
		*request.timeout_mut() = self.timeout;

		if let Some(body) = &self.body {
			*request.body_mut() = Some(body.clone().into());
		}
		if let Some(value) = credential {
			decorate::attach(&mut request, value.clone());
		}

		request
	}
}

/// Builder returned by [`AuthClient::request`] and its method shorthands.
///
/// Construction errors (unresolvable target, unserializable body) are deferred until
/// [`send`](Self::send), matching reqwest's builder ergonomics.
#[must_use = "a request builder does nothing until it is sent"]
pub struct RequestBuilder<'a, S>
where
	S: ?Sized + CredentialSource,
{
	client: &'a AuthClient<S>,
	request: Result<AuthRequest, ConfigError>,
}
impl<'a, S> RequestBuilder<'a, S>
where
	S: ?Sized + CredentialSource,
{
	pub(crate) fn new(client: &'a AuthClient<S>, method: Method, target: &str) -> Self {
		let request = client.config().resolve(target).map(|url| AuthRequest::new(method, url));

		Self { client, request }
	}

	/// Adds or replaces a header.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		if let Ok(request) = &mut self.request {
			request.headers.insert(name, value);
		}

		self
	}

	/// Appends query pairs to the target URL.
	pub fn query<K, V>(mut self, pairs: &[(K, V)]) -> Self
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		if let Ok(request) = &mut self.request {
			request.url.query_pairs_mut().extend_pairs(pairs.iter());
		}

		self
	}

	/// Serializes `body` as JSON and sets the `content-type` header.
	pub fn json<T>(mut self, body: &T) -> Self
	where
		T: ?Sized + Serialize,
	{
		if self.request.is_err() {
			return self;
		}

		match serde_json::to_vec(body) {
			Ok(bytes) =>
				if let Ok(request) = &mut self.request {
					request.headers.insert(
						reqwest::header::CONTENT_TYPE,
						HeaderValue::from_static("application/json"),
					);
					request.body = Some(bytes);
				},
			Err(err) => self.request = Err(err.into()),
		}

		self
	}

	/// Sets a raw body.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		if let Ok(request) = &mut self.request {
			request.body = Some(body.into());
		}

		self
	}

	/// Sets a per-request timeout, applied to every transmission.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		if let Ok(request) = &mut self.request {
			request.timeout = Some(timeout);
		}

		self
	}

	/// Sends the request without attaching a credential.
	pub fn anonymous(mut self) -> Self {
		if let Ok(request) = &mut self.request {
			request.requires_auth = false;
		}

		self
	}

	/// Consumes the builder, returning the replayable template.
	pub fn build(self) -> Result<AuthRequest> {
		Ok(self.request?)
	}

	/// Sends the request through the client's decorate/classify/refresh pipeline.
	pub async fn send(self) -> Result<Response> {
		let client = self.client;
		let request = self.build()?;

		client.execute(request).await
	}
}
