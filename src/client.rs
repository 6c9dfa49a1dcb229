//! Caller-facing client that hides credential expiry behind ordinary request/response calls.
//!
//! Every [`AuthClient`] owns its own [`RefreshCoordinator`] and [`SessionTerminator`]; clones
//! share both, so all handles of one client take part in the same refresh cycles.

// self
use crate::{
	_prelude::*,
	classify::{Disposition, FailureClassifier},
	config::ClientConfig,
	coordinator::{RefreshCoordinator, RefreshMetrics, RefreshPhase},
	decorate,
	error::ConfigError,
	http,
	obs::{Stage, StageSpan},
	request::{AuthRequest, RequestBuilder},
	retry,
	session::{Navigator, SessionTerminator},
	source::{CredentialSource, HttpCredentialSource},
};

/// Bearer-authenticated HTTP client with single-flight credential refresh.
pub struct AuthClient<S = HttpCredentialSource>
where
	S: ?Sized + CredentialSource,
{
	http: ReqwestClient,
	config: Arc<ClientConfig>,
	source: Arc<S>,
	classifier: Arc<FailureClassifier>,
	coordinator: Arc<RefreshCoordinator>,
}
impl AuthClient {
	/// Creates a client backed by a fresh reqwest client and the HTTP credential source
	/// described by `config`.
	///
	/// The reqwest client keeps a cookie store, so the session cookie set by the API origin is
	/// presented to the refresh endpoint.
	pub fn new(config: ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self> {
		let http = ReqwestClient::builder()
			.cookie_store(true)
			.build()
			.map_err(ConfigError::http_client_build)?;

		Self::with_http_client(config, http, navigator)
	}

	/// Same as [`AuthClient::new`] but reuses a caller-configured reqwest client for both the
	/// session endpoints and application calls.
	///
	/// The refresh endpoint authenticates with the stored session artifact (usually a cookie),
	/// so `http` must carry it: enable `cookie_store(true)` or install a default header.
	pub fn with_http_client(
		config: ClientConfig,
		http: ReqwestClient,
		navigator: Arc<dyn Navigator>,
	) -> Result<Self> {
		let source = HttpCredentialSource::from_config(http.clone(), &config)?;

		Self::with_source(config, http, Arc::new(source), navigator)
	}
}
impl<S> AuthClient<S>
where
	S: ?Sized + CredentialSource,
{
	/// Creates a client around an arbitrary credential source.
	///
	/// `config` is validated here as well, so configurations loaded through serde are held to
	/// the same rules as [`ClientConfigBuilder::build`](crate::config::ClientConfigBuilder::build).
	pub fn with_source(
		config: ClientConfig,
		http: ReqwestClient,
		source: Arc<S>,
		navigator: Arc<dyn Navigator>,
	) -> Result<Self> {
		config.validate().map_err(ConfigError::from)?;

		let login_url = config.login_url()?;
		let terminator = Arc::new(SessionTerminator::new(navigator, login_url));
		let coordinator = Arc::new(RefreshCoordinator::new(terminator, config.refresh_timeout));
		let classifier = Arc::new(FailureClassifier::from_config(&config));

		Ok(Self { http, config: Arc::new(config), source, classifier, coordinator })
	}

	/// Starts a request to `target`, a path (or absolute URL) resolved against the base URL.
	pub fn request(&self, method: Method, target: &str) -> RequestBuilder<'_, S> {
		RequestBuilder::new(self, method, target)
	}

	/// Starts a `GET` request.
	pub fn get(&self, target: &str) -> RequestBuilder<'_, S> {
		self.request(Method::GET, target)
	}

	/// Starts a `POST` request.
	pub fn post(&self, target: &str) -> RequestBuilder<'_, S> {
		self.request(Method::POST, target)
	}

	/// Starts a `PUT` request.
	pub fn put(&self, target: &str) -> RequestBuilder<'_, S> {
		self.request(Method::PUT, target)
	}

	/// Starts a `PATCH` request.
	pub fn patch(&self, target: &str) -> RequestBuilder<'_, S> {
		self.request(Method::PATCH, target)
	}

	/// Starts a `DELETE` request.
	pub fn delete(&self, target: &str) -> RequestBuilder<'_, S> {
		self.request(Method::DELETE, target)
	}

	/// Sends a prepared template through the decorate, dispatch, classify, refresh, and replay
	/// pipeline.
	///
	/// Authorization failures recovered by a refresh never reach the caller; they see the
	/// replay's response instead.
	pub async fn execute(&self, request: AuthRequest) -> Result<Response> {
		if request.requires_auth() && self.session().is_ended() {
			return Err(Error::SessionEnded);
		}

		let outgoing =
			decorate::decorate(&request, self.source.as_ref(), self.config.credential_policy)
				.await?;
		let span = StageSpan::enter(Stage::Dispatch, "execute");
		let outcome = span.instrument(http::dispatch(&self.http, outgoing)).await;

		span.settle(&outcome);

		let failure = match outcome {
			Err(Error::Status(failure)) => failure,
			other => return other,
		};
		let disposition =
			self.classifier.classify(request.url(), failure.status, request.is_retried());

		tracing::debug!(
			method = %request.method(),
			url = %request.url(),
			status = failure.status,
			%disposition,
			"Classified failed response."
		);

		match disposition {
			Disposition::Refresh => {},
			Disposition::RetryExhausted => return Err(Error::RetryExhausted(failure)),
			Disposition::RefreshEndpoint | Disposition::PassThrough => return Err(failure.into()),
		}

		// A cycle that already failed must not be restarted by a straggler.
		if self.session().is_ended() {
			return Err(Error::SessionEnded);
		}

		let credential = self.coordinator.fresh_credential(self.source.as_ref(), &request).await?;

		retry::replay(&self.http, request, &credential, &self.classifier).await
	}

	/// Validated configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Credential source shared by every clone.
	pub fn source(&self) -> &Arc<S> {
		&self.source
	}

	/// Refresh cycle counters.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		self.coordinator.metrics()
	}

	/// Current refresh phase.
	pub fn refresh_phase(&self) -> RefreshPhase {
		self.coordinator.phase()
	}

	/// Session terminator shared by every clone.
	pub fn session(&self) -> &SessionTerminator {
		self.coordinator.terminator()
	}

	/// Re-arms the session after the user has authenticated again.
	pub fn resume_session(&self) {
		tracing::info!("Session resumed.");

		self.session().resume();
	}
}
impl<S> Clone for AuthClient<S>
where
	S: ?Sized + CredentialSource,
{
	fn clone(&self) -> Self {
		Self {
			http: self.http.clone(),
			config: self.config.clone(),
			source: self.source.clone(),
			classifier: self.classifier.clone(),
			coordinator: self.coordinator.clone(),
		}
	}
}
impl<S> Debug for AuthClient<S>
where
	S: ?Sized + CredentialSource,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("coordinator", &self.coordinator)
			.field("session", self.session())
			.finish()
	}
}
