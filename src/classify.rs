//! Failure Classifier: decides which failed responses enter the refresh path.

// self
use crate::{_prelude::*, config::ClientConfig};

/// Routing decision for a failed response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disposition {
	/// First authorization failure on an eligible target; refresh and replay once.
	Refresh,
	/// The failing call targets the refresh endpoint itself; propagate immediately.
	RefreshEndpoint,
	/// Authorization failure on a request that was already replayed; terminal.
	RetryExhausted,
	/// Unrelated failure or excluded target; propagate unchanged.
	PassThrough,
}
impl Disposition {
	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Disposition::Refresh => "refresh",
			Disposition::RefreshEndpoint => "refresh_endpoint",
			Disposition::RetryExhausted => "retry_exhausted",
			Disposition::PassThrough => "pass_through",
		}
	}
}
impl Display for Disposition {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Stateless classifier built from a [`ClientConfig`].
#[derive(Clone, Debug)]
pub struct FailureClassifier {
	refresh_path: String,
	excluded_paths: Vec<String>,
	auth_failure_statuses: BTreeSet<u16>,
}
impl FailureClassifier {
	/// Creates a classifier from explicit rules.
	pub fn new(
		refresh_path: impl Into<String>,
		excluded_paths: Vec<String>,
		auth_failure_statuses: BTreeSet<u16>,
	) -> Self {
		Self { refresh_path: refresh_path.into(), excluded_paths, auth_failure_statuses }
	}

	/// Creates a classifier for the refresh/excluded paths and statuses in `config`.
	pub fn from_config(config: &ClientConfig) -> Self {
		Self::new(
			config.endpoints.refresh.clone(),
			config.excluded_paths.clone(),
			config.auth_failure_statuses.clone(),
		)
	}

	/// Whether `status` counts as an authorization failure.
	pub fn is_auth_failure(&self, status: u16) -> bool {
		self.auth_failure_statuses.contains(&status)
	}

	/// Whether `url` targets the refresh endpoint.
	pub fn targets_refresh(&self, url: &Url) -> bool {
		url.path().contains(self.refresh_path.as_str())
	}

	/// Whether `url` targets a credential-issuance endpoint.
	pub fn targets_excluded(&self, url: &Url) -> bool {
		let path = url.path();

		self.excluded_paths.iter().any(|excluded| path.contains(excluded.as_str()))
	}

	/// Classifies a failed response for `url` with `status`.
	///
	/// `retried` reports whether the failing transmission was already the single replay.
	pub fn classify(&self, url: &Url, status: u16, retried: bool) -> Disposition {
		if self.targets_refresh(url) {
			return Disposition::RefreshEndpoint;
		}
		if self.targets_excluded(url) || !self.is_auth_failure(status) {
			return Disposition::PassThrough;
		}
		if retried {
			return Disposition::RetryExhausted;
		}

		Disposition::Refresh
	}
}
