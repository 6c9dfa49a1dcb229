//! Thread-safe in-memory [`CredentialSource`] for local development and tests.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	credential::Credential,
	source::{CredentialSource, SourceError, SourceFuture},
};

#[derive(Debug, Default)]
struct MemoryState {
	current: Option<Credential>,
	current_failure: Option<SourceError>,
	scripted: VecDeque<Result<Credential, SourceError>>,
}

/// In-process credential source with scripted refresh outcomes.
///
/// Unless a result has been scripted with [`push_refresh`](Self::push_refresh), every refresh
/// mints `<prefix>-<n>` where `n` counts refresh calls from 1. A successful refresh also
/// becomes the current credential.
#[derive(Debug)]
pub struct MemoryCredentialSource {
	prefix: String,
	state: Mutex<MemoryState>,
	refresh_calls: AtomicU64,
	current_calls: AtomicU64,
}
impl MemoryCredentialSource {
	/// Creates a source whose minted tokens start with `prefix`.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			state: Default::default(),
			refresh_calls: AtomicU64::new(0),
			current_calls: AtomicU64::new(0),
		}
	}

	/// Seeds the current credential.
	pub fn with_current(self, token: impl Into<String>) -> Self {
		self.state.lock().current = Some(Credential::new(token));

		self
	}

	/// Makes every `current` lookup fail with `err` until cleared.
	pub fn fail_current(&self, err: Option<SourceError>) {
		self.state.lock().current_failure = err;
	}

	/// Queues the outcome of the next unscripted refresh call.
	pub fn push_refresh(&self, outcome: Result<Credential, SourceError>) {
		self.state.lock().scripted.push_back(outcome);
	}

	/// Returns the number of refresh calls observed so far.
	pub fn refresh_calls(&self) -> u64 {
		self.refresh_calls.load(Ordering::Relaxed)
	}

	/// Returns the number of current-credential lookups observed so far.
	pub fn current_calls(&self) -> u64 {
		self.current_calls.load(Ordering::Relaxed)
	}

	fn current_now(&self) -> Result<Option<Credential>, SourceError> {
		self.current_calls.fetch_add(1, Ordering::Relaxed);

		let state = self.state.lock();

		match &state.current_failure {
			Some(err) => Err(err.clone()),
			None => Ok(state.current.clone()),
		}
	}

	fn refresh_now(&self) -> Result<Credential, SourceError> {
		let call = self.refresh_calls.fetch_add(1, Ordering::Relaxed) + 1;
		let mut state = self.state.lock();
		let outcome = state
			.scripted
			.pop_front()
			.unwrap_or_else(|| Ok(Credential::new(format!("{}-{call}", self.prefix))));

		if let Ok(credential) = &outcome {
			state.current = Some(credential.clone());
		}

		outcome
	}
}
impl Default for MemoryCredentialSource {
	fn default() -> Self {
		Self::new("memory")
	}
}
impl CredentialSource for MemoryCredentialSource {
	fn current(&self) -> SourceFuture<'_, Option<Credential>> {
		Box::pin(async move { self.current_now() })
	}

	fn refresh(&self) -> SourceFuture<'_, Credential> {
		Box::pin(async move { self.refresh_now() })
	}
}
