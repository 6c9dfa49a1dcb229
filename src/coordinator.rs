//! Refresh Coordinator: single-flight credential refresh shared by concurrent callers.
//!
//! When several requests fail authorization at once, the first caller to reach
//! [`RefreshCoordinator::fresh_credential`] flips the phase from [`RefreshPhase::Idle`] to
//! [`RefreshPhase::Refreshing`] and becomes the cycle driver; everyone else is parked on a
//! one-shot channel in the queue. The check-and-set and the enqueue share one critical section
//! with no suspension point, so two callers can never both drive. When the refresh settles
//! (success, failure, timeout, or a dropped driver) the phase returns to idle and the whole
//! queue is released with the same outcome.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::mem;
// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	credential::Credential,
	error::RefreshError,
	obs::{Stage, StageSpan},
	request::AuthRequest,
	session::SessionTerminator,
	source::CredentialSource,
};

/// Outcome of one refresh cycle, delivered to the driver and every waiter.
pub type RefreshOutcome = Result<Credential, RefreshError>;

/// Coordinator phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RefreshPhase {
	/// No refresh in flight.
	#[default]
	Idle,
	/// A driver is refreshing; new eligible failures enqueue.
	Refreshing,
}

/// Suspended caller waiting for the in-flight refresh.
#[derive(Debug)]
pub struct PendingRequest {
	method: Method,
	url: Url,
	notify: oneshot::Sender<RefreshOutcome>,
}

#[derive(Debug, Default)]
struct CoordinatorState {
	phase: RefreshPhase,
	queue: Vec<PendingRequest>,
	cycle: u64,
}

enum Role<'a> {
	Driver(CycleGuard<'a>),
	Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Per-client owner of the refresh phase and the waiter queue.
pub struct RefreshCoordinator {
	state: Mutex<CoordinatorState>,
	terminator: Arc<SessionTerminator>,
	refresh_timeout: Duration,
	metrics: Arc<RefreshMetrics>,
}
impl RefreshCoordinator {
	/// Creates an idle coordinator that bounds each refresh by `refresh_timeout`.
	pub fn new(terminator: Arc<SessionTerminator>, refresh_timeout: Duration) -> Self {
		Self { state: Default::default(), terminator, refresh_timeout, metrics: Default::default() }
	}

	/// Current phase.
	pub fn phase(&self) -> RefreshPhase {
		self.state.lock().phase
	}

	/// Number of callers currently parked behind the in-flight refresh.
	pub fn waiting(&self) -> usize {
		self.state.lock().queue.len()
	}

	/// Shared counters.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		&self.metrics
	}

	/// Terminator invoked when a cycle fails.
	pub fn terminator(&self) -> &Arc<SessionTerminator> {
		&self.terminator
	}

	/// Obtains a refreshed credential on behalf of `request`, which just failed authorization.
	///
	/// Exactly one refresh call is made per cycle no matter how many callers arrive while it is
	/// in flight. A failed or timed-out cycle terminates the session once.
	pub async fn fresh_credential<S>(&self, source: &S, request: &AuthRequest) -> RefreshOutcome
	where
		S: ?Sized + CredentialSource,
	{
		match self.enlist(request) {
			Role::Waiter(receiver) => receiver.await.unwrap_or(Err(RefreshError::Abandoned)),
			Role::Driver(guard) => {
				let outcome = self.drive(source).await;

				guard.settle(outcome.clone());

				outcome
			},
		}
	}

	fn enlist(&self, request: &AuthRequest) -> Role<'_> {
		let mut state = self.state.lock();

		match state.phase {
			RefreshPhase::Idle => {
				state.phase = RefreshPhase::Refreshing;
				state.cycle += 1;

				tracing::debug!(
					cycle = state.cycle,
					method = %request.method(),
					url = %request.url(),
					"Starting credential refresh."
				);

				Role::Driver(CycleGuard { coordinator: self, cycle: state.cycle, settled: false })
			},
			RefreshPhase::Refreshing => {
				let (notify, receiver) = oneshot::channel();

				state.queue.push(PendingRequest {
					method: request.method().clone(),
					url: request.url().clone(),
					notify,
				});
				self.metrics.record_enqueued();

				tracing::debug!(
					cycle = state.cycle,
					waiting = state.queue.len(),
					method = %request.method(),
					url = %request.url(),
					"Refresh in flight; request queued."
				);

				Role::Waiter(receiver)
			},
		}
	}

	async fn drive<S>(&self, source: &S) -> RefreshOutcome
	where
		S: ?Sized + CredentialSource,
	{
		let span = StageSpan::enter(Stage::Refresh, "fresh_credential");

		self.metrics.record_attempt();

		let limit = self.refresh_timeout.unsigned_abs();
		let outcome = match span.instrument(tokio::time::timeout(limit, source.refresh())).await {
			Ok(Ok(credential)) => Ok(credential),
			Ok(Err(err)) => Err(RefreshError::from(err)),
			Err(_) => Err(RefreshError::TimedOut { after: self.refresh_timeout }),
		};

		span.settle(&outcome);

		outcome
	}

	fn finish(&self, cycle: u64, outcome: RefreshOutcome) {
		match &outcome {
			Ok(_) => {
				self.metrics.record_success();

				tracing::info!(cycle, "Credential refresh succeeded.");
			},
			Err(err) => {
				self.metrics.record_failure();

				tracing::warn!(cycle, error = %err, "Credential refresh failed.");

				// Latch the session before waiters wake so none of them can start a new cycle.
				self.terminator.terminate(err);
			},
		}

		self.release(cycle, outcome);
	}

	fn release(&self, cycle: u64, outcome: RefreshOutcome) {
		let queue = {
			let mut state = self.state.lock();

			state.phase = RefreshPhase::Idle;

			mem::take(&mut state.queue)
		};

		tracing::debug!(cycle, released = queue.len(), "Releasing queued requests.");

		for pending in queue {
			if pending.notify.send(outcome.clone()).is_err() {
				tracing::debug!(
					cycle,
					method = %pending.method,
					url = %pending.url,
					"Queued caller went away before the refresh settled."
				);
			}
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.lock();

		f.debug_struct("RefreshCoordinator")
			.field("phase", &state.phase)
			.field("waiting", &state.queue.len())
			.field("cycle", &state.cycle)
			.field("refresh_timeout", &self.refresh_timeout)
			.finish()
	}
}

/// Ownership of the current cycle; dropping it unsettled releases the queue as abandoned.
struct CycleGuard<'a> {
	coordinator: &'a RefreshCoordinator,
	cycle: u64,
	settled: bool,
}
impl CycleGuard<'_> {
	fn settle(mut self, outcome: RefreshOutcome) {
		// Stay unsettled until the queue is drained; a panicking navigator still releases it.
		self.coordinator.finish(self.cycle, outcome);
		self.settled = true;
	}
}
impl Drop for CycleGuard<'_> {
	fn drop(&mut self) {
		if self.settled {
			return;
		}

		self.coordinator.metrics.record_abandoned();

		tracing::warn!(cycle = self.cycle, "Refresh driver dropped before the cycle settled.");

		self.coordinator.release(self.cycle, Err(RefreshError::Abandoned));
	}
}
