//! Session Terminator: ends the session once per failed refresh and sends the user to login.

// std
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
// self
use crate::{_prelude::*, error::RefreshError};

/// Host-side router capable of a hard navigation (browser location, desktop shell, CLI
/// prompt, ...).
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Navigates away from the current surface to `target`.
	fn redirect(&self, target: &Url);
}
impl<F> Navigator for F
where
	F: Fn(&Url) + Send + Sync,
{
	fn redirect(&self, target: &Url) {
		self(target)
	}
}

/// Navigator that only records the targets it was asked to visit.
#[derive(Debug, Default)]
pub struct RecordingNavigator(Mutex<Vec<Url>>);
impl RecordingNavigator {
	/// Returns every recorded redirect target in call order.
	pub fn redirects(&self) -> Vec<Url> {
		self.0.lock().clone()
	}
}
impl Navigator for RecordingNavigator {
	fn redirect(&self, target: &Url) {
		self.0.lock().push(target.clone());
	}
}

/// Latched terminator shared by every clone of a client.
///
/// The first [`terminate`](Self::terminate) call ends the session and performs the redirect;
/// later calls are no-ops until [`resume`](Self::resume) re-arms the latch.
pub struct SessionTerminator {
	navigator: Arc<dyn Navigator>,
	login_url: Url,
	ended: AtomicBool,
	redirects: AtomicU64,
}
impl SessionTerminator {
	/// Creates an armed terminator that redirects to `login_url`.
	pub fn new(navigator: Arc<dyn Navigator>, login_url: Url) -> Self {
		Self { navigator, login_url, ended: AtomicBool::new(false), redirects: AtomicU64::new(0) }
	}

	/// Ends the session; returns `true` when this call performed the redirect.
	pub fn terminate(&self, reason: &RefreshError) -> bool {
		if self.ended.swap(true, Ordering::AcqRel) {
			tracing::debug!(error = %reason, "Session already ended; redirect suppressed.");

			return false;
		}

		tracing::warn!(
			error = %reason,
			login = %self.login_url,
			"Session ended; redirecting to login."
		);

		self.redirects.fetch_add(1, Ordering::Relaxed);
		self.navigator.redirect(&self.login_url);

		true
	}

	/// Whether the session has been terminated and not resumed.
	pub fn is_ended(&self) -> bool {
		self.ended.load(Ordering::Acquire)
	}

	/// Re-arms the latch after the user has signed in again.
	pub fn resume(&self) {
		self.ended.store(false, Ordering::Release);
	}

	/// Login URL used for the redirect.
	pub fn login_url(&self) -> &Url {
		&self.login_url
	}

	/// Number of redirects performed over the terminator's lifetime.
	pub fn redirects(&self) -> u64 {
		self.redirects.load(Ordering::Relaxed)
	}
}
impl Debug for SessionTerminator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTerminator")
			.field("login_url", &self.login_url)
			.field("ended", &self.is_ended())
			.finish()
	}
}
