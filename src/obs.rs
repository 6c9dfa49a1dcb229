//! Observability for the dispatch, refresh, and replay stages.
//!
//! Each stage runs inside a [`StageSpan`] named `bearer_relay.stage`. The span carries the
//! `stage` and `site` fields from the start and gains an `outcome` field (`success` or
//! `failure`) once the stage settles. With the `metrics` feature the same transitions
//! increment `bearer_relay_stage_total{stage, outcome}`, including one `attempt` per entry.

mod metrics;
mod tracing;

pub use self::tracing::StageSpan;

/// Stages a request can pass through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// First transmission of a caller's request.
	Dispatch,
	/// Shared credential refresh performed by the cycle driver.
	Refresh,
	/// Single replay of a request with the refreshed credential.
	Replay,
}
impl Stage {
	/// Stable label used for span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Dispatch => "dispatch",
			Stage::Refresh => "refresh",
			Stage::Replay => "replay",
		}
	}
}
