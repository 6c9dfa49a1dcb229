// self
use crate::obs::Stage;

/// Increments `bearer_relay_stage_total` when the `metrics` feature is enabled.
pub(super) fn count(stage: Stage, outcome: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"bearer_relay_stage_total",
			"stage" => stage.as_str(),
			"outcome" => outcome
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (stage, outcome);
	}
}
