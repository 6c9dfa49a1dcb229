// crates.io
use tracing::{Instrument, Span, field, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::Stage};

/// Span around one stage of a request; records its outcome when settled.
#[derive(Clone, Debug)]
pub struct StageSpan {
	span: Span,
	stage: Stage,
}
impl StageSpan {
	/// Opens the span for `stage` at call site `site` and counts the attempt.
	pub fn enter(stage: Stage, site: &'static str) -> Self {
		let span = tracing::info_span!(
			"bearer_relay.stage",
			stage = stage.as_str(),
			site,
			outcome = field::Empty
		);

		super::metrics::count(stage, "attempt");

		Self { span, stage }
	}

	/// Instruments a future without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}

	/// Records the stage outcome on the span and in the stage counter.
	pub fn settle<T, E>(&self, result: &Result<T, E>) {
		let outcome = if result.is_ok() { "success" } else { "failure" };

		self.span.record("outcome", outcome);

		super::metrics::count(self.stage, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrumented_stage_settles() {
		let span = StageSpan::enter(Stage::Refresh, "instrumented_stage_settles");
		let value: Result<u8, ()> = StageSpan::instrument(&span, async { Ok(42) }).await;

		span.settle(&value);

		assert_eq!(value, Ok(42));
	}

	#[test]
	fn stage_labels_are_stable() {
		assert_eq!(Stage::Dispatch.as_str(), "dispatch");
		assert_eq!(Stage::Refresh.as_str(), "refresh");
		assert_eq!(Stage::Replay.as_str(), "replay");
	}
}
