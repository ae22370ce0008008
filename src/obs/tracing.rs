// self
use crate::{_prelude::*, obs::Stage};

/// A span builder used around handshake stages.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provider name + stage.
	pub fn new(provider: &str, stage: Stage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"auth_strategy.handshake",
				provider,
				stage = stage.as_str(),
				cause = tracing::field::Empty,
				key = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, stage);

			Self {}
		}
	}

	/// Enters the span until the returned guard drops.
	pub fn entered(self) -> StageSpanGuard {
		#[cfg(feature = "tracing")]
		{
			StageSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			StageSpanGuard {}
		}
	}

	/// Records why the stage failed, plus the config key involved when there is one.
	pub fn record_failure(&self, cause: &str, key: Option<&str>) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("cause", cause);

			if let Some(key) = key {
				self.span.record("key", key);
			}
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (cause, key);
		}
	}

	/// Runs `f` inside the span.
	pub fn in_scope<F, T>(&self, f: F) -> T
	where
		F: FnOnce() -> T,
	{
		#[cfg(feature = "tracing")]
		{
			self.span.in_scope(f)
		}
		#[cfg(not(feature = "tracing"))]
		{
			f()
		}
	}
}

/// RAII guard returned by [`StageSpan::entered`].
pub struct StageSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for StageSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StageSpanGuard(..)")
	}
}
