// self
use crate::obs::Outcome;

/// Records a handshake outcome via the global metrics recorder (when enabled).
pub fn record_outcome(provider: &str, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"auth_strategy_handshake_total",
			"provider" => provider.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (provider, outcome);
	}
}

/// Records a rejected handshake construction via the global metrics recorder (when enabled).
pub fn record_construct_rejection(provider: &str, cause: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"auth_strategy_construct_rejected_total",
			"provider" => provider.to_owned(),
			"cause" => cause
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (provider, cause);
	}
}
