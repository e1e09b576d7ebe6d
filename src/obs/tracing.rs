// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedAcquire<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedAcquire<F> = F;

/// A span builder used around token acquisition.
#[derive(Clone, Debug)]
pub struct AcquireSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AcquireSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("onedrive_disk.acquire", stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> AcquireSpanGuard {
		#[cfg(feature = "tracing")]
		{
			AcquireSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			AcquireSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedAcquire<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`AcquireSpan::entered`].
pub struct AcquireSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for AcquireSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AcquireSpanGuard(..)")
	}
}
