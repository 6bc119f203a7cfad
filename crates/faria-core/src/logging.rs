#![forbid(unsafe_code)]

//! Structured logging facade.
//!
//! Primitives log state transitions (overlay open/close, focus restoration,
//! queue eviction, submit lifecycle) through the macros exported here. With
//! the `tracing` feature the macros are `tracing`'s own; without it they
//! expand to nothing, so call sites never carry their own `cfg` attributes.
//!
//! Downstream crates forward their `tracing` feature to `faria-core/tracing`
//! and call `faria_core::debug!(...)` and friends.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, info, trace, trace_span, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op `debug!` when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op `info!` when tracing is disabled.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// No-op `trace!` when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op `warn!` when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// No-op `debug_span!` when tracing is disabled.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op `trace_span!` when tracing is disabled.
    #[macro_export]
    macro_rules! trace_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in span returned by the no-op span macros.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the span. Does nothing.
    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }

    /// Enter the span by reference. Does nothing.
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan::entered`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;
