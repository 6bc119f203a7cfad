#![forbid(unsafe_code)]

//! Core: events, the host environment adapter, and the state cells shared by
//! every FrankenARIA primitive.

pub mod click_outside;
pub mod controllable;
pub mod element;
pub mod environment;
pub mod error;
pub mod event;
pub mod logging;
pub mod motion;
pub mod registry;
pub mod scope;
pub mod timer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use error::UsageError;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, info, trace, trace_span, warn};
