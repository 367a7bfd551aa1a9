//! Zero-cost logging hooks.
//!
//! With the `tracing` feature the macros forward to the `tracing` crate; without it they
//! expand to nothing, so release builds of the index carry no logging code at all.
//!
//! ```bash
//! cargo test --features tracing
//! RUST_LOG=bplus_index=debug cargo test --features tracing -- --nocapture
//! ```

#![allow(unused_macros, unused_imports)]

/// Trace-level event (per operation). No-op without the `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level event (structural changes). No-op without the `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
