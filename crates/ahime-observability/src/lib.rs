//! Observability for the Ahimè storefront.
//!
//! - `StructuredLogger` - session-scoped structured log entries
//! - `init_tracing` - subscriber for `tracing` events emitted by library crates

mod logging;
mod tracing;

pub use crate::logging::*;
pub use crate::tracing::init_tracing;
