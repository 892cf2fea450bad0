//! Ready-made hooks for `railway` transactions.
//!
//! - [`Transactional`] commits or rolls back a [`Resource`] around each run.
//! - [`Traced`] wraps each run in a `tracing` span.
//! - [`AuditProfiler`] and [`TracingProfiler`] observe single steps.
//! - [`Registry`] maps configuration keys to capabilities at startup.

mod audit;
mod logged;
mod registry;
mod settled;
mod traced;
mod transactional;

pub use audit::{AuditLog, AuditProfiler, StepRecord, StepStatus};
pub use logged::TracingProfiler;
pub use registry::Registry;
pub use settled::Settled;
pub use traced::Traced;
pub use transactional::{Resource, Transactional};
