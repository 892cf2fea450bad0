use std::fmt::Debug;
use std::time::Instant;

use railway::{Profiler, Step};
use tracing::debug;

use crate::settled::Settled;

/// Profiler emitting one `debug` event per executed step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProfiler;

impl<I, N> Profiler<I, N> for TracingProfiler
where
    I: Debug,
    N: Settled,
{
    fn call(&self, step: Step<'_, I, N>) -> N {
        let operation = step.name();
        let args = format!("{:?}", step.args());
        let started = Instant::now();

        let native = step.run();

        debug!(
            operation,
            args = %args,
            elapsed = ?started.elapsed(),
            succeeded = native.succeeded(),
            "step finished"
        );
        native
    }
}
