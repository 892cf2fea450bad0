use std::time::Instant;

use railway::{Extension, Run};
use tracing::{info, info_span, warn};

/// Opens an `info` span around every run and logs how it ended.
#[derive(Debug, Clone)]
pub struct Traced {
    name: String,
}

impl Traced {
    /// `name` is recorded on the span, to tell transactions apart.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Extension for Traced {
    fn call<T, E, F>(&self, run: F) -> Run<T, E>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> Run<T, E>,
    {
        let span = info_span!("transaction", name = %self.name);
        let _entered = span.enter();
        let started = Instant::now();

        let result = run();

        let elapsed = started.elapsed();
        match &result {
            Ok(outcome) => {
                let state = if outcome.is_success() {
                    "completed"
                } else {
                    "halted"
                };
                info!(state, ?elapsed, "run finished");
            }
            Err(error) => warn!(error = %error, ?elapsed, "run faulted"),
        }
        result
    }
}
