use std::cell::{Ref, RefCell};
use std::fmt::Debug;
use std::rc::Rc;
use std::time::{Duration, Instant};

use railway::{Profiler, Step};

use crate::settled::Settled;

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// The operation returned a success.
    Succeeded,
    /// The operation returned a failure and halted its run.
    Failed,
}

/// Record of one executed step.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Name of the operation.
    pub name: String,
    /// `Debug` rendering of the arguments.
    pub args: String,
    pub status: StepStatus,
    /// When the step started executing.
    pub started_at: Instant,
    pub elapsed: Duration,
}

/// Every step an [`AuditProfiler`] saw, in execution order.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    records: Vec<StepRecord>,
}

impl AuditLog {
    /// Create a new empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: StepRecord) {
        self.records.push(record);
    }

    /// All records, in execution order.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Names of the recorded steps.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|record| record.name.as_str()).collect()
    }

    /// One line per step, for display.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                StepStatus::Succeeded => "✓",
                StepStatus::Failed => "✗",
            };
            lines.push(format!("{status} {}({})", record.name, record.args));
        }
        lines.join("\n")
    }
}

/// Profiler recording every executed step into a shared [`AuditLog`].
///
/// Clones share the log, so keep one clone to read it after handing the
/// other to a transaction builder. The log keeps growing across runs until
/// [`AuditProfiler::take`] empties it.
#[derive(Debug, Clone, Default)]
pub struct AuditProfiler {
    log: Rc<RefCell<AuditLog>>,
}

impl AuditProfiler {
    /// Create a profiler with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The log so far.
    ///
    /// Steps may read the log while they run.
    ///
    /// # Panics
    ///
    /// The returned guard blocks recording: a step finishing under this
    /// profiler while the guard is held panics. Drop it before the next run.
    #[must_use]
    pub fn log(&self) -> Ref<'_, AuditLog> {
        self.log.borrow()
    }

    /// Take the log so far, leaving an empty one behind.
    #[must_use]
    pub fn take(&self) -> AuditLog {
        self.log.take()
    }
}

impl<I, N> Profiler<I, N> for AuditProfiler
where
    I: Debug,
    N: Settled,
{
    fn call(&self, step: Step<'_, I, N>) -> N {
        let name = step.name().to_string();
        let args = format!("{:?}", step.args());
        let started_at = Instant::now();

        let native = step.run();

        let status = if native.succeeded() {
            StepStatus::Succeeded
        } else {
            StepStatus::Failed
        };
        self.log.borrow_mut().push(StepRecord {
            name,
            args,
            status,
            started_at,
            elapsed: started_at.elapsed(),
        });
        native
    }
}
