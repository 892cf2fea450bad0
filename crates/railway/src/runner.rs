use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, trace};

use crate::adapter::Adapter;
use crate::error::{Error, UnknownOperationError};
use crate::extension::Run;
use crate::operation::{Operations, Step};
use crate::outcome::Outcome;
use crate::profiler::Profiler;

/// Early exit out of a run body.
///
/// Every step call returns `Result<O, Halt>`; propagating the `Halt` with `?`
/// leaves the body and hands control back to the transaction, which reads
/// the reason for the halt from the runner. A `Halt` carries no payload and
/// can only be obtained from a [`Runner`].
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Halt {
    _private: (),
}

impl Halt {
    fn new() -> Self {
        Self { _private: () }
    }
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("transaction halted")
    }
}

enum Phase<E> {
    Running,
    Halted(E),
    Faulted(Error),
}

/// Step dispatcher handed to a transaction body.
///
/// A runner lives for exactly one run. The first failing step halts it for
/// good: later calls return [`Halt`] without executing anything, and the
/// failure becomes the run's outcome even if the body ignores the `Halt`.
pub struct Runner<'t, I, O, E, A>
where
    A: Adapter<O, E>,
{
    operations: &'t Operations<I, A::Native>,
    profiler: Option<&'t dyn Profiler<I, A::Native>>,
    phase: RefCell<Phase<E>>,
    _adapter: PhantomData<fn() -> (O, A)>,
}

impl<'t, I, O, E, A> Runner<'t, I, O, E, A>
where
    A: Adapter<O, E>,
{
    pub(crate) fn new(
        operations: &'t Operations<I, A::Native>,
        profiler: Option<&'t dyn Profiler<I, A::Native>>,
    ) -> Self {
        Self {
            operations,
            profiler,
            phase: RefCell::new(Phase::Running),
            _adapter: PhantomData,
        }
    }

    /// Execute the operation `name` with `args`.
    ///
    /// Returns the unwrapped success value, so the body can keep working with
    /// plain values.
    ///
    /// # Errors
    ///
    /// Returns [`Halt`] when the operation fails, when `name` is not in the
    /// operations table, or when the run has already halted.
    pub fn call(&self, name: &str, args: I) -> Result<O, Halt> {
        if self.is_halted() {
            trace!(operation = name, "run already halted, skipping step");
            return Err(Halt::new());
        }

        let Some(operation) = self.operations.get(name) else {
            debug!(operation = name, "unknown operation");
            let error = UnknownOperationError {
                name: name.to_string(),
                known: self.operations.names(),
            };
            return Err(self.stop(Phase::Faulted(error.into())));
        };

        trace!(operation = name, "running step");
        let step = Step::new(name, args, &**operation);
        let native = match self.profiler {
            Some(profiler) => profiler.call(step),
            None => step.run(),
        };

        match A::to_canonical(native) {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => {
                debug!(operation = name, "step failed, halting run");
                Err(self.stop(Phase::Halted(error)))
            }
        }
    }

    /// Halt the run with a failure of the body's own making.
    pub fn fail(&self, error: E) -> Halt {
        if self.is_halted() {
            return Halt::new();
        }
        debug!("run halted by its body");
        self.stop(Phase::Halted(error))
    }

    /// Whether `name` can be called in this run.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains(name)
    }

    /// Whether a step has already stopped this run.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        !matches!(*self.phase.borrow(), Phase::Running)
    }

    fn stop(&self, phase: Phase<E>) -> Halt {
        self.phase.replace(phase);
        Halt::new()
    }

    /// Settle the run once the body has returned.
    pub(crate) fn finish<R>(self, returned: Result<R, Halt>) -> Run<R, E> {
        match (self.phase.into_inner(), returned) {
            (Phase::Halted(error), _) => Ok(Outcome::Failure(error)),
            (Phase::Faulted(fault), _) => Err(fault),
            (Phase::Running, Ok(value)) => Ok(Outcome::Success(value)),
            (Phase::Running, Err(_)) => Err(Error::StrayHalt),
        }
    }
}
