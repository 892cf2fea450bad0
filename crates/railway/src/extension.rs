use crate::error::Error;
use crate::outcome::Outcome;

/// What a run hands back to its extension: the run's outcome, or a fault
/// that must reach the caller.
pub type Run<T, E> = Result<Outcome<T, E>, Error>;

/// Wraps a whole transaction run.
///
/// `call` receives the run as a zero-argument thunk. It must invoke it exactly
/// once, synchronously, and return its value, possibly transformed. This is
/// where whole-run side effects such as commit and rollback belong.
///
/// Failure payloads are `Send + Sync + 'static` so an extension can hand one
/// back inside an [`Error`] when undoing the run fails too
/// (see [`Error::RollbackFailed`]).
///
/// A pair `(outer, inner)` is itself an extension: `outer` wraps `inner`.
pub trait Extension {
    fn call<T, E, F>(&self, run: F) -> Run<T, E>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> Run<T, E>;
}

/// Runs the body and returns its result untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl Extension for Passthrough {
    fn call<T, E, F>(&self, run: F) -> Run<T, E>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> Run<T, E>,
    {
        run()
    }
}

impl<A, B> Extension for (A, B)
where
    A: Extension,
    B: Extension,
{
    fn call<T, E, F>(&self, run: F) -> Run<T, E>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> Run<T, E>,
    {
        let (outer, inner) = self;
        outer.call(|| inner.call(run))
    }
}
