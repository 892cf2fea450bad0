use crate::operation::Step;

/// Wraps every step of a run.
///
/// The profiler receives the pending [`Step`] and must run it exactly once,
/// returning the native result it produced (or a replacement for it). A
/// profiler that never runs the step leaves the run's outcome undefined.
pub trait Profiler<I, N> {
    fn call(&self, step: Step<'_, I, N>) -> N;
}

impl<I, N, F> Profiler<I, N> for F
where
    F: Fn(Step<'_, I, N>) -> N,
{
    fn call(&self, step: Step<'_, I, N>) -> N {
        self(step)
    }
}
