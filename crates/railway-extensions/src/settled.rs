use railway::Outcome;

/// Native step results whose success can be read without converting them.
///
/// Implemented for the native representation of every adapter the `railway`
/// crate ships, so profilers can report a step's result without knowing the
/// transaction's adapter.
pub trait Settled {
    fn succeeded(&self) -> bool;
}

impl<T, E> Settled for Outcome<T, E> {
    fn succeeded(&self) -> bool {
        self.is_success()
    }
}

impl<T, E> Settled for Result<T, E> {
    fn succeeded(&self) -> bool {
        self.is_ok()
    }
}

impl<T> Settled for Option<T> {
    fn succeeded(&self) -> bool {
        self.is_some()
    }
}
