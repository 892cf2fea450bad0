use crate::error::AccessError;

/// Which side of an [`Outcome`] a value sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Success,
    Failure,
}

/// Canonical result of an operation or of a whole run.
///
/// An outcome is exactly one of two variants, fixed at construction. Adapters
/// translate between this type and whatever representation operations
/// actually return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Outcome<T, E> {
    /// The operation produced a value.
    Success(T),
    /// The operation failed; the payload is opaque to the engine.
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Wrap a value as a success.
    pub fn pure(value: T) -> Self {
        Self::Success(value)
    }

    /// Whether this is a `Success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Whether this is a `Failure`.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Which side this outcome sits on.
    #[must_use]
    pub fn variant(&self) -> Variant {
        match self {
            Self::Success(_) => Variant::Success,
            Self::Failure(_) => Variant::Failure,
        }
    }

    /// Take the success payload.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when called on a failure.
    pub fn into_value(self) -> Result<T, AccessError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(_) => Err(AccessError {
                found: Variant::Failure,
            }),
        }
    }

    /// Take the failure payload.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] when called on a success.
    pub fn into_failure(self) -> Result<E, AccessError> {
        match self {
            Self::Success(_) => Err(AccessError {
                found: Variant::Success,
            }),
            Self::Failure(error) => Ok(error),
        }
    }

    /// The success payload, or `default` for a failure.
    pub fn value_or(self, default: T) -> T {
        match self {
            Self::Success(value) => value,
            Self::Failure(_) => default,
        }
    }

    /// Transform the success payload. `f` is never called on a failure.
    pub fn map<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transform the failure payload. `f` is never called on a success.
    pub fn map_failure<G, F>(self, f: F) -> Outcome<T, G>
    where
        F: FnOnce(E) -> G,
    {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    /// Chain an operation that itself returns an outcome.
    ///
    /// A failure is threaded through unchanged, however long the chain.
    pub fn bind<U, F>(self, f: F) -> Outcome<U, E>
    where
        F: FnOnce(T) -> Outcome<U, E>,
    {
        match self {
            Self::Success(value) => f(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Collapse both variants into one value. Exactly one function runs.
    pub fn fold<R, S, F>(self, on_success: S, on_failure: F) -> R
    where
        S: FnOnce(T) -> R,
        F: FnOnce(E) -> R,
    {
        match self {
            Self::Success(value) => on_success(value),
            Self::Failure(error) => on_failure(error),
        }
    }

    /// Borrow both payloads, leaving the outcome in place.
    pub fn as_ref(&self) -> Outcome<&T, &E> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Convert into the standard library's `Result`.
    ///
    /// # Errors
    ///
    /// A failure becomes `Err` with its payload.
    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use proptest::prelude::*;

    use super::*;

    type Checked = Outcome<i64, String>;

    fn halve(value: i64) -> Checked {
        if value % 2 == 0 {
            Outcome::Success(value / 2)
        } else {
            Outcome::Failure(format!("{value} is odd"))
        }
    }

    #[test]
    fn pure_is_a_success() {
        let outcome: Checked = Outcome::pure(3);

        assert!(outcome.is_success());
        assert!(!outcome.is_failure());
        assert_eq!(outcome.variant(), Variant::Success);
        assert_eq!(outcome, Outcome::Success(3));
    }

    #[test]
    fn into_value_on_failure_is_an_access_error() {
        let outcome: Checked = Outcome::Failure("boom".to_string());

        let error = outcome.into_value().expect_err("failure has no value");

        assert_eq!(error.found, Variant::Failure);
    }

    #[test]
    fn into_failure_on_success_is_an_access_error() {
        let outcome: Checked = Outcome::pure(1);

        let error = outcome.into_failure().expect_err("success has no failure");

        assert_eq!(error.found, Variant::Success);
    }

    #[test]
    fn value_or_falls_back_on_failure() {
        assert_eq!(Checked::pure(1).value_or(9), 1);
        assert_eq!(Checked::Failure("x".to_string()).value_or(9), 9);
    }

    #[test]
    fn map_never_runs_on_failure() {
        let calls = Cell::new(0);
        let outcome: Checked = Outcome::Failure("boom".to_string());

        let mapped = outcome.map(|value| {
            calls.set(calls.get() + 1);
            value + 1
        });

        assert_eq!(mapped, Outcome::Failure("boom".to_string()));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn map_failure_leaves_success_alone() {
        let outcome: Checked = Outcome::pure(4);

        assert_eq!(outcome.map_failure(|error| error.len()), Outcome::Success(4));
    }

    #[test]
    fn bind_chains_until_the_first_failure() {
        assert_eq!(Checked::pure(8).bind(halve).bind(halve), Outcome::Success(2));
        assert_eq!(
            Checked::pure(6).bind(halve).bind(halve).bind(halve),
            Outcome::Failure("3 is odd".to_string())
        );
    }

    #[test]
    fn fold_applies_exactly_one_side() {
        let success = Checked::pure(2).fold(|value| value * 10, |_| -1);
        let failure = Checked::Failure("x".to_string()).fold(|value| value * 10, |_| -1);

        assert_eq!(success, 20);
        assert_eq!(failure, -1);
    }

    #[test]
    fn as_ref_borrows_without_consuming() {
        let outcome: Checked = Outcome::Failure("boom".to_string());

        let borrowed = outcome.as_ref().map_failure(String::len);

        assert_eq!(borrowed, Outcome::Failure(4));
        assert_eq!(outcome.into_failure(), Ok("boom".to_string()));
    }

    #[test]
    fn converts_to_and_from_std_result() {
        let ok: Result<i64, String> = Ok(1);
        let err: Result<i64, String> = Err("nope".to_string());

        assert_eq!(Outcome::from(ok), Checked::pure(1));
        assert_eq!(Outcome::from(err), Checked::Failure("nope".to_string()));
        assert_eq!(Checked::pure(5).into_result(), Ok(5));
    }

    proptest! {
        #[test]
        fn pure_unwraps_to_its_value(value in any::<i64>()) {
            let outcome: Checked = Outcome::pure(value);
            prop_assert!(outcome.is_success());
            prop_assert_eq!(outcome.into_value(), Ok(value));
        }

        #[test]
        fn failure_unwraps_only_as_failure(payload in "[a-z]{0,12}") {
            let outcome: Checked = Outcome::Failure(payload.clone());
            prop_assert!(!outcome.is_success());
            prop_assert!(outcome.clone().into_value().is_err());
            prop_assert_eq!(outcome.into_failure(), Ok(payload));
        }

        #[test]
        fn bind_threads_failures_through_any_chain(payload in "[a-z]{1,8}", length in 0usize..32) {
            let mut outcome: Checked = Outcome::Failure(payload.clone());
            for _ in 0..length {
                outcome = outcome.bind(|value| Outcome::Success(value + 1));
            }
            prop_assert_eq!(outcome, Outcome::Failure(payload));
        }
    }
}
