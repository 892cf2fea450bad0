//! Conversions between [`Outcome`] and the result types operations return.
//!
//! An adapter is a zero-sized marker type selecting a native representation.
//! Operations registered on a transaction return `Adapter::Native`; the
//! runner converts every step result into an [`Outcome`] and the final
//! outcome back into `Native` for the caller.

use crate::outcome::Outcome;

/// Bidirectional conversion between a native representation and [`Outcome`].
///
/// For every value `v`, `to_canonical(from_canonical(Outcome::Success(v)))`
/// must equal `Outcome::Success(v)`. Round-tripping a failure may lose the
/// payload when the native type cannot carry one; each adapter states whether
/// it does.
pub trait Adapter<T, E> {
    /// Result type operations return under this adapter.
    type Native;

    fn to_canonical(native: Self::Native) -> Outcome<T, E>;

    fn from_canonical(outcome: Outcome<T, E>) -> Self::Native;
}

/// Operations return [`Outcome`] directly. Lossless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Canonical;

impl<T, E> Adapter<T, E> for Canonical {
    type Native = Outcome<T, E>;

    fn to_canonical(native: Self::Native) -> Outcome<T, E> {
        native
    }

    fn from_canonical(outcome: Outcome<T, E>) -> Self::Native {
        outcome
    }
}

/// Operations return `std::result::Result`. Lossless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StdResult;

impl<T, E> Adapter<T, E> for StdResult {
    type Native = Result<T, E>;

    fn to_canonical(native: Self::Native) -> Outcome<T, E> {
        Outcome::from(native)
    }

    fn from_canonical(outcome: Outcome<T, E>) -> Self::Native {
        outcome.into()
    }
}

/// Operations return `Option`.
///
/// Lossy on failure: `None` carries no payload, so a failure comes back as
/// `Failure(E::default())` whatever it held on the way out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Maybe;

impl<T, E: Default> Adapter<T, E> for Maybe {
    type Native = Option<T>;

    fn to_canonical(native: Self::Native) -> Outcome<T, E> {
        match native {
            Some(value) => Outcome::Success(value),
            None => Outcome::Failure(E::default()),
        }
    }

    fn from_canonical(outcome: Outcome<T, E>) -> Self::Native {
        match outcome {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }
}
