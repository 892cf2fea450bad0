//! Faults raised while configuring or running a transaction.

use std::any::Any;
use std::fmt;

use thiserror::Error;

use crate::outcome::Variant;

/// Invalid setup, reported eagerly while a transaction is being configured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// A declaration refers to a method the bindings do not provide.
    #[error("operation '{operation}' refers to method '{method}', which the bindings do not provide")]
    UnboundMethod {
        /// Name the operation is declared under.
        operation: String,
        /// Method the declaration points at.
        method: String,
    },

    /// The configuration document has no `operations` entry.
    #[error("no `operations` declaration found")]
    MissingDeclaration,

    /// The declaration is neither a list nor a map.
    #[error(
        "operations can be given as a list of method names or as a map of name to method name, found {found}"
    )]
    InvalidShape {
        /// Kind of value found instead.
        found: String,
    },

    /// A declaration entry is not a name reference.
    #[error("operation '{operation}' must be declared as a method name, found {found}")]
    InvalidTarget {
        /// Name (or list position) of the offending entry.
        operation: String,
        /// Kind of value found instead.
        found: String,
    },

    /// The configuration document could not be parsed.
    #[error("invalid declaration document: {0}")]
    InvalidToml(String),

    /// A registry was asked for a key it does not hold.
    #[error("{kind} '{key}' is not known; known {kind}s are: {}", .known.join(", "))]
    UnknownKey {
        /// What the registry holds (adapter, extension, ...).
        kind: &'static str,
        /// Requested key.
        key: String,
        /// Keys in registration order.
        known: Vec<String>,
    },

    /// A registry key was registered twice.
    #[error("{kind} '{key}' is already registered")]
    DuplicateKey {
        /// What the registry holds.
        kind: &'static str,
        /// Offending key.
        key: String,
    },
}

/// A step referenced an operation that is not in the resolved table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("operation '{name}' is not defined; defined operations are: {}", .known.join(", "))]
pub struct UnknownOperationError {
    /// Name that was called.
    pub name: String,
    /// Names in the operations table, in declaration order.
    pub known: Vec<String>,
}

/// Wrong-variant access on an [`Outcome`](crate::Outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", access_message(.found))]
pub struct AccessError {
    /// Variant the accessor was called on.
    pub found: Variant,
}

fn access_message(found: &Variant) -> &'static str {
    match found {
        Variant::Failure => "no value wrapped in a Failure",
        Variant::Success => "no failure wrapped in a Success",
    }
}

/// A whole-run extension failed to drive its resource.
#[derive(Debug, Error)]
#[error("extension failed to {action}")]
pub struct ExtensionError {
    /// What the extension was doing (`begin`, `commit`, `rollback`).
    pub action: &'static str,
    /// The resource's own error.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl ExtensionError {
    #[must_use]
    pub fn new<S>(action: &'static str, source: S) -> Self
    where
        S: std::error::Error + Send + Sync + 'static,
    {
        Self {
            action,
            source: Box::new(source),
        }
    }
}

/// Faults surfaced to the caller of a transaction.
///
/// Domain failures are never reported here: they are the `Failure` variant of
/// the run's outcome.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    UnknownOperation(#[from] UnknownOperationError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Extension(#[from] ExtensionError),

    /// The body returned a `Halt` although its own run never halted.
    #[error("run body returned a halt that did not originate from its runner")]
    StrayHalt,

    /// A run stopped, and undoing its effects failed as well.
    #[error("{rollback} after {run}")]
    RollbackFailed {
        /// How the run stopped; the original failure or fault is kept.
        run: Interrupted,
        /// Why the rollback failed.
        #[source]
        rollback: ExtensionError,
    },
}

/// How a run stopped before an extension had to undo it.
#[derive(Debug)]
#[non_exhaustive]
pub enum Interrupted {
    /// The run halted on a domain failure, carried as-is.
    Failure(Box<dyn Any + Send + Sync>),
    /// The run, or the extension around it, faulted.
    Fault(Box<Error>),
}

impl Interrupted {
    /// Keep a run's failure payload.
    #[must_use]
    pub fn failure<E: Send + Sync + 'static>(error: E) -> Self {
        Self::Failure(Box::new(error))
    }

    /// Keep a run's fault.
    #[must_use]
    pub fn fault(fault: Error) -> Self {
        Self::Fault(Box::new(fault))
    }

    /// The failure payload, if the run halted on a failure of type `E`.
    #[must_use]
    pub fn failure_ref<E: 'static>(&self) -> Option<&E> {
        match self {
            Self::Failure(payload) => payload.downcast_ref(),
            Self::Fault(_) => None,
        }
    }

    /// Take the failure payload back, if the run halted on a failure of
    /// type `E`.
    #[must_use]
    pub fn into_failure<E: 'static>(self) -> Option<E> {
        match self {
            Self::Failure(payload) => payload.downcast().ok().map(|payload| *payload),
            Self::Fault(_) => None,
        }
    }

    /// The fault, if the run faulted.
    #[must_use]
    pub fn fault_ref(&self) -> Option<&Error> {
        match self {
            Self::Failure(_) => None,
            Self::Fault(fault) => Some(fault),
        }
    }
}

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(_) => f.write_str("the run failed"),
            Self::Fault(fault) => write!(f, "the run faulted: {fault}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
