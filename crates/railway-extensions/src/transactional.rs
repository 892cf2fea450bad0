//! Commit-or-rollback around a whole run.

use railway::{Error, Extension, ExtensionError, Interrupted, Outcome, Run};
use tracing::{debug, warn};

/// Something a run can be made atomic against: a database connection, a
/// unit of work, a staging area.
///
/// Methods take `&self`; resources keep their session state behind interior
/// mutability, the way connection handles do.
pub trait Resource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn begin(&self) -> Result<(), Self::Error>;

    fn commit(&self) -> Result<(), Self::Error>;

    fn rollback(&self) -> Result<(), Self::Error>;
}

/// Runs every transaction inside a unit of work on its resource.
///
/// The unit is committed only when the run succeeds. A failed run, a faulted
/// run and a refused commit are all rolled back. If that rollback fails too,
/// the caller gets [`Error::RollbackFailed`] carrying both the rollback error
/// and what stopped the run.
#[derive(Debug, Clone, Default)]
pub struct Transactional<R> {
    resource: R,
}

impl<R: Resource> Transactional<R> {
    /// Wrap runs in units of work on `resource`.
    #[must_use]
    pub fn new(resource: R) -> Self {
        Self { resource }
    }

    /// The resource units of work are opened on.
    #[must_use]
    pub fn resource(&self) -> &R {
        &self.resource
    }

    fn rollback(&self) -> Result<(), ExtensionError> {
        match self.resource.rollback() {
            Ok(()) => {
                debug!("rolled back");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "rollback failed");
                Err(ExtensionError::new("rollback", e))
            }
        }
    }

    /// Roll back after `fault`, which reaches the caller either way.
    fn abandon(&self, fault: Error) -> Error {
        match self.rollback() {
            Ok(()) => fault,
            Err(rollback) => Error::RollbackFailed {
                run: Interrupted::fault(fault),
                rollback,
            },
        }
    }
}

impl<R: Resource> Extension for Transactional<R> {
    fn call<T, E, F>(&self, run: F) -> Run<T, E>
    where
        E: Send + Sync + 'static,
        F: FnOnce() -> Run<T, E>,
    {
        self.resource
            .begin()
            .map_err(|e| ExtensionError::new("begin", e))?;

        match run() {
            Ok(Outcome::Success(value)) => match self.resource.commit() {
                Ok(()) => {
                    debug!("committed");
                    Ok(Outcome::Success(value))
                }
                Err(e) => {
                    warn!(error = %e, "commit failed");
                    Err(self.abandon(ExtensionError::new("commit", e).into()))
                }
            },
            Ok(Outcome::Failure(error)) => match self.rollback() {
                Ok(()) => Ok(Outcome::Failure(error)),
                Err(rollback) => Err(Error::RollbackFailed {
                    run: Interrupted::failure(error),
                    rollback,
                }),
            },
            Err(fault) => Err(self.abandon(fault)),
        }
    }
}
