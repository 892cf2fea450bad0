//! Short-circuiting transactions over named fallible operations.
//!
//! A [`Transaction`] runs a body of steps. Each step calls a named operation
//! through the [`Runner`]; a successful step hands back its plain value, and
//! the first failing step halts the run, skipping everything after it and
//! becoming the run's outcome.
//!
//! ```
//! use railway::{Outcome, Transaction};
//!
//! let checkout = Transaction::<u32, u32, String>::builder()
//!     .operation("reserve", |qty| Outcome::Success(qty))
//!     .operation("charge", |qty| {
//!         if qty <= 3 {
//!             Outcome::Success(qty * 10)
//!         } else {
//!             Outcome::Failure(format!("cannot charge for {qty} items"))
//!         }
//!     })
//!     .build();
//!
//! let total = checkout.transaction(|steps| {
//!     let reserved = steps.call("reserve", 2)?;
//!     steps.call("charge", reserved)
//! })?;
//! assert_eq!(total, Outcome::Success(20));
//!
//! let refused = checkout.transaction(|steps| {
//!     let reserved = steps.call("reserve", 5)?;
//!     steps.call("charge", reserved)
//! })?;
//! assert_eq!(refused, Outcome::Failure("cannot charge for 5 items".to_string()));
//! # Ok::<(), railway::Error>(())
//! ```
//!
//! Operations may return other result types; an [`Adapter`] converts between
//! them and [`Outcome`]. Whole runs can be wrapped by an [`Extension`] and
//! single steps by a [`Profiler`].

pub mod adapter;
mod error;
mod extension;
mod operation;
mod outcome;
mod profiler;
pub mod resolver;
mod runner;
mod transaction;

pub use adapter::{Adapter, Canonical, Maybe, StdResult};
pub use error::{
    AccessError, ConfigurationError, Error, ExtensionError, Interrupted, Result,
    UnknownOperationError,
};
pub use extension::{Extension, Passthrough, Run};
pub use operation::{Operation, Operations, Step};
pub use outcome::{Outcome, Variant};
pub use profiler::Profiler;
pub use resolver::{Bindings, Declaration, NoBindings, Target};
pub use runner::{Halt, Runner};
pub use transaction::{Transaction, TransactionBuilder};
