use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::debug;

use crate::adapter::{Adapter, Canonical};
use crate::error::{ConfigurationError, Error};
use crate::extension::{Extension, Passthrough};
use crate::operation::Operations;
use crate::outcome::Outcome;
use crate::profiler::Profiler;
use crate::resolver::{Bindings, Declaration, resolve};
use crate::runner::{Halt, Runner};

/// A configured business transaction.
///
/// Holds the operations table, the adapter (as a type), the run extension and
/// an optional step profiler. A transaction is immutable: [`Transaction::with`]
/// returns a new one and leaves the receiver as it was.
///
/// # Type Parameters
///
/// - `I`: argument type of every operation
/// - `O`: success value type of every operation
/// - `E`: failure payload type
/// - `A`: adapter selecting the native result representation
/// - `X`: whole-run extension
pub struct Transaction<I, O, E, A = Canonical, X = Passthrough>
where
    A: Adapter<O, E>,
{
    operations: Operations<I, A::Native>,
    profiler: Option<Rc<dyn Profiler<I, A::Native>>>,
    extension: Rc<X>,
    _adapter: PhantomData<fn() -> (O, E, A)>,
}

impl<I, O, E, A> Transaction<I, O, E, A>
where
    A: Adapter<O, E>,
{
    /// Start configuring a transaction with the default extension.
    #[must_use]
    pub fn builder() -> TransactionBuilder<I, O, E, A> {
        TransactionBuilder::empty(Passthrough)
    }
}

impl<I, O, E, A, X> Transaction<I, O, E, A, X>
where
    A: Adapter<O, E>,
    X: Extension,
{
    /// Run `body` as one transaction.
    ///
    /// The body receives a [`Runner`] to call operations through. The first
    /// failing step halts the run and its failure becomes the outcome; a body
    /// that returns normally succeeds with its return value. The outcome is
    /// handed back in the adapter's native representation.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] for faults that are not domain failures: an unknown
    /// operation, or an error raised by the extension.
    pub fn transaction<R, F>(&self, body: F) -> Result<<A as Adapter<R, E>>::Native, Error>
    where
        A: Adapter<R, E>,
        E: Send + Sync + 'static,
        F: FnOnce(&Runner<'_, I, O, E, A>) -> Result<R, Halt>,
    {
        let operations = &self.operations;
        let profiler = self.profiler.as_deref();

        let run = move || {
            let runner: Runner<'_, I, O, E, A> = Runner::new(operations, profiler);
            let returned = body(&runner);
            runner.finish(returned)
        };

        let outcome = self.extension.call(run)?;
        let state = if outcome.is_success() {
            "completed"
        } else {
            "halted"
        };
        debug!(state, "transaction finished");
        Ok(<A as Adapter<R, E>>::from_canonical(outcome))
    }

    /// A new transaction whose operations are this one's merged with
    /// `overrides`. Overrides win on name collisions; adapter, extension and
    /// profiler are shared with the receiver.
    #[must_use]
    pub fn with(&self, overrides: &Operations<I, A::Native>) -> Self {
        Self {
            operations: self.operations.merge(overrides),
            profiler: self.profiler.clone(),
            extension: Rc::clone(&self.extension),
            _adapter: PhantomData,
        }
    }

    /// Shorthand for [`Transaction::with`] overriding a single operation.
    #[must_use]
    pub fn with_operation<F>(&self, name: impl Into<String>, operation: F) -> Self
    where
        F: Fn(I) -> A::Native + 'static,
    {
        let mut overrides = Operations::new();
        overrides.insert(name, Rc::new(operation));
        self.with(&overrides)
    }

    /// The resolved operations table.
    #[must_use]
    pub fn operations(&self) -> &Operations<I, A::Native> {
        &self.operations
    }

    /// The extension wrapping every run.
    #[must_use]
    pub fn extension(&self) -> &X {
        &self.extension
    }

    /// Wrap `value` as a success in the adapter's native representation.
    pub fn success<T>(&self, value: T) -> <A as Adapter<T, E>>::Native
    where
        A: Adapter<T, E>,
    {
        <A as Adapter<T, E>>::from_canonical(Outcome::Success(value))
    }

    /// Wrap `error` as a failure in the adapter's native representation.
    pub fn failure<T>(&self, error: E) -> <A as Adapter<T, E>>::Native
    where
        A: Adapter<T, E>,
    {
        <A as Adapter<T, E>>::from_canonical(Outcome::Failure(error))
    }
}

impl<I, O, E, A, X> Clone for Transaction<I, O, E, A, X>
where
    A: Adapter<O, E>,
{
    fn clone(&self) -> Self {
        Self {
            operations: self.operations.clone(),
            profiler: self.profiler.clone(),
            extension: Rc::clone(&self.extension),
            _adapter: PhantomData,
        }
    }
}

impl<I, O, E, A, X> fmt::Debug for Transaction<I, O, E, A, X>
where
    A: Adapter<O, E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("operations", &self.operations)
            .field("profiled", &self.profiler.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`Transaction`].
///
/// The adapter is fixed by the builder's type, since operations are stored in
/// its native representation. The extension can be swapped at any point.
pub struct TransactionBuilder<I, O, E, A = Canonical, X = Passthrough>
where
    A: Adapter<O, E>,
{
    operations: Operations<I, A::Native>,
    profiler: Option<Rc<dyn Profiler<I, A::Native>>>,
    extension: X,
    _adapter: PhantomData<fn() -> (O, E, A)>,
}

impl<I, O, E> TransactionBuilder<I, O, E> {
    /// A builder for the canonical adapter and no extension.
    #[must_use]
    pub fn new() -> Self {
        Self::empty(Passthrough)
    }
}

impl<I, O, E> Default for TransactionBuilder<I, O, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, O, E, A, X> TransactionBuilder<I, O, E, A, X>
where
    A: Adapter<O, E>,
{
    fn empty(extension: X) -> Self {
        Self {
            operations: Operations::new(),
            profiler: None,
            extension,
            _adapter: PhantomData,
        }
    }

    /// Add or replace one operation.
    #[must_use]
    pub fn operation<F>(mut self, name: impl Into<String>, operation: F) -> Self
    where
        F: Fn(I) -> A::Native + 'static,
    {
        self.operations.insert(name, Rc::new(operation));
        self
    }

    /// Merge a whole table in; its entries win over earlier ones.
    #[must_use]
    pub fn operations(mut self, operations: &Operations<I, A::Native>) -> Self {
        self.operations = self.operations.merge(operations);
        self
    }

    /// Resolve `declaration` against the host's `bindings` and merge the
    /// result in.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] if a declared method is not bound.
    pub fn declare<B>(
        self,
        declaration: &Declaration<I, A::Native>,
        bindings: &B,
    ) -> Result<Self, ConfigurationError>
    where
        B: Bindings<I, A::Native> + ?Sized,
    {
        let resolved = resolve(declaration, bindings)?;
        Ok(self.operations(&resolved))
    }

    /// Wrap every step in `profiler`.
    #[must_use]
    pub fn profiler<P>(mut self, profiler: P) -> Self
    where
        P: Profiler<I, A::Native> + 'static,
    {
        self.profiler = Some(Rc::new(profiler));
        self
    }

    /// Replace the run extension.
    #[must_use]
    pub fn extension<Y: Extension>(self, extension: Y) -> TransactionBuilder<I, O, E, A, Y> {
        TransactionBuilder {
            operations: self.operations,
            profiler: self.profiler,
            extension,
            _adapter: PhantomData,
        }
    }

    /// Finish configuration.
    #[must_use]
    pub fn build(self) -> Transaction<I, O, E, A, X> {
        Transaction {
            operations: self.operations,
            profiler: self.profiler,
            extension: Rc::new(self.extension),
            _adapter: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::adapter::{Maybe, StdResult};
    use crate::extension::Run;
    use crate::operation::Step;

    type Arithmetic = Transaction<i32, i32, String>;

    fn arithmetic() -> Arithmetic {
        Arithmetic::builder()
            .operation("add_one", |x| Outcome::Success(x + 1))
            .operation("add_two", |x| Outcome::Success(x + 2))
            .build()
    }

    #[test]
    fn chains_operations() -> anyhow::Result<()> {
        let outcome = arithmetic().transaction(|steps| {
            let x = steps.call("add_one", 1)?;
            steps.call("add_two", x)
        })?;

        assert_eq!(outcome, Outcome::Success(4));
        Ok(())
    }

    #[test]
    fn plain_code_can_sit_between_steps() -> anyhow::Result<()> {
        let outcome = arithmetic().transaction(|steps| {
            let x = steps.call("add_one", 1)?;
            let y = x + 1;
            steps.call("add_two", y)
        })?;

        assert_eq!(outcome, Outcome::Success(5));
        Ok(())
    }

    #[test]
    fn body_return_value_becomes_the_success() -> anyhow::Result<()> {
        let outcome = arithmetic().transaction(|steps| {
            let x = steps.call("add_one", 1)?;
            Ok(format!("got {x}"))
        })?;

        assert_eq!(outcome, Outcome::Success("got 2".to_string()));
        Ok(())
    }

    #[test]
    fn stops_at_the_first_failure() -> anyhow::Result<()> {
        let reached = Cell::new(false);
        let transaction =
            arithmetic().with_operation("add_one", |_| Outcome::Failure("error".to_string()));

        let outcome = transaction.transaction(|steps| {
            steps.call("add_one", 1)?;
            reached.set(true);
            steps.call("add_two", 1)
        })?;

        assert_eq!(outcome, Outcome::Failure("error".to_string()));
        assert!(!reached.get());
        Ok(())
    }

    #[test]
    fn body_can_halt_with_its_own_failure() -> anyhow::Result<()> {
        let outcome = arithmetic().transaction(|steps| {
            let x = steps.call("add_one", 1)?;
            if x < 10 {
                return Err(steps.fail(format!("{x} is too small")));
            }
            Ok(x)
        })?;

        assert_eq!(outcome, Outcome::Failure("2 is too small".to_string()));
        Ok(())
    }

    #[test]
    fn unknown_operation_surfaces_as_an_error() {
        let error = arithmetic()
            .transaction(|steps| steps.call("add_three", 1))
            .expect_err("add_three is not defined");

        assert!(matches!(
            error,
            Error::UnknownOperation(ref unknown) if unknown.name == "add_three"
        ));
    }

    #[test]
    fn with_replaces_operations_without_touching_the_original() -> anyhow::Result<()> {
        let original = arithmetic();
        let replaced = original.with_operation("add_one", |x| Outcome::Success(x + 100));

        let from_replaced = replaced.transaction(|steps| steps.call("add_one", 1))?;
        let from_original = original.transaction(|steps| steps.call("add_one", 1))?;

        assert_eq!(from_replaced, Outcome::Success(101));
        assert_eq!(from_original, Outcome::Success(2));
        assert_eq!(replaced.operations().names(), vec!["add_one", "add_two"]);
        Ok(())
    }

    #[test]
    fn std_result_adapter_speaks_native_results() -> anyhow::Result<()> {
        let transaction = Transaction::<i32, i32, String, StdResult>::builder()
            .operation("parse_positive", |x| {
                if x > 0 {
                    Ok(x)
                } else {
                    Err(format!("{x} is not positive"))
                }
            })
            .build();

        let ok = transaction.transaction(|steps| steps.call("parse_positive", 3))?;
        let err = transaction.transaction(|steps| steps.call("parse_positive", -3))?;

        assert_eq!(ok, Ok(3));
        assert_eq!(err, Err("-3 is not positive".to_string()));
        Ok(())
    }

    #[test]
    fn maybe_adapter_reports_failures_as_none() -> anyhow::Result<()> {
        let transaction = Transaction::<i32, i32, (), Maybe>::builder()
            .operation("half", |x| (x % 2 == 0).then_some(x / 2))
            .build();

        let halved = transaction.transaction(|steps| {
            let x = steps.call("half", 8)?;
            steps.call("half", x)
        })?;
        let odd = transaction.transaction(|steps| steps.call("half", 3))?;

        assert_eq!(halved, Some(2));
        assert_eq!(odd, None);
        Ok(())
    }

    #[test]
    fn native_helpers_follow_the_adapter() {
        let transaction = Transaction::<i32, i32, String, StdResult>::builder().build();

        assert_eq!(transaction.success::<i32>(1), Ok(1));
        assert_eq!(transaction.failure::<i32>("no".to_string()), Err("no".to_string()));
    }

    struct Counting {
        calls: Cell<usize>,
    }

    impl Extension for Counting {
        fn call<T, E, F>(&self, run: F) -> Run<T, E>
        where
            E: Send + Sync + 'static,
            F: FnOnce() -> Run<T, E>,
        {
            self.calls.set(self.calls.get() + 1);
            run()
        }
    }

    #[test]
    fn extension_runs_once_per_transaction() -> anyhow::Result<()> {
        let transaction =
            arithmetic().with_operation("fail", |_| Outcome::Failure("boom".to_string()));
        let counted = Transaction::<i32, i32, String>::builder()
            .operations(transaction.operations())
            .extension(Counting {
                calls: Cell::new(0),
            })
            .build();

        let succeeded = counted.transaction(|steps| steps.call("add_one", 1))?;
        assert_eq!(succeeded, Outcome::Success(2));
        assert_eq!(counted.extension().calls.get(), 1);

        let failed = counted.transaction(|steps| steps.call("fail", 1))?;
        assert_eq!(failed, Outcome::Failure("boom".to_string()));
        assert_eq!(counted.extension().calls.get(), 2);
        Ok(())
    }

    struct Recording {
        calls: Rc<RefCell<Vec<(String, i32)>>>,
    }

    impl Profiler<i32, Outcome<i32, String>> for Recording {
        fn call(&self, step: Step<'_, i32, Outcome<i32, String>>) -> Outcome<i32, String> {
            self.calls
                .borrow_mut()
                .push((step.name().to_string(), *step.args()));
            step.run()
        }
    }

    #[test]
    fn profiler_sees_every_executed_step_in_order() -> anyhow::Result<()> {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let transaction = Arithmetic::builder()
            .operation("add_one", |x| Outcome::Success(x + 1))
            .operation("reject", |_| Outcome::Failure("rejected".to_string()))
            .operation("add_two", |x| Outcome::Success(x + 2))
            .profiler(Recording {
                calls: Rc::clone(&calls),
            })
            .build();

        let outcome = transaction.transaction(|steps| {
            let x = steps.call("add_one", 1)?;
            let y = steps.call("reject", x)?;
            steps.call("add_two", y)
        })?;

        assert_eq!(outcome, Outcome::Failure("rejected".to_string()));
        assert_eq!(
            *calls.borrow(),
            vec![("add_one".to_string(), 1), ("reject".to_string(), 2)]
        );
        Ok(())
    }
}
