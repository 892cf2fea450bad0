use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// A named unit of work: takes the table's argument type and returns the
/// adapter's native result.
pub type Operation<I, N> = Rc<dyn Fn(I) -> N>;

/// Table of operations keyed by name, in declaration order.
///
/// Tables are never changed in place once handed to a transaction; merging
/// produces a new table.
pub struct Operations<I, N> {
    entries: IndexMap<String, Operation<I, N>>,
}

impl<I, N> Operations<I, N> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Add or replace an operation, returning the one it replaced.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        operation: Operation<I, N>,
    ) -> Option<Operation<I, N>> {
        self.entries.insert(name.into(), operation)
    }

    /// The operation registered as `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Operation<I, N>> {
        self.entries.get(name)
    }

    /// Whether an operation is registered as `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Operation names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Number of operations in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no operation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A new table holding this table's operations overridden by `overrides`.
    ///
    /// Names present in both take the override. Neither input is modified.
    #[must_use]
    pub fn merge(&self, overrides: &Self) -> Self {
        let mut merged = self.clone();
        for (name, operation) in &overrides.entries {
            merged.entries.insert(name.clone(), Rc::clone(operation));
        }
        merged
    }

    /// Name and operation pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operation<I, N>)> {
        self.entries.iter().map(|(name, operation)| (name.as_str(), operation))
    }
}

impl<I, N> Default for Operations<I, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, N> Clone for Operations<I, N> {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(name, operation)| (name.clone(), Rc::clone(operation)))
                .collect(),
        }
    }
}

impl<I, N> fmt::Debug for Operations<I, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl<I, N, S, F> FromIterator<(S, F)> for Operations<I, N>
where
    S: Into<String>,
    F: Fn(I) -> N + 'static,
{
    fn from_iter<T: IntoIterator<Item = (S, F)>>(iter: T) -> Self {
        let mut operations = Self::new();
        for (name, operation) in iter {
            operations.insert(name, Rc::new(operation));
        }
        operations
    }
}

/// One pending invocation of an operation.
///
/// A step is a zero-argument thunk over the operation and its arguments.
/// [`Step::run`] consumes it, so it can run at most once.
pub struct Step<'a, I, N> {
    name: &'a str,
    args: I,
    operation: &'a dyn Fn(I) -> N,
}

impl<'a, I, N> Step<'a, I, N> {
    pub(crate) fn new(name: &'a str, args: I, operation: &'a dyn Fn(I) -> N) -> Self {
        Self {
            name,
            args,
            operation,
        }
    }

    /// Name the operation was called under.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Arguments the operation will receive.
    #[must_use]
    pub fn args(&self) -> &I {
        &self.args
    }

    /// Invoke the operation with the step's arguments.
    pub fn run(self) -> N {
        (self.operation)(self.args)
    }
}

impl<I: fmt::Debug, N> fmt::Debug for Step<'_, I, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}
