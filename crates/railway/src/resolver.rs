//! Turning an operation declaration into an operations table.
//!
//! A declaration names operations either as a plain list, where each name is
//! looked up among the host's [`Bindings`], or as a map from operation name
//! to a [`Target`]: another method name, or a callable used as-is. Everything
//! is resolved up front; a bad declaration never survives until a step runs.

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::ConfigurationError;
use crate::operation::{Operation, Operations};

/// Explicit dispatch table a host exposes to the resolver.
///
/// Implementations usually `match` on the method name and hand back closures
/// that capture whatever state the host shares with its operations.
pub trait Bindings<I, N> {
    /// The callable bound to `method`, if the host provides one.
    fn method(&self, method: &str) -> Option<Operation<I, N>>;
}

/// Bindings that provide no methods; only callables resolve against them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBindings;

impl<I, N> Bindings<I, N> for NoBindings {
    fn method(&self, _method: &str) -> Option<Operation<I, N>> {
        None
    }
}

/// What a declared operation resolves to.
pub enum Target<I, N> {
    /// A method looked up in the bindings.
    Method(String),
    /// A callable used as-is.
    Callable(Operation<I, N>),
}

impl<I, N> Clone for Target<I, N> {
    fn clone(&self) -> Self {
        match self {
            Self::Method(method) => Self::Method(method.clone()),
            Self::Callable(operation) => Self::Callable(Rc::clone(operation)),
        }
    }
}

/// Operation declaration.
pub enum Declaration<I, N> {
    /// Operation names, each resolved from the method of the same name.
    List(Vec<String>),
    /// Operation name to target.
    Map(IndexMap<String, Target<I, N>>),
}

impl<I, N> Clone for Declaration<I, N> {
    fn clone(&self) -> Self {
        match self {
            Self::List(names) => Self::List(names.clone()),
            Self::Map(targets) => Self::Map(targets.clone()),
        }
    }
}

impl<I, N> Default for Declaration<I, N> {
    fn default() -> Self {
        Self::Map(IndexMap::new())
    }
}

impl<I, N> Declaration<I, N> {
    pub fn list<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self::List(names.into_iter().map(Into::into).collect())
    }

    /// Declare `operation` as the bound method `method`.
    ///
    /// A list declaration is turned into a map first, keeping its entries.
    #[must_use]
    pub fn method(self, operation: impl Into<String>, method: impl Into<String>) -> Self {
        self.with_target(operation.into(), Target::Method(method.into()))
    }

    /// Declare `operation` as a callable used as-is.
    #[must_use]
    pub fn callable<F>(self, operation: impl Into<String>, callable: F) -> Self
    where
        F: Fn(I) -> N + 'static,
    {
        self.with_target(operation.into(), Target::Callable(Rc::new(callable)))
    }

    fn with_target(self, operation: String, target: Target<I, N>) -> Self {
        let mut targets = self.into_targets();
        targets.insert(operation, target);
        Self::Map(targets)
    }

    fn into_targets(self) -> IndexMap<String, Target<I, N>> {
        match self {
            Self::List(names) => names
                .into_iter()
                .map(|name| {
                    let target = Target::Method(name.clone());
                    (name, target)
                })
                .collect(),
            Self::Map(targets) => targets,
        }
    }

    /// Read a declaration from a TOML document.
    ///
    /// The document holds an `operations` entry that is either an array of
    /// method names or a table of operation name to method name:
    ///
    /// ```toml
    /// operations = ["reserve", "charge"]
    /// ```
    ///
    /// ```toml
    /// [operations]
    /// reserve = "reserve_stock"
    /// charge = "charge_card"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the document does not parse, has no
    /// `operations` entry, or declares something other than method names.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigurationError> {
        let mut document: toml::Table =
            toml::from_str(input).map_err(|e| ConfigurationError::InvalidToml(e.to_string()))?;
        let operations = document
            .remove("operations")
            .ok_or(ConfigurationError::MissingDeclaration)?;

        match operations {
            toml::Value::Array(entries) => entries
                .into_iter()
                .enumerate()
                .map(|(index, entry)| match entry {
                    toml::Value::String(name) => Ok(name),
                    other => Err(ConfigurationError::InvalidTarget {
                        operation: format!("#{index}"),
                        found: other.type_str().to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            toml::Value::Table(entries) => entries
                .into_iter()
                .map(|(operation, target)| match target {
                    toml::Value::String(method) => Ok((operation, Target::Method(method))),
                    other => Err(ConfigurationError::InvalidTarget {
                        operation,
                        found: other.type_str().to_string(),
                    }),
                })
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(Self::Map),
            other => Err(ConfigurationError::InvalidShape {
                found: other.type_str().to_string(),
            }),
        }
    }
}

/// Resolve `declaration` against `bindings` into an operations table.
///
/// # Errors
///
/// Returns [`ConfigurationError::UnboundMethod`] for the first method
/// reference the bindings do not provide.
pub fn resolve<I, N, B>(
    declaration: &Declaration<I, N>,
    bindings: &B,
) -> Result<Operations<I, N>, ConfigurationError>
where
    B: Bindings<I, N> + ?Sized,
{
    let mut operations = Operations::new();

    match declaration {
        Declaration::List(names) => {
            for name in names {
                operations.insert(name.as_str(), bind(name, name, bindings)?);
            }
        }
        Declaration::Map(targets) => {
            for (name, target) in targets {
                let operation = match target {
                    Target::Method(method) => bind(name, method, bindings)?,
                    Target::Callable(callable) => Rc::clone(callable),
                };
                operations.insert(name.as_str(), operation);
            }
        }
    }

    debug!(count = operations.len(), "resolved operations");
    Ok(operations)
}

fn bind<I, N, B>(
    operation: &str,
    method: &str,
    bindings: &B,
) -> Result<Operation<I, N>, ConfigurationError>
where
    B: Bindings<I, N> + ?Sized,
{
    bindings
        .method(method)
        .ok_or_else(|| ConfigurationError::UnboundMethod {
            operation: operation.to_string(),
            method: method.to_string(),
        })
}
