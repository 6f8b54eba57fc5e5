//! Function-valued leaves.
//!
//! A function leaf is persisted as its source text in `<key>.js`. Source text
//! cannot be evaluated here, so the behaviour behind it lives in a
//! [`FunctionRegistry`] keyed by that same text: writing a bound function
//! registers it, and reading a `.js` leaf binds whatever the registry holds
//! for the stored source.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value as JsonValue;

use crate::Error;

/// The invokable part of a [`Function`].
pub type Callable = Arc<dyn Fn(&[JsonValue]) -> JsonValue + Send + Sync>;

/// A function-valued leaf: source text plus, when known, its implementation.
#[derive(Clone)]
pub struct Function {
    source: String,
    callable: Option<Callable>,
}

impl Function {
    /// A function with the given source text and implementation.
    ///
    /// ```rust
    /// use objfs_core_store::Function;
    /// use serde_json::json;
    ///
    /// let greet = Function::new("() => 'hi'", |_| json!("hi"));
    /// assert_eq!(greet.call(&[]).unwrap(), json!("hi"));
    /// ```
    pub fn new<F>(source: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[JsonValue]) -> JsonValue + Send + Sync + 'static,
    {
        Function {
            source: source.into(),
            callable: Some(Arc::new(f)),
        }
    }

    /// A function known only by its source text.
    pub fn unbound(source: impl Into<String>) -> Self {
        Function {
            source: source.into(),
            callable: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_bound(&self) -> bool {
        self.callable.is_some()
    }

    /// Invoke the function.
    ///
    /// Fails with [`Error::UnboundFunction`] when no implementation has been
    /// registered for this source text.
    pub fn call(&self, args: &[JsonValue]) -> Result<JsonValue, Error> {
        match &self.callable {
            Some(callable) => Ok(callable(args)),
            None => Err(Error::UnboundFunction {
                function: self.source.clone(),
            }),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("source", &self.source)
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Functions compare by source text.
impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Implementations for function leaves, keyed by source text.
#[derive(Default)]
pub struct FunctionRegistry {
    entries: RwLock<HashMap<String, Callable>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the implementation of `function`.
    ///
    /// Unbound functions are ignored. A later registration for the same
    /// source text replaces the earlier one.
    pub fn register(&self, function: &Function) {
        if let Some(callable) = &function.callable {
            self.entries
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(function.source.clone(), callable.clone());
        }
    }

    /// Build a [`Function`] for stored source text, bound if registered.
    pub fn bind(&self, source: String) -> Function {
        let callable = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&source)
            .cloned();
        Function { source, callable }
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bound_function_calls() {
        let add = Function::new("(a, b) => a + b", |args| {
            json!(args.iter().filter_map(JsonValue::as_i64).sum::<i64>())
        });
        assert!(add.is_bound());
        assert_eq!(add.call(&[json!(2), json!(3)]).unwrap(), json!(5));
    }

    #[test]
    fn unbound_function_fails_to_call() {
        let f = Function::unbound("() => 'hi'");
        assert!(!f.is_bound());
        let err = f.call(&[]).unwrap_err();
        assert!(matches!(err, Error::UnboundFunction { ref function } if function == "() => 'hi'"));
    }

    #[test]
    fn equality_is_by_source() {
        let a = Function::new("() => 1", |_| json!(1));
        let b = Function::unbound("() => 1");
        assert_eq!(a, b);
        assert_ne!(a, Function::unbound("() => 2"));
    }

    #[test]
    fn registry_binds_registered_source() {
        let registry = FunctionRegistry::new();
        assert!(registry.is_empty());

        registry.register(&Function::new("() => 'hi'", |_| json!("hi")));
        registry.register(&Function::unbound("() => 'ignored'"));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("() => 'hi'"));

        let bound = registry.bind("() => 'hi'".to_string());
        assert_eq!(bound.call(&[]).unwrap(), json!("hi"));

        let unbound = registry.bind("() => 'other'".to_string());
        assert!(!unbound.is_bound());
    }

    #[test]
    fn later_registration_wins() {
        let registry = FunctionRegistry::new();
        registry.register(&Function::new("f", |_| json!(1)));
        registry.register(&Function::new("f", |_| json!(2)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.bind("f".to_string()).call(&[]).unwrap(), json!(2));
    }

    #[test]
    fn debug_shows_source_only() {
        let f = Function::new("() => 'hi'", |_| json!("hi"));
        let debug = format!("{:?}", f);
        assert!(debug.contains("() => 'hi'"));
        assert!(debug.contains("bound: true"));
    }
}
