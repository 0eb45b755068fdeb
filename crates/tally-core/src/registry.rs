//! Operation registry: textual name → constructor.
//!
//! The registry is an explicit object with clear construction and lifetime
//! (no ambient global table). Built-ins are populated once by
//! [`OpRegistry::with_builtins`]; callers can register further operations at
//! runtime and they become resolvable, and visible to the help listing,
//! without any other code change.
//!
//! Resolution is case-insensitive and always returns a freshly constructed
//! boxed operation. Operations hold no per-use state, so freshness is not
//! observable today; it just keeps the door closed on future statefulness.

use std::sync::Arc;

use crate::error::{CalcError, Result};
use crate::operation::{
    AbsoluteDifference, Addition, BinaryOp, Division, IntegerDivision, Modulus, Multiplication,
    Percentage, Power, Root, Subtraction,
};

/// Constructor stored per registered name.
pub type OpConstructor = Arc<dyn Fn() -> Box<dyn BinaryOp> + Send + Sync>;

/// Name→constructor table, iteration in registration order.
#[derive(Clone, Default)]
pub struct OpRegistry {
    entries: Vec<(String, OpConstructor)>,
}

impl std::fmt::Debug for OpRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl OpRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the ten built-in operations.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, OpConstructor); 10] = [
            ("add", Arc::new(|| Box::new(Addition) as Box<dyn BinaryOp>)),
            ("subtract", Arc::new(|| Box::new(Subtraction) as Box<dyn BinaryOp>)),
            ("multiply", Arc::new(|| Box::new(Multiplication) as Box<dyn BinaryOp>)),
            ("divide", Arc::new(|| Box::new(Division) as Box<dyn BinaryOp>)),
            ("power", Arc::new(|| Box::new(Power) as Box<dyn BinaryOp>)),
            ("root", Arc::new(|| Box::new(Root) as Box<dyn BinaryOp>)),
            ("modulus", Arc::new(|| Box::new(Modulus) as Box<dyn BinaryOp>)),
            ("int_divide", Arc::new(|| Box::new(IntegerDivision) as Box<dyn BinaryOp>)),
            ("percent", Arc::new(|| Box::new(Percentage) as Box<dyn BinaryOp>)),
            ("abs_diff", Arc::new(|| Box::new(AbsoluteDifference) as Box<dyn BinaryOp>)),
        ];
        for (name, ctor) in builtins {
            registry
                .register(name, ctor)
                .expect("builtin operations always conform");
        }
        registry
    }

    /// Register (or redefine) an operation under `name`.
    ///
    /// The constructor is probed once: a produced operation with an empty
    /// display tag does not satisfy the operation contract and is rejected
    /// with [`CalcError::InvalidOperationType`]. Re-registering an existing
    /// name overwrites its constructor in place, keeping listing order.
    pub fn register(&mut self, name: &str, ctor: OpConstructor) -> Result<()> {
        let probe = ctor();
        if probe.name().trim().is_empty() {
            return Err(CalcError::InvalidOperationType {
                name: name.to_string(),
                message: "constructed operation reports an empty display name".to_string(),
            });
        }
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return Err(CalcError::InvalidOperationType {
                name: name.to_string(),
                message: "operation name must not be empty".to_string(),
            });
        }
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = ctor;
        } else {
            self.entries.push((key, ctor));
        }
        Ok(())
    }

    /// Resolve a command name to a fresh operation instance.
    pub fn resolve(&self, name: &str) -> Result<Box<dyn BinaryOp>> {
        let key = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, ctor)| ctor())
            .ok_or(CalcError::UnknownOperation {
                name: name.trim().to_string(),
            })
    }

    /// Resolve by display tag (the name stored in persisted records),
    /// case-insensitively. Scans all constructors, so runtime-registered
    /// operations are found too.
    pub fn resolve_display(&self, tag: &str) -> Result<Box<dyn BinaryOp>> {
        let wanted = tag.trim().to_lowercase();
        self.entries
            .iter()
            .map(|(_, ctor)| ctor())
            .find(|op| op.name().to_lowercase() == wanted)
            .ok_or(CalcError::UnknownOperation {
                name: tag.trim().to_string(),
            })
    }

    /// Command names in registration order, for the help listing.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Whether a command name is registered (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let key = name.trim().to_lowercase();
        self.entries.iter().any(|(k, _)| *k == key)
    }
}
