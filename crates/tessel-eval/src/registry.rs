//! Name to constructor lookup for the pattern-matching compiler

use std::collections::HashMap;
use crate::error::{EvalError, EvalResult};
use crate::primitive::{MatchPattern, Node};
use crate::primitives;
use crate::value::Argument;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    patterns: HashMap<&'static str, MatchPattern>,
}

impl Registry {
    pub fn new() -> Self { Registry::default() }

    /// Registry holding every built-in primitive.
    pub fn builtin() -> Self {
        let mut registry = Registry::new();
        for pattern in primitives::match_data() { registry.register(pattern); }
        registry
    }

    /// Adds or replaces the descriptor registered under `pattern.name`.
    pub fn register(&mut self, pattern: MatchPattern) -> Option<MatchPattern> { self.patterns.insert(pattern.name, pattern) }

    pub fn get(&self, name: &str) -> Option<&MatchPattern> { self.patterns.get(name) }
    pub fn contains(&self, name: &str) -> bool { self.patterns.contains_key(name) }
    pub fn len(&self) -> usize { self.patterns.len() }
    pub fn is_empty(&self) -> bool { self.patterns.is_empty() }

    /// Descriptors sorted by name.
    pub fn patterns(&self) -> Vec<&MatchPattern> {
        let mut all: Vec<_> = self.patterns.values().collect();
        all.sort_by_key(|p| p.name);
        all
    }

    /// Builds a node, running the primitive's construction-time checks.
    pub fn create(&self, name: &str, operands: Vec<Argument>) -> EvalResult<Node> {
        let pattern = self.get(name).ok_or_else(|| EvalError::UnknownPrimitive(name.to_string()))?;
        (pattern.create)(operands)
    }
}
