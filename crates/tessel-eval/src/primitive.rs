//! The primitive evaluation contract

use std::fmt;
use std::sync::Arc;
use async_trait::async_trait;
use crate::error::{Arity, EvalError, EvalResult};
use crate::value::{Argument, Context};

/// Shared handle to an evaluation-tree node.
///
/// Nodes are immutable once built and a tree is assembled bottom-up, so a
/// node can only reference nodes that already existed when it was created.
/// Shared sub-expressions are plain `Arc` clones and cycles cannot form.
pub type Node = Arc<dyn Primitive>;

/// Constructor stored in a registration descriptor.
pub type CreateFn = fn(Vec<Argument>) -> EvalResult<Node>;

/// An evaluation-tree node implementing one operator.
///
/// `evaluate` may be called any number of times, concurrently, with
/// different contexts: implementations keep no per-call state.
#[async_trait]
pub trait Primitive: Send + Sync + fmt::Debug {
    /// Operator name used in registration and error messages.
    fn name(&self) -> &'static str;

    /// Resolves the operands against `ctx` and applies the operator.
    async fn evaluate(&self, ctx: &Context) -> EvalResult<Argument>;
}

/// Registration descriptor handed to the pattern-matching compiler.
#[derive(Clone, Copy)]
pub struct MatchPattern {
    pub name: &'static str,
    pub pattern: &'static str,
    pub arity: Arity,
    pub create: CreateFn,
}

impl fmt::Debug for MatchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchPattern").field("name", &self.name).field("pattern", &self.pattern).field("arity", &self.arity).finish()
    }
}

/// Checks operand count and literal validity.
///
/// Runs at construction, and again before each evaluation.
pub fn validate_operands(op: &'static str, arity: Arity, operands: &[Argument]) -> EvalResult<()> {
    if !arity.accepts(operands.len()) { return Err(EvalError::arity(op, arity, operands.len())); }
    if let Some(idx) = operands.iter().position(|a| !a.is_valid()) {
        return Err(EvalError::invalid_operand(op, format!(
            "the {} primitive requires that the arguments given by the operands array are valid (operand {} is not)", op, idx
        )));
    }
    Ok(())
}

/// Extracts the single literal string operand of a resource adapter.
pub fn literal_string(op: &'static str, mut operands: Vec<Argument>) -> EvalResult<String> {
    validate_operands(op, Arity::Exactly(1), &operands)?;
    match operands.pop() {
        Some(Argument::Str(s)) => Ok(s),
        Some(other) => Err(EvalError::invalid_operand(op, format!(
            "the first literal argument must be a string representing a valid file name, got {}", other.kind_name()
        ))),
        None => Err(EvalError::arity(op, Arity::Exactly(1), 0)),
    }
}
