//! Positional access to call-time arguments.

use async_trait::async_trait;
use std::sync::Arc;
use crate::error::{Arity, EvalError, EvalResult};
use crate::primitive::{validate_operands, MatchPattern, Node, Primitive};
use crate::value::{Argument, Context};

const OP: &str = "access_argument";
const ARITY: Arity = Arity::Exactly(1);

pub const MATCH_DATA: MatchPattern = MatchPattern { name: OP, pattern: "arg(_1)", arity: ARITY, create: AccessArgument::create };

/// Yields the context argument at a fixed position.
#[derive(Debug, Clone, Copy)]
pub struct AccessArgument {
    index: usize,
}

impl AccessArgument {
    pub fn new(index: usize) -> Self { AccessArgument { index } }

    pub fn index(&self) -> usize { self.index }

    /// Builds from a single non-negative integer literal.
    pub fn create(operands: Vec<Argument>) -> EvalResult<Node> {
        validate_operands(OP, ARITY, &operands)?;
        match operands[0] {
            Argument::Int(n) if n >= 0 => Ok(Arc::new(AccessArgument::new(n as usize))),
            ref other => Err(EvalError::invalid_operand(OP, format!("argument position must be a non-negative integer literal, got {}", other))),
        }
    }
}

#[async_trait]
impl Primitive for AccessArgument {
    fn name(&self) -> &'static str { OP }

    async fn evaluate(&self, ctx: &Context) -> EvalResult<Argument> {
        ctx.get(self.index).cloned().ok_or(EvalError::UnboundArgument { op: OP, index: self.index, len: ctx.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_the_context() {
        let node = AccessArgument::create(vec![Argument::Int(1)]).unwrap();
        let ctx = Context::new(vec![Argument::Int(10), Argument::string("b")]);
        assert_eq!(node.evaluate(&ctx).await.unwrap(), Argument::string("b"));
    }

    #[tokio::test]
    async fn out_of_range_is_unbound() {
        let node = AccessArgument::new(2);
        let err = node.evaluate(&Context::new(vec![Argument::Int(0)])).await.unwrap_err();
        assert_eq!(err, EvalError::UnboundArgument { op: OP, index: 2, len: 1 });
    }

    #[test]
    fn position_must_be_a_non_negative_integer() {
        assert!(matches!(AccessArgument::create(vec![Argument::Int(-1)]), Err(EvalError::InvalidOperand { .. })));
        assert!(matches!(AccessArgument::create(vec![Argument::string("0")]), Err(EvalError::InvalidOperand { .. })));
        assert!(matches!(AccessArgument::create(vec![]), Err(EvalError::Arity { .. })));
    }
}
