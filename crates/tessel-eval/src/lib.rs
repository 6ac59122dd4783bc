//! # Tessel Eval - asynchronous evaluation of primitive trees
//!
//! A compiled expression is a tree of [`primitive::Primitive`] nodes. Each
//! node resolves its operands concurrently ([`resolve`]) and then runs a
//! rank-dispatched numeric kernel on them.

pub mod error;
pub mod value;
pub mod primitive;
pub mod resolve;
pub mod primitives;
pub mod ingest;
pub mod registry;

pub mod prelude {
    pub use crate::value::{Argument, Context, Schedule, Tensor};
    pub use crate::error::{Arity, EvalError, EvalResult, ShapeFault, Side};
    pub use crate::primitive::{MatchPattern, Node, Primitive};
    pub use crate::primitives::{AccessArgument, CompareOp, Comparison, Cross, FileRead, FileReadCsv};
    pub use crate::registry::Registry;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    fn arg(i: i64) -> Argument { Argument::Expr(AccessArgument::create(vec![Argument::Int(i)]).unwrap()) }
    fn v(data: &[f64]) -> Argument { Argument::vector(data.to_vec()) }

    #[tokio::test] async fn test_scalar_greater() { let n = Comparison::create_greater(vec![Argument::scalar(2.0), Argument::scalar(1.0)]).unwrap(); assert_eq!(n.evaluate(&Context::empty()).await.unwrap(), Argument::Bool(true)); }
    #[tokio::test] async fn test_scalar_less_equal_false() { let n = Comparison::create_less_equal(vec![Argument::scalar(2.0), Argument::scalar(1.0)]).unwrap(); assert_eq!(n.evaluate(&Context::empty()).await.unwrap(), Argument::Bool(false)); }
    #[tokio::test] async fn test_string_compare() { let n = Comparison::create_less(vec![Argument::string("a"), Argument::string("b")]).unwrap(); assert_eq!(n.evaluate(&Context::empty()).await.unwrap(), Argument::Bool(true)); }
    #[tokio::test] async fn test_cross_literal() { let n = Cross::create(vec![v(&[1.0, 0.0, 0.0]), v(&[0.0, 1.0, 0.0])]).unwrap(); assert_eq!(n.evaluate(&Context::empty()).await.unwrap(), v(&[0.0, 0.0, 1.0])); }
    #[tokio::test] async fn test_cross_planar() { let n = Cross::create(vec![v(&[1.0, 0.0]), v(&[0.0, 1.0])]).unwrap(); assert_eq!(n.evaluate(&Context::empty()).await.unwrap(), v(&[0.0, 0.0, 1.0])); }
    #[tokio::test] async fn test_cross_function_form() { let n = Cross::create(vec![]).unwrap(); let ctx = Context::new(vec![v(&[0.0, 1.0]), v(&[1.0, 0.0])]); assert_eq!(n.evaluate(&ctx).await.unwrap(), v(&[0.0, 0.0, -1.0])); }
    #[tokio::test] async fn test_cross_function_form_arity() { let n = Cross::create(vec![]).unwrap(); let ctx = Context::new(vec![v(&[0.0, 1.0])]); assert!(matches!(n.evaluate(&ctx).await, Err(EvalError::Arity { got: 1, .. }))); }
    #[tokio::test] async fn test_cross_of_strings() { let n = Cross::create(vec![Argument::string("a"), v(&[1.0, 0.0])]).unwrap(); assert!(matches!(n.evaluate(&Context::empty()).await, Err(EvalError::IncompatibleOperands { .. }))); }
    #[tokio::test] async fn test_cross_of_scalars() { let n = Cross::create(vec![Argument::Int(1), Argument::Bool(true)]).unwrap(); assert_eq!(n.evaluate(&Context::empty()).await.unwrap_err(), EvalError::unsupported_rank("cross", Side::Left, 0)); }
    #[tokio::test] async fn test_access_argument() { let n = Comparison::create_greater(vec![arg(0), arg(1)]).unwrap(); assert_eq!(n.evaluate(&Context::new(vec![Argument::Int(3), Argument::Int(2)])).await.unwrap(), Argument::Bool(true)); }
    #[tokio::test] async fn test_unbound_argument() { let n = Comparison::create_greater(vec![arg(0), arg(5)]).unwrap(); assert!(matches!(n.evaluate(&Context::new(vec![Argument::Int(3)])).await, Err(EvalError::UnboundArgument { index: 5, .. }))); }
    #[tokio::test] async fn test_nested_tree() { let inner = Cross::create(vec![v(&[1.0, 0.0]), v(&[0.0, 1.0])]).unwrap(); let n = Comparison::create_greater(vec![Argument::Expr(inner), v(&[0.0, 0.0, 0.5])]).unwrap(); assert_eq!(n.evaluate(&Context::empty()).await.unwrap(), Argument::Bool(true)); }
    #[tokio::test] async fn test_shared_subexpression() { let shared = Cross::create(vec![v(&[1.0, 0.0]), v(&[0.0, 1.0])]).unwrap(); let n = Comparison::create_greater_equal(vec![Argument::Expr(Arc::clone(&shared)), Argument::Expr(shared)]).unwrap(); assert_eq!(n.evaluate(&Context::empty()).await.unwrap(), Argument::Bool(true)); }
    #[tokio::test] async fn test_inline_schedule() { let n = Comparison::create_less(vec![arg(0), arg(1)]).unwrap(); let ctx = Context::new(vec![Argument::scalar(1.0), Argument::scalar(2.0)]).with_schedule(Schedule::Inline); assert_eq!(n.evaluate(&ctx).await.unwrap(), Argument::Bool(true)); }
    #[tokio::test] async fn test_incompatible_kinds() { let n = Comparison::create_less(vec![Argument::Int(1), Argument::string("1")]).unwrap(); assert!(matches!(n.evaluate(&Context::empty()).await, Err(EvalError::IncompatibleOperands { .. }))); }
    #[test] fn test_invalid_literal_rejected_early() { assert!(matches!(Cross::create(vec![Argument::Invalid, v(&[1.0, 0.0])]), Err(EvalError::InvalidOperand { .. }))); }
    #[test] fn test_registry_prelude() { assert!(Registry::builtin().contains("cross")); }
}
