//! Operand resolution: evaluate every operand of a primitive concurrently and
//! join the results in declaration order.

use std::sync::Arc;
use futures::future::{self, BoxFuture, FutureExt};
use tokio::runtime::Handle;
use tracing::{debug, trace};
use crate::error::{EvalError, EvalResult};
use crate::value::{Argument, Context, Schedule};

/// Resolves `operands` against `ctx`.
///
/// Literal operands are cloned, nested primitives are evaluated. All
/// evaluations are in flight at once; the result keeps operand order no
/// matter which finishes first. The first error observed fails the whole
/// call. Under [`Schedule::Spawn`] tasks already spawned keep running after
/// such a failure; their results are discarded.
pub async fn resolve(op: &'static str, operands: &[Argument], ctx: &Context) -> EvalResult<Vec<Argument>> {
    if let Some(idx) = operands.iter().position(|a| !a.is_valid()) {
        return Err(EvalError::invalid_operand(op, format!("operand {} is invalid", idx)));
    }
    let spawn = ctx.schedule() == Schedule::Spawn && Handle::try_current().is_ok();
    debug!(op, operands = operands.len(), spawn, "resolving operands");

    let pending: Vec<BoxFuture<'static, EvalResult<Argument>>> = operands
        .iter()
        .enumerate()
        .map(|(idx, operand)| operand_future(op, idx, operand, ctx, spawn))
        .collect();

    let values = future::try_join_all(pending).await?;
    if let Some(idx) = values.iter().position(|a| !a.is_valid()) {
        return Err(EvalError::invalid_operand(op, format!("operand {} evaluated to an invalid value", idx)));
    }
    Ok(values)
}

/// Resolves the call-time arguments themselves, for primitives built without
/// operands. Nested primitives found there see an empty context.
pub async fn resolve_context(op: &'static str, ctx: &Context) -> EvalResult<Vec<Argument>> {
    let inner = Context::empty().with_schedule(ctx.schedule());
    resolve(op, ctx.args(), &inner).await
}

fn operand_future(op: &'static str, idx: usize, operand: &Argument, ctx: &Context, spawn: bool) -> BoxFuture<'static, EvalResult<Argument>> {
    let node = match operand {
        Argument::Expr(node) => Arc::clone(node),
        literal => return future::ready(Ok(literal.clone())).boxed(),
    };
    let ctx = ctx.clone();
    if spawn {
        let handle = tokio::spawn(async move { node.evaluate(&ctx).await });
        async move {
            let result = handle.await.map_err(|e| EvalError::internal(op, format!("evaluation of operand {} did not complete: {}", idx, e)))?;
            trace!(op, operand = idx, ok = result.is_ok(), "operand resolved");
            result
        }
        .boxed()
    } else {
        async move {
            let result = node.evaluate(&ctx).await;
            trace!(op, operand = idx, ok = result.is_ok(), "operand resolved");
            result
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{Node, Primitive};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug)]
    struct Delayed { ms: u64, value: i64, calls: Arc<AtomicUsize> }

    #[async_trait]
    impl Primitive for Delayed {
        fn name(&self) -> &'static str { "delayed" }
        async fn evaluate(&self, _ctx: &Context) -> EvalResult<Argument> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(self.ms)).await;
            Ok(Argument::Int(self.value))
        }
    }

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl Primitive for Failing {
        fn name(&self) -> &'static str { "failing" }
        async fn evaluate(&self, _ctx: &Context) -> EvalResult<Argument> {
            Err(EvalError::extent("failing", "boom"))
        }
    }

    #[derive(Debug)]
    struct Yields(Argument);

    #[async_trait]
    impl Primitive for Yields {
        fn name(&self) -> &'static str { "yields" }
        async fn evaluate(&self, _ctx: &Context) -> EvalResult<Argument> { Ok(self.0.clone()) }
    }

    fn delayed(ms: u64, value: i64, calls: &Arc<AtomicUsize>) -> Argument {
        let node: Node = Arc::new(Delayed { ms, value, calls: Arc::clone(calls) });
        Argument::Expr(node)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn keeps_declaration_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let operands = vec![delayed(60, 0, &calls), delayed(5, 1, &calls), Argument::Int(2), delayed(30, 3, &calls), delayed(0, 4, &calls)];
        for schedule in [Schedule::Spawn, Schedule::Inline] {
            let ctx = Context::empty().with_schedule(schedule);
            let values = resolve("test", &operands, &ctx).await.unwrap();
            assert_eq!(values, (0..5).map(Argument::Int).collect::<Vec<_>>());
        }
        // each nested primitive ran once per resolve call
        assert_eq!(calls.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn one_failure_fails_the_join() {
        let calls = Arc::new(AtomicUsize::new(0));
        let failing: Node = Arc::new(Failing);
        let operands = vec![delayed(10, 0, &calls), Argument::Expr(failing), delayed(20, 2, &calls)];
        let err = resolve("test", &operands, &Context::empty()).await.unwrap_err();
        assert!(err.is_shape());
    }

    #[tokio::test]
    async fn invalid_literal_is_rejected_before_scheduling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let operands = vec![delayed(0, 0, &calls), Argument::Invalid];
        let err = resolve("test", &operands, &Context::empty()).await.unwrap_err();
        assert!(matches!(err, EvalError::InvalidOperand { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_result_is_rejected() {
        let node: Node = Arc::new(Yields(Argument::Invalid));
        let err = resolve("test", &[Argument::Expr(node)], &Context::empty()).await.unwrap_err();
        assert!(matches!(err, EvalError::InvalidOperand { .. }));
    }

    #[test]
    fn inline_without_a_runtime() {
        let node: Node = Arc::new(Yields(Argument::Bool(true)));
        let values = futures::executor::block_on(resolve("test", &[Argument::Expr(node), Argument::Int(1)], &Context::empty())).unwrap();
        assert_eq!(values, vec![Argument::Bool(true), Argument::Int(1)]);
    }

    #[tokio::test]
    async fn context_arguments_can_be_resolved() {
        let node: Node = Arc::new(Yields(Argument::Int(7)));
        let ctx = Context::new(vec![Argument::Expr(node), Argument::string("x")]);
        let values = resolve_context("test", &ctx).await.unwrap();
        assert_eq!(values, vec![Argument::Int(7), Argument::string("x")]);
    }
}
