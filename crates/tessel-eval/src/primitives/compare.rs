//! Ordering comparisons: `>`, `>=`, `<` and `<=`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use crate::error::{Arity, EvalError, EvalResult, Side};
use crate::primitive::{validate_operands, MatchPattern, Node, Primitive};
use crate::resolve::resolve;
use crate::value::{Argument, Context, Tensor};

const ARITY: Arity = Arity::Exactly(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp { Greater, GreaterEqual, Less, LessEqual }

impl CompareOp {
    pub fn name(self) -> &'static str {
        match self {
            CompareOp::Greater => "greater", CompareOp::GreaterEqual => "greater_equal",
            CompareOp::Less => "less", CompareOp::LessEqual => "less_equal",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self { CompareOp::Greater => ">", CompareOp::GreaterEqual => ">=", CompareOp::Less => "<", CompareOp::LessEqual => "<=" }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            ">" | "gt" | "greater" => Some(CompareOp::Greater),
            ">=" | "ge" | "greater_equal" => Some(CompareOp::GreaterEqual),
            "<" | "lt" | "less" => Some(CompareOp::Less),
            "<=" | "le" | "less_equal" => Some(CompareOp::LessEqual),
            _ => None,
        }
    }

    pub fn holds<T: PartialOrd + ?Sized>(self, lhs: &T, rhs: &T) -> bool {
        match self {
            CompareOp::Greater => lhs > rhs, CompareOp::GreaterEqual => lhs >= rhs,
            CompareOp::Less => lhs < rhs, CompareOp::LessEqual => lhs <= rhs,
        }
    }
}

/// Compares two operands of the same kind.
///
/// Booleans, integers and strings compare directly; tensor pairs go through
/// [`compare_tensors`]. Anything else is incompatible.
pub fn compare(op: CompareOp, lhs: &Argument, rhs: &Argument) -> EvalResult<bool> {
    match (lhs, rhs) {
        (Argument::Tensor(a), Argument::Tensor(b)) => compare_tensors(op, a, b),
        (Argument::Bool(a), Argument::Bool(b)) => Ok(op.holds(a, b)),
        (Argument::Int(a), Argument::Int(b)) => Ok(op.holds(a, b)),
        (Argument::Str(a), Argument::Str(b)) => Ok(op.holds(a.as_str(), b.as_str())),
        _ => Err(EvalError::incompatible(op.name(), format!(
            "{} {} {} can't be compared", lhs.kind_name(), op.symbol(), rhs.kind_name()
        ))),
    }
}

/// Rank-dispatched tensor comparison.
///
/// Scalars compare directly. Vectors of equal length and matrices of equal
/// extents compare element-wise and the result is true when the 0/1 result
/// has a non-zero norm, i.e. when at least one element pair satisfies the
/// relation. Every other rank pairing is a shape error.
pub fn compare_tensors(op: CompareOp, lhs: &Tensor, rhs: &Tensor) -> EvalResult<bool> {
    match lhs.num_dimensions() {
        0 => compare_0d(op, lhs, rhs),
        1 => compare_1d(op, lhs, rhs),
        2 => compare_2d(op, lhs, rhs),
        rank => Err(EvalError::unsupported_rank(op.name(), Side::Left, rank)),
    }
}

fn compare_0d(op: CompareOp, lhs: &Tensor, rhs: &Tensor) -> EvalResult<bool> {
    match rhs.num_dimensions() {
        0 => Ok(op.holds(&lhs.data()[0], &rhs.data()[0])),
        rank => Err(EvalError::unsupported_rank(op.name(), Side::Right, rank)),
    }
}

fn compare_1d(op: CompareOp, lhs: &Tensor, rhs: &Tensor) -> EvalResult<bool> {
    match rhs.num_dimensions() {
        1 => {
            if lhs.dimensions() != rhs.dimensions() { return Err(EvalError::mismatch(op.name(), lhs.dimensions(), rhs.dimensions())); }
            Ok(any_holds(op, lhs.data(), rhs.data()))
        }
        rank => Err(EvalError::unsupported_rank(op.name(), Side::Right, rank)),
    }
}

fn compare_2d(op: CompareOp, lhs: &Tensor, rhs: &Tensor) -> EvalResult<bool> {
    match rhs.num_dimensions() {
        2 => {
            if lhs.dimensions() != rhs.dimensions() { return Err(EvalError::mismatch(op.name(), lhs.dimensions(), rhs.dimensions())); }
            Ok(any_holds(op, lhs.data(), rhs.data()))
        }
        rank => Err(EvalError::unsupported_rank(op.name(), Side::Right, rank)),
    }
}

fn any_holds(op: CompareOp, lhs: &[f64], rhs: &[f64]) -> bool {
    lhs.iter().zip(rhs).any(|(a, b)| op.holds(a, b))
}

/// `_1 > _2` and friends.
#[derive(Debug)]
pub struct Comparison {
    op: CompareOp,
    operands: Vec<Argument>,
}

impl Comparison {
    pub fn new(op: CompareOp, operands: Vec<Argument>) -> EvalResult<Self> {
        validate_operands(op.name(), ARITY, &operands)?;
        Ok(Comparison { op, operands })
    }

    pub fn op(&self) -> CompareOp { self.op }

    fn create(op: CompareOp, operands: Vec<Argument>) -> EvalResult<Node> { Ok(Arc::new(Comparison::new(op, operands)?)) }
    pub fn create_greater(operands: Vec<Argument>) -> EvalResult<Node> { Comparison::create(CompareOp::Greater, operands) }
    pub fn create_greater_equal(operands: Vec<Argument>) -> EvalResult<Node> { Comparison::create(CompareOp::GreaterEqual, operands) }
    pub fn create_less(operands: Vec<Argument>) -> EvalResult<Node> { Comparison::create(CompareOp::Less, operands) }
    pub fn create_less_equal(operands: Vec<Argument>) -> EvalResult<Node> { Comparison::create(CompareOp::LessEqual, operands) }
}

pub const MATCH_DATA: [MatchPattern; 4] = [
    MatchPattern { name: "greater", pattern: "_1 > _2", arity: ARITY, create: Comparison::create_greater },
    MatchPattern { name: "greater_equal", pattern: "_1 >= _2", arity: ARITY, create: Comparison::create_greater_equal },
    MatchPattern { name: "less", pattern: "_1 < _2", arity: ARITY, create: Comparison::create_less },
    MatchPattern { name: "less_equal", pattern: "_1 <= _2", arity: ARITY, create: Comparison::create_less_equal },
];

#[async_trait]
impl Primitive for Comparison {
    fn name(&self) -> &'static str { self.op.name() }

    async fn evaluate(&self, ctx: &Context) -> EvalResult<Argument> {
        let name = self.op.name();
        validate_operands(name, ARITY, &self.operands)?;
        let ops = resolve(name, &self.operands, ctx).await?;
        let [lhs, rhs]: [Argument; 2] = ops.try_into().map_err(|ops: Vec<Argument>| EvalError::arity(name, ARITY, ops.len()))?;
        debug!(op = name, lhs = lhs.kind_name(), rhs = rhs.kind_name(), "comparing");
        compare(self.op, &lhs, &rhs).map(Argument::Bool)
    }
}
