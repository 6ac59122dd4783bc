//! Error handling for Tessel evaluation

use std::fmt;
use thiserror::Error;

/// Failures raised while building or evaluating a node name its operator.
/// `UnknownPrimitive` names the missing registry entry instead, and
/// `Serialization` comes from writers that run outside any primitive.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{op}: the {op} primitive requires {expected} operand(s), got {got}")]
    Arity { op: &'static str, expected: Arity, got: usize },
    #[error("{op}: invalid operand: {detail}")]
    InvalidOperand { op: &'static str, detail: String },
    #[error("{op}: shape error: {fault}")]
    Shape { op: &'static str, fault: ShapeFault },
    #[error("{op}: left hand side and right hand side are incompatible: {detail}")]
    IncompatibleOperands { op: &'static str, detail: String },
    #[error("{op}: positional argument {index} is unbound (context holds {len})")]
    UnboundArgument { op: &'static str, index: usize, len: usize },
    #[error("{op}: IO error on '{resource}': {detail}")]
    Io { op: &'static str, resource: String, detail: String },
    #[error("{op}: parse error in '{resource}' at row {row}: {detail}")]
    Parse { op: &'static str, resource: String, row: usize, detail: String },
    #[error("{op}: malformed data in '{resource}': {detail}")]
    Deserialization { op: &'static str, resource: String, detail: String },
    #[error("no primitive registered under '{0}'")]
    UnknownPrimitive(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("{op}: internal error: {detail}")]
    Internal { op: &'static str, detail: String },
}

/// Rank and extent violations detected by views and kernels.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShapeFault {
    #[error("{side} operand has unsupported number of dimensions ({rank})")]
    UnsupportedRank { side: Side, rank: usize },
    #[error("the dimensions of the operands do not match ({left:?} vs {right:?})")]
    Mismatch { left: Vec<usize>, right: Vec<usize> },
    #[error("{0}")]
    Extent(String),
    #[error("row {row} has {got} element(s), expected {expected}")]
    RaggedRow { row: usize, expected: usize, got: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side { Left, Right, Only }

/// Operand count a primitive accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    /// Either no operands (taken from the call-time context) or exactly `n`.
    NoneOr(usize),
}

pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    pub fn arity(op: &'static str, expected: Arity, got: usize) -> Self { EvalError::Arity { op, expected, got } }
    pub fn invalid_operand(op: &'static str, detail: impl Into<String>) -> Self { EvalError::InvalidOperand { op, detail: detail.into() } }
    pub fn shape(op: &'static str, fault: ShapeFault) -> Self { EvalError::Shape { op, fault } }
    pub fn extent(op: &'static str, msg: impl Into<String>) -> Self { EvalError::Shape { op, fault: ShapeFault::Extent(msg.into()) } }
    pub fn unsupported_rank(op: &'static str, side: Side, rank: usize) -> Self { EvalError::Shape { op, fault: ShapeFault::UnsupportedRank { side, rank } } }
    pub fn mismatch(op: &'static str, left: &[usize], right: &[usize]) -> Self {
        EvalError::Shape { op, fault: ShapeFault::Mismatch { left: left.to_vec(), right: right.to_vec() } }
    }
    pub fn incompatible(op: &'static str, detail: impl Into<String>) -> Self { EvalError::IncompatibleOperands { op, detail: detail.into() } }
    pub fn io(op: &'static str, resource: impl Into<String>, err: impl fmt::Display) -> Self {
        EvalError::Io { op, resource: resource.into(), detail: err.to_string() }
    }
    pub fn internal(op: &'static str, detail: impl Into<String>) -> Self { EvalError::Internal { op, detail: detail.into() } }

    /// True for any shape violation, regardless of sub-case.
    pub fn is_shape(&self) -> bool { matches!(self, EvalError::Shape { .. }) }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left hand side"),
            Side::Right => write!(f, "right hand side"),
            Side::Only => write!(f, "the"),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {}", n),
            Arity::NoneOr(n) => write!(f, "either zero or {}", n),
        }
    }
}

impl Arity {
    pub fn accepts(self, got: usize) -> bool {
        match self {
            Arity::Exactly(n) => got == n,
            Arity::NoneOr(n) => got == 0 || got == n,
        }
    }
}
