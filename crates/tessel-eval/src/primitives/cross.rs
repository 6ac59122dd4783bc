//! Cross product of vectors and of matrices of row vectors.
//!
//! Planar operands (2 components, or matrices with 2 columns) are promoted
//! in place by appending a zero z component before the product is taken.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use crate::error::{Arity, EvalError, EvalResult, Side};
use crate::primitive::{validate_operands, MatchPattern, Node, Primitive};
use crate::resolve::{resolve, resolve_context};
use crate::value::{Argument, Context, Tensor};

const OP: &str = "cross";
const ARITY: Arity = Arity::NoneOr(2);

pub const MATCH_DATA: MatchPattern = MatchPattern { name: OP, pattern: "cross(_1, _2)", arity: ARITY, create: Cross::create };

/// `cross(_1, _2)`.
///
/// Built without operands it acts as a function of the call-time context,
/// taking its two operands from there.
#[derive(Debug)]
pub struct Cross {
    operands: Vec<Argument>,
}

impl Cross {
    pub fn new(operands: Vec<Argument>) -> EvalResult<Self> {
        validate_operands(OP, ARITY, &operands)?;
        Ok(Cross { operands })
    }

    pub fn create(operands: Vec<Argument>) -> EvalResult<Node> { Ok(Arc::new(Cross::new(operands)?)) }
}

#[async_trait]
impl Primitive for Cross {
    fn name(&self) -> &'static str { OP }

    async fn evaluate(&self, ctx: &Context) -> EvalResult<Argument> {
        validate_operands(OP, ARITY, &self.operands)?;
        let ops = if self.operands.is_empty() {
            resolve_context(OP, ctx).await?
        } else {
            resolve(OP, &self.operands, ctx).await?
        };
        let [lhs, rhs]: [Argument; 2] = ops.try_into().map_err(|ops: Vec<Argument>| EvalError::arity(OP, Arity::Exactly(2), ops.len()))?;
        let lhs = numeric_operand(Side::Left, lhs)?;
        let rhs = numeric_operand(Side::Right, rhs)?;
        debug!(lhs = ?lhs.dimensions(), rhs = ?rhs.dimensions(), "cross product");
        cross(lhs, rhs).map(Argument::Tensor)
    }
}

fn numeric_operand(side: Side, arg: Argument) -> EvalResult<Tensor> {
    match arg {
        Argument::Tensor(t) => Ok(t),
        Argument::Int(n) => Ok(Tensor::scalar(n as f64)),
        Argument::Bool(b) => Ok(Tensor::scalar(if b { 1.0 } else { 0.0 })),
        other => Err(EvalError::incompatible(OP, format!("{} operand must be numeric, got {}", side, other.kind_name()))),
    }
}

/// Cross product kernel, dispatched on the ranks of both operands.
///
/// Takes both operands by value; the result reuses the storage of the
/// operand whose (promoted) shape it has.
pub fn cross(lhs: Tensor, rhs: Tensor) -> EvalResult<Tensor> {
    match (lhs.num_dimensions(), rhs.num_dimensions()) {
        (1, 1) => cross_1d_1d(lhs, rhs),
        (1, 2) => cross_1d_2d(lhs, rhs),
        (2, 1) => cross_2d_1d(lhs, rhs),
        (2, 2) => cross_2d_2d(lhs, rhs),
        (1 | 2, rank) => Err(EvalError::unsupported_rank(OP, Side::Right, rank)),
        (rank, _) => Err(EvalError::unsupported_rank(OP, Side::Left, rank)),
    }
}

fn cross_1d_1d(mut lhs: Tensor, mut rhs: Tensor) -> EvalResult<Tensor> {
    promote_vector(Side::Left, &mut lhs)?;
    promote_vector(Side::Right, &mut rhs)?;
    let product = cross3(lhs.as_vector()?, rhs.as_vector()?);
    lhs.as_vector_mut()?.copy_from_slice(&product);
    Ok(lhs)
}

fn cross_1d_2d(mut lhs: Tensor, mut rhs: Tensor) -> EvalResult<Tensor> {
    promote_vector(Side::Left, &mut lhs)?;
    promote_columns(Side::Right, &mut rhs)?;
    let v = lhs.as_vector()?;
    for row in rhs.as_matrix_mut()?.iter_rows_mut() {
        let product = cross3(v, row);
        row.copy_from_slice(&product);
    }
    Ok(rhs)
}

fn cross_2d_1d(mut lhs: Tensor, mut rhs: Tensor) -> EvalResult<Tensor> {
    promote_vector(Side::Right, &mut rhs)?;
    promote_columns(Side::Left, &mut lhs)?;
    let v = rhs.as_vector()?;
    for row in lhs.as_matrix_mut()?.iter_rows_mut() {
        let product = cross3(row, v);
        row.copy_from_slice(&product);
    }
    Ok(lhs)
}

fn cross_2d_2d(mut lhs: Tensor, mut rhs: Tensor) -> EvalResult<Tensor> {
    if lhs.dimension(0) != rhs.dimension(0) {
        return Err(EvalError::mismatch(OP, lhs.dimensions(), rhs.dimensions()));
    }
    promote_columns(Side::Left, &mut lhs)?;
    promote_columns(Side::Right, &mut rhs)?;
    let other = rhs.as_matrix()?;
    for (row, rhs_row) in lhs.as_matrix_mut()?.iter_rows_mut().zip(other.iter_rows()) {
        let product = cross3(row, rhs_row);
        row.copy_from_slice(&product);
    }
    Ok(lhs)
}

/// Grows a 2-vector to a 3-vector in the z=0 plane.
fn promote_vector(side: Side, t: &mut Tensor) -> EvalResult<()> {
    match t.size() {
        2 => t.resize(&[3]),
        3 => Ok(()),
        n => Err(EvalError::extent(OP, format!("{} operand vector has {} elements, expected 2 or 3", side, n))),
    }
}

/// Appends a zero column to a matrix of 2-component row vectors.
fn promote_columns(side: Side, t: &mut Tensor) -> EvalResult<()> {
    match *t.dimensions() {
        [rows, 2] => t.resize(&[rows, 3]),
        [_, 3] => Ok(()),
        [_, cols] => Err(EvalError::extent(OP, format!("{} operand rows have {} elements, expected 2 or 3", side, cols))),
        _ => Err(EvalError::unsupported_rank(OP, side, t.num_dimensions())),
    }
}

fn cross3(a: &[f64], b: &[f64]) -> [f64; 3] {
    [a[1] * b[2] - a[2] * b[1], a[2] * b[0] - a[0] * b[2], a[0] * b[1] - a[1] * b[0]]
}
