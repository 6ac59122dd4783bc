//! Runtime values for Tessel

use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::error::{EvalError, EvalResult, Side};
use crate::primitive::Node;

const OP: &str = "tensor";

/// Dense rank-0/1/2 container of doubles, stored row-major.
///
/// `shape` is empty for a scalar, `[n]` for a vector and `[rows, cols]` for a
/// matrix; `data` always holds exactly `shape.iter().product()` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TensorRepr")]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f64>,
}

#[derive(Deserialize)]
struct TensorRepr {
    shape: Vec<usize>,
    data: Vec<f64>,
}

impl TryFrom<TensorRepr> for Tensor {
    type Error = EvalError;
    fn try_from(repr: TensorRepr) -> EvalResult<Self> { Tensor::from_parts(repr.shape, repr.data) }
}

/// Read-only row-major view of a rank-2 tensor.
#[derive(Debug, Clone, Copy)]
pub struct MatrixView<'a> {
    rows: usize,
    cols: usize,
    data: &'a [f64],
}

/// Mutable row-major view of a rank-2 tensor.
#[derive(Debug)]
pub struct MatrixViewMut<'a> {
    rows: usize,
    cols: usize,
    data: &'a mut [f64],
}

impl Tensor {
    pub fn scalar(value: f64) -> Self { Tensor { shape: vec![], data: vec![value] } }
    pub fn vector(data: Vec<f64>) -> Self { let len = data.len(); Tensor { shape: vec![len], data } }
    pub fn matrix(rows: usize, cols: usize, data: Vec<f64>) -> EvalResult<Self> { Tensor::from_parts(vec![rows, cols], data) }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> EvalResult<Self> {
        let n = rows.len();
        let m = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n * m);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != m { return Err(EvalError::extent(OP, format!("row {} has {} columns, expected {}", i, row.len(), m))); }
            data.extend(row);
        }
        Ok(Tensor { shape: vec![n, m], data })
    }

    pub fn zeros(shape: &[usize]) -> EvalResult<Self> {
        check_rank(shape)?;
        Ok(Tensor { shape: shape.to_vec(), data: vec![0.0; element_count(shape)?] })
    }

    /// Builds a tensor from raw parts, enforcing the rank and element-count invariant.
    pub fn from_parts(shape: Vec<usize>, data: Vec<f64>) -> EvalResult<Self> {
        check_rank(&shape)?;
        let expected = element_count(&shape)?;
        if data.len() != expected {
            return Err(EvalError::extent(OP, format!("shape {:?} needs {} elements, got {}", shape, expected, data.len())));
        }
        Ok(Tensor { shape, data })
    }

    pub fn num_dimensions(&self) -> usize { self.shape.len() }
    pub fn dimensions(&self) -> &[usize] { &self.shape }
    pub fn dimension(&self, axis: usize) -> Option<usize> { self.shape.get(axis).copied() }
    pub fn size(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }
    pub fn data(&self) -> &[f64] { &self.data }
    pub fn data_mut(&mut self) -> &mut [f64] { &mut self.data }
    pub fn into_data(self) -> Vec<f64> { self.data }

    pub fn get_flat(&self, idx: usize) -> Option<f64> { self.data.get(idx).copied() }
    pub fn get(&self, indices: &[usize]) -> Option<f64> { self.flatten_index(indices).map(|i| self.data[i]) }

    pub fn get_mut(&mut self, indices: &[usize]) -> Option<&mut f64> {
        let idx = self.flatten_index(indices)?;
        self.data.get_mut(idx)
    }

    fn flatten_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.shape.len() { return None; }
        let mut flat = 0; let mut stride = 1;
        for (idx, &dim) in indices.iter().zip(&self.shape).rev() {
            if *idx >= dim { return None; }
            flat += idx * stride; stride *= dim;
        }
        Some(flat)
    }

    /// Resizes in place to `new_extents` (same rank), keeping the overlapping
    /// elements at their multi-index and zero-filling every new slot.
    pub fn resize(&mut self, new_extents: &[usize]) -> EvalResult<()> {
        if new_extents.len() != self.shape.len() {
            return Err(EvalError::extent(OP, format!("cannot resize rank {} tensor to extents {:?}", self.shape.len(), new_extents)));
        }
        let len = element_count(new_extents)?;
        match (self.shape.as_slice(), new_extents) {
            ([], []) => {}
            ([_], [n]) => self.data.resize(*n, 0.0),
            ([rows, cols], [new_rows, new_cols]) => {
                let (rows, cols, new_rows, new_cols) = (*rows, *cols, *new_rows, *new_cols);
                if cols == new_cols {
                    self.data.resize(len, 0.0);
                } else {
                    let mut data = vec![0.0; len];
                    let keep_cols = cols.min(new_cols);
                    for r in 0..rows.min(new_rows) {
                        data[r * new_cols..r * new_cols + keep_cols].copy_from_slice(&self.data[r * cols..r * cols + keep_cols]);
                    }
                    self.data = data;
                }
            }
            _ => unreachable!("rank checked above"),
        }
        self.shape = new_extents.to_vec();
        Ok(())
    }

    pub fn as_scalar(&self) -> EvalResult<f64> {
        if self.num_dimensions() != 0 { return Err(EvalError::unsupported_rank(OP, Side::Only, self.num_dimensions())); }
        Ok(self.data[0])
    }

    pub fn as_vector(&self) -> EvalResult<&[f64]> {
        if self.num_dimensions() != 1 { return Err(EvalError::unsupported_rank(OP, Side::Only, self.num_dimensions())); }
        Ok(&self.data)
    }

    pub fn as_vector_mut(&mut self) -> EvalResult<&mut [f64]> {
        if self.num_dimensions() != 1 { return Err(EvalError::unsupported_rank(OP, Side::Only, self.num_dimensions())); }
        Ok(&mut self.data)
    }

    pub fn as_matrix(&self) -> EvalResult<MatrixView<'_>> {
        match self.shape.as_slice() {
            [rows, cols] => Ok(MatrixView { rows: *rows, cols: *cols, data: &self.data }),
            _ => Err(EvalError::unsupported_rank(OP, Side::Only, self.num_dimensions())),
        }
    }

    pub fn as_matrix_mut(&mut self) -> EvalResult<MatrixViewMut<'_>> {
        match self.shape.as_slice() {
            [rows, cols] => Ok(MatrixViewMut { rows: *rows, cols: *cols, data: &mut self.data }),
            _ => Err(EvalError::unsupported_rank(OP, Side::Only, self.num_dimensions())),
        }
    }
}

impl<'a> MatrixView<'a> {
    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols { return None; }
        Some(self.data[row * self.cols + col])
    }
    pub fn row(&self, row: usize) -> Option<&'a [f64]> {
        if row >= self.rows { return None; }
        Some(&self.data[row * self.cols..(row + 1) * self.cols])
    }
    pub fn column(&self, col: usize) -> Option<impl Iterator<Item = f64> + 'a> {
        if col >= self.cols { return None; }
        let (data, cols, rows) = (self.data, self.cols, self.rows);
        Some((0..rows).map(move |r| data[r * cols + col]))
    }
    /// Rows in order; empty when the matrix has no columns.
    pub fn iter_rows(&self) -> impl Iterator<Item = &'a [f64]> + 'a {
        self.data.chunks_exact(self.cols.max(1))
    }

    /// Copies the `rows x cols` block starting at `(row, col)`.
    pub fn submatrix(&self, row: usize, col: usize, rows: usize, cols: usize) -> EvalResult<Tensor> {
        if row + rows > self.rows || col + cols > self.cols {
            return Err(EvalError::extent(OP, format!(
                "submatrix ({}, {}) of extent {}x{} exceeds {}x{}", row, col, rows, cols, self.rows, self.cols
            )));
        }
        let mut data = Vec::with_capacity(rows * cols);
        for r in row..row + rows {
            data.extend_from_slice(&self.data[r * self.cols + col..r * self.cols + col + cols]);
        }
        Tensor::matrix(rows, cols, data)
    }
}

impl MatrixViewMut<'_> {
    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn row_mut(&mut self, row: usize) -> Option<&mut [f64]> {
        if row >= self.rows { return None; }
        Some(&mut self.data[row * self.cols..(row + 1) * self.cols])
    }
    pub fn iter_rows_mut(&mut self) -> impl Iterator<Item = &mut [f64]> {
        self.data.chunks_exact_mut(self.cols.max(1))
    }
    pub fn fill_column(&mut self, col: usize, value: f64) {
        if col >= self.cols { return; }
        for r in 0..self.rows { self.data[r * self.cols + col] = value; }
    }
}

fn check_rank(shape: &[usize]) -> EvalResult<()> {
    if shape.len() > 2 { return Err(EvalError::unsupported_rank(OP, Side::Only, shape.len())); }
    Ok(())
}

/// Element count of `shape`, failing when the extents overflow `usize`.
fn element_count(shape: &[usize]) -> EvalResult<usize> {
    shape.iter().try_fold(1usize, |n, &d| n.checked_mul(d))
        .ok_or_else(|| EvalError::extent(OP, format!("extents {:?} overflow the element count", shape)))
}

/// Literal, operand and result value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Argument {
    #[default]
    Invalid,
    Bool(bool),
    Int(i64),
    Str(String),
    Tensor(Tensor),
    List(Vec<Argument>),
    /// Nested primitive; evaluated by the resolver, never serialized.
    #[serde(skip)]
    Expr(Node),
}

impl Argument {
    pub fn string(s: impl Into<String>) -> Self { Argument::Str(s.into()) }
    pub fn scalar(value: f64) -> Self { Argument::Tensor(Tensor::scalar(value)) }
    pub fn vector(data: Vec<f64>) -> Self { Argument::Tensor(Tensor::vector(data)) }
    pub fn expr(node: Node) -> Self { Argument::Expr(node) }

    pub fn is_valid(&self) -> bool { !matches!(self, Argument::Invalid) }
    pub fn as_bool(&self) -> Option<bool> { match self { Argument::Bool(b) => Some(*b), _ => None } }
    pub fn as_int(&self) -> Option<i64> { match self { Argument::Int(n) => Some(*n), _ => None } }
    pub fn as_str(&self) -> Option<&str> { match self { Argument::Str(s) => Some(s), _ => None } }
    pub fn as_tensor(&self) -> Option<&Tensor> { match self { Argument::Tensor(t) => Some(t), _ => None } }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Argument::Invalid => "invalid", Argument::Bool(_) => "boolean", Argument::Int(_) => "integer",
            Argument::Str(_) => "string", Argument::Tensor(_) => "tensor", Argument::Expr(_) => "expression",
            Argument::List(_) => "list",
        }
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Argument::Invalid, Argument::Invalid) => true,
            (Argument::Bool(a), Argument::Bool(b)) => a == b,
            (Argument::Int(a), Argument::Int(b)) => a == b,
            (Argument::Str(a), Argument::Str(b)) => a == b,
            (Argument::Tensor(a), Argument::Tensor(b)) => a == b,
            (Argument::Expr(a), Argument::Expr(b)) => Arc::ptr_eq(a, b),
            (Argument::List(a), Argument::List(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Argument { fn from(b: bool) -> Self { Argument::Bool(b) } }
impl From<i64> for Argument { fn from(n: i64) -> Self { Argument::Int(n) } }
impl From<&str> for Argument { fn from(s: &str) -> Self { Argument::Str(s.to_string()) } }
impl From<String> for Argument { fn from(s: String) -> Self { Argument::Str(s) } }
impl From<Tensor> for Argument { fn from(t: Tensor) -> Self { Argument::Tensor(t) } }
impl From<Node> for Argument { fn from(node: Node) -> Self { Argument::Expr(node) } }

/// How the resolver schedules nested primitive evaluations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Schedule {
    /// One `tokio` task per nested primitive, when a runtime is available.
    #[default]
    Spawn,
    /// Poll every operand future on the calling task.
    Inline,
}

/// Call-time arguments, shared read-only by every evaluation in one tree.
#[derive(Debug, Clone, Default)]
pub struct Context {
    args: Arc<Vec<Argument>>,
    schedule: Schedule,
}

impl Context {
    pub fn new(args: Vec<Argument>) -> Self { Context { args: Arc::new(args), schedule: Schedule::default() } }
    pub fn empty() -> Self { Context::default() }
    pub fn with_schedule(mut self, schedule: Schedule) -> Self { self.schedule = schedule; self }
    pub fn schedule(&self) -> Schedule { self.schedule }
    pub fn args(&self) -> &[Argument] { &self.args }
    pub fn get(&self, idx: usize) -> Option<&Argument> { self.args.get(idx) }
    pub fn len(&self) -> usize { self.args.len() }
    pub fn is_empty(&self) -> bool { self.args.is_empty() }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape.as_slice() {
            [] => write!(f, "{}", self.data[0]),
            [_] => { write!(f, "[")?; for (i, v) in self.data.iter().enumerate() { if i > 0 { write!(f, ", ")?; } write!(f, "{}", v)?; } write!(f, "]") }
            [_, cols] => {
                write!(f, "[")?;
                for (r, row) in self.data.chunks_exact((*cols).max(1)).enumerate() {
                    if r > 0 { write!(f, ", ")?; }
                    write!(f, "[")?; for (i, v) in row.iter().enumerate() { if i > 0 { write!(f, ", ")?; } write!(f, "{}", v)?; } write!(f, "]")?;
                }
                write!(f, "]")
            }
            shape => write!(f, "<tensor {:?}>", shape),
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Invalid => write!(f, "<invalid>"),
            Argument::Bool(b) => write!(f, "{}", b),
            Argument::Int(n) => write!(f, "{}", n),
            Argument::Str(s) => write!(f, "\"{}\"", s),
            Argument::Tensor(t) => write!(f, "{}", t),
            Argument::Expr(node) => write!(f, "<{}>", node.name()),
            Argument::List(items) => { write!(f, "(")?; for (i, v) in items.iter().enumerate() { if i > 0 { write!(f, ", ")?; } write!(f, "{}", v)?; } write!(f, ")") }
        }
    }
}
