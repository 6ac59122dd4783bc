//! Resource adapters: `file_read` (raw wire format) and `file_read_csv`
//! (comma-separated numeric rows).

use async_trait::async_trait;
use std::fs;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;
use crate::error::{Arity, EvalError, EvalResult};
use crate::ingest::{from_raw_bytes, parse_delimited};
use crate::primitive::{literal_string, MatchPattern, Node, Primitive};
use crate::value::{Argument, Context};

const READ: &str = "file_read";
const READ_CSV: &str = "file_read_csv";
const ARITY: Arity = Arity::Exactly(1);

pub const MATCH_DATA: [MatchPattern; 2] = [
    MatchPattern { name: READ, pattern: "file_read(_1)", arity: ARITY, create: FileRead::create },
    MatchPattern { name: READ_CSV, pattern: "file_read_csv(_1)", arity: ARITY, create: FileReadCsv::create },
];

/// Runs a file read on the blocking pool when a runtime is present, inline otherwise.
async fn off_runtime<T, F>(op: &'static str, read: F) -> EvalResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> EvalResult<T> + Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => handle.spawn_blocking(read).await.map_err(|e| EvalError::internal(op, format!("file read did not complete: {}", e)))?,
        Err(_) => read(),
    }
}

/// Loads a value previously written with [`crate::ingest::to_raw_bytes`].
#[derive(Debug, Clone)]
pub struct FileRead {
    filename: String,
}

impl FileRead {
    pub fn new(operands: Vec<Argument>) -> EvalResult<Self> { Ok(FileRead { filename: literal_string(READ, operands)? }) }
    pub fn create(operands: Vec<Argument>) -> EvalResult<Node> { Ok(Arc::new(FileRead::new(operands)?)) }
    pub fn filename(&self) -> &str { &self.filename }
}

#[async_trait]
impl Primitive for FileRead {
    fn name(&self) -> &'static str { READ }

    async fn evaluate(&self, _ctx: &Context) -> EvalResult<Argument> {
        let filename = self.filename.clone();
        let bytes = off_runtime(READ, move || {
            fs::read(&filename).map_err(|e| EvalError::io(READ, &filename, format!("couldn't read file: {}", e)))
        }).await?;
        debug!(file = %self.filename, bytes = bytes.len(), "read raw value");
        from_raw_bytes(READ, &self.filename, &bytes)
    }
}

/// Loads a numeric tensor from a comma-separated text file.
#[derive(Debug, Clone)]
pub struct FileReadCsv {
    filename: String,
}

impl FileReadCsv {
    pub fn new(operands: Vec<Argument>) -> EvalResult<Self> { Ok(FileReadCsv { filename: literal_string(READ_CSV, operands)? }) }
    pub fn create(operands: Vec<Argument>) -> EvalResult<Node> { Ok(Arc::new(FileReadCsv::new(operands)?)) }
    pub fn filename(&self) -> &str { &self.filename }
}

#[async_trait]
impl Primitive for FileReadCsv {
    fn name(&self) -> &'static str { READ_CSV }

    async fn evaluate(&self, _ctx: &Context) -> EvalResult<Argument> {
        let filename = self.filename.clone();
        let tensor = off_runtime(READ_CSV, move || {
            let text = fs::read_to_string(&filename).map_err(|e| EvalError::io(READ_CSV, &filename, format!("couldn't open file: {}", e)))?;
            parse_delimited(READ_CSV, &filename, &text)
        }).await?;
        debug!(file = %self.filename, shape = ?tensor.dimensions(), "read delimited text");
        Ok(Argument::Tensor(tensor))
    }
}
