//! Built-in primitives

pub mod access;
pub mod compare;
pub mod cross;
pub mod file_read;

pub use access::AccessArgument;
pub use compare::{compare, compare_tensors, CompareOp, Comparison};
pub use cross::{cross, Cross};
pub use file_read::{FileRead, FileReadCsv};

use crate::primitive::MatchPattern;

/// Registration descriptors of every built-in primitive.
pub fn match_data() -> Vec<MatchPattern> {
    let mut patterns = vec![access::MATCH_DATA, cross::MATCH_DATA];
    patterns.extend(compare::MATCH_DATA);
    patterns.extend(file_read::MATCH_DATA);
    patterns
}
