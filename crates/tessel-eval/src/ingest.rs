//! Literal ingestion formats
//!
//! Two formats:
//! - delimited text: comma-separated numeric rows
//! - raw: a `bincode` encoded [`Argument`]

use crate::error::{EvalError, EvalResult, ShapeFault};
use crate::value::{Argument, Tensor};

/// Parses comma-separated numeric rows into a tensor.
///
/// One row with one field is a scalar, one row with several fields is a
/// vector, anything else is a matrix (an empty text yields a 0x0 matrix).
/// Fields are trimmed; rows are numbered from 0 in errors.
pub fn parse_delimited(op: &'static str, resource: &str, text: &str) -> EvalResult<Tensor> {
    let mut data = Vec::new();
    let mut rows = 0usize;
    let mut cols = 0usize;
    for (row, line) in text.lines().enumerate() {
        let before = data.len();
        for field in line.split(',') {
            let field = field.trim();
            let value = field.parse::<f64>().map_err(|_| EvalError::Parse {
                op,
                resource: resource.to_string(),
                row,
                detail: format!("wrong data format, '{}' is not a number", field),
            })?;
            data.push(value);
        }
        let got = data.len() - before;
        if row == 0 {
            cols = got;
        } else if got != cols {
            return Err(EvalError::shape(op, ShapeFault::RaggedRow { row, expected: cols, got }));
        }
        rows += 1;
    }

    match (rows, cols) {
        (1, 1) => Ok(Tensor::scalar(data[0])),
        (1, _) => Ok(Tensor::vector(data)),
        _ => Tensor::matrix(rows, cols, data),
    }
}

/// Encodes a value in the raw wire format.
pub fn to_raw_bytes(value: &Argument) -> EvalResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| EvalError::Serialization(e.to_string()))
}

/// Decodes a value from the raw wire format.
///
/// A blob holding the invalid tag is rejected like any other malformed one.
pub fn from_raw_bytes(op: &'static str, resource: &str, bytes: &[u8]) -> EvalResult<Argument> {
    let malformed = |detail: String| EvalError::Deserialization { op, resource: resource.to_string(), detail };
    match bincode::deserialize(bytes).map_err(|e| malformed(e.to_string()))? {
        Argument::Invalid => Err(malformed("value is the invalid tag".to_string())),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Cross;

    const OP: &str = "file_read_csv";

    #[test]
    fn matrix_from_rows() {
        let t = parse_delimited(OP, "mem", "1,2,3\n4,5,6").unwrap();
        assert_eq!(t.dimensions(), &[2, 3]);
        assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn scalar_and_vector() {
        assert_eq!(parse_delimited(OP, "mem", "4.5\n").unwrap(), Tensor::scalar(4.5));
        assert_eq!(parse_delimited(OP, "mem", "1, 2 ,-3e1").unwrap(), Tensor::vector(vec![1.0, 2.0, -30.0]));
        let column = parse_delimited(OP, "mem", "1\n2\n3").unwrap();
        assert_eq!(column.dimensions(), &[3, 1]);
    }

    #[test]
    fn empty_text_is_an_empty_matrix() {
        assert_eq!(parse_delimited(OP, "mem", "").unwrap().dimensions(), &[0, 0]);
    }

    #[test]
    fn ragged_rows_name_the_row() {
        match parse_delimited(OP, "mem", "1,2\n1,2,3") {
            Err(EvalError::Shape { fault: ShapeFault::RaggedRow { row, expected, got }, .. }) => {
                assert_eq!((row, expected, got), (1, 2, 3));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn bad_tokens_name_the_row() {
        match parse_delimited(OP, "data.csv", "1,2\n3,x\n5,6") {
            Err(EvalError::Parse { row, resource, .. }) => { assert_eq!(row, 1); assert_eq!(resource, "data.csv"); }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(parse_delimited(OP, "mem", "1,2\n\n3,4"), Err(EvalError::Parse { row: 1, .. })));
    }

    #[test]
    fn raw_format_round_trip() {
        let value = Argument::List(vec![Argument::Int(1), Argument::Tensor(Tensor::from_rows(vec![vec![1.0, 2.0]]).unwrap()), Argument::string("s")]);
        let bytes = to_raw_bytes(&value).unwrap();
        assert_eq!(from_raw_bytes("file_read", "mem", &bytes).unwrap(), value);
    }

    #[test]
    fn raw_format_rejects_garbage_and_truncation() {
        assert!(matches!(from_raw_bytes("file_read", "mem", &[0xff, 0xff, 0xff]), Err(EvalError::Deserialization { .. })));
        let bytes = to_raw_bytes(&Argument::Tensor(Tensor::vector(vec![1.0, 2.0]))).unwrap();
        assert!(matches!(from_raw_bytes("file_read", "mem", &bytes[..bytes.len() - 8]), Err(EvalError::Deserialization { .. })));
    }

    // Argument::Tensor is variant 4; a tensor is its shape then its data.
    fn raw_tensor(shape: &[u64], data: &[f64]) -> Vec<u8> {
        bincode::serialize(&(4u32, (shape.to_vec(), data.to_vec()))).unwrap()
    }

    #[test]
    fn raw_tensors_are_validated() {
        let ok = from_raw_bytes("file_read", "mem", &raw_tensor(&[2], &[1.0, 2.0])).unwrap();
        assert_eq!(ok, Argument::Tensor(Tensor::vector(vec![1.0, 2.0])));

        for bytes in [raw_tensor(&[2, 2], &[1.0, 2.0, 3.0]), raw_tensor(&[1, 1, 1], &[1.0])] {
            assert!(matches!(from_raw_bytes("file_read", "mem", &bytes), Err(EvalError::Deserialization { .. })));
        }
    }

    #[test]
    fn raw_tensors_with_overflowing_extents_are_rejected() {
        let bytes = raw_tensor(&[1 << 63, 2], &[]);
        match from_raw_bytes("file_read", "huge.bin", &bytes) {
            Err(EvalError::Deserialization { resource, detail, .. }) => {
                assert_eq!(resource, "huge.bin");
                assert!(detail.contains("overflow"), "{}", detail);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn raw_invalid_tag_is_rejected() {
        let bytes = to_raw_bytes(&Argument::Invalid).unwrap();
        assert!(matches!(from_raw_bytes("file_read", "mem", &bytes), Err(EvalError::Deserialization { op: "file_read", .. })));
    }

    #[test]
    fn expressions_are_not_serializable() {
        let node = Cross::create(vec![]).unwrap();
        assert!(matches!(to_raw_bytes(&Argument::Expr(node)), Err(EvalError::Serialization(_))));
    }
}
