//! Binary codec for fixed-dimension vectors.
//!
//! Vectors are persisted as a `u32` little-endian component count followed by
//! that many `f64` little-endian values. The count is written per record so a
//! snapshot reader can validate each vector against the collection's
//! dimension instead of trusting the header blindly.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, SagittaError};

/// Write a vector as a length-prefixed sequence of `f64` values.
pub fn write_vector<W: Write>(output: &mut W, vector: &[f64]) -> Result<()> {
    output.write_u32::<LittleEndian>(vector.len() as u32)?;
    for value in vector {
        output.write_f64::<LittleEndian>(*value)?;
    }
    Ok(())
}

/// Read a vector written with [`write_vector`].
///
/// When `expected_dimension` is given, a length mismatch fails with
/// [`SagittaError::CorruptSnapshot`] — a persisted record that disagrees with
/// its collection header is damage, not a caller error.
pub fn read_vector<R: Read>(input: &mut R, expected_dimension: Option<usize>) -> Result<Vec<f64>> {
    let len = input.read_u32::<LittleEndian>()? as usize;
    if let Some(expected) = expected_dimension {
        if len != expected {
            return Err(SagittaError::corrupt_snapshot(format!(
                "vector record has dimension {len}, collection dimension is {expected}"
            )));
        }
    }

    let mut vector = Vec::with_capacity(len);
    for _ in 0..len {
        vector.push(input.read_f64::<LittleEndian>()?);
    }
    Ok(vector)
}
