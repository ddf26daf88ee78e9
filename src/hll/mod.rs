// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! HyperLogLog sketch implementation for cardinality estimation.
//!
//! A sketch holds `m = 2^p` registers, where `p` (the precision) is
//! derived from the requested standard error via `se ≈ 1.04 / sqrt(m)`.
//! Each incoming 64-bit hash is split into two fields:
//!
//! - the low `p` bits select a register index;
//! - the number of leading zeros among the remaining `64 - p` bits,
//!   plus one, is the candidate register value.
//!
//! A register only ever grows: it keeps the maximum candidate observed,
//! which makes updates idempotent under duplicate inputs and lets two
//! sketches merge by register-wise maximum.
//!
//! # Representations
//!
//! While few registers have been touched the sketch stores compact
//! `(index, value)` pairs; once the pair count crosses a fixed fraction
//! of `m` it converts, once and in place, to a packed 6-bit register
//! array. The conversion is lossless: estimates before and after are
//! identical to a sketch that was dense from the first update.

mod dense;
mod estimator;
mod serialization;
mod sketch;
mod sparse;

pub use sketch::HllSketch;

pub(crate) use serialization::deserialize;
pub(crate) use serialization::serialize;
pub(crate) use serialization::serialize_empty;

use crate::error::Error;
use crate::error::ErrorKind;

/// Smallest supported precision (16 registers, se ≈ 0.26).
pub const MIN_PRECISION: u8 = 4;

/// Largest supported precision (65536 registers, se ≈ 0.0040625).
pub const MAX_PRECISION: u8 = 16;

/// Bits per register; values reach at most `64 - p + 1 = 61`.
pub(crate) const REGISTER_BITS: u32 = 6;

/// Loosest accepted standard error, reached at [`MIN_PRECISION`].
pub const MAX_STANDARD_ERROR: f64 = 0.26;

/// Tightest accepted standard error, reached at [`MAX_PRECISION`].
pub const MIN_STANDARD_ERROR: f64 = 0.0040625;

/// Number of registers for a precision.
#[inline]
pub(crate) fn num_registers(precision: u8) -> usize {
    1usize << precision
}

/// Expected relative error of estimates at the given precision.
pub fn standard_error_for_precision(precision: u8) -> f64 {
    1.04 / (num_registers(precision) as f64).sqrt()
}

/// Smallest precision whose standard error meets the requested bound.
///
/// # Errors
///
/// Returns [`ErrorKind::InvalidConfiguration`] if the bound lies
/// outside `[MIN_STANDARD_ERROR, MAX_STANDARD_ERROR]` (a NaN bound is
/// rejected the same way).
pub fn precision_for_error(max_standard_error: f64) -> Result<u8, Error> {
    if !(MIN_STANDARD_ERROR..=MAX_STANDARD_ERROR).contains(&max_standard_error) {
        return Err(Error::new(
            ErrorKind::InvalidConfiguration,
            format!("max standard error must be in [{MIN_STANDARD_ERROR}, {MAX_STANDARD_ERROR}]"),
        )
        .with_context("max_standard_error", max_standard_error));
    }

    for precision in MIN_PRECISION..=MAX_PRECISION {
        if standard_error_for_precision(precision) <= max_standard_error {
            return Ok(precision);
        }
    }
    // The range check above guarantees MAX_PRECISION satisfies the bound.
    Ok(MAX_PRECISION)
}

/// Extract the register index (low `p` bits) from a hash.
#[inline]
pub(crate) fn register_index(hash: u64, precision: u8) -> u32 {
    (hash & (num_registers(precision) as u64 - 1)) as u32
}

/// Extract the candidate register value from a hash.
///
/// Counts the leading zeros among the `64 - p` bits above the index
/// field, plus one. An all-zero remainder yields `64 - p + 1`.
#[inline]
pub(crate) fn register_value(hash: u64, precision: u8) -> u8 {
    let remainder = hash >> precision;
    if remainder == 0 {
        64 - precision + 1
    } else {
        (remainder.leading_zeros() as u8) - precision + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_for_error() {
        assert_eq!(precision_for_error(0.26).unwrap(), 4);
        assert_eq!(precision_for_error(0.023).unwrap(), 11);
        assert_eq!(precision_for_error(0.01).unwrap(), 14);
        assert_eq!(precision_for_error(0.0040625).unwrap(), 16);
    }

    #[test]
    fn test_precision_for_error_rejects_out_of_range() {
        for bad in [0.0, -0.1, 0.003, 0.27, f64::NAN] {
            let err = precision_for_error(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidConfiguration);
        }
    }

    #[test]
    fn test_standard_error_matches_precision() {
        // se(p) must satisfy its own bound exactly.
        for precision in MIN_PRECISION..=MAX_PRECISION {
            let se = standard_error_for_precision(precision);
            assert_eq!(precision_for_error(se).unwrap(), precision);
        }
    }

    #[test]
    fn test_register_index_masks_low_bits() {
        assert_eq!(register_index(0xFFFF_FFFF_FFFF_FFFF, 4), 15);
        assert_eq!(register_index(0x0000_0000_0000_0800, 11), 0);
        assert_eq!(register_index(0xABCD, 16), 0xABCD);
    }

    #[test]
    fn test_register_value_counts_remainder_zeros() {
        // Remainder of all zeros: maximum value 64 - p + 1.
        assert_eq!(register_value(0, 11), 54);
        assert_eq!(register_value(0x7FF, 11), 54);
        // Top bit set: no leading zeros in the remainder.
        assert_eq!(register_value(1 << 63, 11), 1);
        // Remainder 1 (bit just above the index field): 52 zeros + 1.
        assert_eq!(register_value(1 << 11, 11), 53);
    }

    #[test]
    fn test_register_value_fits_register_width() {
        for precision in [MIN_PRECISION, 11, MAX_PRECISION] {
            let max = register_value(0, precision);
            assert!(u32::from(max) < (1 << REGISTER_BITS));
        }
    }
}
