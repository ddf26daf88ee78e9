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

//! Compact binary layout for cross-node sketch transport.
//!
//! ```text
//! [format version: u8][precision: u8][representation tag: u8][payload]
//! ```
//!
//! Dense payload: the packed 6-bit register array, exactly `3m/4`
//! bytes. Sparse payload: a `u32` entry count followed by packed
//! `(index << 6) | value` entries at the minimum whole-byte width
//! holding `precision + 6` bits, little-endian, in strictly increasing
//! index order.
//!
//! Decoding is strict: any unknown version or tag, out-of-range
//! precision, short or oversized payload, or out-of-order entry is a
//! [`CorruptSketch`](crate::error::ErrorKind::CorruptSketch) error. A
//! partial aggregate crossing a node boundary is never reinterpreted
//! on a best-effort basis.

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::hll::HllSketch;
use crate::hll::MAX_PRECISION;
use crate::hll::MIN_PRECISION;
use crate::hll::REGISTER_BITS;
use crate::hll::dense;
use crate::hll::dense::DenseRegisters;
use crate::hll::num_registers;
use crate::hll::sketch::Storage;
use crate::hll::sparse;
use crate::hll::sparse::SparseRegisters;

const FORMAT_VERSION: u8 = 1;
const TAG_SPARSE: u8 = 0;
const TAG_DENSE: u8 = 1;
const HEADER_BYTES: usize = 3;

/// Bytes per sparse entry: `precision + 6` bits rounded up.
fn sparse_entry_bytes(precision: u8) -> usize {
    (precision as usize + REGISTER_BITS as usize).div_ceil(8)
}

/// Largest register value a sketch at this precision can produce.
fn max_register_value(precision: u8) -> u8 {
    64 - precision + 1
}

/// Encode a sketch into the transport layout.
pub(crate) fn serialize(sketch: &HllSketch) -> Vec<u8> {
    match sketch.storage() {
        Storage::Sparse(sparse) => serialize_sparse(sketch.precision(), sparse),
        Storage::Dense(dense) => serialize_dense(sketch.precision(), dense),
    }
}

/// Encode an empty sparse sketch without building one.
///
/// Used for the partial output of a group that saw no input.
pub(crate) fn serialize_empty(precision: u8) -> Vec<u8> {
    serialize_sparse(precision, &SparseRegisters::new())
}

fn serialize_sparse(precision: u8, sparse: &SparseRegisters) -> Vec<u8> {
    let entry_bytes = sparse_entry_bytes(precision);
    let mut bytes =
        SketchBytes::with_capacity(HEADER_BYTES + 4 + sparse.len() * entry_bytes);
    bytes.write_u8(FORMAT_VERSION);
    bytes.write_u8(precision);
    bytes.write_u8(TAG_SPARSE);
    bytes.write_u32_le(sparse.len() as u32);
    for entry in sparse.entries() {
        bytes.write_uint_le(u64::from(*entry), entry_bytes);
    }
    bytes.into_bytes()
}

fn serialize_dense(precision: u8, dense: &DenseRegisters) -> Vec<u8> {
    let packed = dense.packed();
    let mut bytes = SketchBytes::with_capacity(HEADER_BYTES + packed.len());
    bytes.write_u8(FORMAT_VERSION);
    bytes.write_u8(precision);
    bytes.write_u8(TAG_DENSE);
    bytes.write(packed);
    bytes.into_bytes()
}

/// Decode a sketch from the transport layout.
///
/// # Errors
///
/// [`CorruptSketch`](crate::error::ErrorKind::CorruptSketch) on any
/// deviation from the documented layout.
pub(crate) fn deserialize(bytes: &[u8]) -> Result<HllSketch, Error> {
    let mut slice = SketchSlice::new(bytes);

    let version = slice.read_u8().map_err(|_| Error::truncated("version"))?;
    if version != FORMAT_VERSION {
        return Err(Error::malformed("unsupported sketch format version")
            .with_context("expected", FORMAT_VERSION)
            .with_context("actual", version));
    }

    let precision = slice.read_u8().map_err(|_| Error::truncated("precision"))?;
    if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
        return Err(Error::malformed("precision out of supported range")
            .with_context("precision", precision));
    }

    let tag = slice.read_u8().map_err(|_| Error::truncated("tag"))?;
    let storage = match tag {
        TAG_SPARSE => Storage::Sparse(deserialize_sparse(&mut slice, precision)?),
        TAG_DENSE => Storage::Dense(deserialize_dense(&mut slice, precision)?),
        _ => {
            return Err(
                Error::malformed("unknown representation tag").with_context("tag", tag)
            );
        }
    };

    if slice.remaining() != 0 {
        return Err(Error::malformed("trailing bytes after sketch payload")
            .with_context("trailing", slice.remaining()));
    }

    Ok(HllSketch::from_storage(precision, storage))
}

fn deserialize_sparse(
    slice: &mut SketchSlice<'_>,
    precision: u8,
) -> Result<SparseRegisters, Error> {
    let count = slice
        .read_u32_le()
        .map_err(|_| Error::truncated("entry count"))? as usize;
    if count > sparse::max_entries(precision) {
        // A legal writer converts to dense before reaching this size.
        return Err(Error::malformed("sparse entry count exceeds conversion threshold")
            .with_context("count", count)
            .with_context("precision", precision));
    }

    let entry_bytes = sparse_entry_bytes(precision);
    let registers = num_registers(precision) as u32;
    let max_value = max_register_value(precision);

    let mut entries = Vec::with_capacity(count);
    let mut prev_index = None;
    for _ in 0..count {
        let entry = slice
            .read_uint_le(entry_bytes)
            .map_err(|_| Error::truncated("sparse entry"))? as u32;
        let index = sparse::entry_index(entry);
        let value = sparse::entry_value(entry);

        if index >= registers {
            return Err(Error::malformed("sparse entry index out of range")
                .with_context("index", index));
        }
        if value == 0 || value > max_value {
            return Err(Error::malformed("sparse entry value out of range")
                .with_context("index", index)
                .with_context("value", value));
        }
        if prev_index.is_some_and(|prev| index <= prev) {
            return Err(Error::malformed("sparse entries not in increasing index order")
                .with_context("index", index));
        }
        prev_index = Some(index);
        entries.push(entry);
    }

    Ok(SparseRegisters::from_sorted_entries(entries))
}

fn deserialize_dense(
    slice: &mut SketchSlice<'_>,
    precision: u8,
) -> Result<DenseRegisters, Error> {
    let expected = dense::packed_len(precision);
    if slice.remaining() < expected {
        return Err(Error::truncated("dense register array")
            .with_context("expected", expected)
            .with_context("actual", slice.remaining()));
    }
    let mut packed = vec![0u8; expected];
    slice
        .read_exact(&mut packed)
        .map_err(|_| Error::truncated("dense register array"))?;

    let dense = DenseRegisters::from_packed(precision, &packed);
    let max_value = max_register_value(precision);
    if let Some(value) = dense.iter().find(|value| *value > max_value) {
        return Err(Error::malformed("dense register value out of range")
            .with_context("value", value)
            .with_context("max", max_value));
    }
    Ok(dense)
}
