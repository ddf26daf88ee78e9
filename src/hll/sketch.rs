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

use std::hash::Hash;

use crate::error::Error;
use crate::hash::hash_value;
use crate::hll::MAX_PRECISION;
use crate::hll::MIN_PRECISION;
use crate::hll::dense::DenseRegisters;
use crate::hll::estimator;
use crate::hll::num_registers;
use crate::hll::register_index;
use crate::hll::register_value;
use crate::hll::sparse::SparseRegisters;

/// Current register storage.
///
/// The variant is a one-way state: a sketch starts `Sparse` and may
/// convert to `Dense`, never back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Storage {
    Sparse(SparseRegisters),
    Dense(DenseRegisters),
}

/// HyperLogLog sketch: `2^precision` registers, each holding the
/// maximum leading-zero run observed among the hashes routed to it.
///
/// # Examples
///
/// ```
/// use approx_distinct::hll::HllSketch;
///
/// let mut sketch = HllSketch::new(11);
/// sketch.add(&"apple");
/// sketch.add(&"banana");
/// sketch.add(&"apple");
/// assert_eq!(sketch.estimate().round() as u64, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HllSketch {
    precision: u8,
    storage: Storage,
}

impl HllSketch {
    /// Create an empty sketch.
    ///
    /// # Panics
    ///
    /// Panics if `precision` is outside `[4, 16]`. Use
    /// [`precision_for_error`](crate::hll::precision_for_error) to
    /// derive a valid precision from an accuracy target.
    pub fn new(precision: u8) -> Self {
        assert!(
            (MIN_PRECISION..=MAX_PRECISION).contains(&precision),
            "precision must be in [{MIN_PRECISION}, {MAX_PRECISION}], got {precision}"
        );
        Self {
            precision,
            storage: Storage::Sparse(SparseRegisters::new()),
        }
    }

    pub(crate) fn from_storage(precision: u8, storage: Storage) -> Self {
        Self { precision, storage }
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Register-selection precision of this sketch.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Whether any value has been observed.
    pub fn is_empty(&self) -> bool {
        match &self.storage {
            Storage::Sparse(sparse) => sparse.is_empty(),
            Storage::Dense(dense) => dense.num_zeros() as usize == num_registers(self.precision),
        }
    }

    /// Update the sketch with a hashable value.
    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) {
        self.add_hash(hash_value(value));
    }

    /// Update the sketch with an already-hashed value.
    ///
    /// Idempotent: replaying the same hash never changes the registers
    /// after the first application.
    pub fn add_hash(&mut self, hash: u64) {
        let index = register_index(hash, self.precision);
        let value = register_value(hash, self.precision);

        match &mut self.storage {
            Storage::Sparse(sparse) => {
                sparse.update(index, value);
                if sparse.should_convert(self.precision) {
                    let dense = sparse.to_dense(self.precision);
                    self.storage = Storage::Dense(dense);
                }
            }
            Storage::Dense(dense) => dense.update(index, value),
        }
    }

    /// Merge another sketch into this one, register-wise maximum.
    ///
    /// Produces exactly the sketch that would result from observing the
    /// union of both input streams; commutative and associative.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigurationMismatch`] when the precisions
    /// differ. The sketch is left untouched in that case.
    ///
    /// [`ErrorKind::ConfigurationMismatch`]: crate::error::ErrorKind::ConfigurationMismatch
    pub fn merge_from(&mut self, other: &HllSketch) -> Result<(), Error> {
        if self.precision != other.precision {
            return Err(Error::precision_mismatch(self.precision, other.precision));
        }

        match (&mut self.storage, &other.storage) {
            (Storage::Sparse(sparse), Storage::Sparse(other_sparse)) => {
                sparse.merge_from(other_sparse);
                if sparse.should_convert(self.precision) {
                    let dense = sparse.to_dense(self.precision);
                    self.storage = Storage::Dense(dense);
                }
            }
            (Storage::Sparse(sparse), Storage::Dense(other_dense)) => {
                let mut dense = sparse.to_dense(self.precision);
                dense.merge_from(other_dense);
                self.storage = Storage::Dense(dense);
            }
            (Storage::Dense(dense), Storage::Sparse(other_sparse)) => {
                for (index, value) in other_sparse.iter() {
                    dense.update(index, value);
                }
            }
            (Storage::Dense(dense), Storage::Dense(other_dense)) => {
                dense.merge_from(other_dense);
            }
        }
        Ok(())
    }

    /// Cardinality estimate from the current registers.
    ///
    /// Non-negative and deterministic; identical registers always
    /// produce the identical estimate, independent of representation.
    pub fn estimate(&self) -> f64 {
        let m = num_registers(self.precision);
        let (inverse_sum, num_zeros) = match &self.storage {
            Storage::Sparse(sparse) => {
                let num_zeros = (m - sparse.len()) as u32;
                let touched: f64 = sparse.iter().map(|(_, value)| estimator::inv_pow2(value)).sum();
                (f64::from(num_zeros) + touched, num_zeros)
            }
            Storage::Dense(dense) => {
                let inverse_sum = dense.iter().map(estimator::inv_pow2).sum();
                (inverse_sum, dense.num_zeros())
            }
        };
        estimator::estimate(m, inverse_sum, num_zeros)
    }

    /// Materialize all `m` register values in index order.
    ///
    /// Diagnostic view; both representations yield the same array for
    /// the same observed inputs.
    pub fn registers(&self) -> Vec<u8> {
        match &self.storage {
            Storage::Sparse(sparse) => {
                let mut registers = vec![0u8; num_registers(self.precision)];
                for (index, value) in sparse.iter() {
                    registers[index as usize] = value;
                }
                registers
            }
            Storage::Dense(dense) => dense.iter().collect(),
        }
    }

    /// Encode this sketch into the compact transport layout.
    ///
    /// See the [serialization module](crate::hll) docs for the byte
    /// layout; `deserialize(serialize(s))` reproduces `s` exactly.
    pub fn serialize(&self) -> Vec<u8> {
        crate::hll::serialize(self)
    }

    /// Decode a sketch from the compact transport layout.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::CorruptSketch`] for any malformed input;
    /// decoding never guesses at damaged payloads.
    ///
    /// [`ErrorKind::CorruptSketch`]: crate::error::ErrorKind::CorruptSketch
    pub fn deserialize(bytes: &[u8]) -> Result<HllSketch, Error> {
        crate::hll::deserialize(bytes)
    }

    /// Heap bytes held by the sketch, for per-group memory accounting.
    ///
    /// Bounded: the dense representation never grows past its fixed
    /// packed-array size no matter how many values are observed.
    pub fn memory_bytes(&self) -> usize {
        let storage = match &self.storage {
            Storage::Sparse(sparse) => sparse.memory_bytes(),
            Storage::Dense(dense) => dense.memory_bytes(),
        };
        std::mem::size_of::<Self>() + storage
    }
}
