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
use crate::hll;
use crate::hll::HllSketch;

/// Default accuracy target when the aggregate call omits the error
/// argument (precision 11, 2048 registers).
pub const DEFAULT_MAX_STANDARD_ERROR: f64 = 0.023;

/// Accuracy configuration for one aggregation.
///
/// Immutable once the aggregation begins; accumulators and partials
/// built from different configurations do not mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxDistinctConfig {
    max_standard_error: f64,
    precision: u8,
}

impl ApproxDistinctConfig {
    /// Build a configuration for the requested standard-error bound.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`] when the bound lies
    /// outside the supported range; this is the only point where the
    /// accuracy argument is validated.
    ///
    /// [`ErrorKind::InvalidConfiguration`]: crate::error::ErrorKind::InvalidConfiguration
    pub fn new(max_standard_error: f64) -> Result<Self, Error> {
        let precision = hll::precision_for_error(max_standard_error)?;
        Ok(Self {
            max_standard_error,
            precision,
        })
    }

    /// The configured error bound.
    pub fn max_standard_error(&self) -> f64 {
        self.max_standard_error
    }

    /// Register-selection precision satisfying the error bound.
    pub fn precision(&self) -> u8 {
        self.precision
    }
}

impl Default for ApproxDistinctConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STANDARD_ERROR).expect("default error bound is valid")
    }
}

/// Per-group accumulator state.
///
/// `Empty` holds no sketch at all so that groups without input cost
/// nothing; the sketch is allocated on the first add or merge.
#[derive(Debug, Clone)]
enum State {
    Empty,
    Accumulating(HllSketch),
    Finalized,
}

/// Per-group accumulator for the approximate-distinct aggregate.
///
/// Lifecycle: `Empty → Accumulating → Finalized`, driven by the
/// surrounding aggregation framework. One accumulator belongs to one
/// group and is touched by one thread at a time; there is no interior
/// locking. Calling any input or output operation after
/// [`final_estimate`](Self::final_estimate) is a caller bug and
/// panics.
#[derive(Debug, Clone)]
pub struct ApproxDistinct {
    precision: u8,
    state: State,
}

impl ApproxDistinct {
    /// Create an empty accumulator for one aggregation group.
    pub fn new(config: &ApproxDistinctConfig) -> Self {
        Self {
            precision: config.precision(),
            state: State::Empty,
        }
    }

    /// Create an accumulator straight from an error bound.
    ///
    /// # Errors
    ///
    /// Same validation as [`ApproxDistinctConfig::new`].
    pub fn with_max_standard_error(max_standard_error: f64) -> Result<Self, Error> {
        Ok(Self::new(&ApproxDistinctConfig::new(max_standard_error)?))
    }

    /// Observe one input value for this group.
    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) {
        match &mut self.state {
            State::Empty => {
                let mut sketch = HllSketch::new(self.precision);
                sketch.add(value);
                self.state = State::Accumulating(sketch);
            }
            State::Accumulating(sketch) => sketch.add(value),
            State::Finalized => panic!("add on a finalized approx_distinct accumulator"),
        }
    }

    /// Merge a serialized partial produced by another accumulator.
    ///
    /// Fully succeeds or leaves this accumulator untouched.
    ///
    /// # Errors
    ///
    /// [`CorruptSketch`] when the bytes do not decode;
    /// [`ConfigurationMismatch`] when the partial was built at a
    /// different precision.
    ///
    /// [`CorruptSketch`]: crate::error::ErrorKind::CorruptSketch
    /// [`ConfigurationMismatch`]: crate::error::ErrorKind::ConfigurationMismatch
    pub fn merge_serialized(&mut self, partial: &[u8]) -> Result<(), Error> {
        let incoming = hll::deserialize(partial)?;
        if incoming.precision() != self.precision {
            return Err(Error::precision_mismatch(self.precision, incoming.precision()));
        }

        match &mut self.state {
            State::Empty => {
                self.state = State::Accumulating(incoming);
                Ok(())
            }
            State::Accumulating(sketch) => sketch.merge_from(&incoming),
            State::Finalized => {
                panic!("merge on a finalized approx_distinct accumulator")
            }
        }
    }

    /// Serialize this group's partial for the next aggregation stage.
    ///
    /// An accumulator that saw no input emits a canonical empty sketch
    /// that any peer at the same configuration can decode and merge.
    pub fn serialize_partial(&self) -> Vec<u8> {
        match &self.state {
            State::Empty => hll::serialize_empty(self.precision),
            State::Accumulating(sketch) => hll::serialize(sketch),
            State::Finalized => {
                panic!("serialize on a finalized approx_distinct accumulator")
            }
        }
    }

    /// Emit the final scalar and retire the accumulator.
    ///
    /// A group that saw no input reports zero distinct values without
    /// ever allocating a sketch.
    pub fn final_estimate(&mut self) -> u64 {
        match std::mem::replace(&mut self.state, State::Finalized) {
            State::Empty => 0,
            State::Accumulating(sketch) => sketch.estimate().round() as u64,
            State::Finalized => {
                panic!("final_estimate on a finalized approx_distinct accumulator")
            }
        }
    }

    /// Bytes of memory attributed to this group, for the caller's
    /// memory accounting.
    pub fn memory_usage_bytes(&self) -> usize {
        let sketch = match &self.state {
            State::Accumulating(sketch) => sketch.memory_bytes(),
            State::Empty | State::Finalized => 0,
        };
        std::mem::size_of::<Self>() + sketch
    }
}
