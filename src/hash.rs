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

//! Input hashing for the sketch engine.
//!
//! The sketch only ever consumes a uniformly distributed 64-bit hash;
//! the typed input value never reaches it. Any type implementing
//! [`std::hash::Hash`] can feed the aggregation through this single
//! entry point.

use std::hash::Hash;

/// Seed for MurmurHash3, shared by every sketch in the process.
///
/// The seed is fixed so that partial results produced by different
/// workers hash identically and stay mergeable.
const DEFAULT_HASH_SEED: u32 = 9001;

/// Map a hashable value to a uniformly distributed 64-bit hash.
///
/// Deterministic: the same input always produces the same output, so
/// duplicate inputs collapse onto the same register update.
///
/// # Examples
///
/// ```
/// use approx_distinct::hash::hash_value;
///
/// assert_eq!(hash_value(&true), hash_value(&true));
/// assert_ne!(hash_value(&true), hash_value(&false));
/// ```
pub fn hash_value<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = mur3::Hasher128::with_seed(DEFAULT_HASH_SEED);
    value.hash(&mut hasher);
    let (lo, _hi) = hasher.finish128();
    lo
}
