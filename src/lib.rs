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

//! Approximate distinct-count aggregation engine.
//!
//! This crate implements the sketch engine behind an `approx_distinct`
//! SQL aggregate: a HyperLogLog cardinality estimator whose summaries
//! are bounded in size, mergeable across workers in any order and any
//! tree shape, and accurate to a configurable standard error.
//!
//! The [`hll`] module holds the sketch itself (registers, sparse/dense
//! representations, estimator, wire codec); the [`agg`] module adapts
//! it to the three-phase aggregate contract (input → partial,
//! partial + partial → partial, partial → final scalar) that a
//! distributed execution framework drives per aggregation group.
//!
//! # Example
//!
//! ```rust
//! use approx_distinct::agg::ApproxDistinct;
//! use approx_distinct::agg::ApproxDistinctConfig;
//!
//! let config = ApproxDistinctConfig::new(0.023)?;
//! let mut acc = ApproxDistinct::new(&config);
//! for i in 0..1000u64 {
//!     acc.add(&i);
//!     acc.add(&i); // duplicates do not inflate the count
//! }
//!
//! let estimate = acc.final_estimate();
//! assert!(estimate > 900 && estimate < 1100);
//! # Ok::<(), approx_distinct::error::Error>(())
//! ```

mod codec;

pub mod agg;
pub mod error;
pub mod hash;
pub mod hll;
