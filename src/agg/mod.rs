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

//! Aggregation adapter for the approximate-distinct function.
//!
//! Binds the sketch engine into the three-phase aggregate contract of
//! a distributed query engine: input rows feed a per-group accumulator
//! (`add`), worker-local partials travel as serialized sketches and
//! combine on any node in any order (`merge_serialized`), and the
//! final stage emits one scalar (`final_estimate`).
//!
//! # Usage
//!
//! ```rust
//! use approx_distinct::agg::ApproxDistinct;
//! use approx_distinct::agg::ApproxDistinctConfig;
//!
//! let config = ApproxDistinctConfig::default();
//!
//! // Worker-local partials.
//! let mut worker_a = ApproxDistinct::new(&config);
//! worker_a.add(&true);
//! let mut worker_b = ApproxDistinct::new(&config);
//! worker_b.add(&false);
//!
//! // Combine on the coordinator.
//! let mut combined = ApproxDistinct::new(&config);
//! combined.merge_serialized(&worker_a.serialize_partial()).unwrap();
//! combined.merge_serialized(&worker_b.serialize_partial()).unwrap();
//!
//! assert_eq!(combined.final_estimate(), 2);
//! ```

mod accumulator;

pub use accumulator::ApproxDistinct;
pub use accumulator::ApproxDistinctConfig;
pub use accumulator::DEFAULT_MAX_STANDARD_ERROR;
