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

//! Wire-format round trips and strict corruption detection.
//!
//! Layout under test: `[version][precision][tag][payload]`, sparse
//! tag 0 with a u32 entry count and 3-byte entries at precision 11,
//! dense tag 1 with the 3m/4-byte packed register array.

use approx_distinct::error::ErrorKind;
use approx_distinct::hll::HllSketch;

fn sparse_sketch() -> HllSketch {
    let mut sketch = HllSketch::new(11);
    for i in 0..20u64 {
        sketch.add(&i);
    }
    sketch
}

fn dense_sketch() -> HllSketch {
    let mut sketch = HllSketch::new(11);
    for i in 0..5000u64 {
        sketch.add(&i);
    }
    sketch
}

#[test]
fn test_sparse_roundtrip() {
    let sketch = sparse_sketch();
    let restored = HllSketch::deserialize(&sketch.serialize()).unwrap();
    assert_eq!(restored, sketch);
    assert_eq!(restored.estimate(), sketch.estimate());
}

#[test]
fn test_dense_roundtrip() {
    let sketch = dense_sketch();
    let restored = HllSketch::deserialize(&sketch.serialize()).unwrap();
    assert_eq!(restored, sketch);
    assert_eq!(restored.estimate(), sketch.estimate());
}

#[test]
fn test_empty_roundtrip() {
    let sketch = HllSketch::new(16);
    let restored = HllSketch::deserialize(&sketch.serialize()).unwrap();
    assert_eq!(restored, sketch);
    assert!(restored.is_empty());
}

#[test]
fn test_roundtrip_preserves_behavior() {
    // Updates and merges after the round trip act on identical state.
    let mut original = sparse_sketch();
    let mut restored = HllSketch::deserialize(&original.serialize()).unwrap();

    for i in 1000..6000u64 {
        original.add(&i);
        restored.add(&i);
    }
    assert_eq!(original.registers(), restored.registers());

    let other = dense_sketch();
    original.merge_from(&other).unwrap();
    restored.merge_from(&other).unwrap();
    assert_eq!(original.registers(), restored.registers());
    assert_eq!(original.estimate(), restored.estimate());
}

#[test]
fn test_representation_tags() {
    // Third header byte is the documented representation tag.
    assert_eq!(sparse_sketch().serialize()[2], 0);
    assert_eq!(dense_sketch().serialize()[2], 1);
}

#[test]
fn test_empty_input_rejected() {
    let err = HllSketch::deserialize(&[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptSketch);
}

#[test]
fn test_truncated_header_rejected() {
    let bytes = sparse_sketch().serialize();
    for len in 0..3 {
        let err = HllSketch::deserialize(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSketch, "header length {len}");
    }
}

#[test]
fn test_truncated_payload_rejected() {
    for sketch in [sparse_sketch(), dense_sketch()] {
        let bytes = sketch.serialize();
        let err = HllSketch::deserialize(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSketch);
    }
}

#[test]
fn test_trailing_bytes_rejected() {
    for sketch in [sparse_sketch(), dense_sketch()] {
        let mut bytes = sketch.serialize();
        bytes.push(0);
        let err = HllSketch::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSketch);
    }
}

#[test]
fn test_unknown_version_rejected() {
    let mut bytes = sparse_sketch().serialize();
    bytes[0] = 2;
    let err = HllSketch::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptSketch);
}

#[test]
fn test_unknown_tag_rejected() {
    let mut bytes = sparse_sketch().serialize();
    bytes[2] = 9;
    let err = HllSketch::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptSketch);
}

#[test]
fn test_out_of_range_precision_rejected() {
    for precision in [0u8, 3, 17, 255] {
        let mut bytes = sparse_sketch().serialize();
        bytes[1] = precision;
        let err = HllSketch::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptSketch, "precision {precision}");
    }
}

#[test]
fn test_unordered_sparse_entries_rejected() {
    let bytes = sparse_sketch().serialize();
    // Entries start after the 3-byte header and 4-byte count; at
    // precision 11 each entry is 3 bytes. Swapping the first two
    // breaks the strictly-increasing index order.
    let mut swapped = bytes.clone();
    swapped[7..10].copy_from_slice(&bytes[10..13]);
    swapped[10..13].copy_from_slice(&bytes[7..10]);
    let err = HllSketch::deserialize(&swapped).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptSketch);
}

#[test]
fn test_zero_valued_sparse_entry_rejected() {
    // A sparse entry with register value 0 cannot come from a legal
    // writer: untouched registers are simply absent.
    let mut bytes = vec![1u8, 11, 0];
    bytes.extend_from_slice(&1u32.to_le_bytes());
    let entry = 5u32 << 6; // index 5, value 0
    bytes.extend_from_slice(&entry.to_le_bytes()[..3]);
    let err = HllSketch::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptSketch);
}

#[test]
fn test_oversized_sparse_count_rejected() {
    // Count above the conversion threshold (384 at precision 11)
    // cannot come from a legal writer either.
    let mut bytes = vec![1u8, 11, 0];
    bytes.extend_from_slice(&10_000u32.to_le_bytes());
    let err = HllSketch::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptSketch);
}

#[test]
fn test_out_of_range_dense_register_rejected() {
    // All-ones payload decodes to register value 63, above the
    // 64 - p + 1 = 54 ceiling at precision 11.
    let mut bytes = vec![1u8, 11, 1];
    bytes.extend_from_slice(&vec![0xFF; 1536]);
    let err = HllSketch::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptSketch);
}

#[test]
fn test_partial_wire_format_is_stable() {
    // Same inputs, same bytes: partials produced by identical work on
    // different nodes must compare equal.
    assert_eq!(sparse_sketch().serialize(), sparse_sketch().serialize());
    assert_eq!(dense_sketch().serialize(), dense_sketch().serialize());
}
