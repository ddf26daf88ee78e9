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

use std::io;
use std::io::Cursor;
use std::io::Read;

use byteorder::LittleEndian;
use byteorder::ReadBytesExt;
use byteorder::WriteBytesExt;

/// Growable little-endian byte sink for sketch serialization.
pub(crate) struct SketchBytes {
    bytes: Vec<u8>,
}

impl SketchBytes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write(&mut self, buf: &[u8]) {
        self.bytes.extend_from_slice(buf);
    }

    pub fn write_u8(&mut self, n: u8) {
        // Writing to a Vec cannot fail.
        WriteBytesExt::write_u8(&mut self.bytes, n).expect("write to Vec");
    }

    pub fn write_u32_le(&mut self, n: u32) {
        WriteBytesExt::write_u32::<LittleEndian>(&mut self.bytes, n).expect("write to Vec");
    }

    pub fn write_u64_le(&mut self, n: u64) {
        WriteBytesExt::write_u64::<LittleEndian>(&mut self.bytes, n).expect("write to Vec");
    }

    /// Write the low `width` bytes of `n`, little-endian.
    ///
    /// Used for fields whose width depends on the sketch precision.
    pub fn write_uint_le(&mut self, n: u64, width: usize) {
        debug_assert!(width >= 1 && width <= 8);
        debug_assert!(width == 8 || n < 1 << (width * 8));
        self.write(&n.to_le_bytes()[..width]);
    }
}

/// Strict cursor over serialized sketch bytes.
pub(crate) struct SketchSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl SketchSlice<'_> {
    pub fn new(slice: &[u8]) -> SketchSlice<'_> {
        SketchSlice {
            slice: Cursor::new(slice),
        }
    }

    /// Bytes left unread in the slice.
    pub fn remaining(&self) -> usize {
        let total = self.slice.get_ref().len() as u64;
        (total - self.slice.position().min(total)) as usize
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.slice.read_exact(buf)
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        ReadBytesExt::read_u8(&mut self.slice)
    }

    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        ReadBytesExt::read_u32::<LittleEndian>(&mut self.slice)
    }

    pub fn read_u64_le(&mut self) -> io::Result<u64> {
        ReadBytesExt::read_u64::<LittleEndian>(&mut self.slice)
    }

    /// Read a `width`-byte little-endian unsigned value.
    pub fn read_uint_le(&mut self, width: usize) -> io::Result<u64> {
        debug_assert!(width >= 1 && width <= 8);
        ReadBytesExt::read_uint::<LittleEndian>(&mut self.slice, width)
    }
}
