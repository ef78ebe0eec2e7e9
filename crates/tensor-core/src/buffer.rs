// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The four buffer states of the compile-time / runtime protocol.
//!
//! A tensor's storage goes through distinct states as an operator is
//! lowered:
//!
//! 1. [`NoBuffer`] — shapes are being negotiated, nothing is allocated.
//! 2. [`HostBuffer`] — real bytes on the host, used to stage weights and
//!    quantization parameters for encoding.
//! 3. [`OffsetBuffer`] — the external memory planner has assigned a
//!    `(region, offset)` pair. This is a *promise* of storage, not storage:
//!    there is deliberately no way to read or write through it.
//! 4. [`DeviceBuffer`] — an absolute device address, produced only by
//!    [`crate::MemRegions::resolve`] once the loader supplies region bases.
//!
//! The states are distinct types rather than an enum so the type system
//! rejects phase mistakes (e.g. serializing an already-resolved address
//! into a private-data blob, or dereferencing a planner offset).

use crate::ElemType;
use bytemuck::{Pod, Zeroable};

/// Common capacity/element-size interface over all buffer states.
///
/// `Tensor` is generic over its buffer state; the few operations that are
/// meaningful in every state (footprint checks, element width) go through
/// this trait.
pub trait TensorBuffer: Clone {
    /// Buffer capacity in bytes. Zero for [`NoBuffer`].
    fn capacity_bytes(&self) -> u32;

    /// Element width in bytes. Zero for [`NoBuffer`].
    fn elem_size(&self) -> u32;
}

/// Placeholder state for tensors that only describe a shape.
///
/// Descriptors accept `Tensor<NoBuffer, R>` from the graph compiler before
/// any storage exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoBuffer;

impl TensorBuffer for NoBuffer {
    fn capacity_bytes(&self) -> u32 {
        0
    }
    fn elem_size(&self) -> u32 {
        0
    }
}

/// Host-side storage that owns its bytes.
///
/// Used on the compile side to hold weights and quantization parameters
/// that the descriptor encoders read from. Typed access goes through
/// `bytemuck` casts; the element width recorded at construction is the
/// only width reads are allowed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostBuffer {
    data: Vec<u8>,
    elem: ElemType,
}

impl HostBuffer {
    /// Creates a host buffer from i8 values.
    pub fn from_i8(values: &[i8]) -> Self {
        Self {
            data: bytemuck::cast_slice(values).to_vec(),
            elem: ElemType::I8,
        }
    }

    /// Creates a host buffer from i16 values.
    pub fn from_i16(values: &[i16]) -> Self {
        Self {
            data: bytemuck::cast_slice(values).to_vec(),
            elem: ElemType::I16,
        }
    }

    /// Creates a host buffer from i32 values.
    pub fn from_i32(values: &[i32]) -> Self {
        Self {
            data: bytemuck::cast_slice(values).to_vec(),
            elem: ElemType::I32,
        }
    }

    /// Wraps already-encoded bytes. The buffer reads as 1-byte elements.
    pub fn from_raw(data: Vec<u8>) -> Self {
        Self {
            data,
            elem: ElemType::I8,
        }
    }

    /// Creates a zero-filled host buffer of `len` elements.
    pub fn zeroed(len: usize, elem: ElemType) -> Self {
        Self {
            data: vec![0u8; len * elem.size_bytes() as usize],
            elem,
        }
    }

    /// Returns the element type selected at construction.
    pub fn elem_type(&self) -> ElemType {
        self.elem
    }

    /// Number of elements held.
    pub fn len_elems(&self) -> u32 {
        (self.data.len() as u32) / self.elem.size_bytes()
    }

    /// Views the buffer as i8 elements.
    ///
    /// # Panics
    /// Panics if the buffer was not constructed with [`ElemType::I8`].
    pub fn as_i8(&self) -> &[i8] {
        assert_eq!(self.elem, ElemType::I8, "as_i8 on {} buffer", self.elem);
        bytemuck::cast_slice(&self.data)
    }

    /// Views the buffer as i16 elements.
    ///
    /// # Panics
    /// Panics if the buffer was not constructed with [`ElemType::I16`].
    pub fn as_i16(&self) -> &[i16] {
        assert_eq!(self.elem, ElemType::I16, "as_i16 on {} buffer", self.elem);
        bytemuck::cast_slice(&self.data)
    }

    /// Views the buffer as i32 elements.
    ///
    /// # Panics
    /// Panics if the buffer was not constructed with [`ElemType::I32`].
    pub fn as_i32(&self) -> &[i32] {
        assert_eq!(self.elem, ElemType::I32, "as_i32 on {} buffer", self.elem);
        bytemuck::cast_slice(&self.data)
    }

    /// Returns the raw byte slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl TensorBuffer for HostBuffer {
    fn capacity_bytes(&self) -> u32 {
        self.data.len() as u32
    }
    fn elem_size(&self) -> u32 {
        self.elem.size_bytes()
    }
}

/// A region-relative buffer: the planner's promise of storage.
///
/// Carries `(mem_idx, offset, size, elem_size)`. The graph compiler does
/// not know which physical memory bank a region maps to; it only works
/// with offsets inside each requested region. `OffsetBuffer` is POD and is
/// embedded verbatim in private-data blobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct OffsetBuffer {
    /// Byte offset inside the region.
    pub offset: u32,
    /// Memory-region id, an index into the runtime [`crate::MemRegions`] table.
    pub mem_idx: u32,
    /// Capacity in bytes.
    pub size: u32,
    /// Element width in bytes.
    pub elem_size: u32,
}

impl OffsetBuffer {
    /// Creates a region-relative buffer descriptor.
    pub fn new(mem_idx: u32, offset: u32, size: u32, elem: ElemType) -> Self {
        Self {
            offset,
            mem_idx,
            size,
            elem_size: elem.size_bytes(),
        }
    }

    /// Number of whole elements the buffer can hold.
    pub fn len_elems(&self) -> u32 {
        if self.elem_size == 0 {
            0
        } else {
            self.size / self.elem_size
        }
    }
}

impl TensorBuffer for OffsetBuffer {
    fn capacity_bytes(&self) -> u32 {
        self.size
    }
    fn elem_size(&self) -> u32 {
        self.elem_size
    }
}

/// A resolved buffer: an absolute address in one of the device memories.
///
/// Produced exclusively by [`crate::MemRegions::resolve`]. The core never
/// reads or writes through this address — it is handed across the numeric
/// kernel boundary, where the backend (simulator memory model or real
/// load/store paths) owns the access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceBuffer {
    addr: u64,
    size: u32,
    elem_size: u32,
}

impl DeviceBuffer {
    pub(crate) fn from_parts(addr: u64, size: u32, elem_size: u32) -> Self {
        Self {
            addr,
            size,
            elem_size,
        }
    }

    /// The absolute base address of this buffer.
    pub fn addr(&self) -> u64 {
        self.addr
    }
}

impl TensorBuffer for DeviceBuffer {
    fn capacity_bytes(&self) -> u32 {
        self.size
    }
    fn elem_size(&self) -> u32 {
        self.elem_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_buffer_typed_views() {
        let b = HostBuffer::from_i16(&[-1, 0, 300]);
        assert_eq!(b.len_elems(), 3);
        assert_eq!(b.capacity_bytes(), 6);
        assert_eq!(b.as_i16(), &[-1, 0, 300]);
    }

    #[test]
    #[should_panic(expected = "as_i32")]
    fn test_host_buffer_wrong_width_panics() {
        let b = HostBuffer::from_i8(&[1, 2, 3, 4]);
        let _ = b.as_i32();
    }

    #[test]
    fn test_offset_buffer_is_pod() {
        let buf = OffsetBuffer::new(2, 128, 64, ElemType::I8);
        let bytes = bytemuck::bytes_of(&buf);
        assert_eq!(bytes.len(), 16);
        let back: OffsetBuffer = bytemuck::pod_read_unaligned(bytes);
        assert_eq!(back, buf);
    }

    #[test]
    fn test_offset_buffer_len_elems() {
        let buf = OffsetBuffer::new(0, 0, 64, ElemType::I32);
        assert_eq!(buf.len_elems(), 16);
        assert_eq!(OffsetBuffer::default().len_elems(), 0);
    }

    #[test]
    fn test_zeroed() {
        let b = HostBuffer::zeroed(5, ElemType::I32);
        assert_eq!(b.capacity_bytes(), 20);
        assert!(b.as_i32().iter().all(|&v| v == 0));
    }
}
