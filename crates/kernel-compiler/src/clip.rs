// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compile-time descriptor for saturation to a `[min, max]` range.

use tensor_core::{HostBuffer, NoBuffer, OffsetBuffer};
use tile_iter::{PackedIterator, TensorIterator};

use crate::{
    blob::{BlobHeader, ClipPrivateData, KernelId},
    conv2d::check_capacity,
    CompileError,
};

const OP: &str = "clip";

/// Bytes the encoded clip limits occupy: one `i8` min, one `i8` max.
pub const CLIP_PARAMS_BYTES: u32 = 2;

/// Compile-side clip descriptor.
pub struct ClipDescriptor {
    input: TensorIterator<OffsetBuffer, 4>,
    output: TensorIterator<OffsetBuffer, 4>,
    params: OffsetBuffer,
    attached: bool,
}

impl ClipDescriptor {
    pub fn new(
        input: &TensorIterator<NoBuffer, 4>,
        output: &TensorIterator<NoBuffer, 4>,
    ) -> Result<Self, CompileError> {
        for d in 0..4 {
            if input.dim(d) != output.dim(d) {
                return Err(CompileError::ShapeMismatch {
                    op: OP,
                    detail: format!(
                        "axis {d}: extents {} and {} differ",
                        input.dim(d),
                        output.dim(d)
                    ),
                });
            }
        }
        Ok(Self {
            input: input.attach(OffsetBuffer::default()),
            output: output.attach(OffsetBuffer::default()),
            params: OffsetBuffer::default(),
            attached: false,
        })
    }

    pub fn input_buffer_size(&self) -> u32 {
        self.input.tensor().footprint_elems()
    }

    pub fn output_buffer_size(&self) -> u32 {
        self.output.tensor().footprint_elems()
    }

    pub fn encoded_params_size(&self) -> u32 {
        CLIP_PARAMS_BYTES
    }

    /// Stages the clip limits: min then max.
    pub fn encode_params(&self, min: i8, max: i8) -> Result<HostBuffer, CompileError> {
        if min > max {
            return Err(CompileError::ShapeMismatch {
                op: OP,
                detail: format!("clip range [{min}, {max}] is empty"),
            });
        }
        Ok(HostBuffer::from_i8(&[min, max]))
    }

    pub fn attach_buffers(
        &mut self,
        input: OffsetBuffer,
        output: OffsetBuffer,
        encoded_params: OffsetBuffer,
    ) -> Result<(), CompileError> {
        check_capacity(OP, "input", &input, self.input_buffer_size())?;
        check_capacity(OP, "output", &output, self.output_buffer_size())?;
        if encoded_params.size < CLIP_PARAMS_BYTES {
            return Err(CompileError::BufferTooSmall {
                op: OP,
                role: "params",
                expected: CLIP_PARAMS_BYTES,
                actual: encoded_params.size,
            });
        }
        self.input.set_buf(input);
        self.output.set_buf(output);
        self.params = encoded_params;
        self.attached = true;
        Ok(())
    }

    pub fn private_data_size(&self) -> usize {
        std::mem::size_of::<ClipPrivateData>()
    }

    pub fn private_data(&self) -> Result<ClipPrivateData, CompileError> {
        if !self.attached {
            return Err(CompileError::BuffersNotAttached { op: OP });
        }
        Ok(ClipPrivateData {
            header: BlobHeader::new(KernelId::Clip, self.private_data_size()),
            input: PackedIterator::pack(&self.input),
            output: PackedIterator::pack(&self.output),
            params: self.params,
        })
    }
}
