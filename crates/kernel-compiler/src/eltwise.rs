// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compile-time descriptor for elementwise addition.

use tensor_core::{NoBuffer, OffsetBuffer};
use tile_iter::{PackedIterator, TensorIterator};

use crate::{
    blob::{BlobHeader, EltwisePrivateData, KernelId},
    conv2d::check_capacity,
    CompileError,
};

const OP: &str = "eltwise_add";

/// Compile-side descriptor for `out = left + right`.
///
/// All three tensors must agree on every extent; the operands may still
/// differ in strides and element width (8-bit operands accumulate into a
/// wider output).
pub struct AddDescriptor {
    input_left: TensorIterator<OffsetBuffer, 4>,
    input_right: TensorIterator<OffsetBuffer, 4>,
    output: TensorIterator<OffsetBuffer, 4>,
    attached: bool,
}

impl AddDescriptor {
    pub fn new(
        input_left: &TensorIterator<NoBuffer, 4>,
        input_right: &TensorIterator<NoBuffer, 4>,
        output: &TensorIterator<NoBuffer, 4>,
    ) -> Result<Self, CompileError> {
        for d in 0..4 {
            if input_left.dim(d) != input_right.dim(d) || input_left.dim(d) != output.dim(d) {
                return Err(CompileError::ShapeMismatch {
                    op: OP,
                    detail: format!(
                        "axis {d}: extents {} / {} / {} differ",
                        input_left.dim(d),
                        input_right.dim(d),
                        output.dim(d)
                    ),
                });
            }
        }
        Ok(Self {
            input_left: input_left.attach(OffsetBuffer::default()),
            input_right: input_right.attach(OffsetBuffer::default()),
            output: output.attach(OffsetBuffer::default()),
            attached: false,
        })
    }

    /// Worst-case storage per operand, in elements (all three agree).
    pub fn io_buffer_size(&self) -> u32 {
        self.output.tensor().footprint_elems()
    }

    pub fn attach_buffers(
        &mut self,
        input_left: OffsetBuffer,
        input_right: OffsetBuffer,
        output: OffsetBuffer,
    ) -> Result<(), CompileError> {
        check_capacity(OP, "left input", &input_left, self.io_buffer_size())?;
        check_capacity(OP, "right input", &input_right, self.io_buffer_size())?;
        check_capacity(OP, "output", &output, self.io_buffer_size())?;
        self.input_left.set_buf(input_left);
        self.input_right.set_buf(input_right);
        self.output.set_buf(output);
        self.attached = true;
        Ok(())
    }

    pub fn private_data_size(&self) -> usize {
        std::mem::size_of::<EltwisePrivateData>()
    }

    pub fn private_data(&self) -> Result<EltwisePrivateData, CompileError> {
        if !self.attached {
            return Err(CompileError::BuffersNotAttached { op: OP });
        }
        Ok(EltwisePrivateData {
            header: BlobHeader::new(KernelId::EltwiseAdd, self.private_data_size()),
            input_left: PackedIterator::pack(&self.input_left),
            input_right: PackedIterator::pack(&self.input_right),
            output: PackedIterator::pack(&self.output),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{ElemType, Tensor};

    fn no_tiling(shape: [u32; 4]) -> TensorIterator<NoBuffer, 4> {
        TensorIterator::new(Tensor::shaped_contiguous(shape, 4).unwrap())
    }

    #[test]
    fn test_extent_mismatch_rejected() {
        let r = AddDescriptor::new(
            &no_tiling([1, 4, 4, 8]),
            &no_tiling([1, 4, 5, 8]),
            &no_tiling([1, 4, 4, 8]),
        );
        assert!(matches!(r, Err(CompileError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_blob_carries_all_three_roles() {
        let mut d = AddDescriptor::new(
            &no_tiling([1, 4, 4, 8]),
            &no_tiling([1, 4, 4, 8]),
            &no_tiling([1, 4, 4, 8]),
        )
        .unwrap();
        d.attach_buffers(
            OffsetBuffer::new(1, 0, 128, ElemType::I8),
            OffsetBuffer::new(1, 128, 128, ElemType::I8),
            OffsetBuffer::new(1, 256, 256, ElemType::I16),
        )
        .unwrap();
        let prv = d.private_data().unwrap();
        assert_eq!(prv.header.kernel_id, KernelId::EltwiseAdd.as_tag());
        assert_eq!(prv.input_left.tensor.buf.offset, 0);
        assert_eq!(prv.input_right.tensor.buf.offset, 128);
        assert_eq!(prv.output.tensor.buf.elem_size, 2);
    }
}
