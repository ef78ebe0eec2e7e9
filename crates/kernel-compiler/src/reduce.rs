// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compile-time descriptor for max-reduction along one axis.

use tensor_core::{NoBuffer, OffsetBuffer};
use tile_iter::{PackedIterator, TensorIterator};

use crate::{
    blob::{BlobHeader, KernelId, ReducePrivateData},
    config::ReduceConfig,
    conv2d::check_capacity,
    CompileError,
};

const OP: &str = "reduce_max";

/// Compile-side descriptor for `out = max(in, axis)`.
///
/// The reduced axis collapses to extent 1 in the output; every other
/// axis must match the input exactly.
pub struct ReduceMaxDescriptor {
    input: TensorIterator<OffsetBuffer, 4>,
    output: TensorIterator<OffsetBuffer, 4>,
    config: ReduceConfig,
    attached: bool,
}

impl ReduceMaxDescriptor {
    pub fn new(
        input: &TensorIterator<NoBuffer, 4>,
        config: ReduceConfig,
        output: &TensorIterator<NoBuffer, 4>,
    ) -> Result<Self, CompileError> {
        if config.axis < 0 || config.axis >= 4 {
            return Err(CompileError::ShapeMismatch {
                op: OP,
                detail: format!("reduction axis {} out of range", config.axis),
            });
        }
        for d in 0..4 {
            let expected = if d == config.axis as usize {
                1
            } else {
                input.dim(d)
            };
            if output.dim(d) != expected {
                return Err(CompileError::ShapeMismatch {
                    op: OP,
                    detail: format!(
                        "axis {d}: output extent {} should be {expected}",
                        output.dim(d)
                    ),
                });
            }
        }
        Ok(Self {
            input: input.attach(OffsetBuffer::default()),
            output: output.attach(OffsetBuffer::default()),
            config,
            attached: false,
        })
    }

    pub fn input_buffer_size(&self) -> u32 {
        self.input.tensor().footprint_elems()
    }

    pub fn output_buffer_size(&self) -> u32 {
        self.output.tensor().footprint_elems()
    }

    pub fn attach_buffers(
        &mut self,
        input: OffsetBuffer,
        output: OffsetBuffer,
    ) -> Result<(), CompileError> {
        check_capacity(OP, "input", &input, self.input_buffer_size())?;
        check_capacity(OP, "output", &output, self.output_buffer_size())?;
        self.input.set_buf(input);
        self.output.set_buf(output);
        self.attached = true;
        Ok(())
    }

    pub fn private_data_size(&self) -> usize {
        std::mem::size_of::<ReducePrivateData>()
    }

    pub fn private_data(&self) -> Result<ReducePrivateData, CompileError> {
        if !self.attached {
            return Err(CompileError::BuffersNotAttached { op: OP });
        }
        Ok(ReducePrivateData {
            header: BlobHeader::new(KernelId::ReduceMax, self.private_data_size()),
            input: PackedIterator::pack(&self.input),
            output: PackedIterator::pack(&self.output),
            reduce_axis: self.config.axis,
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
    fn test_output_must_collapse_axis() {
        let r = ReduceMaxDescriptor::new(
            &no_tiling([1, 4, 4, 8]),
            ReduceConfig { axis: 3 },
            &no_tiling([1, 4, 4, 8]),
        );
        assert!(matches!(r, Err(CompileError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_axis_out_of_range() {
        let r = ReduceMaxDescriptor::new(
            &no_tiling([1, 4, 4, 8]),
            ReduceConfig { axis: 4 },
            &no_tiling([1, 4, 4, 1]),
        );
        assert!(r.is_err());
    }

    #[test]
    fn test_blob_contents() {
        let mut d = ReduceMaxDescriptor::new(
            &no_tiling([1, 4, 4, 8]),
            ReduceConfig { axis: 3 },
            &no_tiling([1, 4, 4, 1]),
        )
        .unwrap();
        d.attach_buffers(
            OffsetBuffer::new(1, 0, 128, ElemType::I8),
            OffsetBuffer::new(1, 128, 16, ElemType::I8),
        )
        .unwrap();
        let prv = d.private_data().unwrap();
        assert_eq!(prv.header.kernel_id, KernelId::ReduceMax.as_tag());
        assert_eq!(prv.reduce_axis, 3);
        assert_eq!(prv.output.tensor.shape[3], 1);
    }
}
