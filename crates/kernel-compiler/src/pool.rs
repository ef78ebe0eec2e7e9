// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compile-time descriptors for 2D pooling.
//!
//! Max pooling and sum pooling share everything but the kernel identity:
//! both slide a window over BHWC input and write one value per window
//! position and channel. The shared machinery lives in [`PoolDescriptor`];
//! the two public constructors pin the identity tag.

use tensor_core::{
    layout::{BATCH_DIM, CHANNEL_DIM},
    NoBuffer, OffsetBuffer,
};
use tile_iter::{PackedIterator, TensorIterator};

use crate::{
    blob::{BlobHeader, KernelId, PoolPrivateData},
    config::PoolConfig,
    conv2d::check_capacity,
    CompileError,
};

/// Compile-side pooling descriptor; covers max and sum pooling.
pub struct PoolDescriptor {
    id: KernelId,
    op: &'static str,
    input: TensorIterator<OffsetBuffer, 4>,
    output: TensorIterator<OffsetBuffer, 4>,
    config: PoolConfig,
    attached: bool,
}

impl PoolDescriptor {
    /// Max-pooling descriptor.
    pub fn max_pool2d(
        input: &TensorIterator<NoBuffer, 4>,
        config: PoolConfig,
        output: &TensorIterator<NoBuffer, 4>,
    ) -> Result<Self, CompileError> {
        Self::new(KernelId::MaxPool2d, "max_pool2d", input, config, output)
    }

    /// Sum-pooling descriptor (the accumulation half of average pooling;
    /// the division is a following rescale).
    pub fn sum_pool2d(
        input: &TensorIterator<NoBuffer, 4>,
        config: PoolConfig,
        output: &TensorIterator<NoBuffer, 4>,
    ) -> Result<Self, CompileError> {
        Self::new(KernelId::SumPool2d, "sum_pool2d", input, config, output)
    }

    fn new(
        id: KernelId,
        op: &'static str,
        input: &TensorIterator<NoBuffer, 4>,
        config: PoolConfig,
        output: &TensorIterator<NoBuffer, 4>,
    ) -> Result<Self, CompileError> {
        if input.dim(BATCH_DIM) != output.dim(BATCH_DIM) {
            return Err(CompileError::ShapeMismatch {
                op,
                detail: format!(
                    "batch extents differ: {} vs {}",
                    input.dim(BATCH_DIM),
                    output.dim(BATCH_DIM)
                ),
            });
        }
        if input.dim(CHANNEL_DIM) != output.dim(CHANNEL_DIM) {
            return Err(CompileError::ShapeMismatch {
                op,
                detail: format!(
                    "channel extents differ: {} vs {}",
                    input.dim(CHANNEL_DIM),
                    output.dim(CHANNEL_DIM)
                ),
            });
        }
        if config.kernel_size[0] == 0 || config.kernel_size[1] == 0 {
            return Err(CompileError::ShapeMismatch {
                op,
                detail: "pooling window has a zero extent".into(),
            });
        }
        tracing::debug!(
            op,
            in_shape = ?input.tensor().shape(),
            out_shape = ?output.tensor().shape(),
            "pooling descriptor created"
        );
        Ok(Self {
            id,
            op,
            input: input.attach(OffsetBuffer::default()),
            output: output.attach(OffsetBuffer::default()),
            config,
            attached: false,
        })
    }

    /// Worst-case input storage, in elements.
    pub fn input_buffer_size(&self) -> u32 {
        self.input.tensor().footprint_elems()
    }

    /// Worst-case output storage, in elements.
    pub fn output_buffer_size(&self) -> u32 {
        self.output.tensor().footprint_elems()
    }

    /// Binds planner-assigned buffers.
    pub fn attach_buffers(
        &mut self,
        input: OffsetBuffer,
        output: OffsetBuffer,
    ) -> Result<(), CompileError> {
        check_capacity(self.op, "input", &input, self.input_buffer_size())?;
        check_capacity(self.op, "output", &output, self.output_buffer_size())?;
        self.input.set_buf(input);
        self.output.set_buf(output);
        self.attached = true;
        Ok(())
    }

    /// Size of the private-data record, in bytes.
    pub fn private_data_size(&self) -> usize {
        std::mem::size_of::<PoolPrivateData>()
    }

    /// Serializes the descriptor state into its blob record.
    pub fn private_data(&self) -> Result<PoolPrivateData, CompileError> {
        if !self.attached {
            return Err(CompileError::BuffersNotAttached { op: self.op });
        }
        Ok(PoolPrivateData {
            header: BlobHeader::new(self.id, self.private_data_size()),
            input: PackedIterator::pack(&self.input),
            output: PackedIterator::pack(&self.output),
            config: self.config,
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

    fn pool_cfg() -> PoolConfig {
        PoolConfig {
            kernel_size: [2, 2],
            stride: [2, 2],
            padding_begin: [0, 0],
            padding_end: [0, 0],
        }
    }

    #[test]
    fn test_channel_mismatch_rejected() {
        let r = PoolDescriptor::max_pool2d(
            &no_tiling([1, 8, 8, 4]),
            pool_cfg(),
            &no_tiling([1, 4, 4, 8]),
        );
        assert!(matches!(r, Err(CompileError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_zero_window_rejected() {
        let cfg = PoolConfig {
            kernel_size: [0, 2],
            ..pool_cfg()
        };
        let r =
            PoolDescriptor::max_pool2d(&no_tiling([1, 8, 8, 4]), cfg, &no_tiling([1, 4, 4, 4]));
        assert!(r.is_err());
    }

    #[test]
    fn test_max_and_sum_blob_identity() {
        type Build = fn(
            &TensorIterator<NoBuffer, 4>,
            PoolConfig,
            &TensorIterator<NoBuffer, 4>,
        ) -> Result<PoolDescriptor, CompileError>;
        let cases: [(Build, KernelId); 2] = [
            (PoolDescriptor::max_pool2d, KernelId::MaxPool2d),
            (PoolDescriptor::sum_pool2d, KernelId::SumPool2d),
        ];
        for (build, id) in cases {
            let mut d =
                build(&no_tiling([1, 8, 8, 4]), pool_cfg(), &no_tiling([1, 4, 4, 4])).unwrap();
            d.attach_buffers(
                OffsetBuffer::new(1, 0, 256, ElemType::I8),
                OffsetBuffer::new(1, 256, 64, ElemType::I8),
            )
            .unwrap();
            let prv = d.private_data().unwrap();
            assert_eq!(prv.header.kernel_id, id.as_tag());
            assert_eq!(prv.config, pool_cfg());
        }
    }

    #[test]
    fn test_attach_capacity_checked() {
        let mut d = PoolDescriptor::sum_pool2d(
            &no_tiling([1, 8, 8, 4]),
            pool_cfg(),
            &no_tiling([1, 4, 4, 4]),
        )
        .unwrap();
        // Sum pooling accumulates into wider elements; capacity checks
        // use the buffer's own element width.
        let r = d.attach_buffers(
            OffsetBuffer::new(1, 0, 256, ElemType::I8),
            OffsetBuffer::new(1, 256, 64, ElemType::I32),
        );
        assert!(matches!(
            r,
            Err(CompileError::BufferTooSmall {
                role: "output",
                expected: 256,
                actual: 64,
                ..
            })
        ));
    }
}
