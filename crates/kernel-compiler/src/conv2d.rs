// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compile-time descriptor for 2D convolution.
//!
//! Input and output are BHWC rank-4 tensors; weights are HWCinCout.
//! The descriptor validates channel compatibility up front, answers
//! worst-case buffer-size queries for the memory planner, encodes
//! weights and zero points into their staged forms, and finally
//! serializes everything into a [`Conv2dPrivateData`] record.

use tensor_core::{
    layout::{BATCH_DIM, CHANNEL_DIM, WEIGHT_CIN_DIM, WEIGHT_COUT_DIM},
    HostBuffer, NoBuffer, OffsetBuffer, Tensor,
};
use tile_iter::{PackedIterator, TensorIterator};

use crate::{
    blob::{BlobHeader, Conv2dPrivateData, KernelId},
    config::Conv2dConfig,
    quant, CompileError,
};

const OP: &str = "conv2d";

/// Compile-side convolution descriptor.
pub struct Conv2dDescriptor {
    input: TensorIterator<OffsetBuffer, 4>,
    weights: Tensor<OffsetBuffer, 4>,
    output: TensorIterator<OffsetBuffer, 4>,
    config: Conv2dConfig,
    inp_zp: OffsetBuffer,
    wts_zp: OffsetBuffer,
    inp_quant_axis: i32,
    wts_quant_axis: i32,
    attached: bool,
}

impl Conv2dDescriptor {
    /// Validates shapes and builds the descriptor.
    ///
    /// The input iterator's schedule must already account for the kernel
    /// aperture (see [`tile_iter::IteratorCfg::with_aperture`]); the
    /// descriptor checks channel agreement, not tiling agreement.
    pub fn new(
        input: &TensorIterator<NoBuffer, 4>,
        weights: &Tensor<NoBuffer, 4>,
        config: Conv2dConfig,
        output: &TensorIterator<NoBuffer, 4>,
    ) -> Result<Self, CompileError> {
        if config.groups != 1 {
            return Err(CompileError::ShapeMismatch {
                op: OP,
                detail: format!("grouped convolution ({} groups) not supported", config.groups),
            });
        }
        if input.dim(BATCH_DIM) != 1 {
            return Err(CompileError::ShapeMismatch {
                op: OP,
                detail: format!("batch extent must be 1, got {}", input.dim(BATCH_DIM)),
            });
        }
        if weights.dim(WEIGHT_CIN_DIM) != input.dim(CHANNEL_DIM) {
            return Err(CompileError::ShapeMismatch {
                op: OP,
                detail: format!(
                    "weights expect {} input channels, input has {}",
                    weights.dim(WEIGHT_CIN_DIM),
                    input.dim(CHANNEL_DIM)
                ),
            });
        }
        if weights.dim(WEIGHT_COUT_DIM) != output.dim(CHANNEL_DIM) {
            return Err(CompileError::ShapeMismatch {
                op: OP,
                detail: format!(
                    "weights produce {} channels, output has {}",
                    weights.dim(WEIGHT_COUT_DIM),
                    output.dim(CHANNEL_DIM)
                ),
            });
        }
        tracing::debug!(
            in_shape = ?input.tensor().shape(),
            w_shape = ?weights.shape(),
            out_shape = ?output.tensor().shape(),
            "conv2d descriptor created"
        );
        Ok(Self {
            input: input.attach(OffsetBuffer::default()),
            weights: weights.attach(OffsetBuffer::default()),
            output: output.attach(OffsetBuffer::default()),
            config,
            inp_zp: OffsetBuffer::default(),
            wts_zp: OffsetBuffer::default(),
            inp_quant_axis: tensor_core::layout::PER_TENSOR_QUANT_AXIS,
            wts_quant_axis: tensor_core::layout::PER_TENSOR_QUANT_AXIS,
            attached: false,
        })
    }

    /// Worst-case input storage, in elements.
    pub fn input_buffer_size(&self) -> u32 {
        self.input.tensor().footprint_elems()
    }

    /// Weights storage, in elements.
    pub fn weights_buffer_size(&self) -> u32 {
        self.weights.footprint_elems()
    }

    /// Worst-case output storage, in elements.
    pub fn output_buffer_size(&self) -> u32 {
        self.output.tensor().footprint_elems()
    }

    /// Encoded input zero-point count, in elements.
    pub fn encoded_inp_zp_size(&self) -> u32 {
        // Input quantization is per-tensor.
        1
    }

    /// Encoded weights zero-point count, in elements.
    pub fn encoded_wts_zp_size(&self) -> u32 {
        self.weights.dim(WEIGHT_COUT_DIM)
    }

    /// Stages weights for the device. Only 8-bit weights are supported.
    pub fn encode_weights(&self, weights: &HostBuffer) -> Result<HostBuffer, CompileError> {
        if weights.elem_type() != tensor_core::ElemType::I8 {
            return Err(CompileError::NotSupported {
                op: OP,
                elem_size: weights.elem_type().size_bytes(),
            });
        }
        if weights.len_elems() != self.weights_buffer_size() {
            return Err(CompileError::ShapeMismatch {
                op: OP,
                detail: format!(
                    "{} weight elements staged, descriptor expects {}",
                    weights.len_elems(),
                    self.weights_buffer_size()
                ),
            });
        }
        // No compression on this target; staging is a straight copy.
        Ok(weights.clone())
    }

    /// Encodes input zero points and records the quantization axis.
    pub fn encode_inp_zero_points(
        &mut self,
        zeropts: &HostBuffer,
    ) -> Result<HostBuffer, CompileError> {
        let (enc, axis) = quant::encode_zero_points(
            OP,
            zeropts,
            CHANNEL_DIM as i32,
            self.input.dim(CHANNEL_DIM),
        )?;
        self.inp_quant_axis = axis;
        Ok(enc)
    }

    /// Encodes weights zero points and records the quantization axis.
    pub fn encode_wts_zero_points(
        &mut self,
        zeropts: &HostBuffer,
    ) -> Result<HostBuffer, CompileError> {
        let (enc, axis) = quant::encode_zero_points(
            OP,
            zeropts,
            WEIGHT_COUT_DIM as i32,
            self.weights.dim(WEIGHT_COUT_DIM),
        )?;
        self.wts_quant_axis = axis;
        Ok(enc)
    }

    /// Binds planner-assigned buffers to every role.
    ///
    /// Capacities are checked against the worst-case sizes; zero-point
    /// buffers may be empty when the operator runs without them.
    pub fn attach_buffers(
        &mut self,
        input: OffsetBuffer,
        output: OffsetBuffer,
        weights: OffsetBuffer,
        inp_zp: OffsetBuffer,
        wts_zp: OffsetBuffer,
    ) -> Result<(), CompileError> {
        check_capacity(OP, "input", &input, self.input_buffer_size())?;
        check_capacity(OP, "output", &output, self.output_buffer_size())?;
        check_capacity(OP, "weights", &weights, self.weights_buffer_size())?;
        self.input.set_buf(input);
        self.output.set_buf(output);
        self.weights.set_buf(weights);
        self.inp_zp = inp_zp;
        self.wts_zp = wts_zp;
        self.attached = true;
        Ok(())
    }

    /// Size of the private-data record, in bytes.
    pub fn private_data_size(&self) -> usize {
        std::mem::size_of::<Conv2dPrivateData>()
    }

    /// Serializes the descriptor state into its blob record.
    pub fn private_data(&self) -> Result<Conv2dPrivateData, CompileError> {
        if !self.attached {
            return Err(CompileError::BuffersNotAttached { op: OP });
        }
        Ok(Conv2dPrivateData {
            header: BlobHeader::new(KernelId::Conv2d, self.private_data_size()),
            input: PackedIterator::pack(&self.input),
            output: PackedIterator::pack(&self.output),
            weights: self.weights.pack(),
            inp_zp: self.inp_zp,
            wts_zp: self.wts_zp,
            inp_quant_axis: self.inp_quant_axis,
            wts_quant_axis: self.wts_quant_axis,
            config: self.config,
        })
    }
}

pub(crate) fn check_capacity(
    op: &'static str,
    role: &'static str,
    buf: &OffsetBuffer,
    elems: u32,
) -> Result<(), CompileError> {
    let expected = elems * buf.elem_size;
    if buf.size < expected {
        return Err(CompileError::BufferTooSmall {
            op,
            role,
            expected,
            actual: buf.size,
        });
    }
    Ok(())
}
