// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compile-time descriptor for requantization.
//!
//! Rescale maps accumulator-domain values into the output quantization:
//! `out = ((in - in_bias) * scale >> shift) + out_bias`, with one
//! parameter tuple per tensor or per slice along a chosen axis. The four
//! parameter vectors are staged into one contiguous buffer field by
//! field: all 4-byte input biases, then all 2-byte scales, then all
//! 1-byte shifts, then all 1-byte output biases. Per-slice runtimes can
//! then window each field with a plain base-plus-offset.

use tensor_core::{HostBuffer, NoBuffer, OffsetBuffer};
use tile_iter::{PackedIterator, TensorIterator};

use crate::{
    blob::{BlobHeader, KernelId, RescalePrivateData},
    config::RescaleConfig,
    conv2d::check_capacity,
    CompileError,
};

const OP: &str = "rescale";

/// Bytes one parameter tuple occupies in the encoded buffer.
pub const PARAM_TUPLE_BYTES: u32 = 4 + 2 + 1 + 1;

/// Compile-side rescale descriptor.
pub struct RescaleDescriptor {
    input: TensorIterator<OffsetBuffer, 4>,
    output: TensorIterator<OffsetBuffer, 4>,
    config: RescaleConfig,
    params_elem_num: u32,
    params: OffsetBuffer,
    attached: bool,
}

impl RescaleDescriptor {
    pub fn new(
        input: &TensorIterator<NoBuffer, 4>,
        config: RescaleConfig,
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
        if config.axis >= 4 {
            return Err(CompileError::ShapeMismatch {
                op: OP,
                detail: format!("rescale axis {} out of range", config.axis),
            });
        }
        let params_elem_num = if config.axis < 0 {
            1
        } else {
            input.dim(config.axis as usize)
        };
        Ok(Self {
            input: input.attach(OffsetBuffer::default()),
            output: output.attach(OffsetBuffer::default()),
            config,
            params_elem_num,
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

    /// Parameter tuples this descriptor carries (1 for per-tensor).
    pub fn params_elem_num(&self) -> u32 {
        self.params_elem_num
    }

    /// Size of the encoded parameter buffer, in bytes.
    pub fn encoded_params_size(&self) -> u32 {
        self.params_elem_num * PARAM_TUPLE_BYTES
    }

    /// Stages the four parameter vectors field-major into one buffer.
    pub fn encode_params(
        &self,
        in_bias: &HostBuffer,
        scale: &HostBuffer,
        shift: &HostBuffer,
        out_bias: &HostBuffer,
    ) -> Result<HostBuffer, CompileError> {
        use tensor_core::ElemType;
        let n = self.params_elem_num;
        for (role, buf, elem) in [
            ("in_bias", in_bias, ElemType::I32),
            ("scale", scale, ElemType::I16),
            ("shift", shift, ElemType::I8),
            ("out_bias", out_bias, ElemType::I8),
        ] {
            if buf.elem_type() != elem {
                return Err(CompileError::NotSupported {
                    op: OP,
                    elem_size: buf.elem_type().size_bytes(),
                });
            }
            if buf.len_elems() != n {
                return Err(CompileError::ShapeMismatch {
                    op: OP,
                    detail: format!("{role} holds {} tuples, expected {n}", buf.len_elems()),
                });
            }
        }
        let mut bytes = Vec::with_capacity(self.encoded_params_size() as usize);
        for &v in in_bias.as_i32() {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        for &v in scale.as_i16() {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        for &v in shift.as_i8() {
            bytes.push(v as u8);
        }
        for &v in out_bias.as_i8() {
            bytes.push(v as u8);
        }
        Ok(HostBuffer::from_raw(bytes))
    }

    pub fn attach_buffers(
        &mut self,
        input: OffsetBuffer,
        output: OffsetBuffer,
        encoded_params: OffsetBuffer,
    ) -> Result<(), CompileError> {
        check_capacity(OP, "input", &input, self.input_buffer_size())?;
        check_capacity(OP, "output", &output, self.output_buffer_size())?;
        if encoded_params.size < self.encoded_params_size() {
            return Err(CompileError::BufferTooSmall {
                op: OP,
                role: "params",
                expected: self.encoded_params_size(),
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
        std::mem::size_of::<RescalePrivateData>()
    }

    pub fn private_data(&self) -> Result<RescalePrivateData, CompileError> {
        if !self.attached {
            return Err(CompileError::BuffersNotAttached { op: OP });
        }
        // Widest per-tile parameter window along the rescale axis. Zero
        // increments mean the axis is untiled and the whole vector is
        // needed at once.
        let mut tile_params_max = self.params_elem_num;
        if self.config.axis >= 0 {
            let cfg = self.input.cfg();
            for slot in 0..4 {
                if cfg.order(slot) == self.config.axis {
                    let m = cfg.first_inc(slot).max(cfg.inc(slot));
                    if m > 0 {
                        tile_params_max = m as u32;
                    }
                }
            }
        }
        Ok(RescalePrivateData {
            header: BlobHeader::new(KernelId::Rescale, self.private_data_size()),
            input: PackedIterator::pack(&self.input),
            output: PackedIterator::pack(&self.output),
            params: self.params,
            params_elem_num: self.params_elem_num,
            rescale_axis: self.config.axis,
            tile_params_max_elem_num: tile_params_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::{layout::CHANNEL_DIM, ElemType, Tensor};
    use tile_iter::IteratorCfg;

    fn no_tiling(shape: [u32; 4]) -> TensorIterator<NoBuffer, 4> {
        TensorIterator::new(Tensor::shaped_contiguous(shape, 4).unwrap())
    }

    fn per_channel() -> RescaleDescriptor {
        RescaleDescriptor::new(
            &no_tiling([1, 4, 4, 3]),
            RescaleConfig {
                axis: CHANNEL_DIM as i32,
            },
            &no_tiling([1, 4, 4, 3]),
        )
        .unwrap()
    }

    #[test]
    fn test_params_elem_num() {
        assert_eq!(per_channel().params_elem_num(), 3);
        let per_tensor = RescaleDescriptor::new(
            &no_tiling([1, 4, 4, 3]),
            RescaleConfig { axis: -1 },
            &no_tiling([1, 4, 4, 3]),
        )
        .unwrap();
        assert_eq!(per_tensor.params_elem_num(), 1);
        assert_eq!(per_tensor.encoded_params_size(), PARAM_TUPLE_BYTES);
    }

    #[test]
    fn test_encode_params_field_major() {
        let d = per_channel();
        let enc = d
            .encode_params(
                &HostBuffer::from_i32(&[0x0101_0101, 0x0202_0202, 0x0303_0303]),
                &HostBuffer::from_i16(&[0x1111, 0x2222, 0x3333]),
                &HostBuffer::from_i8(&[7, 8, 9]),
                &HostBuffer::from_i8(&[-1, -2, -3]),
            )
            .unwrap();
        let bytes = enc.as_bytes();
        assert_eq!(bytes.len() as u32, d.encoded_params_size());
        // All biases first, then scales, then shifts, then out-biases.
        assert_eq!(&bytes[0..4], &0x0101_0101i32.to_ne_bytes());
        assert_eq!(&bytes[8..12], &0x0303_0303i32.to_ne_bytes());
        assert_eq!(&bytes[12..14], &0x1111i16.to_ne_bytes());
        assert_eq!(bytes[18], 7);
        assert_eq!(bytes[21], (-1i8) as u8);
        assert_eq!(bytes[23], (-3i8) as u8);
    }

    #[test]
    fn test_encode_params_length_checked() {
        let d = per_channel();
        let r = d.encode_params(
            &HostBuffer::from_i32(&[1, 2]),
            &HostBuffer::from_i16(&[1, 2, 3]),
            &HostBuffer::from_i8(&[1, 2, 3]),
            &HostBuffer::from_i8(&[1, 2, 3]),
        );
        assert!(matches!(r, Err(CompileError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_tile_params_window() {
        // Channel axis tiled 2+1: the runtime needs at most 2 tuples at
        // a time.
        let t = Tensor::<NoBuffer, 4>::shaped_contiguous([1, 4, 4, 3], 4).unwrap();
        let cfg =
            IteratorCfg::for_tiling(&t, &[1, 4, 4, 2], &[1, 4, 4, 2], &[3, 0, 1, 2]).unwrap();
        let it = TensorIterator::with_cfg(t, cfg);
        let mut d = RescaleDescriptor::new(
            &it,
            RescaleConfig {
                axis: CHANNEL_DIM as i32,
            },
            &it,
        )
        .unwrap();
        d.attach_buffers(
            OffsetBuffer::new(1, 0, 48, ElemType::I8),
            OffsetBuffer::new(1, 48, 48, ElemType::I8),
            OffsetBuffer::new(2, 0, 24, ElemType::I8),
        )
        .unwrap();
        let prv = d.private_data().unwrap();
        assert_eq!(prv.params_elem_num, 3);
        assert_eq!(prv.tile_params_max_elem_num, 2);
    }
}
