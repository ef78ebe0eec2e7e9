// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Zero-point encoding shared by the quantized operators.

use tensor_core::HostBuffer;

use crate::CompileError;

/// Encodes a vector of zero points and decides the quantization axis.
///
/// One element means per-tensor quantization (axis -1); exactly
/// `channel_len` elements means per-channel quantization along
/// `channel_axis`; anything else is a shape mismatch. Values are widened
/// from `i8` to the `i16` the accumulation paths subtract at.
pub fn encode_zero_points(
    op: &'static str,
    zeropts: &HostBuffer,
    channel_axis: i32,
    channel_len: u32,
) -> Result<(HostBuffer, i32), CompileError> {
    let n = zeropts.len_elems();
    let quant_axis = if n == 1 {
        -1
    } else if n == channel_len {
        channel_axis
    } else {
        return Err(CompileError::ShapeMismatch {
            op,
            detail: format!("{n} zero points for a channel extent of {channel_len}"),
        });
    };

    if zeropts.elem_type() != tensor_core::ElemType::I8 {
        return Err(CompileError::NotSupported {
            op,
            elem_size: zeropts.elem_type().size_bytes(),
        });
    }
    let widened: Vec<i16> = zeropts.as_i8().iter().map(|&v| v as i16).collect();
    Ok((HostBuffer::from_i16(&widened), quant_axis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::layout::PER_TENSOR_QUANT_AXIS;

    #[test]
    fn test_per_tensor_single_zero_point() {
        let zp = HostBuffer::from_i8(&[-5]);
        let (enc, axis) = encode_zero_points("conv2d", &zp, 3, 16).unwrap();
        assert_eq!(axis, PER_TENSOR_QUANT_AXIS);
        assert_eq!(enc.as_i16(), &[-5i16]);
    }

    #[test]
    fn test_per_channel_zero_points() {
        let zp = HostBuffer::from_i8(&[1, -2, 3]);
        let (enc, axis) = encode_zero_points("conv2d", &zp, 3, 3).unwrap();
        assert_eq!(axis, 3);
        assert_eq!(enc.as_i16(), &[1i16, -2, 3]);
    }

    #[test]
    fn test_wrong_length_is_shape_mismatch() {
        let zp = HostBuffer::from_i8(&[1, 2]);
        let r = encode_zero_points("conv2d", &zp, 3, 16);
        assert!(matches!(r, Err(CompileError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_wide_input_not_supported() {
        let zp = HostBuffer::from_i32(&[1]);
        let r = encode_zero_points("conv2d", &zp, 3, 1);
        assert!(matches!(
            r,
            Err(CompileError::NotSupported { elem_size: 4, .. })
        ));
    }
}
