// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Private-data blob validation and decoding.

use bytemuck::Pod;
use kernel_compiler::{BlobHeader, KernelId};

use crate::ExecError;

/// Reads the leading header without assuming the rest of the record.
pub(crate) fn peek_header(bytes: &[u8]) -> Result<BlobHeader, ExecError> {
    let hdr_size = std::mem::size_of::<BlobHeader>();
    if bytes.len() < hdr_size {
        return Err(ExecError::BlobSizeMismatch {
            expected: hdr_size as u32,
            actual: bytes.len() as u32,
        });
    }
    Ok(bytemuck::pod_read_unaligned(&bytes[..hdr_size]))
}

/// Decodes a full record, validating both the byte count and the
/// header's identity and recorded size. The copy tolerates unaligned
/// input; loaders place blobs at arbitrary offsets.
pub(crate) fn decode<T: Pod>(bytes: &[u8], expected: KernelId) -> Result<T, ExecError> {
    let expected_size = std::mem::size_of::<T>() as u32;
    if bytes.len() as u32 != expected_size {
        return Err(ExecError::BlobSizeMismatch {
            expected: expected_size,
            actual: bytes.len() as u32,
        });
    }
    let header = peek_header(bytes)?;
    if header.kernel_id != expected.as_tag() {
        return Err(ExecError::BlobIdMismatch {
            expected: expected.as_tag(),
            actual: header.kernel_id,
        });
    }
    if header.size != expected_size {
        return Err(ExecError::BlobSizeMismatch {
            expected: expected_size,
            actual: header.size,
        });
    }
    Ok(bytemuck::pod_read_unaligned(bytes))
}
