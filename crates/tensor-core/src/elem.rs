// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-point element types.

/// Enumerates the element types a [`crate::Tensor`] can hold.
///
/// The kernel set is fixed-point only: i8 activations/weights, i16 widened
/// zero points, i32 accumulators and biases. Floating point is out of scope
/// for this runtime by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ElemType {
    /// 8-bit signed integer (quantized activations and weights).
    I8,
    /// 16-bit signed integer (widened zero points, fx16 feature maps).
    I16,
    /// 32-bit signed integer (accumulators and biases).
    I32,
}

impl ElemType {
    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> u32 {
        match self {
            ElemType::I8 => 1,
            ElemType::I16 => 2,
            ElemType::I32 => 4,
        }
    }

    /// Reconstructs an element type from its byte width.
    ///
    /// Private-data blobs store element widths, not type tags; this is
    /// the inverse mapping. Returns `None` for widths that have no
    /// fixed-point type.
    pub fn from_size_bytes(size: u32) -> Option<Self> {
        match size {
            1 => Some(ElemType::I8),
            2 => Some(ElemType::I16),
            4 => Some(ElemType::I32),
            _ => None,
        }
    }

    /// Returns a human-readable label for this element type.
    pub fn as_str(self) -> &'static str {
        match self {
            ElemType::I8 => "i8",
            ElemType::I16 => "i16",
            ElemType::I32 => "i32",
        }
    }
}

impl std::fmt::Display for ElemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bytes() {
        assert_eq!(ElemType::I8.size_bytes(), 1);
        assert_eq!(ElemType::I16.size_bytes(), 2);
        assert_eq!(ElemType::I32.size_bytes(), 4);
    }

    #[test]
    fn test_from_size_roundtrip() {
        for t in [ElemType::I8, ElemType::I16, ElemType::I32] {
            assert_eq!(ElemType::from_size_bytes(t.size_bytes()), Some(t));
        }
        assert_eq!(ElemType::from_size_bytes(8), None);
        assert_eq!(ElemType::from_size_bytes(0), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ElemType::I32), "i32");
    }

    #[test]
    fn test_serde_roundtrip() {
        let json = serde_json::to_string(&ElemType::I16).unwrap();
        let back: ElemType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ElemType::I16);
    }
}
