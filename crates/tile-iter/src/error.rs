// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for schedule construction and validation.

use thiserror::Error;

/// Errors produced while building or validating an [`crate::IteratorCfg`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CfgError {
    #[error("regular tile size on axis {axis} is zero")]
    ZeroTileSize { axis: u32 },

    #[error("a tile size on axis {axis} exceeds the tensor extent")]
    TileExceedsExtent { axis: u32 },

    #[error("increments on axis {axis} do not sum to zero over a full traversal")]
    NotRestartable { axis: u32 },

    #[error("tiles on axis {axis} do not reconstruct the full extent")]
    CoverageMismatch { axis: u32 },
}
