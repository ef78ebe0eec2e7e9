// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tile-iter
//!
//! Tiling schedules and tile iteration over strided tensors.
//!
//! Operators on memory-constrained accelerators rarely see a whole
//! tensor at once; they see a sequence of hardware-sized tiles. This
//! crate turns a full-shape [`tensor_core::Tensor`] plus a per-axis
//! schedule ([`IteratorCfg`]) into that sequence ([`TensorIterator`]),
//! with asymmetric first and last tiles for padding overlap and
//! non-divisible extents:
//!
//! ```text
//!  axis extent 10, first tile 4, regular 3
//!  ┌────────┬──────┬──────┐
//!  │ first 4│ mid 3│last 3│      increments: +4, +3, -7
//!  └────────┴──────┴──────┘      (sum = 0: the cursor wraps to origin)
//! ```
//!
//! Schedules are restartable by construction: a completed traversal
//! leaves the cursor at the origin, so the same iterator drives the next
//! inference pass without reconstruction.
//!
//! # Example
//! ```
//! use tensor_core::{NoBuffer, Tensor};
//! use tile_iter::{IteratorCfg, TensorIterator};
//!
//! let t = Tensor::<NoBuffer, 4>::shaped_contiguous([1, 10, 10, 3], 4).unwrap();
//! let cfg = IteratorCfg::for_tiling(&t, &[1, 4, 10, 3], &[1, 3, 10, 3], &[0, 1, 2, 3]).unwrap();
//! let mut it = TensorIterator::with_cfg(t, cfg);
//! loop {
//!     let tile = it.sub_tensor();
//!     assert!(tile.dim(1) <= 4);
//!     if it.advance() {
//!         break;
//!     }
//! }
//! ```

mod cfg;
mod error;
mod iter;
mod pack;

pub use cfg::IteratorCfg;
pub use error::CfgError;
pub use iter::TensorIterator;
pub use pack::{PackedIterCfg, PackedIterator};
