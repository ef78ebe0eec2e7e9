// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # kernel-runtime
//!
//! The run side of the two-phase kernel protocol.
//!
//! A loader receives opaque private-data blobs and, once the device's
//! memory regions are known, a table of region base addresses. The
//! [`KernelFactory`] turns each blob into a [`RuntimeKernel`] with every
//! buffer resolved to an absolute address; execution then follows the
//! tile loop:
//!
//! ```text
//!  loop {
//!      kernel.prefetch()?;            // hook for double-buffering
//!      kernel.issue(&mut backend)?;   // run the current tile
//!      if kernel.update() { break }   // advance all cursors
//!  }
//! ```
//!
//! Arithmetic lives behind the [`TileBackend`] trait; this crate never
//! dereferences a device address itself.

mod backend;
mod decode;
mod error;
mod factory;
mod kernels;

pub use backend::{
    ClipTile, Conv2dTile, EltwiseTile, ParamSlice, PoolTile, ReduceTile, RescaleTile,
    TileBackend, TilePadding, TileView,
};
pub use error::ExecError;
pub use factory::{KernelFactory, RuntimeKernel};
pub use kernels::{Clip, Conv2d, EltwiseAdd, Pool2d, ReduceMax, Rescale};
