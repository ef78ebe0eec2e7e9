// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensor and buffer primitives for the two-phase (compile-time / runtime)
//! kernel protocol used by the tile-kernel workspace.
//!
//! This crate provides:
//! - [`ElemType`] — fixed-point element types (i8, i16, i32). No floats.
//! - The four buffer states a tensor moves through on its way to the device:
//!   [`NoBuffer`] (shape planning only), [`HostBuffer`] (real host-side
//!   bytes, used for parameter encoding), [`OffsetBuffer`] (a
//!   region-relative location assigned by the external memory planner,
//!   never dereferenceable), and [`DeviceBuffer`] (an absolute address,
//!   produced only by resolving an `OffsetBuffer` against a
//!   [`MemRegions`] table at runtime-object construction).
//! - [`Tensor`] — rank, extents and *signed, arbitrary* element strides
//!   bound to one buffer. Layouts are not assumed dense or row-major;
//!   channel-interleaved weight layouts are first-class.
//! - [`MemRegions`] — the externally supplied memory-region base-address
//!   table of a bank-addressed device.
//!
//! # Buffer-state transitions
//!
//! ```text
//! NoBuffer ──attach──► OffsetBuffer ──MemRegions::resolve──► DeviceBuffer
//!     │
//!     └────attach──► HostBuffer          (parameter staging, host side)
//! ```
//!
//! Each transition is a typed operation — there is no way to read through a
//! region-relative buffer or to fabricate an absolute address without a
//! region table. The compiler enforces the phase discipline the hardware
//! flow requires.

mod buffer;
mod elem;
mod error;
pub mod layout;
mod region;
mod tensor;

pub use buffer::{DeviceBuffer, HostBuffer, NoBuffer, OffsetBuffer, TensorBuffer};
pub use elem::ElemType;
pub use error::TensorError;
pub use region::MemRegions;
pub use tensor::{PackedTensor, Tensor, MAX_RANK};
