// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # kernel-compiler
//!
//! The compile side of the two-phase kernel protocol.
//!
//! A graph compiler builds one descriptor per operator invocation. The
//! descriptor validates shapes, answers worst-case buffer-size queries
//! so an external memory planner can place storage, encodes weights and
//! quantization parameters into their staged forms, accepts the
//! planner's region-relative buffer assignments, and finally serializes
//! its whole state into a fixed-layout private-data blob:
//!
//! ```text
//!  descriptor ──sizes──► memory planner
//!      ▲                     │
//!      └──attach_buffers─────┘
//!      │
//!      ▼
//!  private_data() ──blob──► loader ──► kernel-runtime
//! ```
//!
//! Nothing on this side ever touches a device address; buffers stay
//! region-relative until the runtime resolves them against the loaded
//! region table.

mod blob;
mod clip;
mod config;
mod conv2d;
mod eltwise;
mod error;
mod pool;
pub mod quant;
mod reduce;
mod rescale;

pub use blob::{
    BlobHeader, ClipPrivateData, Conv2dPrivateData, EltwisePrivateData, KernelId,
    PoolPrivateData, ReducePrivateData, RescalePrivateData,
};
pub use clip::{ClipDescriptor, CLIP_PARAMS_BYTES};
pub use config::{Conv2dConfig, PoolConfig, ReduceConfig, RescaleConfig};
pub use conv2d::Conv2dDescriptor;
pub use eltwise::AddDescriptor;
pub use error::CompileError;
pub use pool::PoolDescriptor;
pub use reduce::ReduceMaxDescriptor;
pub use rescale::{RescaleDescriptor, PARAM_TUPLE_BYTES};
