// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The tile cursor: a tensor plus a schedule plus the current position.

use tensor_core::{
    DeviceBuffer, MemRegions, NoBuffer, OffsetBuffer, Tensor, TensorBuffer, TensorError,
};

use crate::IteratorCfg;

/// Walks a tensor tile by tile according to an [`IteratorCfg`].
///
/// The iterator owns its shape description and schedule but never the
/// underlying storage bytes. [`advance`](TensorIterator::advance) moves
/// the cursor one tile along the innermost slot, carrying into outer
/// slots when a slot's count wraps; a full traversal leaves the cursor
/// back at the origin, so the iterator is restartable without
/// reconstruction.
#[derive(Debug, Clone)]
pub struct TensorIterator<B, const R: usize> {
    full: Tensor<B, R>,
    cfg: IteratorCfg<R>,
    offset: i32,
    pos: [i32; R],
    tile_idx: [i32; R],
}

impl<B: TensorBuffer, const R: usize> TensorIterator<B, R> {
    /// Single-tile iterator over the whole tensor.
    pub fn new(tensor: Tensor<B, R>) -> Self {
        let cfg = IteratorCfg::single_tile(&tensor);
        Self::with_cfg(tensor, cfg)
    }

    /// Iterator with an explicit schedule.
    pub fn with_cfg(tensor: Tensor<B, R>, cfg: IteratorCfg<R>) -> Self {
        Self {
            full: tensor,
            cfg,
            offset: 0,
            pos: [0; R],
            tile_idx: [0; R],
        }
    }

    /// Returns the cursor to the first tile.
    pub fn reset(&mut self) {
        self.pos = [0; R];
        self.tile_idx = [0; R];
        self.offset = 0;
    }

    /// Moves to the next tile. Returns `true` when the traversal has
    /// completed and the cursor has wrapped back to the origin.
    pub fn advance(&mut self) -> bool {
        // Completion is a wrap of the outermost slot that iterates an
        // axis; trailing unused slots never wrap.
        let Some(outer) = (0..R).rev().find(|&r| self.cfg.order(r) >= 0) else {
            return true;
        };
        let mut done = false;
        for r in 0..R {
            let dim = self.cfg.order(r);
            if dim < 0 {
                continue;
            }
            let stride = self.full.stride(dim as usize);
            if self.tile_idx[r] == self.cfg.count(r) - 1 {
                // Last tile on this slot: wrap and carry outward.
                self.pos[r] += self.cfg.last_inc(r);
                self.offset += self.cfg.last_inc(r) * stride;
                self.tile_idx[r] = 0;
                if r == outer {
                    done = true;
                }
            } else {
                let inc = if self.tile_idx[r] == 0 {
                    self.cfg.first_inc(r)
                } else {
                    self.cfg.inc(r)
                };
                self.pos[r] += inc;
                self.offset += inc * stride;
                self.tile_idx[r] += 1;
                break;
            }
        }
        done
    }

    /// The current tile as a tensor sharing this iterator's buffer.
    ///
    /// Extents come from the schedule's first/regular/last size for each
    /// slot depending on its tile index; axes no slot iterates keep their
    /// full extent.
    pub fn sub_tensor(&self) -> Tensor<B, R> {
        let mut pos = [0u32; R];
        let mut size = *self.full.shape();
        for r in 0..R {
            let dim = self.cfg.order(r);
            if dim < 0 {
                continue;
            }
            let dim = dim as usize;
            debug_assert!(self.pos[r] >= 0, "cursor before axis origin on slot {r}");
            pos[dim] = self.pos[r] as u32;
            size[dim] = if self.tile_idx[r] == self.cfg.count(r) - 1 {
                self.cfg.last_size(r)
            } else if self.tile_idx[r] == 0 {
                self.cfg.first_size(r)
            } else {
                self.cfg.size(r)
            };
        }
        self.full.slice(&pos, &size)
    }

    /// True if the slot iterating `axis` is on its first tile.
    pub fn is_first_tile(&self, axis: usize) -> bool {
        self.slot_of_axis(axis)
            .map(|r| self.tile_idx[r] == 0)
            .unwrap_or(true)
    }

    /// True if the slot iterating `axis` is on its last tile.
    pub fn is_last_tile(&self, axis: usize) -> bool {
        self.slot_of_axis(axis)
            .map(|r| self.tile_idx[r] == self.cfg.count(r) - 1)
            .unwrap_or(true)
    }

    /// Current cursor coordinate along `axis`; 0 when no slot iterates it.
    pub fn axis_pos(&self, axis: usize) -> i32 {
        self.slot_of_axis(axis).map(|r| self.pos[r]).unwrap_or(0)
    }

    fn slot_of_axis(&self, axis: usize) -> Option<usize> {
        (0..R).find(|&r| self.cfg.order(r) == axis as i32)
    }

    /// Accumulated element offset of the cursor from the tensor origin.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Extent of axis `d` of the full tensor.
    pub fn dim(&self, d: usize) -> u32 {
        self.full.dim(d)
    }

    /// The full tensor being iterated.
    pub fn tensor(&self) -> &Tensor<B, R> {
        &self.full
    }

    /// The schedule.
    pub fn cfg(&self) -> &IteratorCfg<R> {
        &self.cfg
    }

    /// Replaces the buffer, keeping shape, schedule and cursor.
    pub fn set_buf(&mut self, buf: B) {
        self.full.set_buf(buf);
    }
}

impl<const R: usize> TensorIterator<NoBuffer, R> {
    /// Binds a buffer, moving the iterated tensor to the next protocol
    /// state. The cursor starts at the origin.
    pub fn attach<B: TensorBuffer>(&self, buf: B) -> TensorIterator<B, R> {
        TensorIterator::with_cfg(self.full.attach(buf), self.cfg)
    }
}

impl<const R: usize> TensorIterator<OffsetBuffer, R> {
    /// Resolves the iterated tensor's buffer against the device region
    /// table. The cursor starts at the origin.
    pub fn resolve(
        &self,
        regions: &MemRegions<'_>,
    ) -> Result<TensorIterator<DeviceBuffer, R>, TensorError> {
        Ok(TensorIterator::with_cfg(
            self.full.resolve(regions)?,
            self.cfg,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_core::ElemType;

    fn tiled_iter() -> TensorIterator<NoBuffer, 4> {
        // Height 10 split into tiles of 3,3,3,1; everything else whole.
        let t = Tensor::shaped_contiguous([1, 10, 10, 3], 4).unwrap();
        let cfg =
            IteratorCfg::for_tiling(&t, &[1, 3, 10, 3], &[1, 3, 10, 3], &[0, 1, 2, 3]).unwrap();
        TensorIterator::with_cfg(t, cfg)
    }

    #[test]
    fn test_advance_completes_and_wraps() {
        let mut it = tiled_iter();
        assert_eq!(it.cfg().count(1), 4);
        // Three advances stay inside the traversal, the fourth completes it.
        assert!(!it.advance());
        assert!(!it.advance());
        assert!(!it.advance());
        assert!(it.advance());
        // Restartable: cursor is back at the origin.
        assert_eq!(it.offset(), 0);
        assert_eq!(it.sub_tensor().offset(), 0);
        assert_eq!(it.sub_tensor().dim(1), 3);
    }

    #[test]
    fn test_tile_extents_first_middle_last() {
        let mut it = tiled_iter();
        let mut heights = Vec::new();
        let mut offsets = Vec::new();
        loop {
            let tile = it.sub_tensor();
            heights.push(tile.dim(1));
            offsets.push(tile.offset());
            if it.advance() {
                break;
            }
        }
        assert_eq!(heights, vec![3, 3, 3, 1]);
        // Row stride of the full tensor is 30 elements.
        assert_eq!(offsets, vec![0, 90, 180, 270]);
        // Extents along the tiled axis reconstruct the full extent.
        assert_eq!(heights.iter().sum::<u32>(), 10);
    }

    #[test]
    fn test_two_axis_carry_order() {
        // 4x6 tensor, 2-row by 3-column tiles, columns innermost.
        let t = Tensor::<NoBuffer, 2>::shaped_contiguous([4, 6], 2).unwrap();
        let cfg = IteratorCfg::for_tiling(&t, &[2, 3], &[2, 3], &[1, 0]).unwrap();
        let mut it = TensorIterator::with_cfg(t, cfg);
        let mut visited = Vec::new();
        loop {
            let tile = it.sub_tensor();
            visited.push(tile.offset());
            if it.advance() {
                break;
            }
        }
        // Column tiles advance first, then the row axis carries.
        assert_eq!(visited, vec![0, 3, 12, 15]);
    }

    #[test]
    fn test_advance_with_unused_trailing_slots() {
        // Only the height axis is iterated; slots 1..4 are unused, so
        // completion comes from slot 0's wrap.
        let t = Tensor::<NoBuffer, 4>::shaped_contiguous([1, 10, 10, 3], 4).unwrap();
        let cfg =
            IteratorCfg::for_tiling(&t, &[1, 4, 10, 3], &[1, 3, 10, 3], &[1, -1, -1, -1]).unwrap();
        let mut it = TensorIterator::with_cfg(t, cfg);
        let mut heights = Vec::new();
        let mut completed = false;
        for _ in 0..8 {
            heights.push(it.sub_tensor().dim(1));
            if it.advance() {
                completed = true;
                break;
            }
        }
        assert!(completed, "traversal never signaled completion");
        assert_eq!(heights, vec![4, 3, 3]);
        assert_eq!(it.offset(), 0);
    }

    #[test]
    fn test_first_last_tile_flags() {
        let mut it = tiled_iter();
        assert!(it.is_first_tile(1));
        assert!(!it.is_last_tile(1));
        it.advance();
        assert!(!it.is_first_tile(1));
        it.advance();
        it.advance();
        assert!(it.is_last_tile(1));
        // Untiled axes are trivially both first and last.
        assert!(it.is_first_tile(2) && it.is_last_tile(2));
    }

    #[test]
    fn test_reset() {
        let mut it = tiled_iter();
        it.advance();
        it.advance();
        assert_ne!(it.offset(), 0);
        it.reset();
        assert_eq!(it.offset(), 0);
        assert_eq!(it.sub_tensor().dim(1), 3);
    }

    #[test]
    fn test_attach_then_resolve_preserves_schedule() {
        let it = tiled_iter();
        let bound = it.attach(OffsetBuffer::new(1, 0, 300, ElemType::I8));
        let bases = [0u64, 0x2000];
        let regions = MemRegions::new(&bases);
        let dev = bound.resolve(&regions).unwrap();
        assert_eq!(dev.cfg(), it.cfg());
        assert_eq!(dev.tensor().buf().addr(), 0x2000);
    }
}
