// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for tile traversal.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tensor_core::{NoBuffer, Tensor};
use tile_iter::{IteratorCfg, TensorIterator};

fn bench_full_traversal(c: &mut Criterion) {
    let t = Tensor::<NoBuffer, 4>::shaped_contiguous([1, 224, 224, 64], 4).unwrap();
    let cfg =
        IteratorCfg::for_tiling(&t, &[1, 8, 8, 64], &[1, 8, 8, 64], &[0, 1, 2, 3]).unwrap();
    c.bench_function("traverse_224x224_8x8_tiles", |b| {
        let mut it = TensorIterator::with_cfg(t.clone(), cfg);
        b.iter(|| {
            let mut tiles = 0u32;
            loop {
                black_box(it.sub_tensor());
                tiles += 1;
                if it.advance() {
                    break;
                }
            }
            tiles
        })
    });
}

criterion_group!(benches, bench_full_traversal);
criterion_main!(benches);
