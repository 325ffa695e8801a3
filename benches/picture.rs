// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#[macro_use]
extern crate criterion;

use criterion::Criterion;
use mandelbrot::{Area, Cancellation, Picture};
use num::Complex;

fn complex_area(c: &mut Criterion) {
    c.bench_function("complex area 1060x730", |b| {
        b.iter(|| {
            let mut area = Area::new(
                Complex::new(-1.401854499759, -0.000743603637),
                Complex::new(-1.399689899172, 0.000743603637),
                1060,
                730,
                3534,
            );
            area.init();
            area.calculate();
        })
    });
}

fn picture_workers(c: &mut Criterion) {
    c.bench_function_over_inputs(
        "picture 106x73 tiles by workers",
        |b, &workers| {
            b.iter(|| {
                let mut picture = Picture::new(
                    Complex::new(-1.401854499759, -0.000743603637),
                    0.00021646,
                    106,
                    73,
                    10,
                    3534,
                );
                picture.init();
                picture.calculate(&Cancellation::new(), workers, |_| {}).unwrap();
            })
        },
        vec![1, 2, 4, 8],
    );
}

fn picture_chunks(c: &mut Criterion) {
    // Same 1024x1024 image, split into ever larger tiles.
    c.bench_function_over_inputs(
        "picture 1024px by tile size",
        |b, &chunk| {
            let chunks = 1024 / chunk;
            b.iter(|| {
                let mut picture = Picture::new(
                    Complex::new(-1.401854499759, -0.000743603637),
                    0.00021646 * chunk as f64,
                    chunks,
                    chunks,
                    chunk,
                    3534,
                );
                picture.init();
                picture.calculate(&Cancellation::new(), num_cpus::get(), |_| {}).unwrap();
            })
        },
        vec![4, 16, 64, 256, 1024],
    );
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = complex_area, picture_workers, picture_chunks
}
criterion_main!(benches);
