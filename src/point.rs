// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time state of a single coordinate on the complex plane.

use num::Complex;

/// A coordinate together with the progress made iterating `z = z² + c`
/// on it.  The iterate is kept so that a later call with a higher
/// limit picks up where the last one stopped.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    coordinate: Complex<f64>,
    z: Complex<f64>,
    iterations: u32,
}

impl Point {
    /// A fresh point at `coordinate`, with no iterations performed.
    pub fn new(coordinate: Complex<f64>) -> Self {
        Point {
            coordinate,
            z: Complex::new(0.0, 0.0),
            iterations: 0,
        }
    }

    /// Iterate until the point escapes the radius-2 disc or
    /// `max_iterations` have been performed in total.  Calling this
    /// again with the same or a smaller limit does nothing.
    pub fn compute(&mut self, max_iterations: u32) {
        let c = self.coordinate;
        let mut z = self.z;
        let mut iterations = self.iterations;

        while z.norm_sqr() < 4.0 && iterations < max_iterations {
            iterations += 1;
            z = z * z + c;
        }

        self.z = z;
        self.iterations = iterations;
    }

    /// The coordinate on the complex plane.
    pub fn coordinate(&self) -> Complex<f64> {
        self.coordinate
    }

    /// Number of iterations performed so far.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// True once the iterate has left the escape radius.
    pub fn diverges(&self) -> bool {
        self.z.norm_sqr() >= 4.0
    }
}
