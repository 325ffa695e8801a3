// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An Area is a rectangular grid of points covering one region of
//! the complex plane, computed as a single unit of work.  Points are
//! stored row-major; `index_for` and `for_index` are the only
//! translation between grid coordinates and storage.

use itertools::iproduct;
use num::Complex;

use crate::planes::{Pixel, PlaneMapper};
use crate::point::Point;

/// A grid of points over a rectangle of the complex plane.
#[derive(Clone, Debug)]
pub struct Area {
    top_left: Complex<f64>,
    bottom_right: Complex<f64>,
    horizontal_resolution: usize,
    vertical_resolution: usize,
    max_iterations: u32,
    points: Vec<Point>,
    initialized: bool,
    calculated: bool,
}

impl Area {
    /// Describes an area without allocating it.  `init` must be called
    /// before `calculate`.
    pub fn new(
        top_left: Complex<f64>,
        bottom_right: Complex<f64>,
        horizontal_resolution: usize,
        vertical_resolution: usize,
        max_iterations: u32,
    ) -> Self {
        Area {
            top_left,
            bottom_right,
            horizontal_resolution,
            vertical_resolution,
            max_iterations,
            points: Vec::new(),
            initialized: false,
            calculated: false,
        }
    }

    /// A square area of `resolution` x `resolution` points, spanning
    /// `radius` in every direction around `center`.
    pub fn centered(resolution: usize, max_iterations: u32, center: Complex<f64>, radius: f64) -> Self {
        Area::new(
            center + Complex::new(-radius, radius),
            center + Complex::new(radius, -radius),
            resolution,
            resolution,
            max_iterations,
        )
    }

    /// Allocates the grid and places every point on the plane.
    pub fn init(&mut self) {
        let plane = PlaneMapper::new(
            self.horizontal_resolution,
            self.vertical_resolution,
            self.top_left,
            self.bottom_right,
        );
        let mut points = vec![Point::new(self.top_left); plane.len()];
        for (y, x) in iproduct!(0..self.vertical_resolution, 0..self.horizontal_resolution) {
            points[self.index_for(x, y)] = Point::new(plane.pixel_to_point(&Pixel(x, y)));
        }
        self.points = points;
        self.initialized = true;
        self.calculated = false;
    }

    /// Runs every point up to the area's iteration limit.  Blocks
    /// until the whole grid is done.
    pub fn calculate(&mut self) {
        assert!(self.initialized, "Area::calculate called before Area::init");
        let max_iterations = self.max_iterations;
        for point in self.points.iter_mut() {
            point.compute(max_iterations);
        }
        self.calculated = true;
    }

    /// Storage index of the point at x,y.
    pub fn index_for(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.horizontal_resolution && y < self.vertical_resolution,
            "point {},{} outside a {}x{} area",
            x,
            y,
            self.horizontal_resolution,
            self.vertical_resolution
        );
        x + y * self.horizontal_resolution
    }

    /// The x,y coordinates of the point stored at `index`.
    pub fn for_index(&self, index: usize) -> (usize, usize) {
        (
            index % self.horizontal_resolution,
            index / self.horizontal_resolution,
        )
    }

    /// The point at x,y.
    pub fn get_point(&self, x: usize, y: usize) -> &Point {
        &self.points[self.index_for(x, y)]
    }

    /// Every point, row-major.  Empty until `init`.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Top-left corner on the complex plane.
    pub fn top_left(&self) -> Complex<f64> {
        self.top_left
    }

    /// Bottom-right corner on the complex plane.
    pub fn bottom_right(&self) -> Complex<f64> {
        self.bottom_right
    }

    /// Width in points.
    pub fn horizontal_resolution(&self) -> usize {
        self.horizontal_resolution
    }

    /// Height in points.
    pub fn vertical_resolution(&self) -> usize {
        self.vertical_resolution
    }

    /// Iteration limit applied by `calculate`.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Whether `init` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Whether `calculate` has run to completion since the last `init`.
    pub fn is_calculated(&self) -> bool {
        self.calculated
    }
}
