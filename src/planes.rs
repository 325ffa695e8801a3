// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane given by its top-left and
//! bottom-right corners.  Pixel rows grow downward while the
//! imaginary axis usually grows upward, so the bottom-right corner
//! normally has the smaller imaginary part.
use num::Complex;

/// Describes the x, y of a pixel in a region.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of a `width` x `height` grid onto the complex
/// rectangle between two corners.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    width: usize,
    height: usize,
    top_left: Complex<f64>,
    // The extent of the complex rectangle along each axis.  Signed.
    span: Complex<f64>,
}

impl PlaneMapper {
    /// Constructor.  Takes the size of the integral plane and the two
    /// corners describing the complex plane.
    pub fn new(
        width: usize,
        height: usize,
        top_left: Complex<f64>,
        bottom_right: Complex<f64>,
    ) -> PlaneMapper {
        PlaneMapper {
            width,
            height,
            top_left,
            span: bottom_right - top_left,
        }
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    /// Describes that the integral plane has no area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Given a pixel on the integral plane, interpolate its location
    /// on the complex plane.  Pixel 0,0 lands exactly on the top-left
    /// corner; the bottom-right corner itself belongs to the next
    /// grid over.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            self.top_left.re + (pixel.0 as f64 / self.width as f64) * self.span.re,
            self.top_left.im + (pixel.1 as f64 / self.height as f64) * self.span.im,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_to_point_on_positive_planes() {
        let pm = PlaneMapper::new(5, 5, Complex::new(0.0, 0.0), Complex::new(5.0, 5.0));
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(2.0, 2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(4, 4)), Complex::new(4.0, 4.0));
    }

    #[test]
    fn pixel_to_point_on_downward_planes() {
        let pm = PlaneMapper::new(4, 4, Complex::new(-2.0, 2.0), Complex::new(2.0, -2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, 2.0));
        assert_eq!(pm.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(3, 1)), Complex::new(1.0, 1.0));
    }

    #[test]
    fn pixel_to_point_on_rectangular_planes() {
        let pm = PlaneMapper::new(8, 2, Complex::new(0.0, 1.0), Complex::new(4.0, 0.0));
        assert_eq!(pm.pixel_to_point(&Pixel(1, 0)), Complex::new(0.5, 1.0));
        assert_eq!(pm.pixel_to_point(&Pixel(6, 1)), Complex::new(3.0, 0.5));
    }

    #[test]
    fn empty_planes() {
        let corner = Complex::new(0.0, 0.0);
        assert!(PlaneMapper::new(0, 4, corner, corner).is_empty());
        assert!(PlaneMapper::new(4, 0, corner, corner).is_empty());
        let pm = PlaneMapper::new(3, 4, corner, corner);
        assert!(!pm.is_empty());
        assert_eq!(pm.len(), 12);
    }
}
