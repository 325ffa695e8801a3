#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tiled Mandelbrot calculator
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring `z` and adding `c`, starting from
//! zero, never runs off to infinity.  Once `|z|` passes 2 it is
//! guaranteed to escape, so each point is iterated until it either
//! leaves that disc or hits an iteration limit.  The number of
//! iterations it took is the value later used to colour the pixel.
//!
//! A large image is cut into square tiles (`Area`s), each an
//! independent grid of `Point`s.  A `Picture` owns the tiles and
//! calculates them on a fixed pool of worker threads, reporting each
//! tile to the caller as soon as it is finished so the final image
//! can be assembled incrementally.  A `Cancellation` token stops the
//! pool from starting new tiles, leaving a partial picture.
//!
//! ```no_run
//! use mandelbrot::{Cancellation, Picture};
//! use num::Complex;
//!
//! let mut picture = Picture::square(Complex::new(-2.1, 1.5), 3.0, 1024, 16, 500);
//! picture.init();
//! let outcome = picture
//!     .calculate(&Cancellation::new(), 4, |tile| {
//!         let (left, top) = tile.offset;
//!         println!("tile {} at {},{}", tile.index, left, top);
//!     })
//!     .unwrap();
//! assert!(outcome.is_complete());
//! ```

pub mod area;
pub mod cancel;
pub mod error;
pub mod picture;
pub mod planes;
pub mod point;

pub use area::Area;
pub use cancel::Cancellation;
pub use error::Error;
pub use picture::{Calculation, Outcome, Picture, Tile, TileGrid};
pub use planes::{Pixel, PlaneMapper};
pub use point::Point;
