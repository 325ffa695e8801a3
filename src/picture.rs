// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A Picture is a large region of the complex plane cut into a grid
//! of square tiles, each tile an `Area`.  Tiles are calculated by a
//! fixed pool of worker threads fed from a single producer.
//!
//! The producer hands out each tile's `&mut Area` through a
//! zero-capacity channel, so a tile is owned by exactly one worker
//! for the whole of its calculation and no locking is needed on the
//! grid.  When the worker is done it gives the tile back as a shared
//! reference on the completion channel, which the calling thread
//! drains while the rest of the picture is still being computed.
//!
//! Cancellation only stops the producer.  A tile that has already
//! been handed to a worker always runs to completion, so every tile
//! reported complete is fully calculated; tiles that were never
//! handed out are simply left uncalculated.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, SendTimeoutError, Sender};
use log::{debug, trace, warn};
use num::Complex;

use crate::area::Area;
use crate::cancel::Cancellation;
use crate::error::Error;

// How often a producer blocked on a busy pool re-checks `cancel()`.  A
// deadline needs no polling: the wait is cut short to end on it.
const DISPATCH_POLL: Duration = Duration::from_millis(5);

/// The arithmetic of a grid of square tiles: how tile indices map to
/// tile coordinates and to pixel offsets in the final image.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TileGrid {
    horizontal_chunks: usize,
    vertical_chunks: usize,
    chunk_pixel_size: usize,
}

impl TileGrid {
    /// A grid of `horizontal_chunks` x `vertical_chunks` tiles, each
    /// `chunk_pixel_size` pixels wide and high.
    pub fn new(horizontal_chunks: usize, vertical_chunks: usize, chunk_pixel_size: usize) -> Self {
        TileGrid {
            horizontal_chunks,
            vertical_chunks,
            chunk_pixel_size,
        }
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.horizontal_chunks * self.vertical_chunks
    }

    /// True when the grid holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the tile at column x, row y.
    pub fn index_for(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.horizontal_chunks && y < self.vertical_chunks,
            "tile {},{} outside a {}x{} grid",
            x,
            y,
            self.horizontal_chunks,
            self.vertical_chunks
        );
        x + y * self.horizontal_chunks
    }

    /// Column and row of the tile at `index`.
    pub fn for_index(&self, index: usize) -> (usize, usize) {
        (index % self.horizontal_chunks, index / self.horizontal_chunks)
    }

    /// Pixel position of the tile's top-left corner in the final image.
    pub fn offset_for(&self, index: usize) -> (usize, usize) {
        let (x, y) = self.for_index(index);
        (x * self.chunk_pixel_size, y * self.chunk_pixel_size)
    }

    /// Width of the final image in pixels.
    pub fn horizontal_resolution(&self) -> usize {
        self.chunk_pixel_size * self.horizontal_chunks
    }

    /// Height of the final image in pixels.
    pub fn vertical_resolution(&self) -> usize {
        self.chunk_pixel_size * self.vertical_chunks
    }

    /// Tiles per row.
    pub fn horizontal_chunks(&self) -> usize {
        self.horizontal_chunks
    }

    /// Tiles per column.
    pub fn vertical_chunks(&self) -> usize {
        self.vertical_chunks
    }

    /// Side of one tile in pixels.
    pub fn chunk_pixel_size(&self) -> usize {
        self.chunk_pixel_size
    }
}

/// A finished tile, as delivered to the caller of `Picture::calculate`.
#[derive(Copy, Clone, Debug)]
pub struct Tile<'a> {
    /// Position of the tile in the picture.
    pub index: usize,
    /// Pixel offset of the tile's top-left corner in the final image.
    pub offset: (usize, usize),
    /// The fully calculated area.
    pub area: &'a Area,
}

/// How a calculation ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Every tile was calculated.
    Complete,
    /// Cancellation stopped dispatch early; only `computed` of `total`
    /// tiles were calculated and reported.
    Cancelled {
        /// Tiles calculated and reported.
        computed: usize,
        /// Tiles in the picture.
        total: usize,
    },
}

impl Outcome {
    /// True unless the calculation was cut short.
    pub fn is_complete(&self) -> bool {
        *self == Outcome::Complete
    }
}

/// A region of the complex plane divided into square tiles.
#[derive(Clone, Debug)]
pub struct Picture {
    top_left: Complex<f64>,
    chunk_size: f64,
    max_iterations: u32,
    grid: TileGrid,
    areas: Vec<Area>,
    initialized: bool,
}

impl Picture {
    /// A picture anchored at `top_left` made of `horizontal_chunks` x
    /// `vertical_chunks` tiles.  Each tile spans `chunk_size` on the
    /// complex plane and `chunk_pixel_size` pixels in the image.
    pub fn new(
        top_left: Complex<f64>,
        chunk_size: f64,
        horizontal_chunks: usize,
        vertical_chunks: usize,
        chunk_pixel_size: usize,
        max_iterations: u32,
    ) -> Self {
        Picture {
            top_left,
            chunk_size,
            max_iterations,
            grid: TileGrid::new(horizontal_chunks, vertical_chunks, chunk_pixel_size),
            areas: Vec::new(),
            initialized: false,
        }
    }

    /// A square picture `area_size` wide on the complex plane and
    /// `image_size` pixels wide, cut into `divisions` x `divisions`
    /// tiles.  When `image_size` is not a multiple of `divisions` the
    /// tiles are rounded down and the image comes out smaller; that
    /// is logged as a warning, not treated as an error.
    pub fn square(
        top_left: Complex<f64>,
        area_size: f64,
        image_size: usize,
        divisions: usize,
        max_iterations: u32,
    ) -> Self {
        assert!(divisions > 0, "a picture needs at least one division");
        let chunk_pixel_size = image_size / divisions;
        if image_size % divisions != 0 {
            warn!(
                "image size {} can't be divided in {} divisions, the final image will be {}x{}",
                image_size,
                divisions,
                chunk_pixel_size * divisions,
                chunk_pixel_size * divisions
            );
        }
        Picture::new(
            top_left,
            area_size / divisions as f64,
            divisions,
            divisions,
            chunk_pixel_size,
            max_iterations,
        )
    }

    /// Allocates and places every tile.  Nothing is calculated yet.
    pub fn init(&mut self) {
        let chunk = self.chunk_size;
        let areas = (0..self.grid.len())
            .map(|i| {
                let (x, y) = self.grid.for_index(i);
                let top_left = self.top_left + Complex::new(chunk * x as f64, -chunk * y as f64);
                let mut area = Area::new(
                    top_left,
                    top_left + Complex::new(chunk, -chunk),
                    self.grid.chunk_pixel_size,
                    self.grid.chunk_pixel_size,
                    self.max_iterations,
                );
                area.init();
                area
            })
            .collect();
        self.areas = areas;
        self.initialized = true;
    }

    /// Calculates every tile on `worker_count` threads, calling
    /// `on_done` on this thread as each tile finishes.  Tiles finish
    /// in no particular order.
    ///
    /// If `cancel` fires, tiles not yet handed to a worker are
    /// skipped and the result is `Outcome::Cancelled`; `on_done` has
    /// still been called for every tile that was calculated.  Calling
    /// this again finishes the remaining tiles, since tiles already
    /// done cost almost nothing to recalculate.
    pub fn calculate<F>(
        &mut self,
        cancel: &Cancellation,
        worker_count: usize,
        mut on_done: F,
    ) -> Result<Outcome, Error>
    where
        F: FnMut(Tile),
    {
        assert!(
            self.initialized,
            "Picture::calculate called before Picture::init"
        );
        if worker_count == 0 {
            return Err(Error::NoWorkers);
        }

        let grid = self.grid;
        let total = grid.len();
        let tiles = self.areas.iter_mut().enumerate();
        let mut computed = 0;
        debug!("calculating {} tiles on {} workers", total, worker_count);

        let dispatched = crossbeam::scope(|spawner| {
            let (next_tx, next_rx) = channel::bounded(0);
            let (done_tx, done_rx) = channel::bounded(0);

            let producer = spawner.spawn(move |_| dispatch(tiles, next_tx, cancel));
            for worker in 0..worker_count {
                let next = next_rx.clone();
                let done = done_tx.clone();
                spawner.spawn(move |_| work(worker, grid, next, done));
            }
            drop(next_rx);
            drop(done_tx);

            for tile in done_rx.iter() {
                computed += 1;
                on_done(tile);
            }
            producer.join()
        })
        .map_err(|_| Error::WorkerPanicked)?
        .map_err(|_| Error::WorkerPanicked)?;

        if dispatched < total {
            debug!("calculation cancelled, {} of {} tiles done", computed, total);
            Ok(Outcome::Cancelled { computed, total })
        } else {
            Ok(Outcome::Complete)
        }
    }

    /// Runs `calculate` on a background thread.  The returned handle
    /// streams the indices of finished tiles and gives the picture
    /// back once the calculation is over.
    pub fn calculate_async(mut self, cancel: Cancellation, worker_count: usize) -> Calculation {
        let (done_tx, done_rx) = channel::bounded(0);
        let handle = thread::spawn(move || {
            let outcome = self.calculate(&cancel, worker_count, |tile| {
                // Nobody listening is fine; the picture still completes.
                let _ = done_tx.send(tile.index);
            })?;
            Ok((self, outcome))
        });
        Calculation {
            done: done_rx,
            handle,
        }
    }

    /// The tile at `index`.
    pub fn get_area(&self, index: usize) -> &Area {
        &self.areas[index]
    }

    /// Every tile, in index order.  Empty until `init`.
    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// Pixel position of tile `index` in the final image.
    pub fn get_image_offset_for(&self, index: usize) -> (usize, usize) {
        self.grid.offset_for(index)
    }

    /// Index of the tile at column x, row y.
    pub fn index_for(&self, x: usize, y: usize) -> usize {
        self.grid.index_for(x, y)
    }

    /// Column and row of tile `index`.
    pub fn for_index(&self, index: usize) -> (usize, usize) {
        self.grid.for_index(index)
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// True when the picture has no tiles.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Width of the final image in pixels.
    pub fn horizontal_resolution(&self) -> usize {
        self.grid.horizontal_resolution()
    }

    /// Height of the final image in pixels.
    pub fn vertical_resolution(&self) -> usize {
        self.grid.vertical_resolution()
    }

    /// The tile grid.
    pub fn grid(&self) -> TileGrid {
        self.grid
    }

    /// Top-left corner of the whole picture on the complex plane.
    pub fn top_left(&self) -> Complex<f64> {
        self.top_left
    }

    /// Side of one tile on the complex plane.
    pub fn chunk_size(&self) -> f64 {
        self.chunk_size
    }

    /// Iteration limit for every point.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Whether `init` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

/// Offers tiles to the pool one at a time, in index order, until
/// they run out or `cancel` fires.  Returns how many were handed out.
fn dispatch<'a, I>(tiles: I, next: Sender<(usize, &'a mut Area)>, cancel: &Cancellation) -> usize
where
    I: Iterator<Item = (usize, &'a mut Area)>,
{
    let mut dispatched = 0;
    for mut tile in tiles {
        loop {
            if cancel.is_cancelled() {
                debug!("dispatch cancelled after {} tiles", dispatched);
                return dispatched;
            }
            match next.send_timeout(tile, offer_timeout(cancel)) {
                Ok(()) => break,
                Err(SendTimeoutError::Timeout(back)) => tile = back,
                Err(SendTimeoutError::Disconnected(_)) => return dispatched,
            }
        }
        dispatched += 1;
    }
    dispatched
}

/// How long one offer may block before cancellation is checked again.
fn offer_timeout(cancel: &Cancellation) -> Duration {
    match cancel.remaining() {
        Some(remaining) if remaining < DISPATCH_POLL => remaining,
        _ => DISPATCH_POLL,
    }
}

fn work<'a>(
    worker: usize,
    grid: TileGrid,
    next: Receiver<(usize, &'a mut Area)>,
    done: Sender<Tile<'a>>,
) {
    let mut count = 0;
    for (index, area) in next.iter() {
        area.calculate();
        count += 1;
        trace!("worker {} finished tile {}", worker, index);
        let area: &'a Area = area;
        let tile = Tile {
            index,
            offset: grid.offset_for(index),
            area,
        };
        if done.send(tile).is_err() {
            break;
        }
    }
    debug!("worker {} exiting after {} tiles", worker, count);
}

/// A calculation running on a background thread.
pub struct Calculation {
    done: Receiver<usize>,
    handle: JoinHandle<Result<(Picture, Outcome), Error>>,
}

impl Calculation {
    /// Indices of finished tiles, as they finish.  Ends when the
    /// calculation does.
    pub fn iter(&self) -> channel::Iter<usize> {
        self.done.iter()
    }

    /// The raw completion channel, for callers that want to `select!`
    /// on it alongside other events.
    pub fn completed(&self) -> &Receiver<usize> {
        &self.done
    }

    /// Waits for the calculation to end and returns the picture.  Any
    /// completions not yet read are discarded.
    pub fn join(self) -> Result<(Picture, Outcome), Error> {
        for _ in self.done.iter() {}
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(Error::WorkerPanicked),
        }
    }
}
