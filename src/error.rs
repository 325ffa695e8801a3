// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors reported by the scheduler.  Cancellation is not one of
//! them; see `picture::Outcome`.

use failure::Fail;

/// Ways a picture calculation can fail.
#[derive(Debug, Fail, PartialEq)]
pub enum Error {
    /// The scheduler was asked to run with no workers.
    #[fail(display = "at least one worker is required to calculate a picture")]
    NoWorkers,
    /// A worker thread panicked while computing a tile.
    #[fail(display = "a tile worker panicked; the picture is incomplete")]
    WorkerPanicked,
}
