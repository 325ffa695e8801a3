// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use mandelbrot::{Cancellation, Outcome, Picture};
use num::Complex;

fn seahorse_picture(max_iterations: u32) -> Picture {
    Picture::new(
        Complex::new(-1.401854499759, -0.000743603637),
        0.00021646,
        4,
        4,
        254,
        max_iterations,
    )
}

#[test]
fn simple_render_reports_every_tile() {
    let mut picture = seahorse_picture(1000);
    picture.init();

    let mut done = vec![];
    let outcome = picture
        .calculate(&Cancellation::new(), 1, |tile| done.push(tile.index))
        .unwrap();

    assert_eq!(outcome, Outcome::Complete);
    done.sort();
    assert_eq!(done, (0..16).collect::<Vec<_>>());

    let area = picture.get_area(0);
    assert_eq!(area.points().len(), 254 * 254);
    for y in 0..254 {
        for x in 0..254 {
            assert!(area.get_point(x, y).iterations() <= 1000);
        }
    }
    assert_eq!(picture.horizontal_resolution(), 1016);
    assert_eq!(picture.vertical_resolution(), 1016);
}

#[test]
fn async_render_matches_the_blocking_one() {
    let mut blocking = seahorse_picture(300);
    blocking.init();
    blocking.calculate(&Cancellation::new(), 2, |_| {}).unwrap();

    let mut background = seahorse_picture(300);
    background.init();
    let calculation = background.calculate_async(Cancellation::new(), 8);
    let reported = calculation.iter().count();
    let (background, outcome) = calculation.join().unwrap();

    assert!(outcome.is_complete());
    assert_eq!(reported, 16);
    for i in 0..16 {
        assert_eq!(blocking.get_area(i).points(), background.get_area(i).points());
    }
}
