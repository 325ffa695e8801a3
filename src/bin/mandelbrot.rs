// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;
use std::time::Duration;

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use image::{Rgba, RgbaImage};
use log::{debug, error, info, warn};
use mandelbrot::{Area, Cancellation, Outcome, Picture};
use num::Complex;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

fn validate_complex(s: &str, err: &str) -> Result<(), String> {
    match parse_complex(s) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const TOPLEFT: &str = "topleft";
const AREA_SIZE: &str = "area-size";
const SIZE: &str = "size";
const DIVISIONS: &str = "divisions";
const ITERATIONS: &str = "iterations";
const WORKERS: &str = "workers";
const TIMEOUT: &str = "timeout";

fn args<'a>(default_workers: &'a str) -> ArgMatches<'a> {
    let max_workers = num_cpus::get() * 4;

    App::new("mandelbrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Tiled Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("mandelbrot.png")
                .help("Output file, png or jpg"),
        )
        .arg(
            Arg::with_name(TOPLEFT)
                .long(TOPLEFT)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.1,1.5")
                .validator(|s| validate_complex(&s, "Could not parse top left corner"))
                .help("Top left corner of the mandelbrot space, as re,im"),
        )
        .arg(
            Arg::with_name(AREA_SIZE)
                .long(AREA_SIZE)
                .short("a")
                .takes_value(true)
                .default_value("3")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse area size",
                        "Area size must be positive",
                    )
                })
                .help("Width and height of the complex area, from the top left corner"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1920")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        65_535,
                        "Could not parse image size",
                        "Image size must be between 1 and 65535",
                    )
                })
                .help("Width and height of the squared image in pixels"),
        )
        .arg(
            Arg::with_name(DIVISIONS)
                .long(DIVISIONS)
                .short("d")
                .takes_value(true)
                .default_value("50")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse division count",
                        "Division count must be between 1 and 4096",
                    )
                })
                .help("Number of tiles per side to split the work into"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .default_value(default_workers)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_workers,
                        "Could not parse worker count",
                        &format!("Worker count must be between 1 and {}", max_workers),
                    )
                })
                .help("Number of threads calculating tiles"),
        )
        .arg(
            Arg::with_name(TIMEOUT)
                .long(TIMEOUT)
                .short("t")
                .takes_value(true)
                .default_value("20")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        86_400,
                        "Could not parse timeout",
                        "Timeout must be between 0 and 86400 seconds",
                    )
                })
                .help("Seconds before no new tiles are started; 0 waits forever"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| format_err!("missing value for --{}", name))?;
    T::from_str(raw).map_err(|_| format_err!("could not parse --{} {}", name, raw))
}

const INSIDE: Rgba<u8> = Rgba([0, 0, 0, 255]);

const PALETTE: [Rgba<u8>; 7] = [
    Rgba([255, 0, 0, 255]),
    Rgba([0, 255, 0, 255]),
    Rgba([0, 0, 255, 255]),
    Rgba([255, 255, 0, 255]),
    Rgba([0, 255, 255, 255]),
    Rgba([255, 0, 255, 255]),
    Rgba([255, 255, 255, 255]),
];

/// Points that never escaped are black; the rest cycle through the
/// palette by iteration count.
fn color_for(iterations: u32, max_iterations: u32) -> Rgba<u8> {
    if iterations == max_iterations {
        INSIDE
    } else {
        PALETTE[iterations as usize % PALETTE.len()]
    }
}

fn paint(canvas: &mut RgbaImage, area: &Area, offset: (usize, usize)) {
    for (i, point) in area.points().iter().enumerate() {
        let (x, y) = area.for_index(i);
        canvas.put_pixel(
            (offset.0 + x) as u32,
            (offset.1 + y) as u32,
            color_for(point.iterations(), area.max_iterations()),
        );
    }
}

fn run() -> Result<(), Error> {
    let default_workers = num_cpus::get().to_string();
    let matches = args(&default_workers);
    let output: String = value(&matches, OUTPUT)?;
    let top_left = matches
        .value_of(TOPLEFT)
        .and_then(parse_complex)
        .ok_or_else(|| format_err!("could not parse --{}", TOPLEFT))?;
    let area_size: f64 = value(&matches, AREA_SIZE)?;
    let size: usize = value(&matches, SIZE)?;
    let divisions: usize = value(&matches, DIVISIONS)?;
    let iterations: u32 = value(&matches, ITERATIONS)?;
    let workers: usize = value(&matches, WORKERS)?;
    let timeout: u64 = value(&matches, TIMEOUT)?;
    if size < divisions {
        return Err(format_err!(
            "image size {} is smaller than {} divisions",
            size,
            divisions
        ));
    }

    info!("start");
    let mut picture = Picture::square(top_left, area_size, size, divisions, iterations);
    picture.init();

    let cancel = if timeout == 0 {
        Cancellation::new()
    } else {
        Cancellation::with_timeout(Duration::from_secs(timeout))
    };
    let mut canvas = RgbaImage::new(
        picture.horizontal_resolution() as u32,
        picture.vertical_resolution() as u32,
    );

    info!("calculation started on {} workers", workers);
    let outcome = picture.calculate(&cancel, workers, |tile| {
        debug!("index {} done", tile.index);
        paint(&mut canvas, tile.area, tile.offset);
    })?;
    match outcome {
        Outcome::Complete => info!("finished"),
        Outcome::Cancelled { computed, total } => warn!(
            "calculation timed out, image is not complete: {} of {} tiles",
            computed, total
        ),
    }

    canvas.save(&output)?;
    info!("wrote {}", output);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("Render failure: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_complex_numbers() {
        assert_eq!(parse_pair::<u32>("800x600", 'x'), Some((800, 600)));
        assert_eq!(parse_pair::<u32>("800x", 'x'), None);
        assert_eq!(parse_complex("-2.1,1.5"), Some(Complex::new(-2.1, 1.5)));
        assert_eq!(parse_complex("-2.1;1.5"), None);
    }

    #[test]
    fn validates_ranges() {
        assert!(validate_range("4", 1, 8, "nan", "range").is_ok());
        assert_eq!(validate_range("9", 1, 8, "nan", "range"), Err("range".to_string()));
        assert_eq!(validate_range::<u32>("x", 1, 8, "nan", "range"), Err("nan".to_string()));
        assert!(validate_range("0.5", std::f64::MIN_POSITIVE, std::f64::MAX, "nan", "range").is_ok());
        assert!(validate_range("-1", std::f64::MIN_POSITIVE, std::f64::MAX, "nan", "range").is_err());
    }

    #[test]
    fn palette_cycles_and_marks_members_black() {
        assert_eq!(color_for(100, 100), INSIDE);
        assert_eq!(color_for(0, 100), PALETTE[0]);
        assert_eq!(color_for(8, 100), PALETTE[1]);
    }

    #[test]
    fn paint_places_a_tile_at_its_offset() {
        let mut area = Area::new(Complex::new(-2.0, 2.0), Complex::new(2.0, -2.0), 2, 2, 10);
        area.init();
        area.calculate();
        let mut canvas = RgbaImage::new(4, 4);
        paint(&mut canvas, &area, (2, 2));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        // The point at -2 + 2i escapes on the first iteration.
        assert_eq!(*canvas.get_pixel(2, 2), PALETTE[1]);
        // 0 + 0i never escapes.
        assert_eq!(*canvas.get_pixel(3, 3), INSIDE);
    }
}
