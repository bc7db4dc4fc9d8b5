//! Position reconstruction from (known position, measured distance) samples.
//!
//! Each triple of samples is solved in closed form in a local frame with the
//! first anchor at the origin, the second on the x'-axis and the third in the
//! x'y'-plane. With `d` the distance to the second anchor and `(i, j)` the
//! in-plane coordinates of the third:
//!
//! ```text
//! x' = (r1² - r2² + d²) / 2d
//! y' = (r1² - r3² + i² + j²) / 2j - (i / j) x'
//! z' = ±sqrt(r1² - x'² - y'²)
//! ```
//!
//! Triples whose anchors are coincident or colinear, or whose spheres do not
//! meet (`z'²` negative), have no real solution and are skipped.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::Coordinate;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub position: Coordinate,
    pub distance: f64,
}

impl Sample {
    pub fn new(position: impl Into<Coordinate>, distance: f64) -> Self {
        Sample {
            position: position.into(),
            distance,
        }
    }
}

/// Solves one triple, returning the two mirror-image candidates
/// (`+z'`, `-z'`), or `None` when the triple is ill-conditioned.
pub fn trilaterate_triple(s1: &Sample, s2: &Sample, s3: &Sample) -> Option<(Coordinate, Coordinate)> {
    let p1 = s1.position;
    let to_p2 = s2.position - p1;
    let to_p3 = s3.position - p1;

    let ex = to_p2.normalized()?;
    let ez = to_p2.cross(&to_p3).normalized()?;
    let ey = ez.cross(&ex);

    let d = to_p2.norm();
    let i = ex.dot(&to_p3);
    let j = ey.dot(&to_p3);
    if j == 0.0 {
        return None;
    }

    let (r1, r2, r3) = (s1.distance, s2.distance, s3.distance);
    let r1_2 = r1 * r1;

    let xp = (r1_2 - r2 * r2 + d * d) / (2.0 * d);
    let yp = (r1_2 - r3 * r3 + i * i + j * j) / (2.0 * j) - (i / j) * xp;
    let zp_2 = r1_2 - xp * xp - yp * yp;
    if zp_2.is_nan() || zp_2 < 0.0 {
        return None;
    }
    let zp = zp_2.sqrt();

    let base = p1 + ex * xp + ey * yp;
    let above = base + ez * zp;
    let below = base - ez * zp;
    if !(above.is_finite() && below.is_finite()) {
        return None;
    }
    Some((above, below))
}

/// L1 residual of `candidate` against every sample.
pub fn residual(candidate: &Coordinate, samples: &[Sample]) -> f64 {
    samples
        .iter()
        .map(|s| (s.position.distance(candidate) - s.distance).abs())
        .sum()
}

/// Best estimate of the unknown point over every triple of `samples`.
///
/// Each solvable triple contributes its lower-residual candidate; the
/// candidate with the smallest residual overall wins, earlier triples
/// winning ties. With exactly three samples both mirror solutions fit
/// equally well and the `+z'` one is returned.
pub fn trilaterate(samples: &[Sample]) -> Result<Coordinate> {
    if samples.len() < 3 {
        return Err(Error::TooFewSamples(samples.len()));
    }

    let mut best: Option<(f64, Coordinate)> = None;
    let mut skipped = 0usize;

    for (a, b, c) in triples(samples.len()) {
        let Some((above, below)) = trilaterate_triple(&samples[a], &samples[b], &samples[c])
        else {
            skipped += 1;
            continue;
        };

        let e_above = residual(&above, samples);
        let e_below = residual(&below, samples);
        let candidate = if e_below < e_above {
            (e_below, below)
        } else {
            (e_above, above)
        };

        if best.map_or(true, |(e, _)| candidate.0 < e) {
            best = Some(candidate);
        }
    }

    if skipped > 0 {
        debug!("skipped {skipped} ill-conditioned sample triples");
    }

    best.map(|(_, point)| point).ok_or(Error::IllConditioned)
}

/// Index triples `a < b < c` in lexicographic order.
fn triples(n: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    (0..n).flat_map(move |a| {
        (a + 1..n).flat_map(move |b| (b + 1..n).map(move |c| (a, b, c)))
    })
}
