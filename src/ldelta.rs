//! The `D`-function algebra: a piecewise linear function of remaining
//! flops available before a deadline. Structurally analogous to `Z`, but
//! over points-plus-terminal-slope rather than rational subfunctions —
//! ported from `LDeltaFunction` in the original source.

use crate::time::Time;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub t: Time,
    pub flops_before: f64,
}

/// A piecewise linear, non-decreasing function of remaining flops
/// available before instant `t`.
///
/// Invariant: `points` is sorted and non-decreasing in both coordinates;
/// `tail_slope >= 0`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct D {
    points: Vec<Point>,
    tail_slope: f64,
}

impl D {
    pub fn new(points: Vec<Point>, tail_slope: f64) -> Self {
        assert!(tail_slope >= 0.0, "D's terminal slope must be non-negative");
        D { points, tail_slope }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn tail_slope(&self) -> f64 {
        self.tail_slope
    }

    /// `D(tau)`: the flops available before `tau`, linearly interpolating
    /// between bracketing points, or extrapolating past the last point
    /// using `tail_slope`.
    pub fn value(&self, tau: Time) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        if tau.as_secs() <= self.points[0].t.as_secs() {
            return self.points[0].flops_before;
        }
        for w in self.points.windows(2) {
            let (a, b) = (w[0], w[1]);
            if tau.as_secs() <= b.t.as_secs() {
                let span = b.t.as_secs() - a.t.as_secs();
                if span <= 0.0 {
                    return b.flops_before;
                }
                let frac = (tau.as_secs() - a.t.as_secs()) / span;
                return a.flops_before + frac * (b.flops_before - a.flops_before);
            }
        }
        let last = self.points.last().unwrap();
        last.flops_before + self.tail_slope * (tau.as_secs() - last.t.as_secs())
    }

    /// Pointwise minimum, stepping through the merged breakpoints of
    /// `self` and `other`.
    pub fn min(l: &D, r: &D) -> D {
        combine(l, r, f64::min)
    }

    /// Pointwise maximum.
    pub fn max(l: &D, r: &D) -> D {
        combine(l, r, f64::max)
    }

    /// The linear combination `cl*l + cr*r`, stepping through both
    /// functions' breakpoints.
    pub fn lc(l: &D, r: &D, cl: f64, cr: f64) -> D {
        combine(l, r, move |a, b| cl * a + cr * b)
    }

    /// `∫_ref^h (self(t) - r(t))^2 dt`, over the piecewise-linear pieces.
    pub fn sqdiff(&self, r: &D, reference: Time, horizon: Time) -> f64 {
        let breakpoints = merged_breakpoints(self, r, reference, horizon);
        let mut result = 0.0;
        for w in breakpoints.windows(2) {
            let (a, b) = (w[0], w[1]);
            let span = b.as_secs() - a.as_secs();
            if span <= 0.0 {
                continue;
            }
            let da = self.value(a) - r.value(a);
            let db = self.value(b) - r.value(b);
            // Linear interpolation of the squared difference over [a, b]:
            // ∫ (da + (db-da)*s)^2 * span ds, s in [0,1].
            result += span * (da * da + da * (db - da) + (db - da) * (db - da) / 3.0);
        }
        result
    }

    /// Computes the conservative pointwise minimum and the information
    /// loss of approximating `l`/`r` (weighted `vl`/`vr`) by it, in one
    /// pass.
    pub fn min_and_loss(l: &D, r: &D, vl: f64, vr: f64, reference: Time, horizon: Time) -> (D, f64) {
        let min = D::min(l, r);
        let loss = vl * min.sqdiff(l, reference, horizon) + vr * min.sqdiff(r, reference, horizon);
        (min, loss)
    }

    /// Consumes `length` flops scheduled to complete by `deadline`: inserts
    /// breakpoints for the task's start/end and decreases availability past
    /// `deadline` by `length`.
    pub fn update(&mut self, length: f64, deadline: Time, horizon: Time) {
        let before = self.value(deadline);
        self.points.push(Point { t: deadline, flops_before: before });
        self.points.push(Point { t: horizon, flops_before: self.value(horizon) });
        self.points.sort_by(|a, b| a.t.as_secs().partial_cmp(&b.t.as_secs()).unwrap());
        for p in self.points.iter_mut() {
            if p.t.as_secs() >= deadline.as_secs() {
                p.flops_before = (p.flops_before - length).max(0.0);
            }
        }
    }

    /// Best-effort reduction to at most `num_pieces` points by merging
    /// adjacent triples that stay (weakly) convex. Per the open design
    /// question, this has not been validated against a P8-equivalent
    /// property beyond basic monotonicity and should be treated as
    /// advisory, not a certified bound.
    pub fn reduce_max(&self, num_pieces: usize) -> D {
        reduce_best_effort(self, num_pieces, true)
    }

    /// See `reduce_max`; the symmetric best-effort minimizing reduction.
    pub fn reduce_min(&self, num_pieces: usize) -> D {
        reduce_best_effort(self, num_pieces, false)
    }
}

fn reduce_best_effort(d: &D, num_pieces: usize, conservative_up: bool) -> D {
    let mut points = d.points.clone();
    while points.len() > num_pieces.max(2) {
        // Drop the interior point contributing least to the piecewise-linear
        // shape (smallest deviation from the chord of its neighbors), biasing
        // the kept value up (resp. down) to stay a conservative bound.
        let mut worst = None;
        for i in 1..points.len() - 1 {
            let (a, b, c) = (points[i - 1], points[i], points[i + 1]);
            let span = c.t.as_secs() - a.t.as_secs();
            let chord = if span.abs() < f64::EPSILON {
                a.flops_before
            } else {
                let frac = (b.t.as_secs() - a.t.as_secs()) / span;
                a.flops_before + frac * (c.flops_before - a.flops_before)
            };
            let deviation = (b.flops_before - chord).abs();
            if worst.map_or(true, |(_, d)| deviation < d) {
                worst = Some((i, deviation));
            }
        }
        match worst {
            Some((i, _)) => {
                if conservative_up {
                    points[i - 1].flops_before = points[i - 1].flops_before.max(points[i].flops_before);
                } else {
                    points[i + 1].flops_before = points[i + 1].flops_before.min(points[i].flops_before);
                }
                points.remove(i);
            }
            None => break,
        }
    }
    D { points, tail_slope: d.tail_slope }
}

fn combine(l: &D, r: &D, f: impl Fn(f64, f64) -> f64) -> D {
    let mut times: Vec<Time> = l.points.iter().chain(r.points.iter()).map(|p| p.t).collect();
    times.sort_by(|a, b| a.as_secs().partial_cmp(&b.as_secs()).unwrap());
    times.dedup_by(|a, b| a.as_secs() == b.as_secs());
    let points = times.into_iter().map(|t| Point { t, flops_before: f(l.value(t), r.value(t)) }).collect();
    D { points, tail_slope: f(l.tail_slope, r.tail_slope) }
}

fn merged_breakpoints(l: &D, r: &D, reference: Time, horizon: Time) -> Vec<Time> {
    let mut times: Vec<Time> = l.points.iter().chain(r.points.iter()).map(|p| p.t).collect();
    times.push(reference);
    times.push(horizon);
    times.retain(|t| t.as_secs() >= reference.as_secs() && t.as_secs() <= horizon.as_secs());
    times.sort_by(|a, b| a.as_secs().partial_cmp(&b.as_secs()).unwrap());
    times.dedup_by(|a, b| a.as_secs() == b.as_secs());
    times
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> D {
        D::new(
            vec![
                Point { t: Time::from_secs(0.0), flops_before: 0.0 },
                Point { t: Time::from_secs(10.0), flops_before: 100.0 },
            ],
            5.0,
        )
    }

    #[test]
    fn value_interpolates_between_points() {
        let d = sample();
        assert!((d.value(Time::from_secs(5.0)) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn value_extrapolates_with_tail_slope() {
        let d = sample();
        assert!((d.value(Time::from_secs(12.0)) - 110.0).abs() < 1e-9);
    }

    #[test]
    fn p8_min_is_bounded_by_both_operands() {
        let f = sample();
        let g = D::new(
            vec![
                Point { t: Time::from_secs(0.0), flops_before: 10.0 },
                Point { t: Time::from_secs(10.0), flops_before: 60.0 },
            ],
            2.0,
        );
        let min = D::min(&f, &g);
        for t in [0.0, 2.5, 5.0, 7.5, 10.0] {
            let t = Time::from_secs(t);
            assert!(min.value(t) <= f.value(t) + 1e-9);
            assert!(min.value(t) <= g.value(t) + 1e-9);
        }
    }

    #[test]
    fn sqdiff_is_nonnegative() {
        let f = sample();
        let g = D::new(
            vec![
                Point { t: Time::from_secs(0.0), flops_before: 10.0 },
                Point { t: Time::from_secs(10.0), flops_before: 60.0 },
            ],
            2.0,
        );
        assert!(f.sqdiff(&g, Time::from_secs(0.0), Time::from_secs(10.0)) >= 0.0);
    }

    #[test]
    fn update_reduces_availability_past_deadline() {
        let mut d = sample();
        let before = d.value(Time::from_secs(10.0));
        d.update(20.0, Time::from_secs(5.0), Time::from_secs(10.0));
        assert!(d.value(Time::from_secs(10.0)) <= before);
    }
}
