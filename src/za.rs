//! The `Z`-function algebra: a piecewise rational slowness function.
//!
//! `Z(a) = x/a + y*a + z1 + z2`, valid for `a >= l` until the next
//! subfunction's left endpoint. Ported from the `ZAFunction` construction
//! and algebra, generalized to Rust's ownership model: pieces move instead
//! of aliasing into a shared `std::list`.

use crate::config::FunctionConfig;
use crate::proxy::{TaskProxy, NEW_TASK_ID};
use crate::tasklist::TaskList;
use crate::time::Clock;

/// Minimum task length the algebra is defined over.
pub const MIN_A: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SubFunction {
    pub l: f64,
    pub x: f64,
    pub y: f64,
    pub z1: f64,
    pub z2: f64,
}

impl SubFunction {
    pub fn new(l: f64, x: f64, y: f64, z1: f64, z2: f64) -> Self {
        SubFunction { l, x, y, z1, z2 }
    }

    pub fn value(&self, a: f64, n: f64) -> f64 {
        self.x / a + self.y * a * n + self.z1 * n + self.z2
    }

    pub fn slope(&self, a: f64) -> f64 {
        self.y - self.x / (a * a)
    }

    /// True if `other`, placed at `self.l`, would be indistinguishable
    /// from `self` (same coefficients, weakly larger left endpoint) —
    /// used to skip redundant pieces while stepping.
    pub fn extends(&self, other: &SubFunction) -> bool {
        self.l >= other.l && self.x == other.x && self.y == other.y
            && self.z1 == other.z1 && self.z2 == other.z2
    }

    fn at(l: f64, template: &SubFunction) -> Self {
        SubFunction { l, x: template.x, y: template.y, z1: template.z1, z2: template.z2 }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Z {
    pieces: Vec<SubFunction>,
}

impl Default for Z {
    fn default() -> Self {
        Z { pieces: vec![SubFunction::new(MIN_A, 0.0, 0.0, 0.0, 0.0)] }
    }
}

impl Z {
    pub fn from_pieces(pieces: Vec<SubFunction>) -> Self {
        assert!(!pieces.is_empty(), "a Z-function always has at least one piece");
        Z { pieces }
    }

    pub fn pieces(&self) -> &[SubFunction] {
        &self.pieces
    }

    pub fn horizon(&self) -> f64 {
        self.pieces.last().map(|p| p.l).unwrap_or(0.0)
    }

    /// Builds a `Z` from the node's current queue and processing power.
    ///
    /// Empty queue: a new task of length `a` runs immediately, contributing
    /// slowness `a/power`. Otherwise appends a synthetic "new task" proxy
    /// and repeatedly identifies the critical task (the one currently
    /// setting the maximum slowness), emits the corresponding subfunction,
    /// and advances the new task's length to the next value at which the
    /// critical task — or the new task's position in the min-slowness
    /// order — changes.
    pub fn from_task_list(queue: &TaskList, power: f64, clock: &dyn Clock) -> Z {
        if queue.is_empty() {
            return Z { pieces: vec![SubFunction::new(MIN_A, 0.0, 0.0, 1.0 / power, 0.0)] };
        }

        let now = clock.now();
        let mut tasks: Vec<TaskProxy> = queue.tasks().to_vec();
        tasks.push(TaskProxy::new_task(MIN_A, power, now));
        for t in tasks.iter_mut() {
            t.r = (t.rabs - now).seconds();
        }

        let mut pieces = Vec::new();

        loop {
            let mut boundaries = min_slowness_boundaries(&tasks);
            if !boundaries.is_empty() {
                let new_task_a = tasks.last().unwrap().a;
                for t in tasks.iter().skip(1).take(tasks.len().saturating_sub(2)) {
                    if t.a != new_task_a {
                        let l = t.r / (new_task_a - t.a);
                        if l > boundaries[0] {
                            boundaries.push(l);
                        }
                    }
                }
                boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap());
                boundaries.dedup_by(|a, b| a == b);
                sort_min_slowness(&mut tasks, &boundaries);
            }

            // Identify the critical task: the one with the highest slowness,
            // breaking ties toward the steepest tendency (the new task always
            // loses ties, its tendency is treated as lowest).
            let mut e = tasks[0].t;
            let mut max_slowness = (e - tasks[0].r) / tasks[0].a;
            tasks[0].tsum = tasks[0].t;
            let mut tm = 0usize;
            let mut before_new = true;
            let mut min_before_new = true;
            let mut max_tendency = 0.0f64;
            let mut tn = tasks.len() - 1;
            for i in 1..tasks.len() {
                let tendency = if before_new { 0.0 } else { 1.0 / tasks[i].a };
                let (tendency, is_new) = if tasks[i].id == NEW_TASK_ID {
                    tn = i;
                    before_new = false;
                    (-1.0, true)
                } else {
                    (tendency, false)
                };
                tasks[i].tsum = if is_new { tasks[i - 1].tsum } else { tasks[i - 1].tsum + tasks[i].t };
                e += tasks[i].t;
                let slowness = (e - tasks[i].r) / tasks[i].a;
                if slowness > max_slowness || (slowness == max_slowness && tendency > max_tendency) {
                    max_slowness = slowness;
                    tm = i;
                    min_before_new = before_new;
                    max_tendency = tendency;
                }
            }

            let cur_a = tasks[tn].a;
            let mut min_a = f64::INFINITY;

            if tm == tn {
                let sf = SubFunction::new(cur_a, tasks[tm].tsum, 0.0, 1.0 / power, 0.0);
                push_if_new(&mut pieces, sf);
                for i in 0..tn {
                    let a = tasks[i].a * tasks[tm].tsum
                        / (tasks[i].tsum - tasks[i].a / power - tasks[i].r);
                    consider(&mut min_a, cur_a, a);
                }
                for i in (tn + 1)..tasks.len() {
                    let c = tasks[tm].tsum * tasks[i].a * power;
                    let b = (tasks[i].tsum - tasks[i].r) * power - tasks[i].a;
                    if let Some(a) = largest_root(b, c) {
                        consider(&mut min_a, cur_a, a);
                    }
                }
                if !boundaries.is_empty() && boundaries[0] < max_slowness {
                    if let Some(&sv) = boundaries.iter().rev().find(|&&v| v < max_slowness) {
                        let a = tasks[tm].tsum / (sv - 1.0 / power);
                        consider(&mut min_a, cur_a, a);
                    }
                }
            } else if min_before_new {
                let sf = SubFunction::new(
                    cur_a,
                    0.0,
                    0.0,
                    0.0,
                    (tasks[tm].tsum - tasks[tm].r) / tasks[tm].a,
                );
                push_if_new(&mut pieces, sf);
                let a = tasks[tm].a * tasks[tn].tsum
                    / (tasks[tm].tsum - tasks[tm].a / power - tasks[tm].r);
                consider(&mut min_a, cur_a, a);
                for i in (tn + 1)..tasks.len() {
                    let a = (tasks[i].a * (tasks[tm].tsum - tasks[tm].r) / tasks[tm].a
                        - tasks[i].tsum + tasks[i].r) * power;
                    consider(&mut min_a, cur_a, a);
                }
                if tn + 1 < tasks.len() {
                    let a = tasks[tn + 1].a
                        - tasks[tm].a * tasks[tn + 1].r / (tasks[tm].tsum - tasks[tm].r);
                    consider(&mut min_a, cur_a, a);
                }
            } else {
                let sf = SubFunction::new(
                    cur_a,
                    0.0,
                    1.0 / (tasks[tm].a * power),
                    0.0,
                    (tasks[tm].tsum - tasks[tm].r) / tasks[tm].a,
                );
                push_if_new(&mut pieces, sf);
                for i in 0..tn {
                    let a = (tasks[tm].a * (tasks[i].tsum - tasks[i].r) / tasks[i].a
                        - tasks[tm].tsum + tasks[tm].r) * power;
                    consider(&mut min_a, cur_a, a);
                }
                let c = tasks[tn].tsum * tasks[tm].a * power;
                let b = (tasks[tm].tsum - tasks[tm].r) * power - tasks[tm].a;
                if let Some(a) = largest_root(b, c) {
                    consider(&mut min_a, cur_a, a);
                }
                for i in (tn + 1)..tasks.len() {
                    let a = ((tasks[tm].tsum - tasks[tm].r) * tasks[i].a
                        - (tasks[i].tsum - tasks[i].r) * tasks[tm].a) * power
                        / (tasks[tm].a - tasks[i].a);
                    consider(&mut min_a, cur_a, a);
                }
                if tn + 1 < tasks.len() {
                    let c = (tasks[tm].a * tasks[tn + 1].r
                        + tasks[tn + 1].a * (tasks[tm].tsum - tasks[tm].r)) * power;
                    let b = (tasks[tm].tsum - tasks[tm].r) * power - tasks[tn + 1].a;
                    if let Some(a) = largest_root(b, c) {
                        consider(&mut min_a, cur_a, a);
                    }
                }
                if !boundaries.is_empty() && *boundaries.last().unwrap() > max_slowness {
                    if let Some(&sv) = boundaries.iter().find(|&&v| v > max_slowness) {
                        let a = (sv * tasks[tm].a - tasks[tm].tsum + tasks[tm].r) * power;
                        consider(&mut min_a, cur_a, a);
                    }
                }
            }

            if !min_a.is_finite() {
                break;
            }

            tasks[tn].a = min_a + 1.0;
            tasks[tn].t = tasks[tn].a / power;
            if tn + 1 < tasks.len() {
                let new_task = tasks.remove(tn);
                tasks.push(new_task);
            }
        }

        Z { pieces }
    }

    /// `getSlowness`: evaluates the active piece at `a`.
    pub fn get_slowness(&self, a: f64) -> f64 {
        self.active_piece(a).value(a, 1.0)
    }

    /// `estimateSlowness`: evaluates the active piece as if `n` tasks of
    /// length `a` were added at once.
    pub fn estimate_slowness(&self, a: f64, n: u32) -> f64 {
        self.active_piece(a).value(a, n as f64)
    }

    fn active_piece(&self, a: f64) -> &SubFunction {
        match self.pieces.binary_search_by(|p| p.l.partial_cmp(&a).unwrap()) {
            Ok(i) => &self.pieces[i],
            Err(0) => &self.pieces[0],
            Err(i) => &self.pieces[i - 1],
        }
    }

    /// The maximum `z1` across pieces — the slowness floor of the most
    /// heavily loaded machine state this function passes through.
    pub fn slowest_machine(&self) -> f64 {
        self.pieces.iter().map(|p| p.z1).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(l: &Z, r: &Z) -> Z {
        let mut out = Vec::new();
        stepper(&[l, r], |s| {
            let chosen = s.pieces[s.max_idx ^ 1];
            if out.last().map_or(true, |last| !chosen.extends_at(last, s.edge_start)) {
                out.push(SubFunction::at(s.edge_start, chosen));
            }
        });
        Z { pieces: out }
    }

    pub fn max(l: &Z, r: &Z) -> Z {
        let mut out = Vec::new();
        stepper(&[l, r], |s| {
            let chosen = s.pieces[s.max_idx];
            if out.last().map_or(true, |last| !chosen.extends_at(last, s.edge_start)) {
                out.push(SubFunction::at(s.edge_start, chosen));
            }
        });
        Z { pieces: out }
    }

    /// Aggregates `l` and `r` (weighted by cluster sizes `lv`, `rv`) into
    /// the running max envelope `max_l + max_r`.
    pub fn max_diff(l: &Z, r: &Z, lv: f64, rv: f64, max_l: &Z, max_r: &Z) -> Z {
        let val = [lv, rv];
        let mut out = Vec::new();
        stepper(&[l, r, max_l, max_r], |s| {
            let hi = s.pieces[s.max_idx];
            let lo = s.pieces[s.max_idx ^ 1];
            let ml = s.pieces[2];
            let mr = s.pieces[3];
            let other = val[s.max_idx ^ 1];
            let sf = SubFunction::new(
                s.edge_start,
                ml.x + mr.x + other * (hi.x - lo.x),
                ml.y + mr.y + other * (hi.y - lo.y),
                ml.z1 + mr.z1 + other * (hi.z1 - lo.z1),
                ml.z2 + mr.z2 + other * (hi.z2 - lo.z2),
            );
            if out.last().map_or(true, |last| !sf.extends(last)) {
                out.push(sf);
            }
        });
        Z { pieces: out }
    }

    /// `∫_MIN_A^ah (self(a) - r(a))^2 da`, computed piecewise-analytically.
    pub fn sqdiff(&self, r: &Z, ah: f64) -> f64 {
        let mut result = 0.0;
        stepper(&[self, r], |s| {
            let b = if s.edge_end.is_finite() { s.edge_end } else { ah };
            let a = s.edge_start;
            let hi = s.pieces[s.max_idx];
            let lo = s.pieces[s.max_idx ^ 1];
            let u = hi.x - lo.x;
            let v = hi.y - lo.y;
            let w = (hi.z1 + hi.z2) - (lo.z1 + lo.z2);
            if b <= a {
                return;
            }
            let ab = a * b;
            let ba = b - a;
            let ba2 = b * b - a * a;
            let ba3 = b * b * b - a * a * a;
            result += (u * u / ab + 2.0 * u * v + w * w) * ba
                + w * v * ba2
                + v * v * ba3 / 3.0
                + 2.0 * u * w * (b / a).ln();
        });
        result
    }

    /// Clamps a computed `sqdiff`-like quantity into the non-negative
    /// domain, logging per the configured tolerance.
    pub fn clamp_nonnegative(value: f64, cfg: &FunctionConfig) -> f64 {
        if value >= 0.0 {
            value
        } else if value.abs() <= cfg.sqdiff_epsilon {
            tracing::debug!(value, "clamping small negative sqdiff to zero");
            0.0
        } else {
            tracing::warn!(value, "sqdiff violated non-negativity beyond tolerance");
            0.0
        }
    }

    /// Reduces the piece count to at most `cfg.num_pieces` by repeatedly
    /// merging the adjacent pair whose replacement minimizes `sqdiff`
    /// against the original, keeping a bounded beam of candidates. Always
    /// produces a conservative overapproximation (`result(a) >= self(a)`).
    pub fn reduce_max(&self, horizon: f64, cfg: &FunctionConfig) -> Z {
        if self.pieces.len() <= cfg.num_pieces {
            return self.clone();
        }
        let mut current = self.clone();
        while current.pieces.len() > cfg.num_pieces {
            let mut best: Option<(usize, f64, SubFunction)> = None;
            let mut beam = 0usize;
            for i in 0..current.pieces.len() - 1 {
                let merged = merge_dominating(&current.pieces[i], &current.pieces[i + 1]);
                let candidate = {
                    let mut trial = current.pieces.clone();
                    trial[i] = merged;
                    trial.remove(i + 1);
                    Z { pieces: trial }
                };
                let loss = candidate.sqdiff(self, horizon);
                if best.as_ref().map_or(true, |(_, best_loss, _)| loss < *best_loss) {
                    best = Some((i, loss, merged));
                }
                beam += 1;
                if beam >= cfg.reduction_quality {
                    break;
                }
            }
            match best {
                Some((i, _, merged)) => {
                    current.pieces[i] = merged;
                    current.pieces.remove(i + 1);
                }
                None => break,
            }
        }
        current
    }

    /// Reduces availability when assigning `n` tasks of the given `length`:
    /// every piece from `length` onward is shifted up by the slowness
    /// contribution of the newly committed tasks.
    pub fn update(&mut self, length: f64, n: u32) {
        for piece in self.pieces.iter_mut() {
            if piece.l >= length {
                piece.z2 += piece.value(length, n as f64) - piece.value(length, 0.0);
            }
        }
    }
}

impl SubFunction {
    fn extends_at(&self, other: &SubFunction, at_l: f64) -> bool {
        at_l >= other.l && self.x == other.x && self.y == other.y
            && self.z1 == other.z1 && self.z2 == other.z2
    }
}

fn push_if_new(pieces: &mut Vec<SubFunction>, sf: SubFunction) {
    if pieces.last().map_or(true, |last| !sf.extends(last)) {
        pieces.push(sf);
    }
}

fn consider(min_a: &mut f64, cur_a: f64, candidate: f64) {
    if candidate > cur_a && candidate < *min_a {
        *min_a = candidate;
    }
}

fn largest_root(b: f64, c: f64) -> Option<f64> {
    let discriminant = b * b + 4.0 * c;
    if discriminant < 0.0 {
        None
    } else {
        Some((-b + discriminant.sqrt()) / 2.0)
    }
}

/// `TaskList::getBoundaries` restricted to a plain slice (used during `Z`
/// construction, which needs to mutate a local copy of the queue plus the
/// synthetic new-task proxy rather than a `TaskList`).
fn min_slowness_boundaries(tasks: &[TaskProxy]) -> Vec<f64> {
    if tasks.is_empty() {
        return Vec::new();
    }
    let first = &tasks[0];
    let mut boundaries = vec![first.t / first.a];
    let first_boundary = boundaries[0];
    for i in 1..tasks.len() {
        for j in i..tasks.len() {
            if tasks[i].a != tasks[j].a {
                let l = (tasks[j].r - tasks[i].r) / (tasks[i].a - tasks[j].a);
                if l > first_boundary {
                    boundaries.push(l);
                }
            }
        }
    }
    boundaries.sort_by(|a, b| a.partial_cmp(b).unwrap());
    boundaries.dedup_by(|a, b| a == b);
    boundaries
}

fn sort_by_slowness(tasks: &mut [TaskProxy], slowness: f64) {
    if tasks.len() > 1 {
        tasks[1..].sort_by(|a, b| a.deadline(slowness).partial_cmp(&b.deadline(slowness)).unwrap());
    }
}

fn meet_deadlines(tasks: &[TaskProxy], slowness: f64) -> bool {
    let mut e = 0.0;
    for t in tasks {
        e += t.t;
        if e > t.deadline(slowness) {
            return false;
        }
    }
    true
}

fn sort_min_slowness(tasks: &mut Vec<TaskProxy>, boundaries: &[f64]) {
    if tasks.is_empty() {
        return;
    }
    if boundaries.len() == 1 {
        sort_by_slowness(tasks, boundaries[0] + 1.0);
        return;
    }
    let mut min_li = 0usize;
    let mut max_li = boundaries.len() - 1;
    while max_li > min_li + 1 {
        let med = (min_li + max_li) / 2;
        sort_by_slowness(tasks, (boundaries[med] + boundaries[med + 1]) / 2.0);
        if meet_deadlines(tasks, boundaries[med]) {
            max_li = med;
        } else {
            min_li = med;
        }
    }
    sort_by_slowness(tasks, (boundaries[min_li] + boundaries[max_li]) / 2.0);
    if max_li == boundaries.len() - 1 && !meet_deadlines(tasks, boundaries[max_li]) {
        sort_by_slowness(tasks, boundaries[max_li] + 1.0);
    }
}

/// Reconstructs a dominating subfunction over `[l.l, r.l)` ∪ `[r.l, ...)`
/// by interpolating through representative sample points of both inputs,
/// per the "three construction templates" reduction scheme: a merge must
/// weakly dominate both operands on their combined interval.
fn merge_dominating(l: &SubFunction, r: &SubFunction) -> SubFunction {
    let sample_a = l.l.max(MIN_A);
    let sample_b = r.l;
    let sample_c = if r.l.is_finite() { r.l * 2.0 + 1.0 } else { sample_b + 1000.0 };
    let va = l.value(sample_a, 1.0).max(0.0);
    let vb = l.value(sample_b, 1.0).max(r.value(sample_b, 1.0));
    let vc = r.value(sample_c, 1.0);
    // Fit x/a + y*a + z through the three points; fall back to the
    // steeper (right) tangent if the interpolation fails to dominate.
    let denom = (sample_a - sample_b) * (sample_b - sample_c) * (sample_c - sample_a);
    if denom.abs() < f64::EPSILON {
        return *r;
    }
    let y = (va * (sample_b - sample_c) + vb * (sample_c - sample_a) + vc * (sample_a - sample_b)) / denom
        * (sample_a * sample_b * sample_c);
    let candidate = SubFunction::new(l.l, 0.0, y.max(l.y.max(r.y)), 0.0, va.max(vb).max(vc));
    if candidate.value(sample_a, 1.0) + 1e-6 >= va && candidate.value(sample_b, 1.0) + 1e-6 >= vb {
        candidate
    } else {
        SubFunction::new(l.l, 0.0, r.y, 0.0, va.max(vb).max(vc))
    }
}

struct StepInfo<'a, const N: usize> {
    edge_start: f64,
    edge_end: f64,
    pieces: [&'a SubFunction; N],
    max_idx: usize,
}

/// Walks the merged breakpoint sequence of `funcs`, splitting further at
/// any crossing point between `funcs[0]` and `funcs[1]`, and invokes `step`
/// once per resulting sub-interval with the active piece of every function
/// and `max_idx` (which of `funcs[0]`/`funcs[1]` is greater there).
fn stepper<const N: usize>(funcs: [&Z; N], mut step: impl FnMut(&StepInfo<N>)) {
    assert!(N >= 2);
    let mut idx = [0usize; N];
    let mut s = MIN_A;
    loop {
        let mut next_s = f64::INFINITY;
        for (i, f) in funcs.iter().enumerate() {
            if let Some(next) = f.pieces.get(idx[i] + 1) {
                if next.l < next_s {
                    next_s = next.l;
                }
            }
        }
        if next_s > s {
            let f0 = &funcs[0].pieces[idx[0]];
            let f1 = &funcs[1].pieces[idx[1]];
            let mut edges = vec![s];
            for cp in crossing_points(f0, f1, s, next_s) {
                edges.push(cp);
            }
            edges.push(next_s);
            edges.sort_by(|a, b| a.partial_cmp(b).unwrap());
            edges.dedup();
            for w in edges.windows(2) {
                let (a, b) = (w[0], w[1]);
                let mid = if b.is_finite() { (a + b) / 2.0 } else { a + 1000.0 };
                let max_idx = if f0.value(mid, 1.0) >= f1.value(mid, 1.0) { 0 } else { 1 };
                let pieces: [&SubFunction; N] = std::array::from_fn(|i| funcs[i].pieces[idx[i]]);
                step(&StepInfo { edge_start: a, edge_end: b, pieces, max_idx });
            }
        }
        if !next_s.is_finite() {
            break;
        }
        s = next_s;
        for (i, f) in funcs.iter().enumerate() {
            if f.pieces.get(idx[i] + 1).map_or(false, |p| p.l == s) {
                idx[i] += 1;
            }
        }
    }
}

fn crossing_points(f0: &SubFunction, f1: &SubFunction, s: f64, e: f64) -> Vec<f64> {
    let a = f0.y - f1.y;
    let b = (f0.z1 - f1.z1) + (f0.z2 - f1.z2);
    let c = f0.x - f1.x;
    let mut out = Vec::new();
    if a == 0.0 {
        if b != 0.0 {
            let cp = -c / b;
            if cp > s && cp < e {
                out.push(cp);
            }
        }
    } else if b == 0.0 {
        let cp = -c / a;
        if cp > s * s && cp < e * e {
            out.push(cp.sqrt());
        }
    } else {
        let discriminant = b * b - 4.0 * a * c;
        if discriminant >= 0.0 {
            let sq = discriminant.sqrt();
            let mut cp1 = (-b + sq) / (2.0 * a);
            let mut cp2 = (-b - sq) / (2.0 * a);
            if cp1 > cp2 {
                std::mem::swap(&mut cp1, &mut cp2);
            }
            if cp1 > s && cp1 < e {
                out.push(cp1);
            }
            if cp2 > s && cp2 < e {
                out.push(cp2);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasklist::TaskList;
    use crate::time::{FixedClock, Time};

    fn clock() -> FixedClock {
        FixedClock(Time::from_secs(0.0))
    }

    #[test]
    fn empty_queue_yields_single_linear_piece() {
        // End-to-end scenario 1.
        let z = Z::from_task_list(&TaskList::new(), 1000.0, &clock());
        assert_eq!(z.pieces().len(), 1);
        assert!((z.get_slowness(5000.0) - 0.001).abs() < 1e-9);
        assert!((z.estimate_slowness(5000.0, 3) - 0.003).abs() < 1e-9);
    }

    #[test]
    fn p1_slowness_is_nonnegative() {
        let z = Z::from_task_list(&TaskList::new(), 1000.0, &clock());
        for sample in [MIN_A, 5000.0, 1_000_000.0] {
            assert!(z.get_slowness(sample) >= 0.0);
        }
    }

    #[test]
    fn p6_estimate_is_monotone_in_n() {
        let z = Z::from_task_list(&TaskList::new(), 1000.0, &clock());
        let a = 5000.0;
        for n in 1..10u32 {
            assert!(z.estimate_slowness(a, n) <= z.estimate_slowness(a, n + 1) + 1e-9);
        }
    }

    #[test]
    fn p7_estimate_matches_single_task_slowness() {
        let z = Z::from_task_list(&TaskList::new(), 1000.0, &clock());
        let a = 5000.0;
        let diff = (z.estimate_slowness(a, 1) - z.get_slowness(a)).abs() / z.get_slowness(a);
        assert!(diff < 0.01);
    }

    #[test]
    fn p3_and_p4_min_max_bounds() {
        let f = Z::from_pieces(vec![SubFunction::new(MIN_A, 100.0, 0.0, 0.001, 0.0)]);
        let g = Z::from_pieces(vec![SubFunction::new(MIN_A, 50.0, 0.0005, 0.0005, 0.0)]);
        let min = Z::min(&f, &g);
        let max = Z::max(&f, &g);
        for sample in [1000.0, 2000.0, 10000.0, 100000.0] {
            let fv = f.get_slowness(sample);
            let gv = g.get_slowness(sample);
            assert!(min.get_slowness(sample) <= fv * 1.00001 + 1e-9);
            assert!(min.get_slowness(sample) <= gv * 1.00001 + 1e-9);
            assert!(max.get_slowness(sample) >= fv * 0.99999 - 1e-9);
            assert!(max.get_slowness(sample) >= gv * 0.99999 - 1e-9);
        }
    }

    #[test]
    fn p9_sqdiff_is_nonnegative() {
        let f = Z::from_pieces(vec![SubFunction::new(MIN_A, 100.0, 0.0, 0.001, 0.0)]);
        let g = Z::from_pieces(vec![SubFunction::new(MIN_A, 50.0, 0.0005, 0.0005, 0.0)]);
        assert!(f.sqdiff(&g, 100000.0) >= -1e-6);
    }

    #[test]
    fn p2_adjacent_pieces_meet_continuously() {
        let pieces = vec![
            SubFunction::new(MIN_A, 100.0, 0.0, 0.001, 0.0),
            SubFunction::new(5000.0, 0.0, 0.0005, 0.0005, 0.0),
        ];
        let boundary = pieces[1].l;
        let left = pieces[0].value(boundary, 1.0);
        let right = pieces[1].value(boundary, 1.0);
        assert!(((left - right) / left).abs() < 0.05);
    }
}
