//! Reeds-Shepp path generation between oriented poses.
//!
//! Word formulas follow the original paper's notation: each candidate is a
//! triple of signed segment lengths in curvature-normalized units, expanded
//! through the timeflip and reflect symmetries. Covered families: SCS, CSC
//! and CCC (the latter also driven in reversed segment order).

use std::f64::consts::PI;

use crate::geometry::{wrap_angle, Pose2D};
use crate::models::Gear;

/// Primitive segment shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Left,
    Straight,
    Right,
}

/// One sampled Reeds-Shepp path in world units.
///
/// `lengths[i]` is the signed arc length of the i-th segment; the sign
/// encodes gear. Sample sequences are parallel and include both endpoints.
#[derive(Debug, Clone)]
pub struct RsPath {
    pub lengths: Vec<f64>,
    pub kinds: Vec<SegmentKind>,
    pub total_length: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub yaw: Vec<f64>,
    pub directions: Vec<Gear>,
}

impl RsPath {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Candidate word in normalized units (turning radius 1).
#[derive(Debug, Clone)]
struct Word {
    lengths: [f64; 3],
    kinds: [SegmentKind; 3],
}

impl Word {
    fn total(&self) -> f64 {
        self.lengths.iter().map(|l| l.abs()).sum()
    }
}

/// All Reeds-Shepp candidates from `start` to `goal` for the given turning
/// radius, sampled every `step_size` of arc length. Enumeration order is
/// deterministic.
pub fn calc_all_paths(
    start: &Pose2D,
    goal: &Pose2D,
    turning_radius: f64,
    step_size: f64,
) -> Vec<RsPath> {
    let c = 1.0 / turning_radius;
    let dx = goal.x - start.x;
    let dy = goal.y - start.y;
    let (sin0, cos0) = start.yaw.sin_cos();

    let x = (cos0 * dx + sin0 * dy) * c;
    let y = (-sin0 * dx + cos0 * dy) * c;
    let phi = wrap_angle(goal.yaw - start.yaw);

    generate_words(x, y, phi)
        .iter()
        .map(|word| sample_word(word, start, c, step_size * c))
        .collect()
}

fn polar(x: f64, y: f64) -> (f64, f64) {
    (x.hypot(y), y.atan2(x))
}

/// S+L+S+ word.
fn sls(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let phi = wrap_angle(phi);
    if !(phi > 0.0 && phi < PI * 0.99) || y == 0.0 {
        return None;
    }
    let xd = -y / phi.tan() + x;
    let t = xd - (phi / 2.0).tan();
    let u = phi;
    let v = if y > 0.0 {
        (x - xd).hypot(y) - (phi / 2.0).tan()
    } else {
        -(x - xd).hypot(y) - (phi / 2.0).tan()
    };
    Some((t, u, v))
}

/// L+S+L+ word.
fn lsl(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u, t) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if t < 0.0 {
        return None;
    }
    let v = wrap_angle(phi - t);
    if v < 0.0 {
        return None;
    }
    Some((t, u, v))
}

/// L+S+R+ word.
fn lsr(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u1, t1) = polar(x + phi.sin(), y - 1.0 - phi.cos());
    let u1_sq = u1 * u1;
    if u1_sq < 4.0 {
        return None;
    }
    let u = (u1_sq - 4.0).sqrt();
    let theta = 2.0_f64.atan2(u);
    let t = wrap_angle(t1 + theta);
    let v = wrap_angle(t - phi);
    if t < 0.0 || v < 0.0 {
        return None;
    }
    Some((t, u, v))
}

/// L+R-L+ word; the middle arc runs in the opposite gear.
fn lrl(x: f64, y: f64, phi: f64) -> Option<(f64, f64, f64)> {
    let (u1, t1) = polar(x - phi.sin(), y - 1.0 + phi.cos());
    if u1 > 4.0 {
        return None;
    }
    let u = -2.0 * (0.25 * u1).asin();
    let t = wrap_angle(t1 + 0.5 * u + PI);
    let v = wrap_angle(phi - t + u);
    if t < 0.0 || u > 0.0 {
        return None;
    }
    Some((t, u, v))
}

fn generate_words(x: f64, y: f64, phi: f64) -> Vec<Word> {
    use SegmentKind::{Left, Right, Straight};

    let mut words: Vec<Word> = Vec::new();
    let mut push = |lengths: [f64; 3], kinds: [SegmentKind; 3]| {
        let word = Word { lengths, kinds };
        if word.total() < 1e-4 {
            return;
        }
        // Suppress near-duplicates produced by overlapping symmetries.
        let duplicate = words.iter().any(|w| {
            w.kinds == word.kinds
                && w.lengths
                    .iter()
                    .zip(&word.lengths)
                    .map(|(a, b)| (a - b).abs())
                    .sum::<f64>()
                    <= 0.01
        });
        if !duplicate {
            words.push(word);
        }
    };

    // SCS
    if let Some((t, u, v)) = sls(x, y, phi) {
        push([t, u, v], [Straight, Left, Straight]);
    }
    if let Some((t, u, v)) = sls(x, -y, -phi) {
        push([t, u, v], [Straight, Right, Straight]);
    }

    // CSC
    if let Some((t, u, v)) = lsl(x, y, phi) {
        push([t, u, v], [Left, Straight, Left]);
    }
    if let Some((t, u, v)) = lsl(-x, y, -phi) {
        push([-t, -u, -v], [Left, Straight, Left]);
    }
    if let Some((t, u, v)) = lsl(x, -y, -phi) {
        push([t, u, v], [Right, Straight, Right]);
    }
    if let Some((t, u, v)) = lsl(-x, -y, phi) {
        push([-t, -u, -v], [Right, Straight, Right]);
    }
    if let Some((t, u, v)) = lsr(x, y, phi) {
        push([t, u, v], [Left, Straight, Right]);
    }
    if let Some((t, u, v)) = lsr(-x, y, -phi) {
        push([-t, -u, -v], [Left, Straight, Right]);
    }
    if let Some((t, u, v)) = lsr(x, -y, -phi) {
        push([t, u, v], [Right, Straight, Left]);
    }
    if let Some((t, u, v)) = lsr(-x, -y, phi) {
        push([-t, -u, -v], [Right, Straight, Left]);
    }

    // CCC
    if let Some((t, u, v)) = lrl(x, y, phi) {
        push([t, u, v], [Left, Right, Left]);
    }
    if let Some((t, u, v)) = lrl(-x, y, -phi) {
        push([-t, -u, -v], [Left, Right, Left]);
    }
    if let Some((t, u, v)) = lrl(x, -y, -phi) {
        push([t, u, v], [Right, Left, Right]);
    }
    if let Some((t, u, v)) = lrl(-x, -y, phi) {
        push([-t, -u, -v], [Right, Left, Right]);
    }

    // CCC traversed in reversed segment order.
    let xb = x * phi.cos() + y * phi.sin();
    let yb = x * phi.sin() - y * phi.cos();
    if let Some((t, u, v)) = lrl(xb, yb, phi) {
        push([v, u, t], [Left, Right, Left]);
    }
    if let Some((t, u, v)) = lrl(-xb, yb, -phi) {
        push([-v, -u, -t], [Left, Right, Left]);
    }
    if let Some((t, u, v)) = lrl(xb, -yb, -phi) {
        push([v, u, t], [Right, Left, Right]);
    }
    if let Some((t, u, v)) = lrl(-xb, -yb, phi) {
        push([-v, -u, -t], [Right, Left, Right]);
    }

    words
}

/// Pose reached after driving `s` (signed, normalized) along a segment
/// that starts at `(ox, oy, oyaw)`.
fn interpolate(ox: f64, oy: f64, oyaw: f64, s: f64, kind: SegmentKind) -> (f64, f64, f64) {
    match kind {
        SegmentKind::Straight => (ox + s * oyaw.cos(), oy + s * oyaw.sin(), oyaw),
        SegmentKind::Left => (
            ox + (oyaw + s).sin() - oyaw.sin(),
            oy - (oyaw + s).cos() + oyaw.cos(),
            oyaw + s,
        ),
        SegmentKind::Right => (
            ox - (oyaw - s).sin() + oyaw.sin(),
            oy + (oyaw - s).cos() - oyaw.cos(),
            oyaw - s,
        ),
    }
}

/// Samples a normalized word and lifts it into world coordinates anchored
/// at `start`. Adjacent samples are at most `step_norm` of arc apart and
/// segment endpoints are hit exactly.
fn sample_word(word: &Word, start: &Pose2D, c: f64, step_norm: f64) -> RsPath {
    let mut lx = vec![0.0];
    let mut ly = vec![0.0];
    let mut lyaw = vec![0.0];
    let mut directions = vec![Gear::from_signed(word.lengths[0])];

    let (mut ox, mut oy, mut oyaw) = (0.0, 0.0, 0.0);
    for (&l, &kind) in word.lengths.iter().zip(&word.kinds) {
        if l.abs() < 1e-12 {
            continue;
        }
        let gear = Gear::from_signed(l);
        let d = step_norm.copysign(l);

        let mut s = d;
        while s.abs() < l.abs() {
            let (px, py, pyaw) = interpolate(ox, oy, oyaw, s, kind);
            lx.push(px);
            ly.push(py);
            lyaw.push(pyaw);
            directions.push(gear);
            s += d;
        }
        let (px, py, pyaw) = interpolate(ox, oy, oyaw, l, kind);
        lx.push(px);
        ly.push(py);
        lyaw.push(pyaw);
        directions.push(gear);
        (ox, oy, oyaw) = (px, py, pyaw);
    }

    let (sin0, cos0) = start.yaw.sin_cos();
    let n = lx.len();
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut yaw = Vec::with_capacity(n);
    for i in 0..n {
        x.push((lx[i] * cos0 - ly[i] * sin0) / c + start.x);
        y.push((lx[i] * sin0 + ly[i] * cos0) / c + start.y);
        yaw.push(wrap_angle(start.yaw + lyaw[i]));
    }

    let lengths: Vec<f64> = word.lengths.iter().map(|l| l / c).collect();
    RsPath {
        total_length: lengths.iter().map(|l| l.abs()).sum(),
        lengths,
        kinds: word.kinds.to_vec(),
        x,
        y,
        yaw,
        directions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const RADIUS: f64 = 0.5;
    const STEP: f64 = 0.2;

    fn endpoint_error(path: &RsPath, goal: &Pose2D) -> f64 {
        let n = path.len() - 1;
        let dyaw = wrap_angle(path.yaw[n] - goal.yaw).abs();
        (path.x[n] - goal.x).hypot(path.y[n] - goal.y) + dyaw
    }

    #[test]
    fn straight_goal_yields_a_pure_straight_candidate() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(4.0, 0.0, 0.0);
        let paths = calc_all_paths(&start, &goal, RADIUS, STEP);
        assert!(!paths.is_empty());

        let best = paths
            .iter()
            .min_by(|a, b| a.total_length.partial_cmp(&b.total_length).unwrap())
            .unwrap();
        assert_relative_eq!(best.total_length, 4.0, epsilon = 1e-9);
        assert!(best.directions.iter().all(|&d| d == Gear::Forward));
    }

    #[test]
    fn every_candidate_lands_on_the_goal_pose() {
        let start = Pose2D::new(0.3, -0.2, 0.4);
        for goal in [
            Pose2D::new(2.0, 1.0, 1.2),
            Pose2D::new(-1.0, 2.0, -2.5),
            Pose2D::new(0.0, 0.0, std::f64::consts::PI),
            Pose2D::new(1.5, -2.5, 0.0),
        ] {
            let paths = calc_all_paths(&start, &goal, RADIUS, STEP);
            assert!(!paths.is_empty(), "no candidates toward {goal:?}");
            for path in &paths {
                assert!(
                    endpoint_error(path, &goal) < 1e-6,
                    "candidate missed the goal by {}",
                    endpoint_error(path, &goal)
                );
            }
        }
    }

    #[test]
    fn sample_spacing_never_exceeds_the_step() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(1.0, 1.5, 2.0);
        for path in calc_all_paths(&start, &goal, RADIUS, STEP) {
            for i in 1..path.len() {
                let chord = (path.x[i] - path.x[i - 1]).hypot(path.y[i] - path.y[i - 1]);
                assert!(chord <= STEP + 1e-9, "chord {chord} exceeds step");
            }
        }
    }

    #[test]
    fn u_turn_in_place_requires_a_gear_switch() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(0.0, 0.0, std::f64::consts::PI);
        let paths = calc_all_paths(&start, &goal, RADIUS, STEP);
        assert!(!paths.is_empty());
        for path in &paths {
            let switches = path
                .lengths
                .windows(2)
                .filter(|w| w[0] * w[1] < 0.0)
                .count();
            assert!(switches >= 1, "in-place turn without a cusp: {:?}", path.lengths);
        }
    }

    #[test]
    fn directions_follow_segment_signs() {
        let start = Pose2D::new(0.0, 0.0, 0.0);
        let goal = Pose2D::new(0.4, 0.4, 1.0);
        for path in calc_all_paths(&start, &goal, RADIUS, STEP) {
            assert_eq!(path.directions.len(), path.len());
            if path.lengths.iter().all(|&l| l >= 0.0) {
                assert!(path.directions.iter().all(|&d| d == Gear::Forward));
            }
        }
    }

    #[test]
    fn yaw_samples_stay_wrapped() {
        let start = Pose2D::new(0.0, 0.0, 3.0);
        let goal = Pose2D::new(-2.0, 1.0, -3.0);
        for path in calc_all_paths(&start, &goal, RADIUS, STEP) {
            for &a in &path.yaw {
                assert!(a > -PI && a <= PI);
            }
        }
    }
}
