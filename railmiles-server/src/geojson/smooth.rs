//! Corner-cutting curve smoothing.
//!
//! Station-to-station polylines look jagged on a map. Each pass replaces
//! every interior vertex with two points a quarter of the way in from it
//! along its adjacent segments; repeated passes converge on a smooth
//! curve through the first and last points.

/// Passes applied to a rendered route.
pub const SMOOTHING_ITERATIONS: usize = 5;

/// A `[lon, lat]` position.
pub type Point = [f32; 2];

/// Apply `iterations` corner-cutting passes.
pub fn smooth(points: &[Point], iterations: usize) -> Vec<Point> {
    let mut points = points.to_vec();
    for _ in 0..iterations {
        if points.len() < 3 {
            break;
        }
        points = cut_corners(&points);
    }
    points
}

/// One pass: n points in, 2n - 2 out, endpoints unchanged.
fn cut_corners(points: &[Point]) -> Vec<Point> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(points.len() * 2 - 2);
    out.push(*first);
    for window in points.windows(3) {
        let [prev, p, next] = [window[0], window[1], window[2]];
        out.push(lerp(prev, p, 0.75));
        out.push(lerp(p, next, 0.25));
    }
    out.push(*last);
    out
}

/// The point `t` of the way from `a` to `b`.
fn lerp(a: Point, b: Point, t: f32) -> Point {
    [a[0] * (1.0 - t) + b[0] * t, a[1] * (1.0 - t) + b[1] * t]
}
