//! Planar loop utilities.
//!
//! Loops are vertex lists without a repeated closing vertex. Counter-clockwise
//! loops have positive signed area.

use panelcam_core::Point2;

/// Coordinates closer than this are treated as the same point.
pub const POINT_TOLERANCE: f64 = 1e-9;

/// Shoelace signed area, positive for counter-clockwise loops.
pub fn signed_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..points.len() {
        let p1 = points[i];
        let p2 = points[(i + 1) % points.len()];
        sum += p1.x * p2.y - p2.x * p1.y;
    }
    sum / 2.0
}

/// Area centroid of a loop; falls back to the vertex mean for degenerate loops.
pub fn centroid(points: &[Point2]) -> Point2 {
    let area = signed_area(points);
    if area.abs() < POINT_TOLERANCE {
        let n = points.len().max(1) as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        return Point2::new(sx / n, sy / n);
    }
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..points.len() {
        let p1 = points[i];
        let p2 = points[(i + 1) % points.len()];
        let cross = p1.x * p2.y - p2.x * p1.y;
        cx += (p1.x + p2.x) * cross;
        cy += (p1.y + p2.y) * cross;
    }
    Point2::new(cx / (6.0 * area), cy / (6.0 * area))
}

/// Return the loop with the requested winding.
pub fn oriented(mut points: Vec<Point2>, ccw: bool) -> Vec<Point2> {
    if (signed_area(&points) > 0.0) != ccw {
        points.reverse();
    }
    points
}

/// Drop consecutive duplicates and a trailing vertex that repeats the first.
pub fn dedup_loop(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_none_or(|last| (last - p).norm() > tolerance) {
            out.push(*p);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= tolerance {
        out.pop();
    }
    out
}

fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn on_segment(p: &Point2, a: &Point2, b: &Point2) -> bool {
    p.x >= a.x.min(b.x) - POINT_TOLERANCE
        && p.x <= a.x.max(b.x) + POINT_TOLERANCE
        && p.y >= a.y.min(b.y) - POINT_TOLERANCE
        && p.y <= a.y.max(b.y) + POINT_TOLERANCE
}

/// True when segments `a1a2` and `b1b2` share at least one point.
pub fn segments_intersect(a1: &Point2, a2: &Point2, b1: &Point2, b2: &Point2) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > POINT_TOLERANCE && d2 < -POINT_TOLERANCE)
        || (d1 < -POINT_TOLERANCE && d2 > POINT_TOLERANCE))
        && ((d3 > POINT_TOLERANCE && d4 < -POINT_TOLERANCE)
            || (d3 < -POINT_TOLERANCE && d4 > POINT_TOLERANCE))
    {
        return true;
    }

    (d1.abs() <= POINT_TOLERANCE && on_segment(a1, b1, b2))
        || (d2.abs() <= POINT_TOLERANCE && on_segment(a2, b1, b2))
        || (d3.abs() <= POINT_TOLERANCE && on_segment(b1, a1, a2))
        || (d4.abs() <= POINT_TOLERANCE && on_segment(b2, a1, a2))
}

/// Index pair of the first two non-adjacent edges that touch, if any.
///
/// Edge `i` runs from `points[i]` to `points[i + 1]`; with `closed` the last
/// edge returns to `points[0]`.
pub fn first_crossing(points: &[Point2], closed: bool) -> Option<(usize, usize)> {
    let n = points.len();
    let edge_count = if closed { n } else { n.saturating_sub(1) };
    for i in 0..edge_count {
        let (a1, a2) = (points[i], points[(i + 1) % n]);
        for j in (i + 1)..edge_count {
            let adjacent = j == i + 1 || (closed && i == 0 && j == edge_count - 1);
            let (b1, b2) = (points[j], points[(j + 1) % n]);
            if adjacent {
                // Consecutive edges may only share their common vertex; folding back is a crossing.
                let (shared, other_a, other_b) = if j == i + 1 {
                    (a2, a1, b2)
                } else {
                    (a1, a2, b1)
                };
                let da = other_a - shared;
                let db = other_b - shared;
                let colinear = (da.x * db.y - da.y * db.x).abs() <= POINT_TOLERANCE;
                if colinear && da.dot(&db) > 0.0 {
                    return Some((i, j));
                }
                continue;
            }
            if segments_intersect(&a1, &a2, &b1, &b2) {
                return Some((i, j));
            }
        }
    }
    None
}

/// True when the closed loop has no touching non-adjacent edges.
pub fn is_simple(points: &[Point2]) -> bool {
    first_crossing(points, true).is_none()
}

/// Even-odd point-in-polygon test. Points on the boundary may go either way.
pub fn point_in_polygon(p: &Point2, polygon: &[Point2]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x = (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x;
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `p` to segment `ab`.
pub fn distance_to_segment(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let ab = b - a;
    let len2 = ab.norm_squared();
    if len2 < POINT_TOLERANCE * POINT_TOLERANCE {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

/// True when `p` lies on the boundary of the loop within `tolerance`.
pub fn on_boundary(p: &Point2, polygon: &[Point2], tolerance: f64) -> bool {
    let n = polygon.len();
    (0..n).any(|i| distance_to_segment(p, &polygon[i], &polygon[(i + 1) % n]) <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn test_signed_area_and_orientation() {
        let sq = square(2.0);
        assert!((signed_area(&sq) - 4.0).abs() < 1e-12);
        let cw = oriented(sq.clone(), false);
        assert!((signed_area(&cw) + 4.0).abs() < 1e-12);
        let c = centroid(&sq);
        assert!((c.x - 1.0).abs() < 1e-12 && (c.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bowtie_is_not_simple() {
        let bowtie = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        ];
        assert!(!is_simple(&bowtie));
        assert!(is_simple(&square(1.0)));
    }

    #[test]
    fn test_collinear_vertex_is_simple() {
        let mut sq = square(2.0);
        sq.insert(1, Point2::new(1.0, 0.0));
        assert!(is_simple(&sq));
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = square(2.0);
        assert!(point_in_polygon(&Point2::new(1.0, 1.0), &sq));
        assert!(!point_in_polygon(&Point2::new(3.0, 1.0), &sq));
        assert!(on_boundary(&Point2::new(2.0, 1.0), &sq, 1e-9));
    }

    #[test]
    fn test_dedup_loop() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 0.0),
        ];
        assert_eq!(dedup_loop(&pts, 1e-9).len(), 3);
    }
}
