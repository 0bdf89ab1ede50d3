//! Stroke simplification and smoothing
//!
//! Raw pointer samples are reduced with Ramer-Douglas-Peucker, then turned
//! into a chain of quadratic segments: each sample is a control point and the
//! midpoints between samples are the segment endpoints, so consecutive
//! segments join without corners.

use shared_types::Point;
use std::fmt::Write;

/// Drop samples that deviate from the stroke by no more than `tolerance`
///
/// The first and last samples are always kept, and simplifying an already
/// simplified stroke with the same tolerance returns it unchanged.
pub fn simplify_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let sq_tolerance = tolerance * tolerance;
    let last = points.len() - 1;

    let mut simplified = Vec::with_capacity(points.len());
    simplified.push(points[0]);
    simplify_step(points, 0, last, sq_tolerance, &mut simplified);
    simplified.push(points[last]);
    simplified
}

fn simplify_step(
    points: &[Point],
    first: usize,
    last: usize,
    sq_tolerance: f64,
    simplified: &mut Vec<Point>,
) {
    let mut max_sq_dist = sq_tolerance;
    let mut index = None;

    for (i, point) in points.iter().enumerate().take(last).skip(first + 1) {
        let sq_dist = sq_segment_distance(*point, points[first], points[last]);
        if sq_dist > max_sq_dist {
            index = Some(i);
            max_sq_dist = sq_dist;
        }
    }

    if let Some(index) = index {
        if index - first > 1 {
            simplify_step(points, first, index, sq_tolerance, simplified);
        }
        simplified.push(points[index]);
        if last - index > 1 {
            simplify_step(points, index, last, sq_tolerance, simplified);
        }
    }
}

/// Squared distance from `p` to the segment `a`-`b`
fn sq_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let mut x = a.x;
    let mut y = a.y;
    let dx = b.x - x;
    let dy = b.y - y;

    if dx != 0.0 || dy != 0.0 {
        let t = ((p.x - x) * dx + (p.y - y) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            x = b.x;
            y = b.y;
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }

    p.distance_sq(Point::new(x, y))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    QuadTo { control: Point, to: Point },
    LineTo(Point),
}

/// Smooth a simplified stroke into path segments
///
/// A control point closer than `equal_tolerance` to the following sample is
/// skipped. The path always ends with a line to the last sample. Returns an
/// empty path for an empty stroke.
pub fn smooth_path(points: &[Point], equal_tolerance: f64) -> Vec<PathSegment> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };

    let sq_tolerance = equal_tolerance * equal_tolerance;
    let mut segments = Vec::with_capacity(points.len() + 1);
    segments.push(PathSegment::MoveTo(first));

    let mut p1 = first;
    for &p2 in &points[1..] {
        if p1.distance_sq(p2) >= sq_tolerance {
            segments.push(PathSegment::QuadTo {
                control: p1,
                to: p1.midpoint(p2),
            });
        }
        p1 = p2;
    }
    segments.push(PathSegment::LineTo(p1));
    segments
}

/// SVG path data (`M`, `Q`, `L` commands) for `segments`
pub fn svg_path_data(segments: &[PathSegment]) -> String {
    let mut data = String::new();
    for segment in segments {
        // Writing into a String cannot fail
        let _ = match segment {
            PathSegment::MoveTo(p) => write!(data, "M{} {}", p.x, p.y),
            PathSegment::QuadTo { control, to } => {
                write!(data, "Q{} {} {} {}", control.x, control.y, to.x, to.y)
            }
            PathSegment::LineTo(p) => write!(data, "L{} {}", p.x, p.y),
        };
    }
    data
}

/// Build a drawable path, `None` for an empty segment list
pub fn to_skia_path(segments: &[PathSegment]) -> Option<tiny_skia::Path> {
    let mut pb = tiny_skia::PathBuilder::new();
    for segment in segments {
        match *segment {
            PathSegment::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathSegment::QuadTo { control, to } => {
                pb.quad_to(control.x as f32, control.y as f32, to.x as f32, to.y as f32)
            }
            PathSegment::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
        }
    }
    pb.finish()
}
