//! Integer polygon primitives shared by the contour and convexity stages.

use std::f64::consts::PI;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Exact for any coordinates a frame can hold.
    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = (other.x as i64 - self.x as i64) as f64;
        let dy = (other.y as i64 - self.y as i64) as f64;
        dx * dx + dy * dy
    }
}

impl From<imageproc::point::Point<i32>> for Point {
    fn from(p: imageproc::point::Point<i32>) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Point> for (f32, f32) {
    fn from(p: Point) -> Self {
        (p.x as f32, p.y as f32)
    }
}

/// Z component of `(a - o) x (b - o)`; positive when `o -> a -> b` turns counter-clockwise
/// in a y-up frame.
pub(crate) fn cross(o: Point, a: Point, b: Point) -> i64 {
    let (ox, oy) = (o.x as i64, o.y as i64);
    (a.x as i64 - ox) * (b.y as i64 - oy) - (a.y as i64 - oy) * (b.x as i64 - ox)
}

/// Distance from `p` to the infinite line through `a` and `b`.
pub(crate) fn distance_to_line(p: Point, a: Point, b: Point) -> f64 {
    let base = a.distance_to(&b);
    if base == 0.0 {
        return p.distance_to(&a);
    }
    cross(a, b, p).abs() as f64 / base
}

/// Closed polygon traced around a foreground region.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area (shoelace), independent of winding.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }

    /// Length of the closed outline.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.points[i].distance_to(&self.points[(i + 1) % n]))
            .sum()
    }

    /// `4π·area/perimeter²`; `None` when the outline has no length.
    pub fn circularity(&self) -> Option<f64> {
        let perimeter = self.perimeter();
        if perimeter <= 0.0 {
            return None;
        }
        Some(4.0 * PI * self.area() / (perimeter * perimeter))
    }

    /// `(min_x, min_y, max_x, max_y)`.
    pub fn bounding_box(&self) -> Option<(i32, i32, i32, i32)> {
        let first = self.points.first()?;
        Some(self.points.iter().fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        ))
    }
}
