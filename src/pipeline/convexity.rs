use crate::geometry::{Contour, Point, cross, distance_to_line};

/// Convex hull as an ordered subsequence of a contour.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexHull {
    indices: Vec<usize>,
    points: Vec<Point>,
}

impl ConvexHull {
    /// Contour indices of the hull vertices, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Where the contour dips inward between two neighbouring hull vertices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvexityDefect {
    pub start: Point,
    pub end: Point,
    /// Contour point deepest below the `start`-`end` chord.
    pub farthest: Point,
    pub depth: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub farthest_index: usize,
}

pub fn convex_hull(points: &[Point]) -> ConvexHull {
    let mut indices = hull_indices(points);
    indices.sort_unstable();
    let points = indices.iter().map(|&i| points[i]).collect();
    ConvexHull { indices, points }
}

// Monotone chain; collinear and repeated points never become vertices.
fn hull_indices(points: &[Point]) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.dedup_by_key(|i| points[*i]);
        return indices;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| (points[i].x, points[i].y));

    let turns_left = |hull: &[usize], next: usize| {
        let len = hull.len();
        cross(points[hull[len - 2]], points[hull[len - 1]], points[next]) > 0
    };

    let mut hull: Vec<usize> = Vec::with_capacity(n + 1);
    for &i in &order {
        while hull.len() >= 2 && !turns_left(&hull, i) {
            hull.pop();
        }
        hull.push(i);
    }

    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len && !turns_left(&hull, i) {
            hull.pop();
        }
        hull.push(i);
    }
    hull.pop();
    // All points coincide: both chains collapse onto the same spot.
    hull.dedup_by_key(|i| points[*i]);

    hull
}

/// One defect per hull edge whose contour run strays from the edge.
pub fn convexity_defects(points: &[Point], hull: &ConvexHull) -> Vec<ConvexityDefect> {
    let n = points.len();
    let vertices = hull.indices();
    if vertices.len() < 3 {
        return Vec::new();
    }

    let mut defects = Vec::new();
    for (k, &start_index) in vertices.iter().enumerate() {
        let end_index = vertices[(k + 1) % vertices.len()];
        let start = points[start_index];
        let end = points[end_index];

        let mut deepest: Option<(usize, f64)> = None;
        let mut j = (start_index + 1) % n;
        while j != end_index {
            let depth = distance_to_line(points[j], start, end);
            if deepest.is_none_or(|(_, best)| depth > best) {
                deepest = Some((j, depth));
            }
            j = (j + 1) % n;
        }

        if let Some((farthest_index, depth)) = deepest {
            if depth > 0.0 {
                defects.push(ConvexityDefect {
                    start,
                    end,
                    farthest: points[farthest_index],
                    depth,
                    start_index,
                    end_index,
                    farthest_index,
                });
            }
        }
    }

    defects
}

pub fn analyze(contour: &Contour) -> (ConvexHull, Vec<ConvexityDefect>) {
    let hull = convex_hull(contour.points());
    let defects = convexity_defects(contour.points(), &hull);
    log::debug!(
        "convex hull: {} vertices, {} defects",
        hull.len(),
        defects.len()
    );
    (hull, defects)
}
