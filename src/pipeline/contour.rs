use imageproc::contours::find_contours;

use crate::{
    geometry::{Contour, Point},
    types::Mask,
};

/// Every border in the mask, outer and hole alike, with straight runs compressed.
pub fn find_borders(mask: &Mask) -> Vec<Contour> {
    find_contours::<i32>(mask.as_image())
        .into_iter()
        .map(|border| {
            let points = border.points.into_iter().map(Point::from).collect();
            Contour::new(compress_chain(points))
        })
        .collect()
}

/// Drop every point whose incoming and outgoing steps point the same way, keeping only the
/// ends of straight horizontal, vertical and diagonal runs.
pub fn compress_chain(points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points;
    }

    let step = |from: Point, to: Point| ((to.x - from.x).signum(), (to.y - from.y).signum());

    let kept: Vec<Point> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        // Every point repeats the same step only when they all coincide.
        return vec![points[0]];
    }
    kept
}

/// Largest region in the mask, or `None` when it does not exceed `min_area`.
pub fn extract(mask: &Mask, min_area: f64) -> Option<Contour> {
    let mut largest: Option<(f64, Contour)> = None;
    for contour in find_borders(mask) {
        let area = contour.area();
        if largest.as_ref().is_none_or(|(best, _)| area > *best) {
            largest = Some((area, contour));
        }
    }

    match largest {
        Some((area, contour)) if area > min_area => {
            log::debug!(
                "hand contour: {} points, area {area:.0}",
                contour.len()
            );
            Some(contour)
        }
        Some((area, _)) => {
            log::debug!("largest region area {area:.0} not above minimum {min_area:.0}");
            None
        }
        None => None,
    }
}
