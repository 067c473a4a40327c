use serde::Serialize;

use crate::core::geometry::BBox;

/// Linear baseline fit over a line's character geometry.
///
/// Both axes are translated to their per-line minima before fitting, so the
/// intercept is relative to the line's own bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub slope: f64,
    pub intercept: i32,
}

/// Ordinary least squares over bottom-center sample points. Degenerate
/// input (a single point, or all points at one x) yields a flat fit through
/// the mean y instead of failing.
pub fn estimate(boxes: &[BBox]) -> Option<Baseline> {
    if boxes.is_empty() {
        return None;
    }

    let points: Vec<(f64, f64)> = boxes
        .iter()
        .map(|b| {
            let x = f64::from(b.left + b.right) / 2.0;
            let y = f64::from(b.bottom);
            (x, y)
        })
        .collect();

    let x0 = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let y0 = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);

    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0 - x0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1 - y0).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in &points {
        let dx = (x - x0) - mean_x;
        let dy = (y - y0) - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    let intercept = (mean_y - slope * mean_x).trunc() as i32;

    Some(Baseline { slope, intercept })
}
