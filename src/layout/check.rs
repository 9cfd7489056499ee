use super::Placement;

/// Relative tolerance for area and edge comparisons.
const TOLERANCE: f64 = 1e-9;

/// Geometric sanity report over a finished layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutReport {
    pub canvas_area: f64,
    pub placed_area: f64,
    /// `placed_area / canvas_area`
    pub coverage: f64,
    /// Pairs of output positions whose rectangles share positive area
    pub overlaps: Vec<(usize, usize)>,
    /// Output positions that leave the canvas or have a non-positive side
    pub out_of_bounds: Vec<usize>,
    pub percentage_sum: f64,
}

impl LayoutReport {
    /// Full coverage, no overlaps, everything inside, percentages add up.
    /// An empty layout is sound: there is nothing to cover.
    pub fn is_sound(&self) -> bool {
        if self.placed_area == 0.0 && self.overlaps.is_empty() && self.out_of_bounds.is_empty() {
            return self.percentage_sum == 0.0;
        }
        (self.coverage - 1.0).abs() < 1e-6
            && self.overlaps.is_empty()
            && self.out_of_bounds.is_empty()
            && (self.percentage_sum - 100.0).abs() < 1e-6
    }
}

/// Check a layout produced for a `width` x `height` canvas.
pub fn check<T>(placements: &[Placement<'_, T>], width: f64, height: f64) -> LayoutReport {
    let canvas_area = width * height;
    let placed_area: f64 = placements.iter().map(|p| p.area()).sum();
    let edge_tol = TOLERANCE * width.max(height);

    let out_of_bounds = placements
        .iter()
        .enumerate()
        .filter(|(_, p)| {
            p.width <= 0.0
                || p.height <= 0.0
                || p.x < -edge_tol
                || p.y < -edge_tol
                || p.right() > width + edge_tol
                || p.bottom() > height + edge_tol
        })
        .map(|(i, _)| i)
        .collect();

    let area_tol = TOLERANCE * canvas_area;
    let mut overlaps = Vec::new();
    for i in 0..placements.len() {
        for j in (i + 1)..placements.len() {
            if intersection_area(&placements[i], &placements[j]) > area_tol {
                overlaps.push((i, j));
            }
        }
    }

    LayoutReport {
        canvas_area,
        placed_area,
        coverage: placed_area / canvas_area,
        overlaps,
        out_of_bounds,
        percentage_sum: placements.iter().map(|p| p.percentage).sum(),
    }
}

fn intersection_area<T>(a: &Placement<'_, T>, b: &Placement<'_, T>) -> f64 {
    let w = a.right().min(b.right()) - a.x.max(b.x);
    let h = a.bottom().min(b.bottom()) - a.y.max(b.y);
    if w <= 0.0 || h <= 0.0 {
        0.0
    } else {
        w * h
    }
}
