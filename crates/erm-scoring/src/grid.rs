//! 5×5 heat-map grid and inverse mapping

use serde::{Deserialize, Serialize};

/// Cells per axis
pub const GRID_SIZE: u8 = 5;

/// Value of the top-right cell
pub const MAX_CELL_VALUE: f64 = 25.0;

/// Tolerance for an "exact" inverse match
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Cell (2, 2) is nudged below 4 so it stays distinguishable from (1, 4)
/// and (4, 1).
pub const TWO_BY_TWO_VALUE: f64 = 3.99;

/// Grid coordinate, both axes in 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub probability: u8,
    pub impact: u8,
}

impl GridCell {
    pub const fn new(probability: u8, impact: u8) -> Self {
        Self { probability, impact }
    }

    pub fn value(&self) -> f64 {
        cell_value(self.probability, self.impact)
    }
}

/// Stored value of a cell
pub fn cell_value(probability: u8, impact: u8) -> f64 {
    if probability == 2 && impact == 2 {
        TWO_BY_TWO_VALUE
    } else {
        f64::from(probability) * f64::from(impact)
    }
}

/// Cells in scan order: probability ascending, then impact ascending
pub fn cells() -> impl Iterator<Item = GridCell> {
    (1..=GRID_SIZE).flat_map(|p| (1..=GRID_SIZE).map(move |i| GridCell::new(p, i)))
}

/// Inverse-map a score with the default tolerance
pub fn map_to_grid(score: f64) -> GridCell {
    map_to_grid_with_tolerance(score, DEFAULT_TOLERANCE)
}

/// Inverse-map a score onto the grid:
///
/// 1. closest cell within `tolerance`;
/// 2. otherwise the smallest cell value at or above the score, so a risk
///    is never plotted lower than it is;
/// 3. otherwise the closest cell regardless of direction.
///
/// Ties go to the first cell in scan order. Never fails: non-finite input
/// maps to a corner.
pub fn map_to_grid_with_tolerance(score: f64, tolerance: f64) -> GridCell {
    if !score.is_finite() {
        return if score == f64::INFINITY {
            GridCell::new(GRID_SIZE, GRID_SIZE)
        } else {
            GridCell::new(1, 1)
        };
    }

    let exact = best_by(|cell| {
        let diff = (cell.value() - score).abs();
        (diff < tolerance).then_some(diff)
    });
    if let Some(cell) = exact {
        return cell;
    }

    let above = best_by(|cell| {
        let gap = cell.value() - score;
        (gap >= 0.0).then_some(gap)
    });
    if let Some(cell) = above {
        return cell;
    }

    best_by(|cell| Some((cell.value() - score).abs())).unwrap_or(GridCell::new(1, 1))
}

/// First cell with the smallest key among cells where `key` is defined
fn best_by(key: impl Fn(&GridCell) -> Option<f64>) -> Option<GridCell> {
    let mut best: Option<(GridCell, f64)> = None;
    for cell in cells() {
        if let Some(k) = key(&cell) {
            if best.map_or(true, |(_, b)| k < b) {
                best = Some((cell, k));
            }
        }
    }
    best.map(|(cell, _)| cell)
}
