//! Grid selection for aspect-ratio preserving tiling

use serde::{Deserialize, Serialize};

/// Tile grid: `columns` tiles across and `rows` tiles down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub columns: u32,
    pub rows: u32,
}

impl GridShape {
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of tiles in the grid
    #[must_use]
    #[inline]
    pub const fn blocks(&self) -> u32 {
        self.columns * self.rows
    }

    /// Width / height ratio of the grid
    #[must_use]
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.columns) / f64::from(self.rows)
    }
}

/// Every grid with `min_blocks <= columns * rows <= max_blocks`, ordered by
/// block count. Grids with equal block count keep enumeration order
/// (columns ascending, then rows ascending).
#[must_use]
pub fn candidate_grids(min_blocks: u32, max_blocks: u32) -> Vec<GridShape> {
    let mut candidates = Vec::new();
    for columns in 1..=max_blocks {
        // columns * rows <= max_blocks
        for rows in 1..=max_blocks / columns {
            if columns * rows >= min_blocks {
                candidates.push(GridShape::new(columns, rows));
            }
        }
    }
    // Stable sort keeps enumeration order within equal block counts
    candidates.sort_by_key(GridShape::blocks);
    candidates
}

/// Pick the candidate whose aspect ratio is closest to `width / height`.
///
/// When a later candidate matches the best difference exactly, it takes over
/// only if the image area exceeds half the area the candidate would cover at
/// `image_size` pixels per tile. Large images therefore settle on finer grids,
/// and among several qualifying ties the last one evaluated wins.
///
/// Returns `None` when `candidates` is empty.
#[must_use]
#[allow(clippy::float_cmp)] // exact ties are part of the selection rule
pub fn closest_grid(
    width: u32,
    height: u32,
    candidates: &[GridShape],
    image_size: u32,
) -> Option<GridShape> {
    let aspect_ratio = f64::from(width) / f64::from(height);
    let area = f64::from(width) * f64::from(height);
    let tile_area = f64::from(image_size) * f64::from(image_size);

    let mut best: Option<GridShape> = None;
    let mut best_diff = f64::INFINITY;

    for candidate in candidates {
        let diff = (aspect_ratio - candidate.aspect_ratio()).abs();
        if diff < best_diff {
            best_diff = diff;
            best = Some(*candidate);
        } else if diff == best_diff && area > 0.5 * tile_area * f64::from(candidate.blocks()) {
            best = Some(*candidate);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_respect_bounds() {
        let candidates = candidate_grids(1, 12);
        assert!(candidates
            .iter()
            .all(|grid| (1..=12).contains(&grid.blocks())));
        // (1,1) is the only single-block grid and comes first
        assert_eq!(candidates[0], GridShape::new(1, 1));
        assert_eq!(candidates.last().map(GridShape::blocks), Some(12));
    }

    #[test]
    fn test_candidates_sorted_by_block_count() {
        let candidates = candidate_grids(2, 6);
        let blocks: Vec<u32> = candidates.iter().map(GridShape::blocks).collect();
        let mut sorted = blocks.clone();
        sorted.sort_unstable();
        assert_eq!(blocks, sorted);
        assert!(!candidates.contains(&GridShape::new(1, 1)));
        // Equal block counts keep column-major enumeration order
        let two_blocks: Vec<GridShape> = candidates
            .iter()
            .copied()
            .filter(|grid| grid.blocks() == 2)
            .collect();
        assert_eq!(two_blocks, vec![GridShape::new(1, 2), GridShape::new(2, 1)]);
    }

    #[test]
    fn test_candidates_large_bound() {
        let candidates = candidate_grids(69_000, 70_000);
        assert!(candidates
            .iter()
            .all(|grid| (69_000..=70_000).contains(&grid.blocks())));
        assert!(candidates.contains(&GridShape::new(1, 70_000)));
        assert!(candidates.contains(&GridShape::new(70_000, 1)));
    }

    #[test]
    fn test_candidates_empty_when_bounds_inverted() {
        assert!(candidate_grids(5, 4).is_empty());
    }

    #[test]
    fn test_closest_grid_wide_image() {
        let candidates = candidate_grids(1, 12);
        let grid = closest_grid(2000, 500, &candidates, 448);
        assert_eq!(grid, Some(GridShape::new(4, 1)));
    }

    #[test]
    fn test_closest_grid_tall_image() {
        let candidates = candidate_grids(1, 12);
        let grid = closest_grid(400, 1200, &candidates, 448);
        assert_eq!(grid, Some(GridShape::new(1, 3)));
    }

    #[test]
    fn test_tie_prefers_finer_grid_for_large_image() {
        // Square image ties on (1,1), (2,2) and (3,3); 1000*1000 exceeds half
        // of both 4 and 9 tiles of 448x448, so the last tie wins.
        let candidates = candidate_grids(1, 12);
        let grid = closest_grid(1000, 1000, &candidates, 448);
        assert_eq!(grid, Some(GridShape::new(3, 3)));
    }

    #[test]
    fn test_tie_stops_at_area_limit() {
        // 700*700 = 490000 beats half of 4 tiles (401408) but not 9 tiles
        let candidates = candidate_grids(1, 12);
        let grid = closest_grid(700, 700, &candidates, 448);
        assert_eq!(grid, Some(GridShape::new(2, 2)));
    }

    #[test]
    fn test_tie_keeps_single_tile_for_small_image() {
        let candidates = candidate_grids(1, 12);
        let grid = closest_grid(100, 100, &candidates, 448);
        assert_eq!(grid, Some(GridShape::new(1, 1)));
    }

    #[test]
    fn test_closest_grid_no_candidates() {
        assert_eq!(closest_grid(100, 100, &[], 448), None);
    }
}
