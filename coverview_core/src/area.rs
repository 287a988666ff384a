//! Search area and coverage grid.
//!
//! The search area is a circle of `radius` meters centered on the world origin,
//! discretized into a square `grid_cells x grid_cells` boolean grid that records
//! which cells the camera has observed at least once.
//!
//! World coordinates are continuous meters with the origin at the circle center.
//! Grid coordinates are cell indices with `(0, 0)` at the `(-radius, -radius)`
//! corner of the square enclosing the circle.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Discrete grid coordinate. May lie outside the grid; see [`SearchArea::is_within_bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: i64,
    pub y: i64,
}

impl GridCell {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for GridCell {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Upper bound on the total number of grid cells.
pub const MAX_GRID_CELLS: usize = 1 << 24;

/// The circular search area together with its coverage grid.
#[derive(Debug, Clone)]
pub struct SearchArea {
    radius: f64,
    grid_size: f64,
    grid_cells: usize,

    /// Row-major coverage (`index = gy * grid_cells + gx`)
    seen: Vec<bool>,

    /// Row-major mask of cells whose center lies inside the circle
    in_area: Vec<bool>,

    /// Number of `true` entries in `in_area` (coverage denominator)
    cells_in_area: usize,

    /// Number of cells that are both seen and inside the circle
    seen_in_area: usize,
}

impl SearchArea {
    /// Creates a search area of the given radius, discretized into square cells
    /// of `grid_size` meters.
    ///
    /// Rejects non-positive or non-finite parameters and configurations that
    /// would produce an empty grid.
    pub fn new(radius: f64, grid_size: f64) -> Result<Self, ConfigError> {
        ConfigError::require_positive("search_radius", radius)?;
        ConfigError::require_positive("grid_size", grid_size)?;

        let grid_cells = ((2.0 * radius) / grid_size).floor();
        if grid_cells < 1.0 || !grid_cells.is_finite() {
            return Err(ConfigError::EmptyGrid { radius, grid_size });
        }
        let too_large = ConfigError::GridTooLarge {
            radius,
            grid_size,
            cells: grid_cells * grid_cells,
            max: MAX_GRID_CELLS,
        };
        if grid_cells * grid_cells > MAX_GRID_CELLS as f64 {
            return Err(too_large);
        }
        let grid_cells = grid_cells as usize;
        let total = match grid_cells.checked_mul(grid_cells) {
            Some(total) if total <= MAX_GRID_CELLS => total,
            _ => return Err(too_large),
        };

        let mut area = Self {
            radius,
            grid_size,
            grid_cells,
            seen: vec![false; total],
            in_area: vec![false; total],
            cells_in_area: 0,
            seen_in_area: 0,
        };

        for gy in 0..grid_cells {
            for gx in 0..grid_cells {
                let (x, y) = area.grid_to_world(gx as i64, gy as i64);
                if area.is_within_search_area(x, y) {
                    area.in_area[gy * grid_cells + gx] = true;
                    area.cells_in_area += 1;
                }
            }
        }

        Ok(area)
    }

    /// Search radius in meters.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Cell edge length in meters.
    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    /// Number of cells along each side of the grid.
    pub fn grid_cells(&self) -> usize {
        self.grid_cells
    }

    /// Grid index of the cell containing the world origin.
    pub fn center(&self) -> usize {
        self.grid_cells / 2
    }

    /// Converts world coordinates to the containing grid cell. No bounds check.
    pub fn world_to_grid(&self, x: f64, y: f64) -> GridCell {
        GridCell {
            x: ((x + self.radius) / self.grid_size).floor() as i64,
            y: ((y + self.radius) / self.grid_size).floor() as i64,
        }
    }

    /// Converts a grid cell to the world coordinates of its center.
    pub fn grid_to_world(&self, gx: i64, gy: i64) -> (f64, f64) {
        let half = self.grid_size / 2.0;
        (
            gx as f64 * self.grid_size - self.radius + half,
            gy as f64 * self.grid_size - self.radius + half,
        )
    }

    /// Returns true if the cell indexes into the grid.
    pub fn is_within_bounds(&self, gx: i64, gy: i64) -> bool {
        let n = self.grid_cells as i64;
        (0..n).contains(&gx) && (0..n).contains(&gy)
    }

    /// Returns true if the world point lies inside the circular search area.
    pub fn is_within_search_area(&self, x: f64, y: f64) -> bool {
        x.hypot(y) <= self.radius
    }

    fn index(&self, cell: GridCell) -> Option<usize> {
        if self.is_within_bounds(cell.x, cell.y) {
            Some(cell.y as usize * self.grid_cells + cell.x as usize)
        } else {
            None
        }
    }

    /// Marks cells as seen and returns how many were newly marked.
    ///
    /// Out-of-bounds cells are ignored. Marking an already seen cell is a no-op.
    pub fn mark_seen<'a, I>(&mut self, cells: I) -> usize
    where
        I: IntoIterator<Item = &'a GridCell>,
    {
        let mut newly_seen = 0;
        for cell in cells {
            let Some(idx) = self.index(*cell) else {
                continue;
            };
            if !self.seen[idx] {
                self.seen[idx] = true;
                newly_seen += 1;
                if self.in_area[idx] {
                    self.seen_in_area += 1;
                }
            }
        }
        newly_seen
    }

    /// Returns true if the cell is in bounds and has been observed.
    pub fn is_seen(&self, gx: i64, gy: i64) -> bool {
        self.index(GridCell::new(gx, gy))
            .map(|idx| self.seen[idx])
            .unwrap_or(false)
    }

    /// Percentage of in-circle cells observed so far, in `[0, 100]`.
    pub fn coverage_percentage(&self) -> f64 {
        if self.cells_in_area == 0 {
            return 0.0;
        }
        self.seen_in_area as f64 / self.cells_in_area as f64 * 100.0
    }

    /// Number of grid cells whose center lies inside the circle.
    ///
    /// Fixed for a given `(radius, grid_size)`; [`reset`](Self::reset) does not change it.
    pub fn cells_in_area(&self) -> usize {
        self.cells_in_area
    }

    /// Number of observed cells inside the circle.
    pub fn seen_in_area(&self) -> usize {
        self.seen_in_area
    }

    /// Number of observed cells anywhere on the grid.
    pub fn seen_count(&self) -> usize {
        self.seen.iter().filter(|&&s| s).count()
    }

    /// Set of all observed cells.
    pub fn seen_cells(&self) -> HashSet<GridCell> {
        self.seen
            .iter()
            .enumerate()
            .filter(|(_, &s)| s)
            .map(|(idx, _)| {
                GridCell::new(
                    (idx % self.grid_cells) as i64,
                    (idx / self.grid_cells) as i64,
                )
            })
            .collect()
    }

    /// Coverage rows for rendering; row `gy` holds cells `gx = 0..grid_cells`.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.seen.chunks(self.grid_cells)
    }

    /// Clears all coverage. The robot pose and path are owned elsewhere and untouched.
    pub fn reset(&mut self) {
        self.seen.fill(false);
        self.seen_in_area = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn urc_area() -> SearchArea {
        SearchArea::new(10.0, 0.5).unwrap()
    }

    #[test]
    fn test_grid_dimensions() {
        let area = urc_area();
        assert_eq!(area.grid_cells(), 40);
        assert_eq!(area.center(), 20);
    }

    #[test]
    fn test_coordinate_conversion() {
        let area = urc_area();
        assert_eq!(area.world_to_grid(0.0, 0.0), GridCell::new(20, 20));

        let (x, y) = area.grid_to_world(20, 20);
        assert!(x.abs() <= 0.25 && y.abs() <= 0.25);

        // Negative overflow floors instead of truncating toward zero
        assert_eq!(area.world_to_grid(-10.1, 0.0), GridCell::new(-1, 20));
    }

    #[test]
    fn test_bounds() {
        let area = urc_area();
        assert!(area.is_within_bounds(0, 0));
        assert!(area.is_within_bounds(39, 39));
        assert!(!area.is_within_bounds(40, 0));
        assert!(!area.is_within_bounds(0, -1));

        assert!(area.is_within_search_area(0.0, 0.0));
        assert!(area.is_within_search_area(10.0, 0.0));
        assert!(!area.is_within_search_area(15.0, 15.0));
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        assert!(matches!(
            SearchArea::new(10.0, 0.0),
            Err(ConfigError::NonPositive { name: "grid_size", .. })
        ));
        assert!(matches!(
            SearchArea::new(-1.0, 0.5),
            Err(ConfigError::NonPositive { name: "search_radius", .. })
        ));
        assert!(matches!(
            SearchArea::new(0.2, 0.5),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_oversized_grid_rejected() {
        assert!(matches!(
            SearchArea::new(1e10, 1.0),
            Err(ConfigError::GridTooLarge { .. })
        ));
        assert!(matches!(
            SearchArea::new(10.0, 1e-300),
            Err(ConfigError::GridTooLarge { .. })
        ));

        // 4097 cells per side is just past the limit
        assert!(matches!(
            SearchArea::new(4097.0 / 2.0, 1.0),
            Err(ConfigError::GridTooLarge { max: MAX_GRID_CELLS, .. })
        ));
    }

    #[test]
    fn test_initial_coverage_is_zero() {
        let area = urc_area();
        assert_eq!(area.coverage_percentage(), 0.0);
        assert_eq!(area.seen_count(), 0);
    }

    #[test]
    fn test_mark_seen_increases_coverage() {
        let mut area = urc_area();
        let newly = area.mark_seen(&[GridCell::new(20, 20)]);
        assert_eq!(newly, 1);
        assert!(area.coverage_percentage() > 0.0);
        assert!(area.is_seen(20, 20));
    }

    #[test]
    fn test_mark_seen_ignores_out_of_bounds() {
        let mut area = urc_area();
        let cells = [GridCell::new(-1, 5), GridCell::new(40, 40), GridCell::new(3, 3)];
        assert_eq!(area.mark_seen(&cells), 1);
        assert_eq!(area.seen_count(), 1);
    }

    #[test]
    fn test_corner_cells_do_not_count_toward_coverage() {
        let mut area = urc_area();
        // (0, 0) is the corner of the enclosing square, outside the circle
        area.mark_seen(&[GridCell::new(0, 0)]);
        assert_eq!(area.seen_count(), 1);
        assert_eq!(area.coverage_percentage(), 0.0);
    }

    #[test]
    fn test_mark_seen_idempotent() {
        let cells: HashSet<GridCell> =
            [GridCell::new(1, 2), GridCell::new(20, 21), GridCell::new(22, 19)]
                .into_iter()
                .collect();

        let mut once = urc_area();
        once.mark_seen(&cells);

        let mut twice = urc_area();
        twice.mark_seen(&cells);
        assert_eq!(twice.mark_seen(&cells), 0);

        assert_eq!(once.seen_cells(), twice.seen_cells());
        assert_eq!(once.coverage_percentage(), twice.coverage_percentage());
    }

    #[test]
    fn test_full_coverage_is_one_hundred_percent() {
        let mut area = SearchArea::new(2.0, 0.5).unwrap();
        let all: Vec<GridCell> = (0..8)
            .flat_map(|y| (0..8).map(move |x| GridCell::new(x, y)))
            .collect();
        area.mark_seen(&all);
        assert!((area.coverage_percentage() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_keeps_denominator() {
        let mut area = urc_area();
        let denominator = area.cells_in_area();
        assert!(denominator > 0 && denominator < 40 * 40);

        area.mark_seen(&[GridCell::new(20, 20), GridCell::new(21, 20)]);
        area.reset();

        assert_eq!(area.cells_in_area(), denominator);
        assert_eq!(area.coverage_percentage(), 0.0);
        assert!(!area.is_seen(20, 20));
    }

    #[test]
    fn test_rows_layout() {
        let mut area = SearchArea::new(1.0, 0.5).unwrap();
        area.mark_seen(&[GridCell::new(3, 1)]);

        let rows: Vec<&[bool]> = area.rows().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[1][3]);
        assert!(!rows[3][1]);
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_half_cell(x in -10.0f64..10.0, y in -10.0f64..10.0) {
            let area = urc_area();
            let cell = area.world_to_grid(x, y);
            let (wx, wy) = area.grid_to_world(cell.x, cell.y);
            prop_assert!((wx - x).abs() <= 0.25 + 1e-9);
            prop_assert!((wy - y).abs() <= 0.25 + 1e-9);
        }

        #[test]
        fn prop_coverage_is_monotonic(
            batches in prop::collection::vec(
                prop::collection::vec((-5i64..45, -5i64..45), 0..20),
                1..10,
            )
        ) {
            let mut area = urc_area();
            let mut previous: HashSet<GridCell> = HashSet::new();
            let mut previous_pct = 0.0;

            for batch in batches {
                let cells: Vec<GridCell> = batch.into_iter().map(GridCell::from).collect();
                area.mark_seen(&cells);

                let current = area.seen_cells();
                prop_assert!(previous.is_subset(&current));
                prop_assert!(area.coverage_percentage() >= previous_pct);
                prop_assert!(area.coverage_percentage() <= 100.0);

                previous = current;
                previous_pct = area.coverage_percentage();
            }
        }
    }
}
