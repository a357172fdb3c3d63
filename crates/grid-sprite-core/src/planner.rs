use crate::config::{LayoutAxis, LayoutConfig};
use crate::error::Result;
use crate::model::{GridCell, PlacementCoordinate};

/// Stateful grid sequence: hands out one cell per accepted image, in acceptance order.
///
/// The primary counter cycles modulo `limit`; the secondary counter advances once per
/// full cycle. Which counter maps to x depends on [`LayoutAxis`]:
///
/// - `Cols`: `x = col_spacing * primary`, `y = row_spacing * secondary`
/// - `Rows`: `x = col_spacing * secondary`, `y = row_spacing * primary`
///
/// Only call [`GridPlanner::next_coordinate`] for images that were actually placed,
/// otherwise the grid gains holes.
#[derive(Debug, Clone)]
pub struct GridPlanner {
    axis: LayoutAxis,
    limit: u32,
    col_spacing: u32,
    row_spacing: u32,
    primary_index: u32,
    secondary_index: u32,
    issued: usize,
    max_x: u32,
    max_y: u32,
}

impl GridPlanner {
    pub fn new(cfg: &LayoutConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            axis: cfg.axis,
            limit: cfg.limit,
            col_spacing: cfg.col_spacing,
            row_spacing: cfg.row_spacing,
            primary_index: 0,
            secondary_index: 0,
            issued: 0,
            max_x: 0,
            max_y: 0,
        })
    }

    /// Returns the current cell and advances the counters.
    pub fn next_cell(&mut self) -> GridCell {
        let cell = GridCell {
            primary: self.primary_index,
            secondary: self.secondary_index,
        };
        self.primary_index += 1;
        if self.primary_index % self.limit == 0 {
            self.primary_index = 0;
            self.secondary_index += 1;
        }
        self.issued += 1;
        cell
    }

    /// Returns the anchor for the next accepted image and advances the counters.
    pub fn next_coordinate(&mut self) -> PlacementCoordinate {
        let cell = self.next_cell();
        let coord = self.coordinate_of(cell);
        self.max_x = self.max_x.max(coord.x);
        self.max_y = self.max_y.max(coord.y);
        coord
    }

    /// Maps a cell to pixels without touching the counters.
    pub fn coordinate_of(&self, cell: GridCell) -> PlacementCoordinate {
        let (col, row) = match self.axis {
            LayoutAxis::Cols => (cell.primary, cell.secondary),
            LayoutAxis::Rows => (cell.secondary, cell.primary),
        };
        PlacementCoordinate {
            x: self.col_spacing.saturating_mul(col),
            y: self.row_spacing.saturating_mul(row),
        }
    }

    /// Number of coordinates handed out since construction or the last reset.
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Furthest anchor handed out so far as `(max_x, max_y)`. The canvas must extend at
    /// least this far plus the size of the image placed there.
    pub fn anchor_extent(&self) -> (u32, u32) {
        (self.max_x, self.max_y)
    }

    /// Restarts the sequence at cell (0, 0).
    pub fn reset(&mut self) {
        self.primary_index = 0;
        self.secondary_index = 0;
        self.issued = 0;
        self.max_x = 0;
        self.max_y = 0;
    }
}

/// Plans `count` anchors up front. Equivalent to calling `next_coordinate` `count` times
/// on a fresh planner.
pub fn plan_coordinates(count: usize, cfg: &LayoutConfig) -> Result<Vec<PlacementCoordinate>> {
    let mut planner = GridPlanner::new(cfg)?;
    Ok((0..count).map(|_| planner.next_coordinate()).collect())
}
