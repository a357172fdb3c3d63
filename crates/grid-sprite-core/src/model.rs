use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
}

/// Canvas-space bounding box. `right`/`bottom` are exclusive; may be negative
/// before the canvas is revealed and trimmed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bounds {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Bounds {
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
    pub fn width(&self) -> i64 {
        self.right - self.left
    }
    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }
    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Grid position of one accepted image, counted in cells.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GridCell {
    /// Cycles `0..limit`.
    pub primary: u32,
    /// Increments once per full cycle of `primary`.
    pub secondary: u32,
}

/// Anchor of an image's visible top-left corner on the working canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PlacementCoordinate {
    pub x: u32,
    pub y: u32,
}

impl PlacementCoordinate {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A directory entry screened by the file filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub is_valid: bool,
}

/// One exported region: layer name and the top-left corner of its trimmed bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportRecord {
    pub name: String,
    pub x: u32,
    pub y: u32,
}

/// Statistics about the finished sprite sheet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpriteStats {
    /// Number of image layers on the sheet.
    pub num_layers: usize,
    pub width: u32,
    pub height: u32,
    /// Sheet area (`width * height`).
    pub total_area: u64,
    /// Sum of every layer's visible content area.
    pub used_area: u64,
    /// used_area / total_area (0.0 to 1.0). Overlapping layers can push this above 1.0.
    pub occupancy: f64,
}

impl SpriteStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Layers: {}, Size: {}x{}, Occupancy: {:.2}%, Total Area: {} px², Used Area: {} px²",
            self.num_layers,
            self.width,
            self.height,
            self.occupancy * 100.0,
            self.total_area,
            self.used_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.total_area.saturating_sub(self.used_area)
    }
}
