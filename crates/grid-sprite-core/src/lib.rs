//! Core library for building grid sprite sheets.
//!
//! - Filter: screen a folder for supported raster files (`is_valid_image`, `scan_folder`)
//! - Planner: uniform grid anchors, filled along rows or columns (`GridPlanner`)
//! - Builder/Finalizer: composite each image as a named layer, then trim the sheet
//! - Export: per-layer coordinates as CSS rules or JSON records
//!
//! Quick example:
//! ```ignore
//! use grid_sprite_core::{LayoutConfig, pack_folder};
//! # fn main() -> anyhow::Result<()> {
//! let cfg = LayoutConfig::builder().limit(4).build();
//! let out = pack_folder("icons".as_ref(), cfg)?;
//! out.image.save("sprite.png")?;
//! for line in out.lines() {
//!     println!("{line}");
//! }
//! # Ok(()) }
//! ```

pub mod builder;
pub mod canvas;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod finalize;
pub mod model;
pub mod pipeline;
pub mod planner;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use filter::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `grid_sprite_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::builder::{InputImage, Placement, SpriteBuilder, load_image};
    pub use crate::canvas::{Canvas, LayerHandle, LayeredCanvas};
    pub use crate::config::{
        LayoutAxis, LayoutConfig, LayoutConfigBuilder, OpenErrorPolicy, OutputFormat,
    };
    pub use crate::error::{Result, SpriteError};
    pub use crate::model::{
        Bounds, ExportRecord, GridCell, ImageEntry, PlacementCoordinate, Rect, SpriteStats,
    };
    pub use crate::planner::{GridPlanner, plan_coordinates};
    pub use crate::{SpriteOutput, pack_folder, pack_images, pack_paths};
}
