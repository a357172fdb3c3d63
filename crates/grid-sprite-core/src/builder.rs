use crate::canvas::{Canvas, LayerHandle, LayeredCanvas};
use crate::config::LayoutConfig;
use crate::error::{Result, SpriteError};
use crate::filter::layer_name;
use crate::model::PlacementCoordinate;
use crate::planner::GridPlanner;
use image::{DynamicImage, ImageReader};
use std::path::Path;
use tracing::debug;

/// In-memory image to place (layer name + decoded image).
pub struct InputImage {
    pub key: String,
    pub image: DynamicImage,
}

/// Result of placing one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub key: String,
    pub layer: LayerHandle,
    pub coordinate: PlacementCoordinate,
}

/// Decodes the image at `path` read-only. The layer key is the file name without
/// its final extension.
pub fn load_image(path: &Path) -> Result<InputImage> {
    let decode = || -> std::result::Result<DynamicImage, image::ImageError> {
        ImageReader::open(path)?.with_guessed_format()?.decode()
    };
    let image = decode().map_err(|source| SpriteError::ImageOpen {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(InputImage {
        key: layer_name(path),
        image,
    })
}

/// Places accepted images one at a time onto a shared working canvas.
///
/// The canvas is created on the first placement, so a run that never places anything
/// never allocates one. Layer order on the canvas is placement order.
pub struct SpriteBuilder {
    config: LayoutConfig,
    planner: GridPlanner,
    canvas: Option<LayeredCanvas>,
    placements: Vec<Placement>,
}

impl SpriteBuilder {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        let planner = GridPlanner::new(&config)?;
        Ok(Self {
            config,
            planner,
            canvas: None,
            placements: Vec::new(),
        })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Opens `path`, places it, and drops the decoded source.
    pub fn place_path(&mut self, path: &Path) -> Result<&Placement> {
        let input = load_image(path)?;
        Ok(self.place_image(input))
    }

    /// Normalizes `input` to RGBA8, adds it as the topmost layer and moves its visible
    /// top-left corner onto the next grid anchor.
    pub fn place_image(&mut self, input: InputImage) -> &Placement {
        let coordinate = self.planner.next_coordinate();
        let cfg = &self.config;
        let canvas = self
            .canvas
            .get_or_insert_with(|| LayeredCanvas::create(cfg.canvas_width, cfg.canvas_height));

        let rgba = input.image.into_rgba8();
        let layer = canvas.add_layer(&input.key, rgba);
        // Fully transparent layers have no bounds; their origin is anchored instead.
        let (left, top) = canvas
            .layer_bounds(layer)
            .map(|b| (b.left, b.top))
            .unwrap_or((0, 0));
        canvas.translate(layer, -left, -top);
        canvas.translate(layer, coordinate.x as i64, coordinate.y as i64);
        debug!(key = %input.key, x = coordinate.x, y = coordinate.y, "placed layer");

        self.placements.push(Placement {
            key: input.key,
            layer,
            coordinate,
        });
        &self.placements[self.placements.len() - 1]
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Furthest grid anchor used so far.
    pub fn anchor_extent(&self) -> (u32, u32) {
        self.planner.anchor_extent()
    }

    /// Hands over the working canvas. `None` if nothing has been placed.
    pub fn into_canvas(self) -> Option<LayeredCanvas> {
        self.canvas
    }
}
