use crate::builder::{InputImage, SpriteBuilder, load_image};
use crate::canvas::{Canvas, LayeredCanvas};
use crate::config::{LayoutConfig, OpenErrorPolicy, OutputFormat};
use crate::error::{Result, SpriteError};
use crate::export;
use crate::filter::{scan_folder, valid_paths};
use crate::finalize::finalize;
use crate::model::{ExportRecord, SpriteStats};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Output of a sprite run: the trimmed sheet and one record per layer, topmost first.
#[derive(Debug)]
pub struct SpriteOutput {
    pub image: RgbaImage,
    pub records: Vec<ExportRecord>,
    pub format: OutputFormat,
    used_area: u64,
}

impl SpriteOutput {
    /// Records encoded in the configured output format.
    pub fn lines(&self) -> Vec<String> {
        export::render_lines(&self.records, self.format)
    }

    /// True when no layer had visible content and the sheet trimmed down to 0x0.
    pub fn is_empty(&self) -> bool {
        self.image.width() == 0 || self.image.height() == 0
    }

    /// Writes the sheet; the format follows the extension of `path`.
    ///
    /// An empty sheet has nothing to encode and fails with `Encode` without touching `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        if self.is_empty() {
            return Err(SpriteError::Encode(format!(
                "sprite sheet for {} layer(s) has no visible content",
                self.records.len()
            )));
        }
        self.image.save(path)?;
        Ok(())
    }

    pub fn stats(&self) -> SpriteStats {
        let (width, height) = self.image.dimensions();
        let total_area = (width as u64) * (height as u64);
        let occupancy = if total_area > 0 {
            self.used_area as f64 / total_area as f64
        } else {
            0.0
        };
        SpriteStats {
            num_layers: self.records.len(),
            width,
            height,
            total_area,
            used_area: self.used_area,
            occupancy,
        }
    }
}

/// Screens the direct children of `dir`, then places every valid image in file-name order.
///
/// Fails with `NoValidImages` when the folder holds nothing placeable; no canvas is
/// created in that case.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn pack_folder(dir: &Path, cfg: LayoutConfig) -> Result<SpriteOutput> {
    let paths = valid_paths(&scan_folder(dir)?);
    if paths.is_empty() {
        return Err(SpriteError::NoValidImages {
            dir: dir.to_path_buf(),
        });
    }
    info!(count = paths.len(), "valid images found");
    pack_paths(&paths, cfg).map_err(|e| match e {
        SpriteError::NoValidImages { .. } => SpriteError::NoValidImages {
            dir: dir.to_path_buf(),
        },
        other => other,
    })
}

/// Places the images at `paths` in order. See [`pack_paths_with_progress`].
pub fn pack_paths(paths: &[PathBuf], cfg: LayoutConfig) -> Result<SpriteOutput> {
    pack_paths_with_progress(paths, cfg, |_| {})
}

/// Places the images at `paths` in order, calling `on_progress` after each one is handled.
///
/// With the `parallel` feature, decoding runs on the rayon pool up front; placement is
/// still serial and in `paths` order. An undecodable file aborts the run unless
/// `cfg.on_open_error` is `Skip`.
#[instrument(skip_all, fields(count = paths.len()))]
pub fn pack_paths_with_progress<F: FnMut(&Path)>(
    paths: &[PathBuf],
    cfg: LayoutConfig,
    mut on_progress: F,
) -> Result<SpriteOutput> {
    let policy = cfg.on_open_error;
    let mut builder = SpriteBuilder::new(cfg)?;

    #[cfg(feature = "parallel")]
    let loaded: Vec<Result<InputImage>> = paths.par_iter().map(|p| load_image(p)).collect();
    #[cfg(not(feature = "parallel"))]
    let loaded = paths.iter().map(|p| load_image(p));

    for (path, input) in paths.iter().zip(loaded) {
        match input {
            Ok(input) => {
                builder.place_image(input);
            }
            Err(e) if policy == OpenErrorPolicy::Skip => {
                warn!(path = %path.display(), error = %e, "skip image");
            }
            Err(e) => return Err(e),
        }
        on_progress(path);
    }
    finish(builder)
}

/// Places already-decoded images in the given order.
#[instrument(skip_all, fields(count = inputs.len()))]
pub fn pack_images(inputs: Vec<InputImage>, cfg: LayoutConfig) -> Result<SpriteOutput> {
    let mut builder = SpriteBuilder::new(cfg)?;
    for input in inputs {
        builder.place_image(input);
    }
    finish(builder)
}

fn finish(builder: SpriteBuilder) -> Result<SpriteOutput> {
    let format = builder.config().output_format;
    let Some(mut canvas) = builder.into_canvas() else {
        return Err(SpriteError::NoValidImages { dir: PathBuf::new() });
    };
    let placeholder = canvas.placeholder();
    finalize(&mut canvas, placeholder);

    let records = export::records(&canvas);
    let used_area = used_area(&canvas);
    let image = canvas.render();
    info!(
        layers = records.len(),
        width = image.width(),
        height = image.height(),
        "sprite sheet composed"
    );
    Ok(SpriteOutput {
        image,
        records,
        format,
        used_area,
    })
}

fn used_area(canvas: &LayeredCanvas) -> u64 {
    canvas
        .layers_top_down()
        .into_iter()
        .filter_map(|h| canvas.layer_bounds(h))
        .map(|b| (b.width() as u64) * (b.height() as u64))
        .sum()
}
