use crate::error::SpriteError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Layout configuration for a sprite run.
/// Key notes:
///   - `axis` picks which dimension fills first; `limit` bounds it before wrapping
///   - spacing is the fixed pitch between grid cells, independent of image size
///   - the value is built once and passed by reference; nothing mutates it mid-run
///
/// Primary layout axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAxis {
    /// Fill down a column first (the row counter cycles), then move one column right.
    Rows,
    /// Fill along a row first (the column counter cycles), then move one row down.
    #[default]
    Cols,
}

impl FromStr for LayoutAxis {
    type Err = SpriteError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rows" => Ok(Self::Rows),
            "cols" => Ok(Self::Cols),
            other => Err(SpriteError::Configuration(format!(
                "unknown layout: {other} (expected rows|cols)"
            ))),
        }
    }
}

/// Text encoding for exported coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Css,
    Json,
}

impl FromStr for OutputFormat {
    type Err = SpriteError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "css" => Ok(Self::Css),
            "json" => Ok(Self::Json),
            other => Err(SpriteError::Configuration(format!(
                "unknown output format: {other} (expected css|json)"
            ))),
        }
    }
}

/// What to do when a file passes the extension filter but cannot be decoded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OpenErrorPolicy {
    /// Abort the whole run on the first undecodable image.
    #[default]
    Abort,
    /// Log a warning and continue without the image. The grid does not advance for it.
    Skip,
}

impl FromStr for OpenErrorPolicy {
    type Err = SpriteError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(SpriteError::Configuration(format!(
                "unknown open-error policy: {other} (expected abort|skip)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Axis that fills first.
    #[serde(default)]
    pub axis: LayoutAxis,
    /// Cells along the primary axis before wrapping. Must be at least 1.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Horizontal pitch between columns, in pixels.
    #[serde(default = "default_col_spacing")]
    pub col_spacing: u32,
    /// Vertical pitch between rows, in pixels.
    #[serde(default = "default_row_spacing")]
    pub row_spacing: u32,
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Nominal size of the working canvas before trimming.
    #[serde(default = "default_canvas_size")]
    pub canvas_width: u32,
    #[serde(default = "default_canvas_size")]
    pub canvas_height: u32,

    #[serde(default)]
    pub on_open_error: OpenErrorPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            axis: LayoutAxis::default(),
            limit: default_limit(),
            col_spacing: default_col_spacing(),
            row_spacing: default_row_spacing(),
            output_format: OutputFormat::default(),
            canvas_width: default_canvas_size(),
            canvas_height: default_canvas_size(),
            on_open_error: OpenErrorPolicy::default(),
        }
    }
}

impl LayoutConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns a `Configuration` error if:
    /// - `limit` is zero (the primary counter wraps modulo `limit`)
    /// - the nominal canvas has a zero dimension
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.limit == 0 {
            return Err(SpriteError::Configuration(
                "limit must be a positive integer, got 0".into(),
            ));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(SpriteError::Configuration(format!(
                "canvas size must be non-zero, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(())
    }

    /// Create a fluent builder for `LayoutConfig`.
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::new()
    }
}

fn default_limit() -> u32 {
    1
}
fn default_col_spacing() -> u32 {
    100
}
fn default_row_spacing() -> u32 {
    50
}
fn default_canvas_size() -> u32 {
    crate::canvas::DEFAULT_CANVAS_SIZE
}

/// Builder for `LayoutConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct LayoutConfigBuilder {
    cfg: LayoutConfig,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: LayoutConfig::default(),
        }
    }
    pub fn axis(mut self, v: LayoutAxis) -> Self {
        self.cfg.axis = v;
        self
    }
    pub fn limit(mut self, v: u32) -> Self {
        self.cfg.limit = v;
        self
    }
    pub fn col_spacing(mut self, v: u32) -> Self {
        self.cfg.col_spacing = v;
        self
    }
    pub fn row_spacing(mut self, v: u32) -> Self {
        self.cfg.row_spacing = v;
        self
    }
    pub fn output_format(mut self, v: OutputFormat) -> Self {
        self.cfg.output_format = v;
        self
    }
    pub fn canvas_size(mut self, w: u32, h: u32) -> Self {
        self.cfg.canvas_width = w;
        self.cfg.canvas_height = h;
        self
    }
    pub fn on_open_error(mut self, v: OpenErrorPolicy) -> Self {
        self.cfg.on_open_error = v;
        self
    }
    pub fn build(self) -> LayoutConfig {
        self.cfg
    }
}
