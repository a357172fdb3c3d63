//! Layered raster canvas.
//!
//! [`Canvas`] is the narrow document/layer capability the sprite pipeline needs:
//! add a layer, query its visible bounds, move it, remove it, reveal and trim the
//! canvas, then flatten. [`LayeredCanvas`] implements it on top of `image`.
//!
//! Layers keep their own pixel buffers and an integer origin in canvas space, so the
//! nominal canvas size is bookkeeping only. A 10000x10000 working canvas costs nothing
//! until something is rendered.

use crate::model::{Bounds, Rect};
use image::{RgbaImage, imageops};

/// Default nominal size of the working canvas, both dimensions.
pub const DEFAULT_CANVAS_SIZE: u32 = 10_000;

/// Name of the layer every canvas starts with.
pub const PLACEHOLDER_LAYER: &str = "Background";

/// Opaque reference to a layer. Stays valid while the layer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(u64);

pub trait Canvas {
    /// Creates a transparent canvas holding a single placeholder layer.
    fn create(width: u32, height: u32) -> Self
    where
        Self: Sized;
    /// Current canvas size.
    fn size(&self) -> (u32, u32);
    /// Inserts `pixels` as the new topmost layer, top-left at the canvas origin.
    fn add_layer(&mut self, name: &str, pixels: RgbaImage) -> LayerHandle;
    /// Bounds of the layer's non-transparent pixels, `None` if it has none or does not exist.
    fn layer_bounds(&self, handle: LayerHandle) -> Option<Bounds>;
    fn layer_name(&self, handle: LayerHandle) -> Option<&str>;
    /// Canvas position of the layer's pixel buffer top-left corner.
    fn layer_origin(&self, handle: LayerHandle) -> Option<(i64, i64)>;
    /// Moves a layer by `(dx, dy)`. Returns false if the layer does not exist.
    fn translate(&mut self, handle: LayerHandle, dx: i64, dy: i64) -> bool;
    /// Returns false if the layer does not exist.
    fn remove_layer(&mut self, handle: LayerHandle) -> bool;
    /// Layers from topmost to bottommost.
    fn layers_top_down(&self) -> Vec<LayerHandle>;
    /// Grows the canvas so no layer pixel lies outside it.
    fn reveal_all(&mut self);
    /// Crops the canvas to the union of all layer content and returns that union in
    /// pre-trim coordinates. With no content anywhere the canvas collapses to 0x0 and
    /// `None` is returned.
    fn trim_to_content(&mut self) -> Option<Bounds>;
    /// Flattens all layers bottom-to-top into a single image of the canvas size.
    fn render(&self) -> RgbaImage;
}

struct Layer {
    handle: LayerHandle,
    name: String,
    pixels: RgbaImage,
    origin: (i64, i64),
    /// Content rect within `pixels`; computed once since pixels never change.
    content: Option<Rect>,
}

impl Layer {
    fn bounds(&self) -> Option<Bounds> {
        self.content.map(|r| {
            let left = self.origin.0 + r.x as i64;
            let top = self.origin.1 + r.y as i64;
            Bounds::new(left, top, left + r.w as i64, top + r.h as i64)
        })
    }

    fn extent(&self) -> Bounds {
        let (w, h) = self.pixels.dimensions();
        Bounds::new(
            self.origin.0,
            self.origin.1,
            self.origin.0 + w as i64,
            self.origin.1 + h as i64,
        )
    }
}

/// In-memory layered canvas. Index 0 of the layer stack is the bottom.
pub struct LayeredCanvas {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    next_handle: u64,
    placeholder: LayerHandle,
}

impl LayeredCanvas {
    /// Handle of the layer created together with the canvas.
    pub fn placeholder(&self) -> LayerHandle {
        self.placeholder
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn find(&self, handle: LayerHandle) -> Option<&Layer> {
        self.layers.iter().find(|l| l.handle == handle)
    }

    fn shift_all(&mut self, dx: i64, dy: i64) {
        for layer in &mut self.layers {
            layer.origin.0 += dx;
            layer.origin.1 += dy;
        }
    }
}

impl Canvas for LayeredCanvas {
    fn create(width: u32, height: u32) -> Self {
        let mut canvas = Self {
            width,
            height,
            layers: Vec::new(),
            next_handle: 0,
            placeholder: LayerHandle(0),
        };
        // Content-less placeholder; it never contributes to bounds or trim.
        canvas.placeholder = canvas.add_layer(PLACEHOLDER_LAYER, RgbaImage::new(0, 0));
        canvas
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn add_layer(&mut self, name: &str, pixels: RgbaImage) -> LayerHandle {
        let handle = LayerHandle(self.next_handle);
        self.next_handle += 1;
        let content = content_rect(&pixels, 0);
        self.layers.push(Layer {
            handle,
            name: name.to_string(),
            pixels,
            origin: (0, 0),
            content,
        });
        handle
    }

    fn layer_bounds(&self, handle: LayerHandle) -> Option<Bounds> {
        self.find(handle).and_then(Layer::bounds)
    }

    fn layer_name(&self, handle: LayerHandle) -> Option<&str> {
        self.find(handle).map(|l| l.name.as_str())
    }

    fn layer_origin(&self, handle: LayerHandle) -> Option<(i64, i64)> {
        self.find(handle).map(|l| l.origin)
    }

    fn translate(&mut self, handle: LayerHandle, dx: i64, dy: i64) -> bool {
        match self.layers.iter_mut().find(|l| l.handle == handle) {
            Some(layer) => {
                layer.origin.0 += dx;
                layer.origin.1 += dy;
                true
            }
            None => false,
        }
    }

    fn remove_layer(&mut self, handle: LayerHandle) -> bool {
        let before = self.layers.len();
        self.layers.retain(|l| l.handle != handle);
        self.layers.len() != before
    }

    fn layers_top_down(&self) -> Vec<LayerHandle> {
        self.layers.iter().rev().map(|l| l.handle).collect()
    }

    fn reveal_all(&mut self) {
        let mut area = Bounds::new(0, 0, self.width as i64, self.height as i64);
        for layer in &self.layers {
            let (w, h) = layer.pixels.dimensions();
            if w > 0 && h > 0 {
                area = area.union(&layer.extent());
            }
        }
        self.shift_all(-area.left, -area.top);
        self.width = area.width() as u32;
        self.height = area.height() as u32;
    }

    fn trim_to_content(&mut self) -> Option<Bounds> {
        let Some(content) = self
            .layers
            .iter()
            .filter_map(Layer::bounds)
            .reduce(|a, b| a.union(&b))
        else {
            self.width = 0;
            self.height = 0;
            return None;
        };
        self.shift_all(-content.left, -content.top);
        self.width = content.width() as u32;
        self.height = content.height() as u32;
        Some(content)
    }

    fn render(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.width, self.height);
        for layer in &self.layers {
            imageops::overlay(&mut out, &layer.pixels, layer.origin.0, layer.origin.1);
        }
        out
    }
}

/// Tight rectangle around pixels with alpha above `threshold`, or `None` if there are none.
pub fn content_rect(rgba: &RgbaImage, threshold: u8) -> Option<Rect> {
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let column_empty =
        |x: u32, y1: u32, y2: u32| (y1..=y2).all(|y| rgba.get_pixel(x, y)[3] <= threshold);
    let row_empty =
        |y: u32, x1: u32, x2: u32| (x1..=x2).all(|x| rgba.get_pixel(x, y)[3] <= threshold);

    let mut x1 = 0;
    let mut y1 = 0;
    let mut x2 = w - 1;
    let mut y2 = h - 1;
    // left
    while x1 < w && column_empty(x1, 0, h - 1) {
        x1 += 1;
    }
    if x1 >= w {
        return None;
    }
    // right
    while x2 > x1 && column_empty(x2, 0, h - 1) {
        x2 -= 1;
    }
    // top
    while y1 < h && row_empty(y1, x1, x2) {
        y1 += 1;
    }
    // bottom
    while y2 > y1 && row_empty(y2, x1, x2) {
        y2 -= 1;
    }
    Some(Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1))
}
