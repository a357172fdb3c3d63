use crate::canvas::{Canvas, LayerHandle};
use crate::model::Bounds;
use tracing::debug;

/// Turns the oversized working canvas into the final sheet: drops the placeholder
/// layer, pulls back anything that fell outside the nominal bounds, then trims to the
/// content of every layer.
///
/// Returns the trimmed region in pre-trim canvas coordinates, or `None` if no layer
/// has visible content (the canvas is then 0x0).
pub fn finalize<C: Canvas>(canvas: &mut C, placeholder: LayerHandle) -> Option<Bounds> {
    canvas.remove_layer(placeholder);
    canvas.reveal_all();
    let trimmed = canvas.trim_to_content();
    let (w, h) = canvas.size();
    debug!(width = w, height = h, "canvas finalized");
    trimmed
}
