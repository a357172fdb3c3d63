use crate::canvas::Canvas;
use crate::config::OutputFormat;
use crate::model::ExportRecord;
use serde_json::Value;

/// Collects one record per layer, topmost layer first.
///
/// Position is the top-left of the layer's visible bounds; a layer without visible
/// content reports its origin instead. Call after the canvas is finalized so positions
/// are relative to the trimmed sheet.
///
/// Visible bounds always lie inside a trimmed sheet. The origin of a fully transparent
/// layer can end up above or left of it; such a coordinate is clamped to 0, the nearest
/// sheet edge.
pub fn records<C: Canvas>(canvas: &C) -> Vec<ExportRecord> {
    canvas
        .layers_top_down()
        .into_iter()
        .filter_map(|handle| {
            let name = canvas.layer_name(handle)?.to_string();
            let (x, y) = match canvas.layer_bounds(handle) {
                Some(b) => (b.left, b.top),
                None => canvas.layer_origin(handle)?,
            };
            Some(ExportRecord {
                name,
                x: x.max(0) as u32,
                y: y.max(0) as u32,
            })
        })
        .collect()
}

/// One rule per record: `.name { background-position: -x -y; }`.
pub fn to_css_lines(records: &[ExportRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| format!(".{} {{ background-position: -{} -{}; }}", r.name, r.x, r.y))
        .collect()
}

/// A JSON array spread over lines: `[`, one object per record, `]`.
///
/// Coordinates are emitted as strings and `y` carries a leading minus, so a record at
/// (0, 50) reads `{"layer": "icon", "x": "0", "y": "-50"}`. Joined with newlines the
/// lines form a valid JSON document.
pub fn to_json_lines(records: &[ExportRecord]) -> Vec<String> {
    let mut lines = Vec::with_capacity(records.len() + 2);
    lines.push("[".to_string());
    for (i, r) in records.iter().enumerate() {
        let sep = if i + 1 < records.len() { "," } else { "" };
        lines.push(format!(
            "{{\"layer\": {}, \"x\": \"{}\", \"y\": \"-{}\"}}{}",
            Value::String(r.name.clone()),
            r.x,
            r.y,
            sep
        ));
    }
    lines.push("]".to_string());
    lines
}

pub fn render_lines(records: &[ExportRecord], format: OutputFormat) -> Vec<String> {
    match format {
        OutputFormat::Css => to_css_lines(records),
        OutputFormat::Json => to_json_lines(records),
    }
}

/// Walks a finalized canvas and encodes every layer in `format`.
pub fn export<C: Canvas>(canvas: &C, format: OutputFormat) -> Vec<String> {
    render_lines(&records(canvas), format)
}
