use crate::error::Result;
use crate::model::ImageEntry;
use std::path::Path;
use walkdir::WalkDir;

/// Extensions accepted by [`is_valid_image`].
pub const SUPPORTED_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".gif", ".png", ".tif"];

/// True if the lowercased `filename` contains one of [`SUPPORTED_EXTENSIONS`].
///
/// This is a substring match, not a suffix match: `notes.jpgx` and `x.png.bak`
/// are accepted.
pub fn is_valid_image(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

/// Layer name for a source file: the file name with its final `.ext` segment removed.
pub fn layer_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match file_name.rfind('.') {
        Some(idx) => file_name[..idx].to_string(),
        None => file_name,
    }
}

/// Lists the direct children of `dir` in file-name order, screening each one.
///
/// Subfolders are listed with `is_valid == false`; nothing below the first level is visited.
/// A symlink is screened by its target, so a link to an image is accepted and a dangling
/// link is not.
pub fn scan_folder(dir: &Path) -> Result<Vec<ImageEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io) => io,
            None => std::io::Error::other("directory walk failed"),
        })?;
        // `Path::is_file` follows symlinks; the entry's own file type does not.
        let is_valid = entry.path().is_file()
            && is_valid_image(&entry.file_name().to_string_lossy());
        entries.push(ImageEntry {
            path: entry.into_path(),
            is_valid,
        });
    }
    Ok(entries)
}

/// Paths of the valid entries, in scan order.
pub fn valid_paths(entries: &[ImageEntry]) -> Vec<std::path::PathBuf> {
    entries
        .iter()
        .filter(|e| e.is_valid)
        .map(|e| e.path.clone())
        .collect()
}
