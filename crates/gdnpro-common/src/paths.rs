//! Path utilities for detecting file types by extension and deriving
//! output paths for rendered documents.

use std::path::{Path, PathBuf};

/// Extensions accepted as source documents.
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];

/// Extensions the renamer treats as images when probing orientation.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check if a path has a PDF extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gdnpro_common::paths::is_pdf_file;
///
/// assert!(is_pdf_file(Path::new("/docs/brochure.PDF")));
/// assert!(!is_pdf_file(Path::new("brochure.gif")));
/// ```
pub fn is_pdf_file(path: &Path) -> bool {
    has_extension(path, DOCUMENT_EXTENSIONS)
}

/// Check if a path has an image file extension.
pub fn is_image_file(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

/// Compute where the rendered version of `source` is written.
///
/// The output lands in `output_dir` when one is given and differs from the
/// source's own directory, otherwise next to the source. The base name is
/// kept and the extension replaced with `extension`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use gdnpro_common::paths::destination_path;
///
/// let dest = destination_path(Path::new("/a/x.pdf"), Some(Path::new("/out")), "gif");
/// assert_eq!(dest, Path::new("/out/x.gif"));
/// ```
pub fn destination_path(source: &Path, output_dir: Option<&Path>, extension: &str) -> PathBuf {
    let source_dir = source.parent().unwrap_or_else(|| Path::new(""));
    let dir = match output_dir {
        Some(dir) if dir != source_dir => dir,
        _ => source_dir,
    };

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    dir.join(format!("{}.{}", stem, extension))
}

/// Display name of a path (its final component), used in progress output.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pdf_file() {
        assert!(is_pdf_file(Path::new("a.pdf")));
        assert!(is_pdf_file(Path::new("/x/y/A.Pdf")));
        assert!(!is_pdf_file(Path::new("a.pdf.txt")));
        assert!(!is_pdf_file(Path::new("pdf")));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("photo.JPG")));
        assert!(is_image_file(Path::new("scan.tiff")));
        assert!(!is_image_file(Path::new("notes.txt")));
    }

    #[test]
    fn test_destination_same_directory() {
        let dest = destination_path(Path::new("/a/doc1.pdf"), None, "gif");
        assert_eq!(dest, PathBuf::from("/a/doc1.gif"));
    }

    #[test]
    fn test_destination_output_dir_equal_to_source_dir() {
        let dest = destination_path(Path::new("/a/doc1.pdf"), Some(Path::new("/a")), "gif");
        assert_eq!(dest, PathBuf::from("/a/doc1.gif"));
    }

    #[test]
    fn test_destination_distinct_output_dir() {
        let dest = destination_path(Path::new("/a/doc1.pdf"), Some(Path::new("/b/c")), "gif");
        assert_eq!(dest, PathBuf::from("/b/c/doc1.gif"));
    }

    #[test]
    fn test_destination_keeps_inner_dots() {
        let dest = destination_path(Path::new("/a/v1.2.final.pdf"), None, "gif");
        assert_eq!(dest, PathBuf::from("/a/v1.2.final.gif"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/a/b/doc.pdf")), "doc.pdf");
    }
}
