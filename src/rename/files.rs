//! Collecting inputs, applying renames, and exporting rename lists.

use super::Renamer;
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One planned rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub path: PathBuf,
    pub old_name: String,
    pub new_name: String,
}

impl RenameEntry {
    pub fn is_change(&self) -> bool {
        self.old_name != self.new_name
    }

    pub fn target(&self) -> PathBuf {
        self.path.with_file_name(&self.new_name)
    }
}

impl fmt::Display for RenameEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.old_name, self.new_name)
    }
}

/// Outcome of [`apply_plan`].
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub renamed: usize,
    pub unchanged: usize,
    pub failed: Vec<(PathBuf, String)>,
}

/// Expand `inputs` into a sorted, de-duplicated list of files.
///
/// Directories are walked recursively; missing paths are logged and skipped.
pub fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                match entry {
                    Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                    Ok(_) => {}
                    Err(e) => warn!("Failed to read directory entry under {:?}: {}", input, e),
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            warn!("Skipping missing path: {:?}", input);
        }
    }

    files.sort();
    files.dedup();
    files
}

/// Compute the new name of every file.
pub fn plan(renamer: &Renamer, files: &[PathBuf]) -> Vec<RenameEntry> {
    files
        .iter()
        .map(|path| RenameEntry {
            path: path.clone(),
            old_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            new_name: renamer.preview(path),
        })
        .collect()
}

/// Rename every changed entry in place.
///
/// Failures are collected and the remaining entries are still processed.
/// An existing file is never overwritten, except by a case-only rename of
/// itself.
pub fn apply_plan(entries: &[RenameEntry]) -> ApplyReport {
    let mut report = ApplyReport::default();

    for entry in entries {
        if !entry.is_change() {
            report.unchanged += 1;
            continue;
        }

        let target = entry.target();
        if target.exists() && !same_file(&entry.path, &target) {
            warn!("Not renaming {:?}: {:?} already exists", entry.path, target);
            report
                .failed
                .push((entry.path.clone(), format!("{} already exists", entry.new_name)));
            continue;
        }

        match std::fs::rename(&entry.path, &target) {
            Ok(()) => {
                debug!("Renamed {:?} -> {:?}", entry.path, target);
                report.renamed += 1;
            }
            Err(e) => {
                warn!("Failed to rename {:?}: {}", entry.path, e);
                report.failed.push((entry.path.clone(), e.to_string()));
            }
        }
    }

    info!(
        "Renamed {} file(s), {} unchanged, {} failed",
        report.renamed,
        report.unchanged,
        report.failed.len()
    );
    report
}

/// Whether `a` and `b` name the same file on disk.
///
/// True for a case-only rename on a case-insensitive filesystem, false when
/// the two names are distinct files.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (std::fs::metadata(a), std::fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Write `old -> new` lines to `path`, appending `.txt` when missing.
///
/// Returns the path actually written.
pub fn export_plan(entries: &[RenameEntry], path: &Path) -> Result<PathBuf> {
    let path = if path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
    {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".txt");
        PathBuf::from(name)
    };

    let content: String = entries.iter().map(|e| format!("{}\n", e)).collect();
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write rename list: {:?}", path))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rename::{CaseMode, RenameOptions};
    use gdnpro_db::queries::patterns::default_patterns;

    fn renamer(options: RenameOptions) -> Renamer {
        Renamer::new(options, &default_patterns()).unwrap()
    }

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"x").unwrap();
        path
    }

    #[test]
    fn test_collect_walks_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let a = touch(dir.path(), "a.txt");
        let b = touch(&dir.path().join("sub"), "b.txt");

        let files = collect_files(&[
            dir.path().to_path_buf(),
            a.clone(),
            dir.path().join("missing.txt"),
        ]);
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn test_plan_and_apply() {
        let dir = tempfile::tempdir().unwrap();
        let spaced = touch(dir.path(), "my file.pdf");
        let clean = touch(dir.path(), "clean.pdf");

        let entries = plan(&renamer(RenameOptions::default()), &[spaced.clone(), clean]);
        assert_eq!(entries[0].to_string(), "my file.pdf -> my_file.pdf");
        assert!(!entries[1].is_change());

        let report = apply_plan(&entries);
        assert_eq!(report.renamed, 1);
        assert_eq!(report.unchanged, 1);
        assert!(report.failed.is_empty());
        assert!(!spaced.exists());
        assert!(dir.path().join("my_file.pdf").exists());
    }

    #[test]
    fn test_apply_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let spaced = touch(dir.path(), "a b.pdf");
        touch(dir.path(), "a_b.pdf");

        let entries = plan(&renamer(RenameOptions::default()), &[spaced.clone()]);
        let report = apply_plan(&entries);
        assert_eq!(report.renamed, 0);
        assert_eq!(report.failed.len(), 1);
        assert!(spaced.exists());
    }

    #[test]
    fn test_case_only_rename_keeps_distinct_file() {
        let dir = tempfile::tempdir().unwrap();
        let upper = dir.path().join("Photo.pdf");
        std::fs::write(&upper, b"UPPER").unwrap();
        let lower = dir.path().join("photo.pdf");
        if lower.exists() {
            // case-insensitive filesystem, both names are one file
            return;
        }
        std::fs::write(&lower, b"lower").unwrap();

        let entries = plan(
            &renamer(RenameOptions {
                case: CaseMode::Lowercase,
                ..Default::default()
            }),
            &[upper.clone()],
        );
        assert_eq!(entries[0].new_name, "photo.pdf");

        let report = apply_plan(&entries);
        assert_eq!(report.renamed, 0);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(std::fs::read(&lower).unwrap(), b"lower");
        assert_eq!(std::fs::read(&upper).unwrap(), b"UPPER");
    }

    #[test]
    fn test_orientation_from_real_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.png");
        image::RgbImage::new(20, 10).save(&path).unwrap();

        let r = renamer(RenameOptions {
            orientation: true,
            ..Default::default()
        });
        assert_eq!(r.preview(&path), "banner_L.png");

        let not_image = touch(dir.path(), "notes.png");
        assert_eq!(r.preview(&not_image), "notes.png");
    }

    #[test]
    fn test_export_appends_txt() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![RenameEntry {
            path: dir.path().join("a b.pdf"),
            old_name: "a b.pdf".to_string(),
            new_name: "a_b.pdf".to_string(),
        }];

        let written = export_plan(&entries, &dir.path().join("list")).unwrap();
        assert_eq!(written, dir.path().join("list.txt"));
        assert_eq!(std::fs::read_to_string(&written).unwrap(), "a b.pdf -> a_b.pdf\n");

        let kept = export_plan(&entries, &dir.path().join("names.TXT")).unwrap();
        assert_eq!(kept, dir.path().join("names.TXT"));
    }
}
