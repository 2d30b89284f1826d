//! Batch file renaming.
//!
//! A [`Renamer`] turns a file name into a cleaned-up one. The stem is
//! rewritten in four passes (character replacement, illegal character and
//! pattern cleanup, case conversion, orientation marker) and the extension
//! is carried over unchanged.

mod files;

pub use files::{apply_plan, collect_files, export_plan, plan, ApplyReport, RenameEntry};

use anyhow::{Context, Result};
use gdnpro_common::paths::is_image_file;
use gdnpro_db::models::Pattern;
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Characters removed by the illegal-character cleanup.
pub const ILLEGAL_CHARS: &str = "()+<>&|;\"/,!{@}£$^#€™?*";

/// Case conversion applied after cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CaseMode {
    /// Leave case alone.
    #[default]
    Default,
    /// Upper case everything.
    Capitals,
    /// Upper case the first letter of each run of letters.
    Title,
    Lowercase,
}

impl CaseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseMode::Default => "Default",
            CaseMode::Capitals => "Capitals",
            CaseMode::Title => "Title",
            CaseMode::Lowercase => "Lowercase",
        }
    }

    fn apply(&self, name: &str) -> String {
        match self {
            CaseMode::Default => name.to_string(),
            CaseMode::Capitals => name.to_uppercase(),
            CaseMode::Title => title_case(name),
            CaseMode::Lowercase => name.to_lowercase(),
        }
    }
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(CaseMode::Default),
            "capitals" | "upper" | "uppercase" => Ok(CaseMode::Capitals),
            "title" => Ok(CaseMode::Title),
            "lowercase" | "lower" => Ok(CaseMode::Lowercase),
            other => Err(format!("unknown case mode: {}", other)),
        }
    }
}

/// Where the orientation marker goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OrientationPosition {
    Prefix,
    #[default]
    Suffix,
}

impl OrientationPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationPosition::Prefix => "Prefix",
            OrientationPosition::Suffix => "Suffix",
        }
    }
}

impl fmt::Display for OrientationPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrientationPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(OrientationPosition::Prefix),
            "suffix" => Ok(OrientationPosition::Suffix),
            other => Err(format!("unknown orientation position: {}", other)),
        }
    }
}

/// Image orientation derived from pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        match width.cmp(&height) {
            std::cmp::Ordering::Greater => Orientation::Landscape,
            std::cmp::Ordering::Less => Orientation::Portrait,
            std::cmp::Ordering::Equal => Orientation::Square,
        }
    }

    /// Single-letter marker added to names.
    pub fn marker(&self) -> char {
        match self {
            Orientation::Landscape => 'L',
            Orientation::Portrait => 'P',
            Orientation::Square => 'S',
        }
    }
}

/// Read an image's orientation, or `None` if it cannot be decoded.
pub fn image_orientation(path: &Path) -> Option<Orientation> {
    match image::image_dimensions(path) {
        Ok((width, height)) => Some(Orientation::from_dimensions(width, height)),
        Err(e) => {
            tracing::debug!("No orientation for {:?}: {}", path, e);
            None
        }
    }
}

/// Renaming options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOptions {
    /// Text replaced before anything else. Empty disables the step.
    pub replace: String,
    pub with: String,
    /// Remove illegal characters and apply the stored patterns.
    pub remove_illegal: bool,
    pub case: CaseMode,
    /// Add an `L`/`P`/`S` marker for readable images.
    pub orientation: bool,
    pub position: OrientationPosition,
}

impl Default for RenameOptions {
    fn default() -> Self {
        Self {
            replace: " ".to_string(),
            with: "_".to_string(),
            remove_illegal: true,
            case: CaseMode::Default,
            orientation: false,
            position: OrientationPosition::Suffix,
        }
    }
}

/// Computes new file names.
#[derive(Debug, Clone)]
pub struct Renamer {
    options: RenameOptions,
    patterns: Vec<(Regex, String)>,
    underscores: Regex,
    dashes: Regex,
    leading_marker: Regex,
    trailing_marker: Regex,
    inner_marker: Regex,
}

impl Renamer {
    /// Compile `patterns` in order.
    ///
    /// Replacements use the `regex` crate syntax, so `$1` refers to a group.
    pub fn new(options: RenameOptions, patterns: &[Pattern]) -> Result<Self> {
        let compiled = patterns
            .iter()
            .map(|p| {
                Regex::new(&p.pattern)
                    .map(|re| (re, p.replacement.clone()))
                    .with_context(|| format!("Invalid rename pattern: {:?}", p.pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            options,
            patterns: compiled,
            underscores: Regex::new("_+")?,
            dashes: Regex::new("-+")?,
            leading_marker: Regex::new("^[LPS]_")?,
            trailing_marker: Regex::new("_[LPS]$")?,
            inner_marker: Regex::new("_[LPS]_")?,
        })
    }

    /// New file name for `path`.
    ///
    /// Files with an image extension are probed for orientation when enabled.
    pub fn preview(&self, path: &Path) -> String {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let orientation = if self.options.orientation && is_image_file(path) {
            image_orientation(path)
        } else {
            None
        };

        self.rename(&file_name, orientation)
    }

    /// New file name for `file_name` given an already known orientation.
    pub fn rename(&self, file_name: &str, orientation: Option<Orientation>) -> String {
        let (stem, extension) = split_extension(file_name);
        let mut name = stem.to_string();

        if !self.options.replace.is_empty() {
            name = name.replace(&self.options.replace, &self.options.with);
        }

        if self.options.remove_illegal {
            name.retain(|c| !ILLEGAL_CHARS.contains(c));
            for (re, replacement) in &self.patterns {
                name = re.replace_all(&name, replacement.as_str()).into_owned();
            }
            name = self.collapse(&name);
        }

        name = self.options.case.apply(&name);

        if self.options.orientation {
            if let Some(orientation) = orientation {
                name = self.mark(&name, orientation);
            }
        }

        format!("{}{}", name, extension)
    }

    fn collapse(&self, name: &str) -> String {
        let name = self.underscores.replace_all(name, "_");
        self.dashes.replace_all(&name, "-").into_owned()
    }

    fn mark(&self, name: &str, orientation: Orientation) -> String {
        let name = self.leading_marker.replace(name, "");
        let name = self.trailing_marker.replace(&name, "");
        let name = self.inner_marker.replace_all(&name, "_");
        let name = self.underscores.replace_all(&name, "_");
        let name = name.trim_matches('_');

        match self.options.position {
            OrientationPosition::Prefix => format!("{}_{}", orientation.marker(), name),
            OrientationPosition::Suffix => format!("{}_{}", name, orientation.marker()),
        }
    }
}

/// Split `"a.b.pdf"` into `("a.b", ".pdf")`. Leading-dot names have no extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// Upper case the first letter of each run of letters, lower case the rest.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for c in name.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
