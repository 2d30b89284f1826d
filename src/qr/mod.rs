//! Batch QR code generation.
//!
//! Entries are `{name, url}` pairs loaded from a JSON file or given on the
//! command line. Each URL is encoded and written to
//! `<output_dir>/<safe name>.<format>`.

mod render;

pub use render::{render_eps, render_pdf, render_png, render_svg, render_tiff};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Box size bounds, in pixels per module.
pub const BOX_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=40;

/// Quiet zone bounds, in modules.
pub const BORDER_RANGE: std::ops::RangeInclusive<u32> = 0..=10;

/// Errors listed in a batch summary.
const MAX_REPORTED_ERRORS: usize = 5;

/// One code to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrEntry {
    #[serde(alias = "filename")]
    pub name: String,
    pub url: String,
}

impl QrEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum QrFormat {
    #[default]
    Png,
    Svg,
    Tiff,
    Eps,
    Pdf,
}

impl QrFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            QrFormat::Png => "png",
            QrFormat::Svg => "svg",
            QrFormat::Tiff => "tiff",
            QrFormat::Eps => "eps",
            QrFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for QrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for QrFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(QrFormat::Png),
            "svg" => Ok(QrFormat::Svg),
            "tif" | "tiff" => Ok(QrFormat::Tiff),
            "eps" => Ok(QrFormat::Eps),
            "pdf" => Ok(QrFormat::Pdf),
            other => Err(format!("unsupported QR format: {}", other)),
        }
    }
}

/// Error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ErrorCorrection {
    /// About 7% recovery.
    #[default]
    #[value(name = "L")]
    Low,
    /// About 15% recovery.
    #[value(name = "M")]
    Medium,
    /// About 25% recovery.
    #[value(name = "Q")]
    Quartile,
    /// About 30% recovery.
    #[value(name = "H")]
    High,
}

impl ErrorCorrection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCorrection::Low => "L",
            ErrorCorrection::Medium => "M",
            ErrorCorrection::Quartile => "Q",
            ErrorCorrection::High => "H",
        }
    }

    fn ec_level(&self) -> qrcode::EcLevel {
        match self {
            ErrorCorrection::Low => qrcode::EcLevel::L,
            ErrorCorrection::Medium => qrcode::EcLevel::M,
            ErrorCorrection::Quartile => qrcode::EcLevel::Q,
            ErrorCorrection::High => qrcode::EcLevel::H,
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCorrection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(ErrorCorrection::Low),
            "m" | "medium" => Ok(ErrorCorrection::Medium),
            "q" | "quartile" => Ok(ErrorCorrection::Quartile),
            "h" | "high" => Ok(ErrorCorrection::High),
            other => Err(format!("unknown error correction level: {}", other)),
        }
    }
}

/// An opaque RGB colour written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor { r: 0, g: 0, b: 0 };
    pub const WHITE: HexColor = HexColor {
        r: 255,
        g: 255,
        b: 255,
    };
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = String;

    /// Accepts `#RRGGBB`, `#RGB` (with or without `#`), `black` and `white`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "black" => return Ok(HexColor::BLACK),
            "white" => return Ok(HexColor::WHITE),
            _ => {}
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        let invalid = || format!("invalid colour: {:?}", s);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
        match hex.len() {
            6 => Ok(HexColor {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let doubled: String = hex.chars().flat_map(|c| [c, c]).collect();
                doubled.parse()
            }
            _ => Err(invalid()),
        }
    }
}

/// How codes are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrStyle {
    pub format: QrFormat,
    /// Pixels per module.
    pub box_size: u32,
    /// Quiet zone width in modules.
    pub border: u32,
    pub error_correction: ErrorCorrection,
    pub fill: HexColor,
    pub background: HexColor,
    /// Transparent background. PNG only, other formats use white.
    pub transparent: bool,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            format: QrFormat::Png,
            box_size: 10,
            border: 4,
            error_correction: ErrorCorrection::Low,
            fill: HexColor::BLACK,
            background: HexColor::WHITE,
            transparent: false,
        }
    }
}

impl QrStyle {
    pub fn validate(&self) -> Result<()> {
        if !BOX_SIZE_RANGE.contains(&self.box_size) {
            bail!(
                "Box size {} is outside {}..={}",
                self.box_size,
                BOX_SIZE_RANGE.start(),
                BOX_SIZE_RANGE.end()
            );
        }
        if !BORDER_RANGE.contains(&self.border) {
            bail!(
                "Border {} is outside {}..={}",
                self.border,
                BORDER_RANGE.start(),
                BORDER_RANGE.end()
            );
        }
        Ok(())
    }

    /// Background used by formats without an alpha channel.
    fn opaque_background(&self) -> HexColor {
        if self.transparent {
            HexColor::WHITE
        } else {
            self.background
        }
    }
}

/// Modules of an encoded code, row-major, `true` for dark.
#[derive(Debug, Clone)]
pub struct Modules {
    pub width: usize,
    pub dark: Vec<bool>,
}

impl Modules {
    /// Encode `data`, picking the smallest version that fits.
    pub fn encode(data: &str, error_correction: ErrorCorrection) -> Result<Self> {
        let code = qrcode::QrCode::with_error_correction_level(data.as_bytes(), error_correction.ec_level())
            .map_err(|e| anyhow::anyhow!("Failed to encode QR data: {}", e))?;

        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();

        Ok(Self {
            width: code.width(),
            dark,
        })
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.dark[y * self.width + x]
    }
}

/// Make `name` safe to use as a file stem.
///
/// Keeps alphanumerics, spaces, `-` and `_`, trims, then turns spaces into
/// underscores.
pub fn safe_file_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim().replace(' ', "_")
}

/// Encode `url` and write it to `path` in `style.format`.
pub fn generate(url: &str, style: &QrStyle, path: &Path) -> Result<()> {
    let modules = Modules::encode(url, style.error_correction)?;

    match style.format {
        QrFormat::Png => render_png(&modules, style, path),
        QrFormat::Svg => render_svg(&modules, style, path),
        QrFormat::Tiff => render_tiff(&modules, style, path),
        QrFormat::Eps => render_eps(&modules, style, path),
        QrFormat::Pdf => render_pdf(&modules, style, path),
    }
    .with_context(|| format!("Failed to write {:?}", path))?;

    debug!("Wrote QR code {:?}", path);
    Ok(())
}

/// Result of [`generate_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub total: usize,
    pub generated: Vec<PathBuf>,
    /// Entries with an empty name or URL.
    pub skipped: usize,
    pub errors: Vec<String>,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Generated {} of {} QR codes.",
            self.generated.len(),
            self.total
        )?;
        if !self.errors.is_empty() {
            write!(f, "\n\nErrors:")?;
            for error in self.errors.iter().take(MAX_REPORTED_ERRORS) {
                write!(f, "\n{}", error)?;
            }
        }
        Ok(())
    }
}

/// Generate one file per entry into `output_dir`.
///
/// Entries with an empty name or URL are skipped. A failing entry is
/// recorded and the batch continues.
pub fn generate_batch(entries: &[QrEntry], style: &QrStyle, output_dir: &Path) -> Result<BatchReport> {
    style.validate()?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut report = BatchReport {
        total: entries.len(),
        ..Default::default()
    };

    for entry in entries {
        let name = entry.name.trim();
        let url = entry.url.trim();
        if name.is_empty() || url.is_empty() {
            report.skipped += 1;
            continue;
        }

        let stem = safe_file_name(name);
        if stem.is_empty() {
            report
                .errors
                .push(format!("{}: name has no usable characters", name));
            continue;
        }

        let path = output_dir.join(format!("{}.{}", stem, style.format.extension()));
        match generate(url, style, &path) {
            Ok(()) => report.generated.push(path),
            Err(e) => {
                warn!("QR code for {:?} failed: {:#}", name, e);
                report.errors.push(format!("{}: {:#}", name, e));
            }
        }
    }

    info!(
        "Generated {} of {} QR codes ({} skipped, {} failed)",
        report.generated.len(),
        report.total,
        report.skipped,
        report.errors.len()
    );
    Ok(report)
}

/// Read entries from a JSON array.
pub fn load_entries(path: &Path) -> Result<Vec<QrEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read QR entries: {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse QR entries: {:?}", path))
}

/// Write an example entries file.
pub fn write_template(path: &Path) -> Result<()> {
    let template = vec![
        QrEntry::new("Example Site", "https://example.com"),
        QrEntry::new("Product Page", "https://example.com/product"),
    ];
    let content = serde_json::to_string_pretty(&template)?;
    std::fs::write(path, content + "\n")
        .with_context(|| format!("Failed to write template: {:?}", path))?;
    Ok(())
}

/// Write `entries` back out as a JSON array that [`load_entries`] accepts.
///
/// A path without an extension gets `.json`. Returns the path written.
pub fn export_entries(entries: &[QrEntry], path: &Path) -> Result<PathBuf> {
    if entries.is_empty() {
        bail!("No entries to export");
    }

    let path = if path.extension().is_none() {
        path.with_extension("json")
    } else {
        path.to_path_buf()
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let content = serde_json::to_string_pretty(entries)?;
    std::fs::write(&path, content + "\n")
        .with_context(|| format!("Failed to export entries: {:?}", path))?;
    info!("Exported {} QR entries to {:?}", entries.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("  My Site: Home! "), "My_Site_Home");
        assert_eq!(safe_file_name("a-b_c d"), "a-b_c_d");
        assert_eq!(safe_file_name("???"), "");
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!("#000000".parse::<HexColor>().unwrap(), HexColor::BLACK);
        assert_eq!("ffffff".parse::<HexColor>().unwrap(), HexColor::WHITE);
        assert_eq!(
            "#1a2B3c".parse::<HexColor>().unwrap(),
            HexColor {
                r: 0x1a,
                g: 0x2b,
                b: 0x3c
            }
        );
        assert_eq!(
            "#f00".parse::<HexColor>().unwrap(),
            HexColor { r: 255, g: 0, b: 0 }
        );
        assert!("#12345".parse::<HexColor>().is_err());
        assert!("#gg0000".parse::<HexColor>().is_err());
        assert_eq!(HexColor { r: 1, g: 2, b: 255 }.to_string(), "#0102FF");
    }

    #[test]
    fn test_parse_levels_and_formats() {
        assert_eq!("H".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::High);
        assert_eq!("medium".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Medium);
        assert_eq!("TIFF".parse::<QrFormat>().unwrap(), QrFormat::Tiff);
        assert_eq!("eps".parse::<QrFormat>().unwrap(), QrFormat::Eps);
        assert_eq!("PDF".parse::<QrFormat>().unwrap(), QrFormat::Pdf);
        assert!("jpeg".parse::<QrFormat>().is_err());
    }

    #[test]
    fn test_style_bounds() {
        assert!(QrStyle::default().validate().is_ok());
        let too_big = QrStyle {
            box_size: 41,
            ..Default::default()
        };
        assert!(too_big.validate().is_err());
        let no_box = QrStyle {
            box_size: 0,
            ..Default::default()
        };
        assert!(no_box.validate().is_err());
        let wide_border = QrStyle {
            border: 11,
            ..Default::default()
        };
        assert!(wide_border.validate().is_err());
    }

    #[test]
    fn test_encode_version_one() {
        let modules = Modules::encode("hi", ErrorCorrection::Low).unwrap();
        assert_eq!(modules.width, 21);
        // finder pattern corner
        assert!(modules.is_dark(0, 0));
        assert!(!modules.is_dark(1, 1));
    }

    #[test]
    fn test_batch_skips_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![
            QrEntry::new("Home Page", "https://example.com"),
            QrEntry::new("", "https://example.com/empty"),
            QrEntry::new("No Url", "  "),
            QrEntry::new("!!!", "https://example.com/bang"),
        ];

        let report = generate_batch(&entries, &QrStyle::default(), dir.path()).unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.generated, vec![dir.path().join("Home_Page.png")]);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.errors.len(), 1);

        let summary = report.to_string();
        assert!(summary.starts_with("Generated 1 of 4 QR codes."));
        assert!(summary.contains("!!!: name has no usable characters"));
    }

    #[test]
    fn test_summary_lists_first_five_errors() {
        let report = BatchReport {
            total: 7,
            errors: (1..=7).map(|i| format!("e{i}")).collect(),
            ..Default::default()
        };
        let summary = report.to_string();
        assert!(summary.contains("e5"));
        assert!(!summary.contains("e6"));
    }

    #[test]
    fn test_entries_and_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("qr.json");
        write_template(&template).unwrap();
        let entries = load_entries(&template).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Example Site");

        let aliased = dir.path().join("aliased.json");
        std::fs::write(&aliased, r#"[{"filename": "Menu", "url": "https://x.test/m"}]"#).unwrap();
        assert_eq!(
            load_entries(&aliased).unwrap(),
            vec![QrEntry::new("Menu", "https://x.test/m")]
        );

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        assert!(load_entries(&broken).is_err());
    }

    #[test]
    fn test_batch_writes_pdf_and_eps() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![QrEntry::new("Menu", "https://example.com/menu")];

        for format in [QrFormat::Pdf, QrFormat::Eps] {
            let style = QrStyle {
                format,
                ..Default::default()
            };
            let report = generate_batch(&entries, &style, dir.path()).unwrap();
            assert_eq!(report.generated, vec![dir.path().join(format!("Menu.{format}"))]);
        }

        let pdf = std::fs::read(dir.path().join("Menu.pdf")).unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        let eps = std::fs::read_to_string(dir.path().join("Menu.eps")).unwrap();
        assert!(eps.starts_with("%!PS-Adobe-3.0 EPSF-3.0"));
    }

    #[test]
    fn test_export_round_trips_through_load() {
        let dir = tempfile::tempdir().unwrap();
        let entries = vec![
            QrEntry::new("Example Site", "https://example.com"),
            QrEntry::new("Menu", "https://example.com/menu"),
        ];

        let written = export_entries(&entries, &dir.path().join("out").join("qr_data")).unwrap();
        assert_eq!(written, dir.path().join("out").join("qr_data.json"));
        assert_eq!(load_entries(&written).unwrap(), entries);

        let err = export_entries(&[], &dir.path().join("empty.json")).unwrap_err();
        assert!(err.to_string().contains("No entries"));
        assert!(!dir.path().join("empty.json").exists());
    }
}
