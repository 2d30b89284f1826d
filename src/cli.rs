use clap::{Args, Parser, Subcommand};
use gdnpro::qr::{ErrorCorrection, QrFormat};
use gdnpro::rename::{CaseMode, OrientationPosition};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gdnpro")]
#[command(author, version, about = "Batch PDF to GIF conversion, file renaming and QR codes")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings database (overrides the config file)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render PDFs as animated GIFs
    Gif(GifArgs),

    /// Clean up file names
    Rename(RenameArgs),

    /// Manage the renamer's regex patterns
    Patterns {
        #[command(subcommand)]
        action: PatternAction,
    },

    /// Generate QR codes
    Qr {
        #[command(subcommand)]
        action: QrAction,
    },

    /// Inspect or change saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Write a config file with default values
    InitConfig {
        /// Where to write it
        #[arg(default_value = "gdnpro.toml")]
        path: PathBuf,
    },

    /// Display version information
    Version,
}

#[derive(Args)]
pub struct GifArgs {
    /// PDF files, or directories containing PDFs
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write GIFs here instead of next to each PDF
    #[arg(short, long, conflicts_with = "next_to_source")]
    pub output_dir: Option<PathBuf>,

    /// Forget a saved output directory and write next to each PDF
    #[arg(long)]
    pub next_to_source: bool,

    /// Frame mode: "Loop" or a frame count
    #[arg(short, long)]
    pub frames: Option<String>,

    /// Frame-control adjustment
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub frame_control: Option<bool>,

    /// Add `-layers Optimize`
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub optimize: Option<bool>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Files or directories (walked recursively)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Text to replace before cleanup (empty disables)
    #[arg(long)]
    pub replace: Option<String>,

    /// Replacement for --replace
    #[arg(long)]
    pub with: Option<String>,

    /// Remove illegal characters and apply the stored patterns
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub illegal: Option<bool>,

    /// Case conversion
    #[arg(long, value_enum, ignore_case = true)]
    pub case: Option<CaseMode>,

    /// Add an L/P/S orientation marker to images
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub orientation: Option<bool>,

    /// Where the orientation marker goes
    #[arg(long, value_enum, ignore_case = true)]
    pub position: Option<OrientationPosition>,

    /// Rename the files instead of only previewing
    #[arg(long)]
    pub apply: bool,

    /// Write the preview list to a .txt file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum PatternAction {
    /// List patterns in the order they are applied
    List,

    /// Append a pattern
    Add {
        /// Regular expression
        pattern: String,

        /// Replacement (`$1` refers to a capture group)
        #[arg(default_value = "")]
        replacement: String,
    },

    /// Remove the pattern at a position shown by `patterns list`
    Remove { index: usize },

    /// Restore the built-in patterns
    Reset,
}

#[derive(Subcommand)]
pub enum QrAction {
    /// Generate codes from a JSON file or a single name/URL pair
    Generate(QrArgs),

    /// Write an example JSON input file
    Template {
        /// Where to write it
        file: PathBuf,
    },

    /// Save entries, optionally with one more name/URL pair, to a JSON file
    Export {
        /// JSON file to start from
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Name of an entry to append
        #[arg(long, requires = "url")]
        name: Option<String>,

        /// URL of an entry to append
        #[arg(long, requires = "name")]
        url: Option<String>,

        /// Where to write the entries (`.json` is added when there is no extension)
        file: PathBuf,
    },
}

#[derive(Args)]
pub struct QrArgs {
    /// JSON array of {"name", "url"} objects
    #[arg(short, long, conflicts_with_all = ["name", "url"], required_unless_present = "name")]
    pub input: Option<PathBuf>,

    /// Name of a single code (used for the file name)
    #[arg(long, requires = "url")]
    pub name: Option<String>,

    /// URL of a single code
    #[arg(long, requires = "name")]
    pub url: Option<String>,

    /// Output directory (defaults to the saved one, else the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<QrFormat>,

    /// Pixels per module
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=40))]
    pub box_size: Option<u32>,

    /// Quiet zone in modules
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub border: Option<u32>,

    #[arg(long, value_enum, ignore_case = true)]
    pub error_correction: Option<ErrorCorrection>,

    /// Module colour, e.g. #000000
    #[arg(long)]
    pub fill: Option<String>,

    /// Background colour, e.g. #FFFFFF
    #[arg(long)]
    pub background: Option<String>,

    /// Transparent background (PNG only)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub transparent: Option<bool>,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// List settings, optionally only those starting with a prefix
    List { prefix: Option<String> },

    /// Print one setting
    Get { key: String },

    /// Store a setting
    Set { key: String, value: String },

    /// Remove a setting
    Unset { key: String },
}
