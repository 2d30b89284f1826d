//! Saved per-tool settings.
//!
//! Every tool keeps its last used options in the settings database under
//! its own key prefix (`gif_`, `renamer_`, `qr_`). Booleans are stored as
//! `"1"`/`"0"`. Values that fail to parse fall back to the default with a
//! warning.

use crate::config::GifDefaults;
use crate::convert::GifOptions;
use crate::qr::{ErrorCorrection, HexColor, QrFormat, QrStyle};
use crate::rename::{CaseMode, OrientationPosition, RenameOptions};
use anyhow::{Context, Result};
use gdnpro_db::models::{Pattern, Setting};
use gdnpro_db::pool::{get_conn, init_memory_pool, init_pool, DbPool};
use gdnpro_db::queries::{patterns, settings};
use std::path::{Path, PathBuf};
use std::str::FromStr;

mod keys {
    pub const GIF_FRAME_CONTROL: &str = "gif_frame_control";
    pub const GIF_FRAMES: &str = "gif_frames";
    pub const GIF_OPTIMIZE: &str = "gif_optimize";
    pub const GIF_OUTPUT_DIR: &str = "gif_output_dir";

    pub const RENAMER_REPLACE: &str = "renamer_replace_char";
    pub const RENAMER_WITH: &str = "renamer_with_char";
    pub const RENAMER_ILLEGAL: &str = "renamer_enable_illegal";
    pub const RENAMER_CASE: &str = "renamer_case";
    pub const RENAMER_ORIENTATION: &str = "renamer_enable_orientation";
    pub const RENAMER_POSITION: &str = "renamer_orientation_position";

    pub const QR_FORMAT: &str = "qr_format";
    pub const QR_SIZE: &str = "qr_size";
    pub const QR_BORDER: &str = "qr_border";
    pub const QR_ERROR_CORRECTION: &str = "qr_error_correction";
    pub const QR_FILL: &str = "qr_fill_color";
    pub const QR_BACKGROUND: &str = "qr_bg_color";
    pub const QR_TRANSPARENT: &str = "qr_transparent_bg";
    pub const QR_OUTPUT_DIR: &str = "qr_output_dir";
}

/// Handle on the settings database.
#[derive(Clone)]
pub struct SettingsStore {
    pool: DbPool,
}

impl SettingsStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let pool = init_pool(path)
            .with_context(|| format!("Failed to open settings database: {:?}", path))?;
        tracing::debug!("Opened settings database {:?}", path);
        Ok(Self { pool })
    }

    /// A throwaway store.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            pool: init_memory_pool()?,
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = get_conn(&self.pool)?;
        Ok(settings::get(&conn, key)?)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        settings::set(&conn, key, value)?;
        Ok(())
    }

    /// Remove `key`. Returns whether it existed.
    pub fn unset(&self, key: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        Ok(settings::delete(&conn, key)?)
    }

    pub fn list(&self, prefix: &str) -> Result<Vec<Setting>> {
        let conn = get_conn(&self.pool)?;
        Ok(settings::list_prefix(&conn, prefix)?)
    }

    fn get_parsed<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key)? {
            Some(raw) => match raw.parse() {
                Ok(value) => Ok(value),
                Err(e) => {
                    tracing::warn!("Ignoring saved {} = {:?}: {}", key, raw, e);
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        Ok(match self.get(key)?.as_deref().map(str::trim) {
            Some("1") | Some("true") => true,
            Some("0") | Some("false") => false,
            Some(other) => {
                tracing::warn!("Ignoring saved {} = {:?}", key, other);
                default
            }
            None => default,
        })
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set(key, if value { "1" } else { "0" })
    }

    fn get_path(&self, key: &str) -> Result<Option<PathBuf>> {
        Ok(self.get(key)?.filter(|s| !s.is_empty()).map(PathBuf::from))
    }

    /// Saved GIF options, with `defaults` for anything never saved.
    pub fn gif_settings(&self, defaults: &GifDefaults) -> Result<GifSettings> {
        let frames = self
            .get(keys::GIF_FRAMES)?
            .unwrap_or_else(|| defaults.frames.clone());
        Ok(GifSettings {
            options: GifOptions {
                frame_control: self.get_bool(keys::GIF_FRAME_CONTROL, defaults.frame_control)?,
                frames: frames.parse().unwrap_or_else(|never| match never {}),
                optimize: self.get_bool(keys::GIF_OPTIMIZE, defaults.optimize)?,
            },
            output_dir: self
                .get_path(keys::GIF_OUTPUT_DIR)?
                .or_else(|| defaults.output_dir.clone()),
        })
    }

    pub fn save_gif_settings(&self, gif: &GifSettings) -> Result<()> {
        self.set_bool(keys::GIF_FRAME_CONTROL, gif.options.frame_control)?;
        self.set(keys::GIF_FRAMES, &gif.options.frames.to_string())?;
        self.set_bool(keys::GIF_OPTIMIZE, gif.options.optimize)?;
        match &gif.output_dir {
            Some(dir) => self.set(keys::GIF_OUTPUT_DIR, &dir.to_string_lossy())?,
            None => {
                self.unset(keys::GIF_OUTPUT_DIR)?;
            }
        }
        Ok(())
    }

    pub fn rename_options(&self) -> Result<RenameOptions> {
        let defaults = RenameOptions::default();
        Ok(RenameOptions {
            replace: self.get(keys::RENAMER_REPLACE)?.unwrap_or(defaults.replace),
            with: self.get(keys::RENAMER_WITH)?.unwrap_or(defaults.with),
            remove_illegal: self.get_bool(keys::RENAMER_ILLEGAL, defaults.remove_illegal)?,
            case: self.get_parsed(keys::RENAMER_CASE, defaults.case)?,
            orientation: self.get_bool(keys::RENAMER_ORIENTATION, defaults.orientation)?,
            position: self.get_parsed(keys::RENAMER_POSITION, defaults.position)?,
        })
    }

    pub fn save_rename_options(&self, options: &RenameOptions) -> Result<()> {
        self.set(keys::RENAMER_REPLACE, &options.replace)?;
        self.set(keys::RENAMER_WITH, &options.with)?;
        self.set_bool(keys::RENAMER_ILLEGAL, options.remove_illegal)?;
        self.set(keys::RENAMER_CASE, options.case.as_str())?;
        self.set_bool(keys::RENAMER_ORIENTATION, options.orientation)?;
        self.set(keys::RENAMER_POSITION, options.position.as_str())?;
        Ok(())
    }

    pub fn qr_settings(&self) -> Result<QrSettings> {
        let defaults = QrStyle::default();
        Ok(QrSettings {
            style: QrStyle {
                format: self.get_parsed::<QrFormat>(keys::QR_FORMAT, defaults.format)?,
                box_size: self.get_parsed(keys::QR_SIZE, defaults.box_size)?,
                border: self.get_parsed(keys::QR_BORDER, defaults.border)?,
                error_correction: self
                    .get_parsed::<ErrorCorrection>(keys::QR_ERROR_CORRECTION, defaults.error_correction)?,
                fill: self.get_parsed::<HexColor>(keys::QR_FILL, defaults.fill)?,
                background: self.get_parsed::<HexColor>(keys::QR_BACKGROUND, defaults.background)?,
                transparent: self.get_bool(keys::QR_TRANSPARENT, defaults.transparent)?,
            },
            output_dir: self.get_path(keys::QR_OUTPUT_DIR)?,
        })
    }

    pub fn save_qr_settings(&self, qr: &QrSettings) -> Result<()> {
        let style = &qr.style;
        self.set(keys::QR_FORMAT, style.format.extension())?;
        self.set(keys::QR_SIZE, &style.box_size.to_string())?;
        self.set(keys::QR_BORDER, &style.border.to_string())?;
        self.set(keys::QR_ERROR_CORRECTION, style.error_correction.as_str())?;
        self.set(keys::QR_FILL, &style.fill.to_string())?;
        self.set(keys::QR_BACKGROUND, &style.background.to_string())?;
        self.set_bool(keys::QR_TRANSPARENT, style.transparent)?;
        if let Some(dir) = &qr.output_dir {
            self.set(keys::QR_OUTPUT_DIR, &dir.to_string_lossy())?;
        }
        Ok(())
    }

    /// Renamer patterns in application order.
    pub fn patterns(&self) -> Result<Vec<Pattern>> {
        let conn = get_conn(&self.pool)?;
        Ok(patterns::load_patterns(&conn)?)
    }

    pub fn add_pattern(&self, pattern: Pattern) -> Result<Vec<Pattern>> {
        regex::Regex::new(&pattern.pattern)
            .with_context(|| format!("Invalid rename pattern: {:?}", pattern.pattern))?;
        let conn = get_conn(&self.pool)?;
        Ok(patterns::add_pattern(&conn, pattern)?)
    }

    pub fn remove_pattern(&self, index: usize) -> Result<Pattern> {
        let conn = get_conn(&self.pool)?;
        Ok(patterns::remove_pattern(&conn, index)?)
    }

    pub fn reset_patterns(&self) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        patterns::reset_patterns(&conn)?;
        Ok(())
    }
}

/// GIF options plus where outputs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifSettings {
    pub options: GifOptions,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrSettings {
    pub style: QrStyle,
    pub output_dir: Option<PathBuf>,
}
