//! Keyword visualizations: a frequency bar chart and a weighted word layout.
//!
//! Both renderers are pure functions of a [`FrequencySeries`]; neither
//! touches the keyword map.
//!
//! [`FrequencySeries`]: crate::keywords::FrequencySeries

pub mod bar_chart;
mod palette;
pub mod word_layout;

pub use palette::{Color, ColorError, Palette};
pub use word_layout::{PlacedWord, WordCloud};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

/// Default figure width in inches.
pub const DEFAULT_WIDTH_IN: f64 = 11.0;
/// Default figure height in inches.
pub const DEFAULT_HEIGHT_IN: f64 = 8.5;
/// Default resolution in pixels per inch.
pub const DEFAULT_DPI: u32 = 100;
/// Default cap on the number of words laid out.
pub const DEFAULT_MAX_WORDS: usize = 200;

/// Errors writing rendered output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode image '{}': {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Cosmetic rendering options. None of these affect keyword data.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: u32,
    pub background: Color,
    pub palette: Palette,
    pub max_words: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width_in: DEFAULT_WIDTH_IN,
            height_in: DEFAULT_HEIGHT_IN,
            dpi: DEFAULT_DPI,
            background: Color::WHITE,
            palette: Palette::default(),
            max_words: DEFAULT_MAX_WORDS,
        }
    }
}

impl RenderConfig {
    /// Canvas size in pixels (inches x dpi, at least 1x1).
    #[must_use]
    pub fn canvas_size(&self) -> (u32, u32) {
        let to_px = |inches: f64| {
            let px = (inches * f64::from(self.dpi)).round().clamp(1.0, f64::from(u32::MAX));
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let px = px as u32;
            px
        };
        (to_px(self.width_in), to_px(self.height_in))
    }
}

/// Writes SVG markup to `path`.
///
/// # Errors
/// Returns [`RenderError::Io`] when the file cannot be written.
pub fn write_svg(path: &Path, svg: &str) -> Result<(), RenderError> {
    std::fs::write(path, svg).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Wrote SVG");
    Ok(())
}

/// Escapes text for use inside SVG elements and attributes.
pub(crate) fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
