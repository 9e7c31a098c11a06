//! Weighted word layout with a colour-keyed hit-test raster.
//!
//! Every placed word owns a unique colour. The raster fills each word's
//! bounding box with that colour, so a pixel lookup identifies the word
//! under a pointer without any geometry on the caller's side.

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use std::fmt::Write as _;
use std::path::Path;

use image::{ImageFormat, RgbImage};
use rand::Rng;
use tracing::{debug, info, instrument};

use super::{Color, RenderConfig, RenderError, xml_escape};
use crate::keywords::FrequencySeries;
use crate::selector::ColorResolver;

/// 0 ranks words only by order, 1 scales font size linearly with frequency.
const RELATIVE_SCALING: f64 = 0.5;
const MIN_FONT_SIZE: f64 = 4.0;
/// Largest font as a fraction of canvas height.
const MAX_FONT_FRACTION: f64 = 0.2;
const SHRINK_FACTOR: f64 = 0.85;
const VERTICAL_PROBABILITY: f64 = 0.1;
const CHAR_WIDTH_RATIO: f64 = 0.6;
const LINE_HEIGHT_RATIO: f64 = 1.2;
/// Distance between successive spiral turns, in pixels.
const SPIRAL_SPACING: f64 = 6.0;
/// Arc length between tried spiral positions, in pixels.
const SPIRAL_STEP: f64 = 4.0;

/// A word positioned on the canvas. `(x, y)` is the top-left corner of its
/// bounding box; `width`/`height` are already swapped for vertical words.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub keyword: String,
    pub count: usize,
    pub font_size: f64,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub vertical: bool,
    pub color: Color,
}

impl PlacedWord {
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Laid-out words plus the raster and reverse colour map used for hit tests.
#[derive(Debug, Clone)]
pub struct WordCloud {
    background: Color,
    words: Vec<PlacedWord>,
    raster: RgbImage,
    color_index: HashMap<[u8; 3], usize>,
}

impl WordCloud {
    /// Lays out the `config.max_words` most frequent keywords of `series`.
    ///
    /// Font size grows with relative frequency. Words are placed in series
    /// order along an Archimedean spiral from the canvas centre; a word that
    /// does not fit is shrunk and retried, and dropped once it falls below
    /// the minimum font size.
    #[must_use]
    #[instrument(skip_all, fields(keywords = series.len(), max_words = config.max_words))]
    pub fn generate<R: Rng + ?Sized>(
        series: &FrequencySeries,
        config: &RenderConfig,
        rng: &mut R,
    ) -> Self {
        let (width, height) = config.canvas_size();
        let candidates = series.top(config.max_words);
        #[allow(clippy::cast_precision_loss)]
        let max_count = candidates.max_count().max(1) as f64;
        let max_font = (f64::from(height) * MAX_FONT_FRACTION).max(MIN_FONT_SIZE);

        let mut words: Vec<PlacedWord> = Vec::with_capacity(candidates.len());
        let mut occupancy = Occupancy::new(width, height);
        // Box sizes that found no spot. Occupancy only grows, so any box at
        // least as wide and as tall as one of these cannot fit either.
        let mut failed: Vec<(u32, u32)> = Vec::new();
        let mut dropped = 0usize;
        for (keyword, count) in candidates.iter() {
            #[allow(clippy::cast_precision_loss)]
            let weight = count as f64 / max_count;
            let mut font_size = (max_font
                * (RELATIVE_SCALING * weight + (1.0 - RELATIVE_SCALING) * weight.sqrt()))
            .max(MIN_FONT_SIZE);
            let vertical = rng.gen_bool(VERTICAL_PROBABILITY);
            let start_angle = rng.gen_range(0.0..TAU);

            let placed = loop {
                let (box_w, box_h) = word_box(keyword, font_size, vertical);
                let known_misfit = failed.iter().any(|&(w, h)| box_w >= w && box_h >= h);
                let spot = if known_misfit {
                    None
                } else {
                    spiral_search(&occupancy, (box_w, box_h), start_angle)
                };
                if let Some((x, y)) = spot {
                    occupancy.fill(x, y, box_w, box_h);
                    break Some(PlacedWord {
                        keyword: keyword.to_string(),
                        count,
                        font_size,
                        x,
                        y,
                        width: box_w,
                        height: box_h,
                        vertical,
                        color: Color::BLACK,
                    });
                }
                if !known_misfit {
                    failed.push((box_w, box_h));
                }
                font_size *= SHRINK_FACTOR;
                if font_size < MIN_FONT_SIZE {
                    break None;
                }
            };
            match placed {
                Some(word) => words.push(word),
                None => {
                    debug!(keyword, count, "No room left for keyword");
                    dropped += 1;
                }
            }
        }

        assign_colors(&mut words, config);

        let mut raster = RgbImage::from_pixel(width, height, config.background.rgb());
        let mut color_index = HashMap::with_capacity(words.len());
        for (i, word) in words.iter().enumerate() {
            for y in word.y..word.y + word.height {
                for x in word.x..word.x + word.width {
                    raster.put_pixel(x, y, word.color.rgb());
                }
            }
            color_index.insert(word.color.0, i);
        }

        debug!(placed = words.len(), dropped, "Word layout complete");
        Self {
            background: config.background,
            words,
            raster,
            color_index,
        }
    }

    /// Placed words in placement (frequency) order.
    #[must_use]
    pub fn words(&self) -> &[PlacedWord] {
        &self.words
    }

    /// Hit-test raster: background plus one solid box per word.
    #[must_use]
    pub fn raster(&self) -> &RgbImage {
        &self.raster
    }

    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    /// Reverse colour map lookup.
    #[must_use]
    pub fn word_for_color(&self, color: Color) -> Option<&PlacedWord> {
        self.color_index.get(&color.0).map(|&i| &self.words[i])
    }

    /// SVG rendering of the layout. Each word's text is stretched to its
    /// bounding box so it covers the same pixels as the raster.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let (width, height) = self.raster.dimensions();
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = writeln!(
            svg,
            r#"<rect width="100%" height="100%" fill="{}"/>"#,
            self.background.to_hex()
        );
        for word in &self.words {
            let (length, thickness) = if word.vertical {
                (word.height, word.width)
            } else {
                (word.width, word.height)
            };
            let baseline_offset = (f64::from(thickness) - word.font_size) / 2.0;
            let transform = if word.vertical {
                format!("translate({},{}) rotate(90)", word.x + word.width, word.y)
            } else {
                format!("translate({},{})", word.x, word.y)
            };
            let _ = writeln!(
                svg,
                r#"<text transform="{transform}" x="0" y="{baseline_offset:.1}" font-size="{:.1}" font-family="sans-serif" dominant-baseline="hanging" textLength="{length}" lengthAdjust="spacingAndGlyphs" fill="{}"><title>{}: {}</title>{}</text>"#,
                word.font_size,
                word.color.to_hex(),
                xml_escape(&word.keyword),
                word.count,
                xml_escape(&word.keyword),
            );
        }
        svg.push_str("</svg>\n");
        svg
    }

    /// Writes the hit-test raster as PNG.
    ///
    /// # Errors
    /// Returns [`RenderError::Image`] if encoding or writing fails.
    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        self.raster
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| RenderError::Image {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), words = self.words.len(), "Wrote word layout PNG");
        Ok(())
    }
}

impl ColorResolver for WordCloud {
    fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }

    fn resolve_color_at(&self, x: u32, y: u32) -> Option<&str> {
        let pixel = self.raster.get_pixel_checked(x, y)?;
        self.color_index
            .get(&pixel.0)
            .map(|&i| self.words[i].keyword.as_str())
    }
}

/// Bounding box of `keyword` at `font_size`, in pixels.
fn word_box(keyword: &str, font_size: f64, vertical: bool) -> (u32, u32) {
    #[allow(clippy::cast_precision_loss)]
    let chars = keyword.chars().count().max(1) as f64;
    let to_px = |value: f64| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let px = value.ceil().clamp(1.0, f64::from(u32::MAX)) as u32;
        px
    };
    let along = to_px(chars * font_size * CHAR_WIDTH_RATIO);
    let across = to_px(font_size * LINE_HEIGHT_RATIO);
    if vertical { (across, along) } else { (along, across) }
}

/// Pixel occupancy with a summed-area table, so a box test is four lookups.
struct Occupancy {
    width: u32,
    height: u32,
    cells: Vec<bool>,
    /// `(width + 1) x (height + 1)`; entry `(i, j)` counts occupied cells
    /// with `x < i` and `y < j`.
    sums: Vec<u32>,
}

impl Occupancy {
    fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self {
            width,
            height,
            cells: vec![false; w * h],
            sums: vec![0; (w + 1) * (h + 1)],
        }
    }

    fn sum_at(&self, i: u32, j: u32) -> u32 {
        self.sums[j as usize * (self.width as usize + 1) + i as usize]
    }

    /// Caller guarantees the box lies inside the canvas.
    fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        let (x1, y1) = (x + w, y + h);
        self.sum_at(x1, y1) + self.sum_at(x, y) == self.sum_at(x, y1) + self.sum_at(x1, y)
    }

    fn fill(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let stride = self.width as usize;
        for row in y..y + h {
            let start = row as usize * stride;
            self.cells[start + x as usize..start + (x + w) as usize].fill(true);
        }
        // Only entries right of and below the box change.
        let sum_stride = stride + 1;
        for j in (y + 1) as usize..=self.height as usize {
            for i in (x + 1) as usize..=stride {
                let cell = u32::from(self.cells[(j - 1) * stride + (i - 1)]);
                self.sums[j * sum_stride + i] = cell + self.sums[(j - 1) * sum_stride + i]
                    + self.sums[j * sum_stride + i - 1]
                    - self.sums[(j - 1) * sum_stride + i - 1];
            }
        }
    }
}

/// First free top-left corner on a spiral around the canvas centre.
fn spiral_search(
    occupancy: &Occupancy,
    (box_w, box_h): (u32, u32),
    start_angle: f64,
) -> Option<(u32, u32)> {
    let (width, height) = (occupancy.width, occupancy.height);
    if box_w > width || box_h > height {
        return None;
    }
    let centre_x = f64::from(width) / 2.0;
    let centre_y = f64::from(height) / 2.0;
    let max_radius = centre_x.hypot(centre_y);
    let growth = SPIRAL_SPACING / TAU;

    let mut theta = 0.0f64;
    loop {
        let radius = growth * theta;
        if radius > max_radius {
            return None;
        }
        let angle = start_angle + theta;
        let left = (centre_x + radius * angle.cos() - f64::from(box_w) / 2.0).round();
        let top = (centre_y + radius * angle.sin() - f64::from(box_h) / 2.0).round();
        if left >= 0.0
            && top >= 0.0
            && left + f64::from(box_w) <= f64::from(width)
            && top + f64::from(box_h) <= f64::from(height)
        {
            // Bounds checked above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (x, y) = (left as u32, top as u32);
            if occupancy.is_free(x, y, box_w, box_h) {
                return Some((x, y));
            }
        }
        theta += SPIRAL_STEP / radius.max(SPIRAL_STEP);
    }
}

/// Samples the palette across the placed words, nudging colours until every
/// word has its own and none matches the background.
fn assign_colors(words: &mut [PlacedWord], config: &RenderConfig) {
    let last = words.len().saturating_sub(1).max(1);
    let mut used: HashSet<[u8; 3]> = HashSet::with_capacity(words.len());
    for (i, word) in words.iter_mut().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let base = config.palette.sample(i as f64 / last as f64);
        let color = (0u32..)
            .map(|k| nudge(base, k))
            .find(|c| *c != config.background && !used.contains(&c.0))
            .unwrap_or(base);
        used.insert(color.0);
        word.color = color;
    }
}

/// XORs the low 24 bits of `k` into `color`; distinct `k` give distinct colours.
fn nudge(color: Color, k: u32) -> Color {
    let [_, r, g, b] = k.to_be_bytes();
    let [cr, cg, cb] = color.0;
    Color([cr ^ r, cg ^ g, cb ^ b])
}
