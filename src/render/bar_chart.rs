//! Keyword frequency bar chart rendered as SVG.

use std::fmt::Write as _;

use tracing::instrument;

use super::{RenderConfig, xml_escape};
use crate::keywords::FrequencySeries;

const BAR_COLOR: &str = "#1f77b4";
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 20.0;
const LABEL_FONT_SIZE: f64 = 11.0;
/// Approximate glyph advance relative to font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;

/// Renders one bar per keyword in series order, with rotated keyword labels
/// on the x axis and count ticks on the y axis.
#[must_use]
#[instrument(skip_all, fields(keywords = series.len()))]
pub fn render_svg(series: &FrequencySeries, config: &RenderConfig) -> String {
    let (width_px, height_px) = config.canvas_size();
    let width = f64::from(width_px);
    let height = f64::from(height_px);

    let longest_label = series.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    #[allow(clippy::cast_precision_loss)]
    let label_space = (longest_label as f64 * LABEL_FONT_SIZE * CHAR_WIDTH_RATIO + 16.0)
        .min(height * 0.4);
    let plot_left = MARGIN_LEFT;
    let plot_right = (width - MARGIN_RIGHT).max(plot_left + 1.0);
    let plot_top = MARGIN_TOP;
    let plot_bottom = (height - label_space).max(plot_top + 1.0);
    let plot_width = plot_right - plot_left;
    let plot_height = plot_bottom - plot_top;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width_px}" height="{height_px}" viewBox="0 0 {width_px} {height_px}">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect width="100%" height="100%" fill="{}"/>"#,
        config.background.to_hex()
    );

    let max_count = series.max_count();
    let step = tick_step(max_count);
    #[allow(clippy::cast_precision_loss)]
    let y_max = (max_count.div_ceil(step) * step).max(1) as f64;

    let mut tick = 0usize;
    loop {
        #[allow(clippy::cast_precision_loss)]
        let value = tick as f64;
        if value > y_max {
            break;
        }
        let y = plot_bottom - value / y_max * plot_height;
        let _ = writeln!(
            svg,
            r##"<line x1="{:.1}" y1="{y:.1}" x2="{plot_left:.1}" y2="{y:.1}" stroke="#000"/><text x="{:.1}" y="{:.1}" font-size="{LABEL_FONT_SIZE}" font-family="sans-serif" text-anchor="end">{tick}</text>"##,
            plot_left - 4.0,
            plot_left - 6.0,
            y + LABEL_FONT_SIZE * 0.35,
        );
        tick += step;
    }

    #[allow(clippy::cast_precision_loss)]
    let slot = plot_width / series.len().max(1) as f64;
    let bar_width = slot * 0.8;
    for (i, (keyword, count)) in series.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let (slot_index, value) = (i as f64, count as f64);
        let x = plot_left + slot_index * slot + (slot - bar_width) / 2.0;
        let bar_height = value / y_max * plot_height;
        let y = plot_bottom - bar_height;
        let _ = writeln!(
            svg,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{bar_height:.1}" fill="{BAR_COLOR}"><title>{}: {count}</title></rect>"#,
            xml_escape(keyword)
        );

        let label_x = x + bar_width / 2.0 + LABEL_FONT_SIZE * 0.35;
        let label_y = plot_bottom + 6.0;
        let _ = writeln!(
            svg,
            r#"<text transform="translate({label_x:.1},{label_y:.1}) rotate(-90)" font-size="{LABEL_FONT_SIZE}" font-family="sans-serif" text-anchor="end">{}</text>"#,
            xml_escape(keyword)
        );
    }

    let _ = writeln!(
        svg,
        r##"<line x1="{plot_left:.1}" y1="{plot_top:.1}" x2="{plot_left:.1}" y2="{plot_bottom:.1}" stroke="#000"/><line x1="{plot_left:.1}" y1="{plot_bottom:.1}" x2="{plot_right:.1}" y2="{plot_bottom:.1}" stroke="#000"/>"##
    );
    if series.is_empty() {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-size="14" font-family="sans-serif" text-anchor="middle">no keywords</text>"#,
            width / 2.0,
            height / 2.0
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// Tick spacing giving at most ~10 ticks: 1, 2, 5, 10, 20, 50, ...
fn tick_step(max_count: usize) -> usize {
    let mut magnitude = 1usize;
    loop {
        for factor in [1, 2, 5] {
            let step = factor * magnitude;
            if max_count <= step * 10 {
                return step;
            }
        }
        magnitude *= 10;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn series(pairs: &[(&str, usize)]) -> FrequencySeries {
        FrequencySeries::from_counts(pairs.iter().map(|(k, c)| ((*k).to_string(), *c)))
    }

    #[test]
    fn test_render_svg_one_bar_per_keyword() {
        let svg = render_svg(
            &series(&[("LES", 4), ("wakes", 2), ("shear", 1)]),
            &RenderConfig::default(),
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches(&format!(r#"fill="{BAR_COLOR}""#)).count(), 3);
        assert_eq!(svg.matches("rotate(-90)").count(), 3);
    }

    #[test]
    fn test_render_svg_keeps_series_order() {
        let svg = render_svg(&series(&[("b", 1), ("a", 9)]), &RenderConfig::default());
        let a = svg.find("<title>a: 9</title>").unwrap_or(usize::MAX);
        let b = svg.find("<title>b: 1</title>").unwrap_or(0);
        assert!(a < b, "most frequent keyword must come first");
    }

    #[test]
    fn test_render_svg_escapes_labels() {
        let svg = render_svg(&series(&[("r&d", 1)]), &RenderConfig::default());
        assert!(svg.contains("r&amp;d"));
        assert!(!svg.contains(">r&d<"));
    }

    #[test]
    fn test_render_svg_empty_series() {
        let svg = render_svg(&FrequencySeries::default(), &RenderConfig::default());
        assert!(svg.contains("no keywords"));
    }

    #[test]
    fn test_render_svg_uses_background_and_canvas_size() {
        let config = RenderConfig {
            width_in: 4.0,
            height_in: 3.0,
            dpi: 50,
            background: "black".parse().unwrap(),
            ..RenderConfig::default()
        };
        let svg = render_svg(&series(&[("a", 1)]), &config);
        assert!(svg.contains(r#"width="200" height="150""#));
        assert!(svg.contains(r##"fill="#000000""##));
    }

    #[test]
    fn test_tick_step_progression() {
        assert_eq!(tick_step(0), 1);
        assert_eq!(tick_step(10), 1);
        assert_eq!(tick_step(11), 2);
        assert_eq!(tick_step(45), 5);
        assert_eq!(tick_step(120), 20);
    }
}
