//! SVG rendering of a finished layout.
//!
//! One `<rect>` per placement, white separators, and up to three lines of
//! text on tiles that pass the [`LabelPolicy`].
//!
//! ```
//! use tidemap_rs::layout::{layout_with_defaults, Item};
//! use tidemap_rs::render::colors::rank_color;
//! use tidemap_rs::render::svg::{render_svg, SvgStyle};
//!
//! let items = vec![Item::untagged("A", 60.0), Item::untagged("B", 40.0)];
//! let placed = layout_with_defaults(&items, 200.0, 100.0).unwrap();
//! let svg = render_svg(&placed, 200.0, 100.0, &SvgStyle::default(), |p| rank_color(p.rank));
//! assert!(svg.starts_with("<svg"));
//! ```

use super::colors::{Rgba, WHITE};
use super::labels::LabelPolicy;
use crate::layout::Placement;

/// Offsets of the three label lines from the tile's top-left corner.
const TEXT_INSET_X: f64 = 8.0;
const LINE_BASELINES: [f64; 3] = [20.0, 38.0, 54.0];

#[derive(Debug, Clone)]
pub struct SvgStyle {
    pub stroke: Rgba,
    pub stroke_width: f64,
    pub text: Rgba,
    pub labels: LabelPolicy,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            stroke: WHITE,
            stroke_width: 2.0,
            text: WHITE,
            labels: LabelPolicy::default(),
        }
    }
}

/// Render a complete SVG document for `placements` on a `width` x `height` canvas.
///
/// `fill` picks each tile's colour (e.g. by status tag or by rank).
pub fn render_svg<T, F>(
    placements: &[Placement<'_, T>],
    width: f64,
    height: f64,
    style: &SvgStyle,
    fill: F,
) -> String
where
    F: Fn(&Placement<'_, T>) -> Rgba,
{
    let mut svg = String::with_capacity(256 + placements.len() * 320);

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" overflow="hidden">"#,
        width, height, width, height
    ));
    svg.push('\n');
    svg.push_str(
        r#"<style>
  text { font-family: sans-serif; }
  .name { font-size: 12px; font-weight: 600; }
  .detail { font-size: 11px; font-weight: 500; }
</style>
"#,
    );

    let stroke = style.stroke.to_css();
    let text_fill = style.text.to_css();

    for placement in placements {
        svg.push_str("<g>\n");
        svg.push_str(&format!(
            r#"  <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
            fill(placement).to_css(),
            stroke,
            style.stroke_width
        ));
        svg.push('\n');

        if let Some(label) = style.labels.label(placement) {
            for (i, (line, baseline)) in label.lines().iter().zip(LINE_BASELINES).enumerate() {
                let class = if i == 0 { "name" } else { "detail" };
                svg.push_str(&format!(
                    r#"  <text class="{}" x="{:.2}" y="{:.2}" fill="{}">{}</text>"#,
                    class,
                    placement.x + TEXT_INSET_X,
                    placement.y + baseline,
                    text_fill,
                    escape_xml(line)
                ));
                svg.push('\n');
            }
        }
        svg.push_str("</g>\n");
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
