//! SVG favicon template.

use std::borrow::Cow;

use crate::color::ColorResult;

/// Path data of the three-part triangular mark.
const LOGO_PATHS: [&str; 3] = [
    "M244.658 0H121.707a55.502 55.502 0 0 0 55.502 55.502h22.649V77.37c.02 30.625 24.841 55.447 55.466 55.467V10.666C255.324 4.777 250.55 0 244.658 0z",
    "M183.822 61.262H60.872c.019 30.625 24.84 55.447 55.466 55.467h22.649v21.938c.039 30.625 24.877 55.43 55.502 55.43V71.93c0-5.891-4.776-10.667-10.667-10.667z",
    "M122.951 122.489H0c0 30.653 24.85 55.502 55.502 55.502h22.72v21.867c.02 30.597 24.798 55.408 55.396 55.466V133.156c0-5.891-4.776-10.667-10.667-10.667z",
];

/// Fixed geometry of the generated favicon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgTemplate {
    pub width: u32,
    pub height: u32,
    pub view_box_x: i32,
    pub view_box_y: i32,
    pub view_box_width: u32,
    pub view_box_height: u32,
    /// Corner radius of the background rectangle
    pub corner_radius: u32,
    pub paths: &'static [&'static str],
}

impl SvgTemplate {
    pub const DEFAULT: SvgTemplate = SvgTemplate {
        width: 256,
        height: 256,
        view_box_x: -60,
        view_box_y: -70,
        view_box_width: 376,
        view_box_height: 376,
        corner_radius: 50,
        paths: &LOGO_PATHS,
    };

    /// Render the template filled with the given colors.
    ///
    /// The rectangle covers the whole view box so the background has no
    /// transparent margin.
    pub fn render(&self, background_color: &str, svg_color: &str) -> String {
        let mut svg = format!(
            r#"<svg width="{w}" height="{h}" viewBox="{x} {y} {vw} {vh}" xmlns="http://www.w3.org/2000/svg" preserveAspectRatio="xMidYMid">"#,
            w = self.width,
            h = self.height,
            x = self.view_box_x,
            y = self.view_box_y,
            vw = self.view_box_width,
            vh = self.view_box_height,
        );
        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}"/>"#,
            self.view_box_x,
            self.view_box_y,
            self.view_box_width,
            self.view_box_height,
            self.corner_radius,
            escape_attr(background_color),
        ));
        svg.push_str(&format!(r#"<g fill="{}">"#, escape_attr(svg_color)));
        for path in self.paths {
            svg.push_str(&format!(r#"<path d="{}"/>"#, path));
        }
        svg.push_str("</g></svg>");
        svg
    }

    /// Render the template for a derived color.
    pub fn render_color(&self, color: &ColorResult) -> String {
        self.render(&color.background_color, color.svg_color.as_str())
    }
}

impl Default for SvgTemplate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Render the default favicon SVG.
pub fn render_favicon_svg(background_color: &str, svg_color: &str) -> String {
    SvgTemplate::DEFAULT.render(background_color, svg_color)
}

fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
