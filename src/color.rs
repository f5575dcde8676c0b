//! Deterministic color derivation.
//!
//! Maps arbitrary text to an HSL background color plus a contrasting logo
//! color. The mapping is a pure function of the input text and the selected
//! [`ColorOptions`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Hue range used for the modulo step.
const HUE_RANGE: i64 = 360;
/// Base saturation, in percent.
const SATURATION_BASE: i64 = 75;
/// Saturation spread added on top of the base.
const SATURATION_RANGE: i64 = 20;
/// Base lightness, in percent.
const LIGHTNESS_BASE: i64 = 50;
/// Lightness spread added on top of the base.
const LIGHTNESS_RANGE: i64 = 10;
/// Lightness above which the logo is drawn in black.
const DARK_LOGO_THRESHOLD: i64 = 55;

/// How the text hash is accumulated.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HashMode {
    /// `hash * 31 + unit` with 32-bit two's-complement wraparound.
    #[default]
    Wrapping,
    /// Reproduces the browser script bit for bit: the shift wraps to 32 bits
    /// but the subtraction and addition happen on unbounded integers, so the
    /// final value can leave the `i32` range.
    Browser,
}

/// How the signed hash is reduced into HSL components.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HslMode {
    /// Truncating modulo; negative hashes give negative components.
    #[default]
    Raw,
    /// Euclidean remainder; every component is non-negative.
    Normalized,
}

/// Options controlling [`derive_color_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOptions {
    #[serde(default)]
    pub hash: HashMode,
    #[serde(default)]
    pub hsl: HslMode,
}

/// Color of the logo paths drawn over the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SvgColor {
    Black,
    White,
}

impl SvgColor {
    pub fn as_str(self) -> &'static str {
        match self {
            SvgColor::Black => "black",
            SvgColor::White => "white",
        }
    }
}

impl fmt::Display for SvgColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of deriving a color from text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorResult {
    pub hue: i64,
    pub saturation: i64,
    pub lightness: i64,
    /// `hsl(hue, saturation%, lightness%)`
    pub background_color: String,
    pub svg_color: SvgColor,
}

/// Hash the UTF-16 code units of `input`.
///
/// In [`HashMode::Wrapping`] the result always fits in an `i32`.
pub fn text_hash(input: &str, mode: HashMode) -> i64 {
    match mode {
        HashMode::Wrapping => {
            let hash = input
                .encode_utf16()
                .fold(0i32, |hash, unit| {
                    hash.wrapping_mul(31).wrapping_add(i32::from(unit))
                });
            i64::from(hash)
        }
        HashMode::Browser => input.encode_utf16().fold(0i64, |hash, unit| {
            // `hash << 5` converts to int32 first and wraps
            let shifted = (hash as i32).wrapping_shl(5);
            i64::from(unit) + (i64::from(shifted) - hash)
        }),
    }
}

/// Derive the favicon colors for `input` with default options.
pub fn derive_color(input: &str) -> ColorResult {
    derive_color_with(input, ColorOptions::default())
}

/// Derive the favicon colors for `input`.
pub fn derive_color_with(input: &str, options: ColorOptions) -> ColorResult {
    let hash = text_hash(input, options.hash);
    let reduce = |range: i64| match options.hsl {
        HslMode::Raw => hash % range,
        HslMode::Normalized => hash.rem_euclid(range),
    };

    let hue = reduce(HUE_RANGE);
    let saturation = SATURATION_BASE + reduce(SATURATION_RANGE);
    let lightness = LIGHTNESS_BASE + reduce(LIGHTNESS_RANGE);

    let svg_color = if lightness > DARK_LOGO_THRESHOLD {
        SvgColor::Black
    } else {
        SvgColor::White
    };

    ColorResult {
        hue,
        saturation,
        lightness,
        background_color: format!("hsl({}, {}%, {}%)", hue, saturation, lightness),
        svg_color,
    }
}
