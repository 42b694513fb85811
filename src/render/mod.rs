//! Rendering a [`QrCode`] as pixels, SVG or terminal text.
//!
//! All renderers share [`RenderOptions`]: a quiet-zone `margin` in modules, a
//! `scale` in pixels per module (or a target `width` that the scale is derived
//! from) and the dark and light colours.

pub mod raster;
pub mod svg;
pub mod text;

use core::fmt;
use core::str::FromStr;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::qrcode::QrCode;

const DEFAULT_SCALE: f64 = 4.0;
const DEFAULT_MARGIN: u32 = 4;
/// Requested widths below one version-1 symbol are ignored.
const MIN_WIDTH: u32 = 21;

/// An RGBA colour parsed from a hex string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`; the `#` is optional.
    ///
    /// Short forms double every digit. Six digits are fully opaque.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pairqr::render::Color;
    ///
    /// assert_eq!(Color::parse("#3396ff").unwrap(), Color::rgba(0x33, 0x96, 0xff, 0xff));
    /// assert_eq!(Color::parse("f008").unwrap(), Color::rgba(0xff, 0, 0, 0x88));
    /// assert!(Color::parse("#12345").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let invalid = || Error::InvalidColor(s.to_owned());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match digits.len() {
            3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => format!("{digits}ff"),
            8 => digits.to_owned(),
            _ => return Err(invalid()),
        };
        let value = u32::from_str_radix(&expanded, 16).map_err(|_| invalid())?;
        let [r, g, b, a] = value.to_be_bytes();
        Ok(Self { r, g, b, a })
    }

    /// `#rrggbb`, without alpha.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub(crate) fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, self.a])
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

/// Dark and light module colours.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Colors {
    pub dark: Color,
    pub light: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            dark: Color::BLACK,
            light: Color::WHITE,
        }
    }
}

/// Output produced by [`to_string`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum RenderKind {
    /// `data:image/png;base64,...`
    #[default]
    #[serde(rename = "image/png", alias = "png")]
    Png,
    /// `data:image/jpeg;base64,...`
    #[serde(rename = "image/jpeg", alias = "jpeg", alias = "jpg")]
    Jpeg,
    #[serde(rename = "svg")]
    Svg,
    /// Half-block characters, two module rows per line.
    #[serde(rename = "utf8")]
    Utf8,
    /// ANSI background colours, two columns per module.
    #[serde(rename = "terminal")]
    Terminal,
}

/// Options shared by every renderer.
///
/// Deserializes from JSON such as
/// `{"width": 256, "margin": 2, "color": {"dark": "#3396ff"}, "type": "svg"}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawRenderOptions")]
pub struct RenderOptions {
    /// Target image width in pixels; ignored below 21.
    pub width: Option<u32>,
    /// Pixels per module when no usable width is given.
    pub scale: f64,
    /// Quiet zone around the symbol, in modules.
    pub margin: u32,
    pub color: Colors,
    /// Output format; `type` in JSON.
    pub kind: RenderKind,
    /// JPEG quality between 0 and 1.
    pub quality: Option<f32>,
}

/// [`RenderOptions`] as it appears in JSON, colours still unparsed.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawRenderOptions {
    width: Option<u32>,
    scale: Option<f64>,
    margin: Option<u32>,
    color: RawColors,
    #[serde(rename = "type")]
    kind: RenderKind,
    quality: Option<f32>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawColors {
    dark: Option<String>,
    light: Option<String>,
}

impl TryFrom<RawRenderOptions> for RenderOptions {
    type Error = Error;

    fn try_from(raw: RawRenderOptions) -> Result<Self> {
        let defaults = Self::default();
        let parse = |hex: Option<String>, fallback: Color| -> Result<Color> {
            hex.as_deref().map_or(Ok(fallback), Color::parse)
        };
        Ok(Self {
            width: raw.width,
            scale: raw.scale.unwrap_or(defaults.scale),
            margin: raw.margin.unwrap_or(defaults.margin),
            color: Colors {
                dark: parse(raw.color.dark, defaults.color.dark)?,
                light: parse(raw.color.light, defaults.color.light)?,
            },
            kind: raw.kind,
            quality: raw.quality,
        })
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: None,
            scale: DEFAULT_SCALE,
            margin: DEFAULT_MARGIN,
            color: Colors::default(),
            kind: RenderKind::default(),
            quality: None,
        }
    }
}

impl RenderOptions {
    /// Reads options from JSON.
    ///
    /// Malformed JSON is [`Error::Config`]; a colour that is not a hex
    /// string is [`Error::InvalidColor`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawRenderOptions = serde_json::from_str(json)?;
        raw.try_into()
    }

    /// The requested width, if it is large enough to be honoured.
    pub fn effective_width(&self) -> Option<u32> {
        self.width.filter(|&w| w >= MIN_WIDTH)
    }

    /// Pixels per module for a symbol of `size` modules.
    ///
    /// An honoured width that can hold the symbol and its margins wins;
    /// otherwise an honoured width falls back to the default scale, and
    /// without one the configured scale is used.
    pub fn scale_for(&self, size: usize) -> f64 {
        let total = self.total_modules(size) as f64;
        match self.effective_width() {
            Some(w) if f64::from(w) >= total => f64::from(w) / total,
            Some(_) => DEFAULT_SCALE,
            None if self.scale.is_finite() && self.scale > 0.0 => self.scale,
            None => DEFAULT_SCALE,
        }
    }

    /// Side of the rendered image in pixels.
    pub fn image_width(&self, size: usize) -> u32 {
        (self.total_modules(size) as f64 * self.scale_for(size)).floor() as u32
    }

    /// Side of the symbol plus both margins, in modules.
    pub fn total_modules(&self, size: usize) -> usize {
        size + 2 * self.margin as usize
    }
}

/// Renders `qr` to a string of the kind selected by `opts.kind`.
///
/// Raster kinds produce a base64 data URL.
pub fn to_string(qr: &QrCode, opts: &RenderOptions) -> Result<String> {
    match opts.kind {
        RenderKind::Png | RenderKind::Jpeg => raster::to_data_url(qr, opts),
        RenderKind::Svg => Ok(svg::to_string(qr, opts)),
        RenderKind::Utf8 | RenderKind::Terminal => Ok(text::to_string(qr, opts)),
    }
}
