//! Logo-clear vector output for branded pairing widgets.
//!
//! Instead of square modules, [`generate`] draws the three finder patterns
//! as rounded "eyes", isolated data modules as dots and vertical runs of
//! data modules as round-capped lines. A square in the centre can be left
//! empty for a logo; the symbol is encoded at level Q so it still scans.

use core::fmt::Write as _;
use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::qrcode::{QrCode, QrOptions};
use crate::render::svg::paint;
use crate::render::Color;
use crate::version::EcLevel;

/// Side of a finder pattern in modules.
const EYE: usize = 7;
const EYE_STROKE: f64 = 5.0;
const EYE_RADIUS: f64 = 0.45;
/// Dot radius is `cell / DOT_DIVISOR`; line width is twice that.
const DOT_DIVISOR: f64 = 2.5;
/// Padding added to the logo size before converting it to modules.
const CLEAR_PADDING: f64 = 25.0;
const DEFAULT_DOT_COLOR: Color = Color::rgba(0x14, 0x14, 0x14, 255);
const DEFAULT_ICON_COLOR: Color = Color::rgba(0x33, 0x96, 0xff, 255);
/// Widget padding on each side in the dark theme.
const DARK_PADDING: f64 = 16.0;

/// Input of [`generate`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoQrConfig {
    pub uri: String,
    /// Side of the drawing in user units.
    pub size: f64,
    /// Side of the centre logo; `0` keeps every module.
    #[serde(default)]
    pub logo_size: f64,
    #[serde(default = "default_dot_color")]
    pub dot_color: Color,
}

fn default_dot_color() -> Color {
    DEFAULT_DOT_COLOR
}

impl LogoQrConfig {
    pub fn new(uri: impl Into<String>, size: f64) -> Self {
        Self {
            uri: uri.into(),
            size,
            logo_size: 0.0,
            dot_color: DEFAULT_DOT_COLOR,
        }
    }

    pub fn logo_size(mut self, logo_size: f64) -> Self {
        self.logo_size = logo_size;
        self
    }

    pub fn dot_color(mut self, color: Color) -> Self {
        self.dot_color = color;
        self
    }
}

/// One SVG element of a logo-clear drawing.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// A rounded square; `fill: None` is transparent.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rx: f64,
        fill: Option<Color>,
        stroke: Color,
        stroke_width: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: Color,
    },
    /// A vertical, round-capped line.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Color,
        stroke_width: f64,
    },
}

impl Primitive {
    pub fn to_svg(&self) -> String {
        match self {
            Primitive::Rect {
                x,
                y,
                width,
                height,
                rx,
                fill,
                stroke,
                stroke_width,
            } => {
                let fill =
                    fill.map_or_else(|| "fill=\"transparent\"".to_owned(), |c| paint(&c, "fill"));
                format!(
                    "<rect {fill} width=\"{width}\" rx=\"{rx}\" ry=\"{rx}\" {} stroke-width=\"{stroke_width}\" height=\"{height}\" x=\"{x}\" y=\"{y}\"/>",
                    paint(stroke, "stroke")
                )
            }
            Primitive::Circle { cx, cy, r, fill } => {
                format!("<circle cx=\"{cx}\" cy=\"{cy}\" {} r=\"{r}\"/>", paint(fill, "fill"))
            }
            Primitive::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
                stroke_width,
            } => format!(
                "<line x1=\"{x1}\" x2=\"{x2}\" y1=\"{y1}\" y2=\"{y2}\" {} stroke-width=\"{stroke_width}\" stroke-linecap=\"round\"/>",
                paint(stroke, "stroke")
            ),
        }
    }
}

/// Wraps primitives into a square `<svg>` of the given side.
pub fn to_svg_document(primitives: &[Primitive], size: f64) -> String {
    let mut result =
        format!("<svg xmlns=\"http://www.w3.org/2000/svg\" height=\"{size}\" width=\"{size}\">");
    for p in primitives {
        result += &p.to_svg();
    }
    result += "</svg>\n";
    result
}

/// Encodes `config.uri` at level Q and lays it out as eyes, dots and lines.
///
/// # Errors
///
/// [`Error::InvalidInput`] for an empty uri or a non-positive size, plus
/// whatever [`QrCode::create`] reports.
pub fn generate(config: &LogoQrConfig) -> Result<Vec<Primitive>> {
    if !(config.size.is_finite() && config.size > 0.0) {
        return Err(Error::InvalidInput(format!("invalid size {}", config.size)));
    }
    if !(config.logo_size.is_finite() && config.logo_size >= 0.0) {
        return Err(Error::InvalidInput(format!("invalid logo size {}", config.logo_size)));
    }
    let qr = QrCode::create(&config.uri, &QrOptions::new().ec_level(EcLevel::Quartile))?;
    let n = qr.size();
    let cell = config.size / n as f64;
    let color = config.dot_color;

    let mut primitives: Vec<Primitive> = Vec::new();
    let far = (n - EYE) as f64 * cell;
    for (ex, ey) in [(0.0, 0.0), (far, 0.0), (0.0, far)] {
        for ring in 0..3 {
            let side = cell * (EYE - ring * 2) as f64;
            let inset = cell * ring as f64;
            primitives.push(match ring {
                0 => Primitive::Rect {
                    x: ex + EYE_STROKE / 2.0,
                    y: ey + EYE_STROKE / 2.0,
                    width: side - EYE_STROKE,
                    height: side - EYE_STROKE,
                    rx: (side - EYE_STROKE) * EYE_RADIUS,
                    fill: None,
                    stroke: color,
                    stroke_width: EYE_STROKE,
                },
                _ => Primitive::Rect {
                    x: ex + inset,
                    y: ey + inset,
                    width: side,
                    height: side,
                    rx: side * EYE_RADIUS,
                    fill: (ring == 2).then_some(color),
                    stroke: color,
                    stroke_width: 0.0,
                },
            });
        }
    }

    let clear = ClearZone::new(n, cell, config.logo_size);
    // Dark data modules by column, rows ascending.
    let mut columns: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for y in 0..n {
        for x in 0..n {
            if qr.modules().get(x, y) && !in_eye(n, x, y) && !clear.contains(x, y) {
                columns.entry(x).or_default().push(y);
            }
        }
    }

    let center = |i: usize| i as f64 * cell + cell / 2.0;
    let mut lines: Vec<Primitive> = Vec::new();
    let mut dots = 0;
    for (&x, rows) in &columns {
        for run in consecutive_runs(rows) {
            dots += run.len();
            match run {
                [y] => primitives.push(Primitive::Circle {
                    cx: center(x),
                    cy: center(*y),
                    r: cell / DOT_DIVISOR,
                    fill: color,
                }),
                [first, .., last] => lines.push(Primitive::Line {
                    x1: center(x),
                    y1: center(*first),
                    x2: center(x),
                    y2: center(*last),
                    stroke: color,
                    stroke_width: cell / (DOT_DIVISOR / 2.0),
                }),
                [] => {}
            }
        }
    }
    primitives.extend(lines);
    debug!(modules = n, cell, dots, primitives = primitives.len(), "generated logo-clear layout");
    Ok(primitives)
}

/// Whether a module lies in one of the three 7×7 finder corners.
fn in_eye(n: usize, x: usize, y: usize) -> bool {
    (y < EYE && x < EYE) || (y > n - (EYE + 1) && x < EYE) || (y < EYE && x > n - (EYE + 1))
}

/// Centre square left empty for the logo, in module coordinates.
struct ClearZone {
    bounds: Option<(f64, f64)>,
}

impl ClearZone {
    fn new(n: usize, cell: f64, logo_size: f64) -> Self {
        if logo_size <= 0.0 {
            return Self { bounds: None };
        }
        let modules = ((logo_size + CLEAR_PADDING) / cell).floor();
        let half = n as f64 / 2.0;
        Self {
            bounds: Some((half - modules / 2.0, half + modules / 2.0 - 1.0)),
        }
    }

    fn contains(&self, x: usize, y: usize) -> bool {
        self.bounds.is_some_and(|(lo, hi)| {
            let (x, y) = (x as f64, y as f64);
            x > lo && x < hi && y > lo && y < hi
        })
    }
}

/// Splits ascending rows into runs of adjacent rows.
fn consecutive_runs(rows: &[usize]) -> impl Iterator<Item = &[usize]> {
    rows.chunk_by(|a, b| b - a == 1)
}

/// Visual placed over the centre of the widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CenterVisual {
    Image { src: String, alt: String },
    Icon(&'static str),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Properties of a QR pairing widget, as a caller would configure it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QrWidgetProps {
    pub uri: String,
    pub size: f64,
    pub theme: Theme,
    pub image_src: Option<String>,
    pub alt: Option<String>,
    pub color: Option<String>,
    pub arena_clear: bool,
    pub farcaster: bool,
}

/// Validated widget state, ready to draw.
#[derive(Clone, Debug, PartialEq)]
pub struct QrWidget {
    props: QrWidgetProps,
    dot_color: Color,
    icon_color: Color,
}

impl QrWidget {
    /// Checks the props: a non-empty uri, room for the drawing after the
    /// dark theme's padding, and a parsable colour.
    pub fn new(props: QrWidgetProps) -> Result<Self> {
        if props.uri.is_empty() {
            return Err(Error::InvalidInput("widget uri is empty".into()));
        }
        let min = match props.theme {
            Theme::Dark => DARK_PADDING * 2.0,
            Theme::Light => 0.0,
        };
        if !(props.size.is_finite() && props.size > min) {
            return Err(Error::InvalidInput(format!(
                "widget size {} must exceed {min}",
                props.size
            )));
        }
        let parsed = props.color.as_deref().map(Color::parse).transpose()?;
        Ok(Self {
            dot_color: parsed.unwrap_or(DEFAULT_DOT_COLOR),
            icon_color: parsed.unwrap_or(DEFAULT_ICON_COLOR),
            props,
        })
    }

    pub fn props(&self) -> &QrWidgetProps {
        &self.props
    }

    /// Side of the drawing: the full size in the light theme, less the
    /// padding in the dark theme.
    pub fn svg_size(&self) -> f64 {
        match self.props.theme {
            Theme::Light => self.props.size,
            Theme::Dark => self.props.size - DARK_PADDING * 2.0,
        }
    }

    pub fn logo_size(&self) -> f64 {
        if self.props.arena_clear {
            0.0
        } else {
            self.svg_size() / 4.0
        }
    }

    pub fn icon_color(&self) -> Color {
        self.icon_color
    }

    pub fn center_visual(&self) -> CenterVisual {
        match (&self.props.image_src, self.props.farcaster) {
            (Some(src), _) => CenterVisual::Image {
                src: src.clone(),
                alt: self.props.alt.clone().unwrap_or_else(|| "logo".to_owned()),
            },
            (None, true) => CenterVisual::Icon("farcaster"),
            (None, false) => CenterVisual::Icon("walletConnect"),
        }
    }

    pub fn primitives(&self) -> Result<Vec<Primitive>> {
        let config = LogoQrConfig::new(self.props.uri.clone(), self.svg_size())
            .logo_size(self.logo_size())
            .dot_color(self.dot_color);
        generate(&config)
    }

    /// The QR drawing, with the centre image embedded when one is set.
    pub fn to_svg(&self) -> Result<String> {
        let size = self.svg_size();
        let mut doc = to_svg_document(&self.primitives()?, size);
        if let CenterVisual::Image { src, alt } = self.center_visual() {
            let side = size / 4.0;
            let offset = (size - side) / 2.0;
            let mut image = String::new();
            let _ = write!(
                image,
                "<image href=\"{}\" x=\"{offset}\" y=\"{offset}\" width=\"{side}\" height=\"{side}\"><title>{}</title></image>",
                escape(&src),
                escape(&alt)
            );
            let end = doc.len() - "</svg>\n".len();
            doc.insert_str(end, &image);
        }
        Ok(doc)
    }
}

fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result += "&amp;",
            '<' => result += "&lt;",
            '>' => result += "&gt;",
            '"' => result += "&quot;",
            '\'' => result += "&#39;",
            _ => result.push(c),
        }
    }
    result
}
