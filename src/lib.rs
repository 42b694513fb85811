//! # pairqr
//!
//! A Rust library for turning wallet pairing URIs, and any other text, into QR codes.
//!
//! `pairqr` encodes text into QR Code Model 2 symbols. It supports versions 1 to 40, four error
//! correction levels, and numeric, alphanumeric, byte and kanji segments mixed within one
//! symbol. Symbols can be rendered as images, data URLs, SVG, terminal text, or as the rounded
//! "logo-clear" vector layout used by pairing widgets.
//!
//! ## Features
//!
//! - Optimal segmentation: the text is split into the mix of modes with the fewest bits.
//! - Smallest-version selection, or a pinned version and mask.
//! - Kanji mode through a caller-supplied Shift-JIS mapping.
//! - Render as RGBA images, PNG/JPEG data URLs, SVG, UTF-8 half blocks or ANSI colours.
//! - Logo-clear output: rounded finder eyes, dots and lines, with an empty centre for a logo.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! pairqr = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Encode a pairing URI and render it as SVG:
//!
//! ```rust
//! use pairqr::render::{svg, RenderOptions};
//! use pairqr::{EcLevel, QrCode, QrOptions};
//!
//! let qr = QrCode::create(
//!     "wc:8a5e5bdc-a8a4-4f5a-b3d2-2f6bd63e9a7f@2?relay-protocol=irn",
//!     &QrOptions::new().ec_level(EcLevel::Quartile),
//! )
//! .unwrap();
//! let doc = svg::to_string(&qr, &RenderOptions::default());
//! assert!(doc.starts_with("<svg"));
//! ```
//!
//! Generate the logo-clear layout for a widget:
//!
//! ```rust
//! use pairqr::logo::{generate, to_svg_document, LogoQrConfig};
//!
//! let config = LogoQrConfig::new("wc:abc@2?relay-protocol=irn", 268.0).logo_size(67.0);
//! let primitives = generate(&config).unwrap();
//! // Three eyes of three rounded rects each, then the dots and lines.
//! assert!(primitives.len() > 9);
//! let doc = to_svg_document(&primitives, 268.0);
//! assert!(doc.ends_with("</svg>\n"));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Core QR code encoding functionality.
//! - [`segment`], [`version`], [`ecc`], [`mask`]: the stages of the encoder.
//! - [`render`]: Raster, SVG and text renderers.
//! - [`logo`]: Logo-clear vector layout and widget props.
//! - [`helper`]: One-call utilities for common outputs.

pub mod bits;
pub mod ecc;
pub mod error;
pub mod helper;
pub mod logo;
pub mod mask;
pub mod matrix;
pub mod qrcode;
pub mod render;
pub mod segment;
pub mod version;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
pub use mask::Mask;
pub use matrix::BitMatrix;
pub use qrcode::{QrCode, QrOptions};
pub use segment::{Mode, Segment};
pub use version::{EcLevel, Version};
