//! Pixel output through the `image` crate.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use super::{RenderKind, RenderOptions};
use crate::error::Result;
use crate::qrcode::QrCode;

const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Draws `qr` into an RGBA image of side [`RenderOptions::image_width`].
///
/// The margin is filled with the light colour. Each pixel takes the colour
/// of the module it falls into, so fractional scales are supported.
pub fn to_image(qr: &QrCode, opts: &RenderOptions) -> RgbaImage {
    let size = qr.size();
    let scale: f64 = opts.scale_for(size);
    let width: u32 = opts.image_width(size);
    let margin: f64 = f64::from(opts.margin) * scale;
    let far: f64 = f64::from(width) - margin;
    let light = opts.color.light.to_rgba();
    let dark = opts.color.dark.to_rgba();

    let mut img = RgbaImage::new(width, width);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let (px, py) = (f64::from(x), f64::from(y));
        let inside = px >= margin && py >= margin && px < far && py < far;
        let (mx, my) = (((px - margin) / scale) as i32, ((py - margin) / scale) as i32);
        *pixel = if inside && qr.get_module(mx, my) { dark } else { light };
    }
    img
}

/// Encodes the image as a `data:` URL: JPEG when `opts.kind` is
/// [`RenderKind::Jpeg`], PNG otherwise.
pub fn to_data_url(qr: &QrCode, opts: &RenderOptions) -> Result<String> {
    let img = to_image(qr, opts);
    let (mime, bytes) = match opts.kind {
        RenderKind::Jpeg => ("image/jpeg", encode_jpeg(&img, opts.quality)?),
        _ => ("image/png", encode_png(&img)?),
    };
    Ok(format!("data:{mime};base64,{}", BASE64.encode(bytes)))
}

/// Writes the image to `path`, creating missing parent directories.
///
/// The format follows the file extension.
pub fn save(qr: &QrCode, opts: &RenderOptions, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let img = to_image(qr, opts);
    match ImageFormat::from_path(path)? {
        // JPEG has no alpha channel.
        ImageFormat::Jpeg => fs::write(path, encode_jpeg(&img, opts.quality)?)?,
        format => img.save_with_format(path, format)?,
    }
    debug!(path = %path.display(), width = img.width(), "saved QR image");
    Ok(())
}

fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

fn encode_jpeg(img: &RgbaImage, quality: Option<f32>) -> Result<Vec<u8>> {
    let quality: u8 = quality
        .filter(|q| (0.0..=1.0).contains(q))
        .map_or(DEFAULT_JPEG_QUALITY, |q| (q * 100.0).round().max(1.0) as u8);
    let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let mut buf: Vec<u8> = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
    Ok(buf)
}
