use crate::error::Result;
use crate::qrcode::{QrCode, QrOptions};
use crate::render::{self, raster, svg, text, RenderKind, RenderOptions};
use crate::version::EcLevel;

use image::RgbaImage;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/*---- Utilities ----*/

/// Prints the given QrCode object to the console, two module rows per line.
pub fn print_qr(qr: &QrCode) {
    print!("{}", text::to_utf8(qr, 4));
    println!();
}

/// Converts a QR Code object to a PNG image and saves it to a file.
///
/// # Arguments
///
/// * `qr` - The QR Code object to convert.
/// * `directory_path` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file, without extension. If not provided, a timestamp-based filename will be used.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the image cannot be written.
///
/// # Example
///
/// ```rust,no_run
/// use pairqr::helper::qr_to_image_and_save;
/// use pairqr::{QrCode, QrOptions};
///
/// let qr = QrCode::create("Hello, World!", &QrOptions::default()).unwrap();
/// let path = qr_to_image_and_save(&qr, Some("images"), Some("qr_code")).unwrap();
/// assert!(path.ends_with("qr_code.png"));
/// ```
pub fn qr_to_image_and_save(
    qr: &QrCode,
    directory_path: Option<&str>,
    filename: Option<&str>,
) -> Result<PathBuf> {
    let directory_path = directory_path.unwrap_or("generated");
    let filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            format!("qr-{}", since_the_epoch.as_millis())
        }
    };

    let file_path = PathBuf::from(directory_path).join(format!("{filename}.png"));
    raster::save(qr, &RenderOptions::default(), &file_path)?;
    Ok(file_path)
}

/// Generates a QR Code image from the provided content and saves it to a file.
///
/// # Arguments
///
/// * `content` - The content to encode into the QR Code.
/// * `directory` - Optional. The directory path where the image will be saved. If not provided, the default directory is "generated".
/// * `filename` - Optional. The name of the image file, without extension. If not provided, a timestamp-based filename will be used.
///
/// # Example
///
/// ```rust,no_run
/// use pairqr::helper::generate_image;
///
/// generate_image("Hello, World!", Some("images"), Some("qr_code")).unwrap();
/// ```
pub fn generate_image(
    content: &str,
    directory: Option<&str>,
    filename: Option<&str>,
) -> Result<PathBuf> {
    let qr = QrCode::create(content, &QrOptions::new().ec_level(EcLevel::Low))?;
    qr_to_image_and_save(&qr, directory, filename)
}

/// Generates a QR Code SVG from the provided content.
///
/// # Arguments
///
/// * `content` - The content to encode into the QR Code.
///
/// # Returns
///
/// A string of SVG code representing the QR Code image, with a 4-module margin.
///
/// # Example
///
/// ```
/// use pairqr::helper::generate_svg_string;
///
/// let svg_string = generate_svg_string("Hello, World!").unwrap();
/// assert!(svg_string.starts_with("<svg"));
/// ```
pub fn generate_svg_string(content: &str) -> Result<String> {
    let qr = QrCode::create(content, &QrOptions::new().ec_level(EcLevel::Low))?;
    Ok(svg::to_string(&qr, &RenderOptions::default()))
}

/// Generates a QR Code image buffer from the provided content.
///
/// # Arguments
///
/// * `content` - The content to encode into the QR Code.
/// * `ecl` - Optional. Error correction level, [`EcLevel::Low`] when omitted.
/// * `scale` - Optional. Pixels per module, 1 when omitted.
/// * `margin` - Optional. Quiet zone in modules, 4 when omitted.
///
/// # Returns
///
/// An `RgbaImage` representing the QR Code image.
///
/// # Example
///
/// ```
/// use pairqr::helper::generate_image_buffer;
///
/// let img_buffer = generate_image_buffer("Hello, World!", None, None, None).unwrap();
/// assert_eq!(img_buffer.dimensions(), (29, 29));
/// ```
pub fn generate_image_buffer(
    content: &str,
    ecl: Option<EcLevel>,
    scale: Option<f64>,
    margin: Option<u32>,
) -> Result<RgbaImage> {
    let qr = QrCode::create(content, &QrOptions::new().ec_level(ecl.unwrap_or(EcLevel::Low)))?;
    let defaults = RenderOptions::default();
    let opts = RenderOptions {
        scale: scale.unwrap_or(1.0),
        margin: margin.unwrap_or(defaults.margin),
        ..defaults
    };
    Ok(raster::to_image(&qr, &opts))
}

/// Encodes `content` and renders it as a PNG data URL.
pub fn generate_data_url(content: &str, options: &QrOptions) -> Result<String> {
    let qr = QrCode::create(content, options)?;
    let opts = RenderOptions {
        kind: RenderKind::Png,
        ..RenderOptions::default()
    };
    raster::to_data_url(&qr, &opts)
}

/// Encodes and renders `content`, handing the outcome to `callback`.
///
/// Runs synchronously; the callback's return value is passed through.
///
/// # Example
///
/// ```
/// use pairqr::helper::to_string_with;
/// use pairqr::render::{RenderKind, RenderOptions};
/// use pairqr::QrOptions;
///
/// let opts = RenderOptions { kind: RenderKind::Svg, ..RenderOptions::default() };
/// let len = to_string_with("Hello", &QrOptions::default(), &opts, |res| res.map(|s| s.len()));
/// assert!(len.unwrap() > 0);
/// ```
pub fn to_string_with<F, R>(
    content: &str,
    options: &QrOptions,
    render_options: &RenderOptions,
    callback: F,
) -> R
where
    F: FnOnce(Result<String>) -> R,
{
    let outcome =
        QrCode::create(content, options).and_then(|qr| render::to_string(&qr, render_options));
    callback(outcome)
}
