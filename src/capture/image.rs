//! Screenshot image I/O: decoding background sources, PNG encoding, data URLs
//! and conversion to and from tiny-skia pixmaps

use std::io::{self, Cursor};
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use image::imageops::FilterType;
use tiny_skia::{ColorU8, Pixmap};

const DATA_URL_PNG_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Not a base64 data URL")]
    InvalidDataUrl,

    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decoding failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),

    #[error("Image I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Image has zero width or height ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}

/// Where a background bitmap comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// `data:<mime>;base64,<payload>`
    DataUrl(String),
    /// Encoded image bytes (PNG, JPEG, ...)
    Encoded(Vec<u8>),
    /// Encoded image on disk
    Path(PathBuf),
    /// Already decoded pixels
    Rgba(RgbaImage),
}

impl ImageSource {
    /// Decode into RGBA pixels. Blocking; run off the UI context.
    pub fn decode(self) -> Result<RgbaImage, CaptureError> {
        let rgba = match self {
            ImageSource::DataUrl(url) => decode_bytes(&parse_data_url(&url)?)?,
            ImageSource::Encoded(bytes) => decode_bytes(&bytes)?,
            ImageSource::Path(path) => decode_bytes(&std::fs::read(path)?)?,
            ImageSource::Rgba(rgba) => rgba,
        };
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(CaptureError::EmptyImage {
                width: rgba.width(),
                height: rgba.height(),
            });
        }
        Ok(rgba)
    }
}

fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage, CaptureError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Extract the payload of a base64 data URL
pub fn parse_data_url(url: &str) -> Result<Vec<u8>, CaptureError> {
    let rest = url.strip_prefix("data:").ok_or(CaptureError::InvalidDataUrl)?;
    let (_, payload) = rest
        .split_once(";base64,")
        .ok_or(CaptureError::InvalidDataUrl)?;
    Ok(STANDARD.decode(payload.trim())?)
}

/// Wrap PNG bytes as a data URL
pub fn to_data_url(png: &[u8]) -> String {
    format!("{DATA_URL_PNG_PREFIX}{}", STANDARD.encode(png))
}

/// Write an RGBA image as an 8-bit PNG
pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

/// Encode an RGBA image to PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    write_png(Cursor::new(&mut buffer), image)?;
    Ok(buffer)
}

/// Scale an image to the given pixel size; returned as-is when it already fits
pub fn fit_to(image: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if image.width() == width && image.height() == height {
        return image;
    }
    log::debug!(
        "Resizing background {}x{} -> {}x{}",
        image.width(),
        image.height(),
        width,
        height
    );
    image::imageops::resize(&image, width, height, FilterType::Triangle)
}

/// Convert straight-alpha RGBA pixels to a premultiplied pixmap
pub fn rgba_to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Convert a premultiplied pixmap back to straight-alpha RGBA pixels
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    image
}
