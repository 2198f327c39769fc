//! Pure renderers: semantic parameters in, PNG bytes out.
//!
//! Nothing here touches the network or the filesystem after startup; fonts are
//! loaded once into [`Fonts`] and shared read-only.

pub mod color;
pub(crate) mod draw;
pub mod duck;
pub mod fonts;
pub mod meme;

use image::buffer::ConvertBuffer;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};

use crate::error::DuckgenError;

pub use duck::{DuckProfile, DuckTraits, EyeStyle, TokenId, render_duck};
pub use fonts::Fonts;
pub use meme::{MemeTemplate, TextArea, render_meme, resolve_template};

/// Encodes an RGBA canvas, keeping the alpha channel.
pub(crate) fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>, DuckgenError> {
    let (width, height) = canvas.dimensions();
    write_png(canvas.as_raw(), width, height, ExtendedColorType::Rgba8)
}

/// Encodes a canvas that is known to be fully opaque as RGB.
pub(crate) fn encode_opaque_png(canvas: &RgbaImage) -> Result<Vec<u8>, DuckgenError> {
    let rgb: RgbImage = canvas.convert();
    let (width, height) = rgb.dimensions();
    write_png(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
}

fn write_png(
    pixels: &[u8],
    width: u32,
    height: u32,
    color: ExtendedColorType,
) -> Result<Vec<u8>, DuckgenError> {
    let mut bytes = Vec::new();
    PngEncoder::new_with_quality(&mut bytes, CompressionType::Best, FilterType::Adaptive)
        .write_image(pixels, width, height, color)?;
    Ok(bytes)
}
