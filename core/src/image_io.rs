//! Image Output

use crate::math::*;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use exr::prelude::*;
use image::{ImageBuffer, ImageFormat, Rgb};
use regex::Regex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::result::Result;
use std::sync::OnceLock;

/// Write an RGB image. The format is chosen from the file extension:
/// `.exr`, `.pfm`, `.png` or `.tga`. 8-bit formats are gamma corrected.
///
/// * `path`   - Output file path.
/// * `rgb`    - Floating point RGB pixel data, rows ordered top to bottom.
/// * `width`  - Image width.
/// * `height` - Image height.
pub fn write_image(path: &str, rgb: &[Float], width: usize, height: usize) -> Result<(), String> {
    if rgb.len() != 3 * width * height {
        return Err(format!(
            "Image {path} has {} values, expected {} for {width}x{height}",
            rgb.len(),
            3 * width * height
        ));
    }

    match get_extension_from_filename(path).as_deref() {
        Some(".exr") => write_exr(path, rgb, width, height),
        Some(".tga") => write_8_bit(path, rgb, width as u32, height as u32, ImageFormat::Tga),
        Some(".png") => write_8_bit(path, rgb, width as u32, height as u32, ImageFormat::Png),
        Some(".pfm") => write_pfm(path, rgb, width, height),
        Some(extension) => Err(format!("Extension {extension} is not supported")),
        None => Err(format!("Can't determine file type from suffix of filename {path}")),
    }
}

/// Returns regular expression for extracting the file extension: the last
/// period followed by no periods or slashes.
fn regex_file_ext() -> &'static Regex {
    static DATA: OnceLock<Regex> = OnceLock::new();
    DATA.get_or_init(|| Regex::new(r"(\.[^./\\]+)$").unwrap())
}

/// Retrieve the lowercase extension, including the period, from a file path.
///
/// * `path` - The file path.
fn get_extension_from_filename(path: &str) -> Option<String> {
    regex_file_ext()
        .captures(path)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
}

/// Writes the image in OpenEXR format.
///
/// * `path`   - Output file path.
/// * `rgb`    - Floating point RGB pixel data.
/// * `width`  - Image width.
/// * `height` - Image height.
fn write_exr(path: &str, rgb: &[Float], width: usize, height: usize) -> Result<(), String> {
    info!("Writing image {} with resolution {}x{}", path, width, height);

    let size = Vec2(width, height);
    let layer = Layer::new(
        size,
        LayerAttributes::named("render"),
        Encoding::SMALL_LOSSLESS,
        SpecificChannels::rgb(|pos: Vec2<usize>| {
            let offset = 3 * (pos.1 * width + pos.0);
            (rgb[offset], rgb[offset + 1], rgb[offset + 2])
        }),
    );

    let attributes = ImageAttributes::new(IntegerBounds::from_dimensions(size));
    Image::empty(attributes)
        .with_layer(layer)
        .write()
        .to_file(path)
        .map_err(|err| format!("Error saving output image {path}: {err}"))
}

/// Writes the image in an 8-bit format.
///
/// * `path`         - Output file path.
/// * `rgb`          - Floating point RGB pixel data.
/// * `width`        - Image width.
/// * `height`       - Image height.
/// * `image_format` - Output format.
fn write_8_bit(
    path: &str,
    rgb: &[Float],
    width: u32,
    height: u32,
    image_format: ImageFormat,
) -> Result<(), String> {
    info!("Writing image {path} with resolution {width}x{height}");

    let mut imgbuf = ImageBuffer::new(width, height);
    for (offset, (_, _, pixel)) in imgbuf.enumerate_pixels_mut().enumerate() {
        let i = 3 * offset;
        *pixel = Rgb(apply_gamma(&[rgb[i], rgb[i + 1], rgb[i + 2]]));
    }

    imgbuf
        .save_with_format(path, image_format)
        .map_err(|err| format!("Error saving output image {path}: {err}."))
}

/// Writes the image in PFM format.
///
/// * `path`   - Output file path.
/// * `rgb`    - Floating point RGB pixel data.
/// * `width`  - Image width.
/// * `height` - Image height.
fn write_pfm(path: &str, rgb: &[Float], width: usize, height: usize) -> Result<(), String> {
    info!("Writing image {} with resolution {}x{}", path, width, height);

    let file = File::create(path).map_err(|e| format!("write_pfm(): Error writing PFM file '{path}': {e}"))?;
    let mut file = BufWriter::new(file);

    // The scale encodes endianness.
    let big_endian = cfg!(target_endian = "big");
    let scale = if big_endian { 1.0 } else { -1.0 };
    write!(file, "PF\n{width} {height}\n{scale}\n")
        .map_err(|e| format!("write_pfm(): Error writing PFM header '{path}': {e}"))?;

    // Rows are stored bottom to top.
    for y in (0..height).rev() {
        for &f in &rgb[3 * y * width..3 * (y + 1) * width] {
            let written = if big_endian {
                file.write_f32::<BigEndian>(f)
            } else {
                file.write_f32::<LittleEndian>(f)
            };
            written.map_err(|e| format!("write_pfm(): Error writing PFM pixels '{path}': {e}"))?;
        }
    }

    file.flush()
        .map_err(|e| format!("write_pfm(): Error writing PFM file '{path}': {e}"))
}

/// Apply gamma correction to RGB values and convert them to bytes.
///
/// * `rgb` - RGB floating point pixel value.
#[inline]
fn apply_gamma(rgb: &[Float; 3]) -> [u8; 3] {
    [clamp_byte(rgb[0]), clamp_byte(rgb[1]), clamp_byte(rgb[2])]
}

/// Clamp floating point value to 8-bit range [0, 255].
///
/// * `v` - Value to clamp.
#[inline]
fn clamp_byte(v: Float) -> u8 {
    clamp(255.0 * gamma_correct(v) + 0.5, 0.0, 255.0) as u8
}
