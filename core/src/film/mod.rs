//! Film

use crate::geometry::*;
use crate::image_io::*;
use crate::math::*;
use crate::paramset::*;
use crate::spectrum::*;

mod hdr;

// Re-export
pub use hdr::*;

/// Receives the radiance estimates of a render. Raster positions are in
/// `[0, 1]²` with `(0, 0)` at the bottom left.
pub trait Film: Send + Sync {
    /// Returns the width in pixels.
    fn width(&self) -> usize;

    /// Returns the height in pixels.
    fn height(&self) -> usize;

    /// Returns the pixels, row 0 at the bottom.
    fn data(&self) -> &[Spectrum];

    /// Overwrite a pixel.
    ///
    /// * `x` - Column.
    /// * `y` - Row from the bottom.
    /// * `v` - Value.
    fn set_pixel(&mut self, x: usize, y: usize, v: Spectrum);

    /// Add a contribution to the pixel containing a raster position.
    ///
    /// * `raster` - Raster position in `[0, 1]²`.
    /// * `v`      - Contribution.
    fn splat(&mut self, raster: &Point2f, v: Spectrum);

    /// Add another film of the same size pixel by pixel.
    ///
    /// * `other` - The other film.
    fn accumulate(&mut self, other: &dyn Film) -> Result<(), String>;

    /// Multiply every pixel by a weight.
    ///
    /// * `w` - The weight.
    fn rescale(&mut self, w: Float);

    /// Set every pixel to black.
    fn clear(&mut self);

    /// Returns a black film of the same size.
    fn clone_empty(&self) -> Box<dyn Film>;

    /// Write the film to an image file; see `write_image()` for formats.
    ///
    /// * `path` - Output file path.
    fn save(&self, path: &str) -> Result<(), String>;

    /// Returns the pixel at a position.
    ///
    /// * `x` - Column.
    /// * `y` - Row from the bottom.
    fn pixel(&self, x: usize, y: usize) -> Spectrum {
        self.data()[y * self.width() + x]
    }

    /// Returns the pixel index for a raster position.
    ///
    /// * `raster` - Raster position in `[0, 1]²`.
    fn pixel_index(&self, raster: &Point2f) -> usize {
        let (w, h) = (self.width(), self.height());
        let x = clamp((raster.x * w as Float) as Int, 0, w as Int - 1) as usize;
        let y = clamp((raster.y * h as Float) as Int, 0, h as Int - 1) as usize;
        y * w + x
    }

    /// Returns the sum of all pixels.
    fn total(&self) -> Spectrum {
        self.data().iter().fold(Spectrum::ZERO, |a, b| a + *b)
    }
}

/// Create a film from parameters `width` and `height`.
///
/// * `params` - Parameter set.
pub fn create_hdr_film(params: &ParamSet) -> Result<Box<dyn Film>, String> {
    let width = params.find_one_int("width", 1280);
    let height = params.find_one_int("height", 720);
    if width <= 0 || height <= 0 {
        return Err(format!("Invalid film resolution {}x{}", width, height));
    }
    Ok(Box::new(HDRFilm::new(width as usize, height as usize)))
}

/// Flip rows so the image is ordered top to bottom and flatten to RGB.
///
/// * `data`   - Pixels with row 0 at the bottom.
/// * `width`  - Image width.
/// * `height` - Image height.
pub(crate) fn to_rgb_top_down(data: &[Spectrum], width: usize, height: usize) -> Vec<Float> {
    let mut rgb = Vec::with_capacity(3 * width * height);
    for y in (0..height).rev() {
        for s in &data[y * width..(y + 1) * width] {
            rgb.extend_from_slice(&s.to_rgb());
        }
    }
    rgb
}

/// Saves the film to a path, reporting the error with context.
///
/// * `film` - The film.
/// * `path` - Output file path.
pub(crate) fn save_film(film: &dyn Film, path: &str) -> Result<(), String> {
    let rgb = to_rgb_top_down(film.data(), film.width(), film.height());
    write_image(path, &rgb, film.width(), film.height())
}
