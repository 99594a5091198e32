//! High Dynamic Range Film

use super::*;

/// Film storing floating point RGB pixels.
#[derive(Clone, Debug)]
pub struct HDRFilm {
    width: usize,
    height: usize,
    data: Vec<Spectrum>,
}

impl HDRFilm {
    /// Create a black film.
    ///
    /// * `width`  - Width in pixels.
    /// * `height` - Height in pixels.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![Spectrum::ZERO; width * height],
        }
    }
}

impl Film for HDRFilm {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn data(&self) -> &[Spectrum] {
        &self.data
    }

    fn set_pixel(&mut self, x: usize, y: usize, v: Spectrum) {
        debug_assert!(x < self.width && y < self.height);
        self.data[y * self.width + x] = v;
    }

    fn splat(&mut self, raster: &Point2f, v: Spectrum) {
        let i = self.pixel_index(raster);
        self.data[i] += v;
    }

    fn accumulate(&mut self, other: &dyn Film) -> Result<(), String> {
        if other.width() != self.width || other.height() != self.height {
            return Err(format!(
                "Cannot accumulate a {}x{} film into a {}x{} film",
                other.width(),
                other.height(),
                self.width,
                self.height
            ));
        }
        for (a, b) in self.data.iter_mut().zip(other.data().iter()) {
            *a += *b;
        }
        Ok(())
    }

    fn rescale(&mut self, w: Float) {
        for v in self.data.iter_mut() {
            *v *= w;
        }
    }

    fn clear(&mut self) {
        self.data.fill(Spectrum::ZERO);
    }

    fn clone_empty(&self) -> Box<dyn Film> {
        Box::new(HDRFilm::new(self.width, self.height))
    }

    fn save(&self, path: &str) -> Result<(), String> {
        save_film(self, path)
    }
}
