use crate::types::{ColorKey, PixelCoord};
use crate::Error;
use image::RgbImage;
use log::info;
use std::fmt;
use std::path::Path;

/// Decoded timezone map, immutable once built.
///
/// Pixel (0, 0) is the top-left corner at longitude -180° and latitude +90°.
#[derive(Clone)]
pub struct RasterMap {
    width: u32,
    height: u32,
    pixels: Vec<ColorKey>,
}
impl RasterMap {
    /// Decodes the image at `path` into an RGB raster.
    pub fn load(path: impl AsRef<Path>) -> Result<RasterMap, Error> {
        let path = path.as_ref();
        let image = image::open(path)?.into_rgb8();
        let raster = RasterMap::from_rgb_image(&image)?;

        info!("Loaded timezone raster {} ({}x{})", path.display(), raster.width, raster.height);
        Ok(raster)
    }

    pub fn from_rgb_image(image: &RgbImage) -> Result<RasterMap, Error> {
        let (width, height) = image.dimensions();
        let pixels = image.pixels()
            .map(|pixel| ColorKey::from(pixel.0))
            .collect();

        RasterMap::from_pixels(width, height, pixels)
    }

    /// Builds a raster by evaluating `color_at` for every pixel in row-major order.
    pub fn from_fn<F>(width: u32, height: u32, mut color_at: F) -> Result<RasterMap, Error>
    where
        F: FnMut(PixelCoord) -> ColorKey,
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(color_at(PixelCoord::new(x, y)));
            }
        }

        RasterMap::from_pixels(width, height, pixels)
    }

    fn from_pixels(width: u32, height: u32, pixels: Vec<ColorKey>) -> Result<RasterMap, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyRaster { width, height });
        }

        Ok(RasterMap { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, pixel: PixelCoord) -> bool {
        pixel.x < self.width && pixel.y < self.height
    }

    /// Color at `pixel`.
    ///
    /// # Panics
    /// If `pixel` lies outside the raster. Callers obtain pixels from the
    /// projector, which clamps, so this only fires on a projection bug.
    #[inline]
    pub fn pixel(&self, pixel: PixelCoord) -> ColorKey {
        assert!(
            self.contains(pixel),
            "pixel ({}, {}) outside {}x{} raster",
            pixel.x, pixel.y, self.width, self.height
        );
        self.pixels[pixel.y as usize * self.width as usize + pixel.x as usize]
    }
}
impl fmt::Debug for RasterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterMap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn from_rgb_image_keeps_row_major_layout() {
        let mut image = RgbImage::new(3, 2);
        image.put_pixel(2, 1, Rgb([175, 0, 105]));

        let raster = RasterMap::from_rgb_image(&image).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.pixel(PixelCoord::new(2, 1)), ColorKey::new(175, 0, 105));
        assert_eq!(raster.pixel(PixelCoord::new(1, 1)), ColorKey::new(0, 0, 0));
    }

    #[test]
    fn from_fn_visits_every_pixel() {
        let raster = RasterMap::from_fn(4, 3, |p| ColorKey::new(p.x as u8, p.y as u8, 0)).unwrap();
        assert_eq!(raster.pixel(PixelCoord::new(3, 2)), ColorKey::new(3, 2, 0));
        assert_eq!(raster.pixel(PixelCoord::new(0, 1)), ColorKey::new(0, 1, 0));
    }

    #[test]
    fn debug_output_omits_pixels() {
        let raster = RasterMap::from_fn(4, 3, |_| ColorKey::new(175, 0, 105)).unwrap();
        assert_eq!(format!("{raster:?}"), "RasterMap { width: 4, height: 3, .. }");
    }

    #[test]
    fn rejects_empty_raster() {
        let result = RasterMap::from_fn(0, 10, |_| ColorKey::new(0, 0, 0));
        assert!(matches!(result, Err(Error::EmptyRaster { width: 0, height: 10 })));
    }

    #[test]
    #[should_panic(expected = "outside 2x2 raster")]
    fn sampling_out_of_bounds_panics() {
        let raster = RasterMap::from_fn(2, 2, |_| ColorKey::new(0, 0, 0)).unwrap();
        raster.pixel(PixelCoord::new(2, 0));
    }

    #[test]
    fn load_decodes_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tz.png");
        let image = RgbImage::from_pixel(8, 4, Rgb([0, 0, 35]));
        image.save(&path).unwrap();

        let raster = RasterMap::load(&path).unwrap();
        assert_eq!((raster.width(), raster.height()), (8, 4));
        assert_eq!(raster.pixel(PixelCoord::new(7, 3)), ColorKey::new(0, 0, 35));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RasterMap::load(dir.path().join("missing.png")).is_err());
    }
}
