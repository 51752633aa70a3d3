use crate::raster::RasterMap;
use crate::types::{ColorKey, GeoPoint, PixelCoord};
use std::f64::consts::{FRAC_PI_2, PI};

/// Equirectangular mapping between geographic points and raster pixels.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    raster: &'a RasterMap,
}
impl<'a> Projector<'a> {
    pub fn new(raster: &'a RasterMap) -> Projector<'a> {
        Projector { raster }
    }

    pub fn raster(&self) -> &'a RasterMap {
        self.raster
    }

    /// Pixel under `point`, clamped into the raster even for points on or
    /// past the antimeridian and the poles.
    pub fn project(&self, point: GeoPoint) -> PixelCoord {
        let width = self.raster.width() as f64;
        let height = self.raster.height() as f64;
        let lon = point.longitude.to_radians();
        let lat = point.latitude.to_radians();

        let px = ((lon + PI) * (width / 2.0) / PI).round();
        let py = (height - (lat + FRAC_PI_2) * height / PI).round();

        PixelCoord::new(clamp_axis(px, self.raster.width()), clamp_axis(py, self.raster.height()))
    }

    /// Nominal point of `pixel`, the inverse of [`Projector::project`].
    pub fn unproject(&self, pixel: PixelCoord) -> GeoPoint {
        let width = self.raster.width() as f64;
        let height = self.raster.height() as f64;

        GeoPoint::new(
            90.0 - pixel.y as f64 * 180.0 / height,
            pixel.x as f64 * 360.0 / width - 180.0,
        )
    }

    #[inline]
    pub fn sample(&self, pixel: PixelCoord) -> ColorKey {
        self.raster.pixel(pixel)
    }

    pub fn sample_point(&self, point: GeoPoint) -> (PixelCoord, ColorKey) {
        let pixel = self.project(point);
        (pixel, self.sample(pixel))
    }
}

// NaN saturates to 0 in the cast
#[inline]
fn clamp_axis(value: f64, size: u32) -> u32 {
    let max = size.saturating_sub(1) as f64;
    value.clamp(0.0, max) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(width: u32, height: u32) -> RasterMap {
        RasterMap::from_fn(width, height, |_| ColorKey::new(0, 0, 0)).unwrap()
    }

    #[test]
    fn corners_clamp_into_bounds() {
        let raster = raster(5265, 2633);
        let projector = Projector::new(&raster);

        assert_eq!(projector.project(GeoPoint::new(90.0, -180.0)), PixelCoord::new(0, 0));
        assert_eq!(projector.project(GeoPoint::new(-90.0, 180.0)), PixelCoord::new(5264, 2632));
        assert_eq!(projector.project(GeoPoint::new(90.0, 180.0)), PixelCoord::new(5264, 0));
        assert_eq!(projector.project(GeoPoint::new(-90.0, -180.0)), PixelCoord::new(0, 2632));
    }

    #[test]
    fn out_of_range_input_is_clamped_not_rejected() {
        let raster = raster(360, 180);
        let projector = Projector::new(&raster);

        assert_eq!(projector.project(GeoPoint::new(120.0, 400.0)), PixelCoord::new(359, 0));
        assert_eq!(projector.project(GeoPoint::new(-95.0, -190.0)), PixelCoord::new(0, 179));
        assert_eq!(projector.project(GeoPoint::new(f64::NAN, f64::NAN)), PixelCoord::new(0, 0));
    }

    #[test]
    fn whole_domain_stays_in_bounds() {
        let raster = raster(5265, 2633);
        let projector = Projector::new(&raster);

        for lat in (-180..=180).map(|v| v as f64 * 0.5) {
            for lon in (-360..=360).map(|v| v as f64 * 0.5) {
                let pixel = projector.project(GeoPoint::new(lat, lon));
                assert!(raster.contains(pixel), "({lat}, {lon}) -> {pixel:?}");
            }
        }
    }

    #[test]
    fn origin_maps_to_raster_center() {
        let raster = raster(360, 180);
        let projector = Projector::new(&raster);
        assert_eq!(projector.project(GeoPoint::new(0.0, 0.0)), PixelCoord::new(180, 90));
    }

    #[test]
    fn interior_pixels_round_trip() {
        let raster = raster(5265, 2633);
        let projector = Projector::new(&raster);

        for y in (1..2632).step_by(97) {
            for x in (1..5264).step_by(131) {
                let pixel = PixelCoord::new(x, y);
                let back = projector.project(projector.unproject(pixel));
                assert!(back.x.abs_diff(x) <= 1 && back.y.abs_diff(y) <= 1, "{pixel:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn sample_point_reads_projected_pixel() {
        let raster = RasterMap::from_fn(4, 2, |p| if p.x == 2 && p.y == 1 {
            ColorKey::new(175, 0, 105)
        } else {
            ColorKey::new(0, 0, 35)
        }).unwrap();
        let projector = Projector::new(&raster);

        // pixel (2, 1) covers lon 0, lat 0
        let (pixel, color) = projector.sample_point(GeoPoint::new(0.0, 0.0));
        assert_eq!(pixel, PixelCoord::new(2, 1));
        assert_eq!(color, ColorKey::new(175, 0, 105));
    }
}
