use crate::codebook::Codebook;
use crate::geodesic::GeodesicStepper;
use crate::projector::Projector;
use crate::raster::RasterMap;
use crate::Error;
use crate::types::{ColorKey, GeoPoint, Landfall, PixelCoord, ResolvedZone, TimezoneEntry};
use log::{debug, trace};
use std::fmt;

/// Bearings probed around a point at sea, in probe order.
pub const SEARCH_BEARINGS: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    /// Statute miles
    Imperial,
    /// Kilometers
    Metric,
    /// Nautical miles
    Nautical,
}
impl DistanceUnit {
    pub fn meters(&self) -> f64 {
        match self {
            DistanceUnit::Imperial => 1609.344,
            DistanceUnit::Metric => 1000.0,
            DistanceUnit::Nautical => 1852.0,
        }
    }
}

/// Distance from a point at sea at which the resolver looks for land.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRadius {
    meters: f64,
}
impl SearchRadius {
    /// 12 nautical miles
    pub const TERRITORIAL_WATERS: SearchRadius = SearchRadius { meters: 12.0 * 1852.0 };

    pub fn new(value: f64, unit: DistanceUnit) -> SearchRadius {
        SearchRadius { meters: value * unit.meters() }
    }

    pub fn meters(&self) -> f64 {
        self.meters
    }
}
impl Default for SearchRadius {
    fn default() -> Self {
        SearchRadius::TERRITORIAL_WATERS
    }
}
impl fmt::Display for SearchRadius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} m", self.meters)
    }
}

/// Everything a lookup reads: built once, then shared read-only.
#[derive(Debug)]
pub struct LookupContext {
    raster: RasterMap,
    codebook: Codebook,
    stepper: GeodesicStepper,
}
impl LookupContext {
    pub fn new(raster: RasterMap, codebook: Codebook, stepper: GeodesicStepper) -> LookupContext {
        LookupContext { raster, codebook, stepper }
    }

    /// WGS84 context over the codebook bundled with the crate.
    pub fn with_embedded_codebook(raster: RasterMap) -> Result<LookupContext, Error> {
        Ok(LookupContext::new(raster, Codebook::embedded()?.clone(), GeodesicStepper::wgs84()))
    }

    pub fn raster(&self) -> &RasterMap {
        &self.raster
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    pub fn stepper(&self) -> &GeodesicStepper {
        &self.stepper
    }

    pub fn projector(&self) -> Projector<'_> {
        Projector::new(&self.raster)
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    context: &'a LookupContext,
    radius: SearchRadius,
}
impl<'a> Resolver<'a> {
    pub fn new(context: &'a LookupContext) -> Resolver<'a> {
        Resolver { context, radius: SearchRadius::default() }
    }

    pub fn with_radius(self, radius: SearchRadius) -> Resolver<'a> {
        Resolver { radius, ..self }
    }

    pub fn radius(&self) -> SearchRadius {
        self.radius
    }

    /// Timezone of `point`.
    ///
    /// Land colors answer directly. Ocean colors trigger a search for land
    /// within the search radius. Colors in neither table are snapped to the
    /// codebook grid and tried again before giving up as unknown.
    pub fn resolve(&self, point: GeoPoint) -> ResolvedZone {
        let (pixel, color) = self.context.projector().sample_point(point);

        if let Some(resolved) = self.match_color(point, pixel, color) {
            return resolved;
        }

        let quantized = self.context.codebook.quantize(color);
        debug!("Color {} at {:?} not in codebook, retrying as {}", color, pixel, quantized);

        self.match_color(point, pixel, quantized).unwrap_or_else(|| {
            debug!("No timezone for color {} at {}", color, point);
            ResolvedZone::unknown(pixel, color)
        })
    }

    fn match_color(&self, point: GeoPoint, pixel: PixelCoord, color: ColorKey) -> Option<ResolvedZone> {
        let codebook = &self.context.codebook;

        if let Some(zone) = codebook.land(color) {
            debug!("{} is on land in {}", point, zone);
            return Some(ResolvedZone::matched(pixel, color, TimezoneEntry::Land(zone.to_string())));
        }

        let sea_zone = codebook.sea(color)?;
        Some(self.nearest_land_search(point, pixel, color, sea_zone))
    }

    /// Probes every bearing in [`SEARCH_BEARINGS`] at the search radius.
    ///
    /// The last probe to hit land decides the zone, so a later bearing
    /// overrides an earlier one.
    fn nearest_land_search(&self, point: GeoPoint, pixel: PixelCoord, color: ColorKey, sea_zone: &str) -> ResolvedZone {
        let projector = self.context.projector();
        let mut candidate: Option<(String, Landfall)> = None;

        for bearing in SEARCH_BEARINGS {
            let target = self.context.stepper.step(point, bearing, self.radius.meters());
            let (probe_pixel, probe_color) = projector.sample_point(target);

            match self.context.codebook.classify(probe_color) {
                Some((key, TimezoneEntry::Land(zone))) => {
                    trace!("Probe {}° from {} hit land {} at {:?}", bearing, point, zone, probe_pixel);
                    candidate = Some((zone, Landfall {
                        bearing,
                        point: target,
                        pixel: probe_pixel,
                        color: key,
                    }));
                },
                Some((_, TimezoneEntry::Ocean(zone))) => {
                    trace!("Probe {}° from {} still at sea in {}", bearing, point, zone);
                },
                None => {
                    trace!("Probe {}° from {} sampled unknown color {}", bearing, point, probe_color);
                },
            }
        }

        match candidate {
            Some((zone, landfall)) => {
                debug!("{} is in territorial waters of {} (bearing {}°)", point, zone, landfall.bearing);
                let mut resolved = ResolvedZone::matched(pixel, color, TimezoneEntry::Land(zone));
                resolved.landfall = Some(landfall);
                resolved
            },
            None => {
                debug!("{} is in open ocean {}", point, sea_zone);
                ResolvedZone::matched(pixel, color, TimezoneEntry::Ocean(sea_zone.to_string()))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZoneKind;

    const SEA: ColorKey = ColorKey::new(0, 0, 35);

    fn context_with(color: ColorKey) -> LookupContext {
        let raster = RasterMap::from_fn(360, 180, |_| color).unwrap();
        LookupContext::with_embedded_codebook(raster).unwrap()
    }

    #[test]
    fn distance_units_convert_to_meters() {
        assert_eq!(SearchRadius::new(12.0, DistanceUnit::Nautical), SearchRadius::TERRITORIAL_WATERS);
        assert_eq!(SearchRadius::TERRITORIAL_WATERS.meters(), 22_224.0);
        assert_eq!(SearchRadius::new(2.0, DistanceUnit::Metric).meters(), 2000.0);
        assert_eq!(SearchRadius::new(1.0, DistanceUnit::Imperial).meters(), 1609.344);
    }

    #[test]
    fn bearings_cover_the_compass_in_order() {
        assert_eq!(SEARCH_BEARINGS.len(), 8);
        assert!(SEARCH_BEARINGS.windows(2).all(|pair| pair[1] - pair[0] == 45.0));
    }

    #[test]
    fn land_color_resolves_directly() {
        let context = context_with(ColorKey::new(175, 0, 105));
        let resolved = context.resolver().resolve(GeoPoint::new(5.3, -4.0));

        assert_eq!(resolved.kind, ZoneKind::Land);
        assert_eq!(resolved.timezone, Some(TimezoneEntry::Land("Africa/Abidjan".into())));
        assert_eq!(resolved.landfall, None);
    }

    #[test]
    fn quantized_sea_color_still_searches_for_land() {
        let context = context_with(ColorKey::new(2, 1, 33));
        let resolved = context.resolver().resolve(GeoPoint::new(0.0, 170.0));

        assert_eq!(resolved.kind, ZoneKind::Sea);
        assert_eq!(resolved.color, SEA);
        assert_eq!(resolved.timezone_name(), "Etc/GMT-12");
    }

    #[test]
    fn unknown_color_keeps_sampled_value() {
        let context = context_with(ColorKey::new(250, 251, 252));
        let resolved = context.resolver().resolve(GeoPoint::new(10.0, 10.0));

        assert_eq!(resolved.kind, ZoneKind::Unknown);
        assert_eq!(resolved.color, ColorKey::new(250, 251, 252));
        assert_eq!(resolved.timezone, None);
    }

    #[test]
    fn custom_radius_is_used_for_probes() {
        // land from lon 5° eastward
        let raster = RasterMap::from_fn(360, 180, |p| if p.x >= 185 {
            ColorKey::new(0, 140, 35)
        } else {
            SEA
        }).unwrap();
        let context = LookupContext::with_embedded_codebook(raster).unwrap();
        let point = GeoPoint::new(0.0, 3.0);

        let near = context.resolver().resolve(point);
        assert_eq!(near.kind, ZoneKind::Sea);

        let far = context.resolver()
            .with_radius(SearchRadius::new(300.0, DistanceUnit::Metric))
            .resolve(point);
        assert_eq!(far.timezone_name(), "Europe/Berlin");
        assert_eq!(far.color, SEA);
        assert!(far.landfall.is_some());
    }
}
