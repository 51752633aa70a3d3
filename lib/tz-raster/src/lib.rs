//! Timezone lookup against a color-coded world raster.
//!
//! A coordinate is projected onto an equirectangular map whose pixel colors
//! encode timezone regions, and the sampled color is mapped through a fixed
//! [`Codebook`]. Points that land in open ocean are probed for nearby land
//! with a WGS84 geodesic step before falling back to the nautical zone.

pub mod codebook;
pub mod geodesic;
pub mod projector;
pub mod raster;
pub mod resolver;
pub mod types;

pub use codebook::Codebook;
pub use geodesic::{Ellipsoid, GeodesicStepper};
pub use projector::Projector;
pub use raster::RasterMap;
pub use resolver::{DistanceUnit, LookupContext, Resolver, SearchRadius};
pub use types::{ColorKey, GeoPoint, Landfall, PixelCoord, ResolvedZone, TimezoneEntry, ZoneKind};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read asset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode raster: {0}")]
    Image(#[from] image::ImageError),

    #[error("Malformed codebook: {0}")]
    CodebookFormat(#[from] serde_json::Error),

    #[error("Codebook key {color} for {zone:?} is off the {spread}-step color grid")]
    OffGrid {
        color: ColorKey,
        zone: String,
        spread: u8,
    },

    #[error("Codebook key {color} appears twice in the {table} table")]
    DuplicateKey {
        color: ColorKey,
        table: &'static str,
    },

    #[error("Color spread must be greater than zero")]
    InvalidSpread,

    #[error("Invalid ellipsoid: {reason}")]
    InvalidEllipsoid {
        reason: String
    },

    #[error("Raster has no pixels ({width}x{height})")]
    EmptyRaster {
        width: u32,
        height: u32,
    },
}
