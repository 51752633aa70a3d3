use serde::{Deserialize, Serialize};
use std::fmt;

/// Name reported when a color matches neither table.
pub const UNKNOWN_TIMEZONE: &str = "Etc/Unknown";

/// WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}
impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint { latitude, longitude }
    }
}
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[lat: {}, lon: {}]", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelCoord {
    pub x: u32,
    pub y: u32,
}
impl PixelCoord {
    pub fn new(x: u32, y: u32) -> PixelCoord {
        PixelCoord { x, y }
    }
}

/// RGB color of a raster pixel, also the key into the codebook tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct ColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
impl ColorKey {
    pub const fn new(r: u8, g: u8, b: u8) -> ColorKey {
        ColorKey { r, g, b }
    }

    /// Packs the channels as `0x00RRGGBB` for hashing.
    #[inline]
    pub const fn packed(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}
impl From<[u8; 3]> for ColorKey {
    fn from([r, g, b]: [u8; 3]) -> Self {
        ColorKey { r, g, b }
    }
}
impl From<ColorKey> for [u8; 3] {
    fn from(color: ColorKey) -> Self {
        color.channels()
    }
}
impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "region", content = "id", rename_all = "lowercase")]
pub enum TimezoneEntry {
    /// IANA zone of a land region
    Land(String),
    /// `Etc/GMT±N` zone of an ocean band
    Ocean(String),
}
impl TimezoneEntry {
    pub fn name(&self) -> &str {
        match self {
            TimezoneEntry::Land(id) | TimezoneEntry::Ocean(id) => id,
        }
    }

    pub fn kind(&self) -> ZoneKind {
        match self {
            TimezoneEntry::Land(_) => ZoneKind::Land,
            TimezoneEntry::Ocean(_) => ZoneKind::Sea,
        }
    }
}
impl fmt::Display for TimezoneEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Land,
    Sea,
    Unknown,
}

/// The probe that decided a land result for a point sampled at sea.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Landfall {
    pub bearing: f64,
    pub point: GeoPoint,
    pub pixel: PixelCoord,
    pub color: ColorKey,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedZone {
    pub pixel: PixelCoord,
    /// Color that classified the point; the quantized key if quantization was needed.
    pub color: ColorKey,
    pub kind: ZoneKind,
    pub timezone: Option<TimezoneEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landfall: Option<Landfall>,
}
impl ResolvedZone {
    pub(crate) fn matched(pixel: PixelCoord, color: ColorKey, entry: TimezoneEntry) -> ResolvedZone {
        ResolvedZone {
            pixel,
            color,
            kind: entry.kind(),
            timezone: Some(entry),
            landfall: None,
        }
    }

    pub(crate) fn unknown(pixel: PixelCoord, color: ColorKey) -> ResolvedZone {
        ResolvedZone {
            pixel,
            color,
            kind: ZoneKind::Unknown,
            timezone: None,
            landfall: None,
        }
    }

    pub fn timezone_name(&self) -> &str {
        self.timezone.as_ref().map_or(UNKNOWN_TIMEZONE, TimezoneEntry::name)
    }

    /// Parsed zone, if the name is a zone chrono-tz knows about.
    pub fn tz(&self) -> Option<chrono_tz::Tz> {
        self.timezone.as_ref()?.name().parse().ok()
    }
}
impl fmt::Display for ResolvedZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} px: {} py: {}", self.timezone_name(), self.pixel.x, self.pixel.y)
    }
}
