//! Color → timezone tables for land regions and ocean bands.
//!
//! The tables come from a versioned JSON asset rather than code. The default
//! asset ships inside the crate and is parsed once on first use.

use crate::types::{ColorKey, TimezoneEntry};
use crate::Error;
use log::{info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

const EMBEDDED_CODEBOOK: &str = include_str!("../data/timezone_codebook.json");

static DEFAULT_CODEBOOK: OnceLock<Codebook> = OnceLock::new();

#[derive(Deserialize, Debug)]
struct CodebookAsset {
    version: String,
    color_spread: u8,
    #[serde(default)]
    sea: Vec<AssetEntry>,
    #[serde(default)]
    land: Vec<AssetEntry>,
}

#[derive(Deserialize, Debug)]
struct AssetEntry {
    rgb: ColorKey,
    zone: String,
}

#[derive(Debug, Clone)]
pub struct Codebook {
    version: String,
    color_spread: u8,
    land: HashMap<u32, String>,
    sea: HashMap<u32, String>,
}
impl Codebook {
    /// Codebook bundled with the crate, parsed on first use.
    pub fn embedded() -> Result<&'static Codebook, Error> {
        if let Some(codebook) = DEFAULT_CODEBOOK.get() {
            return Ok(codebook);
        }

        let codebook = Codebook::from_json(EMBEDDED_CODEBOOK)?;
        Ok(DEFAULT_CODEBOOK.get_or_init(|| codebook))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Codebook, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let codebook = Codebook::from_json(&contents)?;

        info!("Loaded codebook {} from {}", codebook.version, path.display());
        Ok(codebook)
    }

    pub fn from_json(json: &str) -> Result<Codebook, Error> {
        let asset: CodebookAsset = serde_json::from_str(json)?;
        if asset.color_spread == 0 {
            return Err(Error::InvalidSpread);
        }

        let sea = build_table(&asset.sea, asset.color_spread, "sea")?;
        let land = build_table(&asset.land, asset.color_spread, "land")?;

        for (key, zone) in &land {
            if let Some(sea_zone) = sea.get(key) {
                warn!("Color {} maps to land zone {} and sea zone {}; land takes precedence",
                      unpack(*key), zone, sea_zone);
            }
        }

        info!("Codebook {}: {} land and {} sea entries (color spread {})",
              asset.version, land.len(), sea.len(), asset.color_spread);

        Ok(Codebook {
            version: asset.version,
            color_spread: asset.color_spread,
            land,
            sea,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn color_spread(&self) -> u8 {
        self.color_spread
    }

    pub fn land_len(&self) -> usize {
        self.land.len()
    }

    pub fn sea_len(&self) -> usize {
        self.sea.len()
    }

    #[inline]
    pub fn land(&self, color: ColorKey) -> Option<&str> {
        self.land.get(&color.packed()).map(String::as_str)
    }

    #[inline]
    pub fn sea(&self, color: ColorKey) -> Option<&str> {
        self.sea.get(&color.packed()).map(String::as_str)
    }

    /// Exact lookup, land table first.
    pub fn lookup(&self, color: ColorKey) -> Option<TimezoneEntry> {
        if let Some(zone) = self.land(color) {
            return Some(TimezoneEntry::Land(zone.to_string()));
        }
        self.sea(color).map(|zone| TimezoneEntry::Ocean(zone.to_string()))
    }

    /// Snaps every channel to the nearest multiple of the color spread.
    pub fn quantize(&self, color: ColorKey) -> ColorKey {
        let spread = self.color_spread as f64;
        let snap = |channel: u8| ((channel as f64 / spread).round() * spread).clamp(0.0, 255.0) as u8;

        ColorKey::new(snap(color.r), snap(color.g), snap(color.b))
    }

    /// Exact lookup, then a lookup of the quantized color. Returns the key that matched.
    pub fn classify(&self, color: ColorKey) -> Option<(ColorKey, TimezoneEntry)> {
        if let Some(entry) = self.lookup(color) {
            return Some((color, entry));
        }

        let quantized = self.quantize(color);
        self.lookup(quantized).map(|entry| (quantized, entry))
    }
}

fn build_table(entries: &[AssetEntry], spread: u8, table: &'static str) -> Result<HashMap<u32, String>, Error> {
    let mut map = HashMap::with_capacity(entries.len());

    for entry in entries {
        if entry.rgb.channels().iter().any(|channel| channel % spread != 0) {
            return Err(Error::OffGrid {
                color: entry.rgb,
                zone: entry.zone.clone(),
                spread,
            });
        }

        if entry.zone.parse::<chrono_tz::Tz>().is_err() {
            warn!("Codebook zone {:?} at {} is not a known IANA timezone", entry.zone, entry.rgb);
        }

        if map.insert(entry.rgb.packed(), entry.zone.clone()).is_some() {
            return Err(Error::DuplicateKey { color: entry.rgb, table });
        }
    }

    Ok(map)
}

fn unpack(key: u32) -> ColorKey {
    ColorKey::new((key >> 16) as u8, (key >> 8) as u8, key as u8)
}
