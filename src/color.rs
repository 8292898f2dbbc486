use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::data::schema::Series;

// ---------------------------------------------------------------------------
// Hex colour parsing
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` / `#rgb` into a `Color32`.
pub fn parse_hex(hex: &str) -> Option<Color32> {
    let rgb: Srgb<u8> = Srgb::from_str(hex.trim()).ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

// ---------------------------------------------------------------------------
// Series colours
// ---------------------------------------------------------------------------

/// Line colour per chart series, as hex strings so they can live in the
/// config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesColors {
    pub air_flow: String,
    pub scaling_delta: String,
    pub steam_pressure: String,
    pub stack_o2: String,
}

impl Default for SeriesColors {
    fn default() -> Self {
        SeriesColors {
            air_flow: "#2563eb".into(),
            scaling_delta: "#dc2626".into(),
            steam_pressure: "#059669".into(),
            stack_o2: "#7c3aed".into(),
        }
    }
}

impl SeriesColors {
    fn hex(&self, series: Series) -> &str {
        match series {
            Series::AirFlow => &self.air_flow,
            Series::ScalingDelta => &self.scaling_delta,
            Series::SteamPressure => &self.steam_pressure,
            Series::StackO2 => &self.stack_o2,
        }
    }

    /// Colour for `series`; falls back to the built-in colour when the
    /// configured one does not parse.
    pub fn color_for(&self, series: Series) -> Color32 {
        parse_hex(self.hex(series)).unwrap_or_else(|| {
            log::warn!("invalid colour {:?} for {series:?}", self.hex(series));
            parse_hex(SeriesColors::default().hex(series)).unwrap_or(Color32::GRAY)
        })
    }
}
