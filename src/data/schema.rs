use serde::{Deserialize, Serialize};

use super::error::Diagnostic;
use super::model::Table;

// ---------------------------------------------------------------------------
// Column schema – which source columns mean what
// ---------------------------------------------------------------------------

/// Column names the loader and charts look for.
///
/// Chart series carry a list of aliases, tried in order, so a renamed
/// column (e.g. `Channel2 Position` → `Air flow %`) only needs a config
/// change rather than a code change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSchema {
    pub timestamp: String,
    pub stack_temp: String,
    pub steam_temp: String,
    /// Name of the derived `stack_temp - steam_temp` column.
    pub scaling_delta: String,
    pub air_flow: Vec<String>,
    pub steam_pressure: Vec<String>,
    pub stack_o2: Vec<String>,
}

impl Default for ColumnSchema {
    fn default() -> Self {
        ColumnSchema {
            timestamp: "Timestamp".into(),
            stack_temp: "StackTempMbus".into(),
            steam_temp: "SteamTempMbus".into(),
            scaling_delta: "Scaling_Delta".into(),
            air_flow: vec!["Air flow %".into(), "Channel2 Position".into()],
            steam_pressure: vec!["SteamPrMbus".into()],
            stack_o2: vec!["StackO2Mbus".into()],
        }
    }
}

impl ColumnSchema {
    /// Candidate column names for a chart series, in preference order.
    pub fn aliases(&self, series: Series) -> Vec<&str> {
        match series {
            Series::AirFlow => self.air_flow.iter().map(String::as_str).collect(),
            Series::ScalingDelta => vec![self.scaling_delta.as_str()],
            Series::SteamPressure => self.steam_pressure.iter().map(String::as_str).collect(),
            Series::StackO2 => self.stack_o2.iter().map(String::as_str).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Series – the four charted signals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Series {
    AirFlow,
    ScalingDelta,
    SteamPressure,
    StackO2,
}

impl Series {
    /// Top-to-bottom chart order.
    pub const ALL: [Series; 4] = [
        Series::AirFlow,
        Series::ScalingDelta,
        Series::SteamPressure,
        Series::StackO2,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Series::AirFlow => "Blower Damper (Air flow)",
            Series::ScalingDelta => "Tube Scaling Delta (TStack - TSteam)",
            Series::SteamPressure => "Steam Pressure",
            Series::StackO2 => "Stack O2",
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            Series::AirFlow => "Blower Damper %",
            Series::ScalingDelta => "Scaling Delta (°C)",
            Series::SteamPressure => "Pressure (Bar)",
            Series::StackO2 => "Stack O2 %",
        }
    }

    pub fn y_label(self) -> &'static str {
        match self {
            Series::AirFlow => "Damper %",
            Series::ScalingDelta => "Delta °C",
            Series::SteamPressure => "Bar",
            Series::StackO2 => "O2 %",
        }
    }
}

// ---------------------------------------------------------------------------
// Series probe – run once per load
// ---------------------------------------------------------------------------

/// Which chart series a loaded table can supply, and from which column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesProbe {
    /// Name of the parsed timestamp column, if present.
    pub timestamp: Option<String>,
    /// Resolved series in chart order: `(series, column name)`.
    pub available: Vec<(Series, String)>,
    /// Series with no usable numeric column.
    pub missing: Vec<Series>,
}

impl SeriesProbe {
    /// Resolve every series against the table's numeric columns.
    pub fn probe(table: &Table, schema: &ColumnSchema) -> Self {
        let timestamp = table
            .timestamps(&schema.timestamp)
            .map(|_| schema.timestamp.clone());

        let mut available = Vec::new();
        let mut missing = Vec::new();
        for series in Series::ALL {
            let found = schema
                .aliases(series)
                .into_iter()
                .find(|name| table.numeric(name).is_some());
            match found {
                Some(name) => available.push((series, name.to_string())),
                None => missing.push(series),
            }
        }

        SeriesProbe {
            timestamp,
            available,
            missing,
        }
    }

    /// Column backing `series`, if available.
    pub fn column_for(&self, series: Series) -> Option<&str> {
        self.available
            .iter()
            .find(|(s, _)| *s == series)
            .map(|(_, name)| name.as_str())
    }

    /// Warnings for missing columns plus a debug listing of what exists.
    pub fn diagnostics(&self, table: &Table, schema: &ColumnSchema) -> Vec<Diagnostic> {
        let mut out = Vec::new();
        if table.columns().is_empty() {
            return out;
        }
        if self.timestamp.is_none() {
            out.push(Diagnostic::warning(format!(
                "No '{}' column: date filtering is disabled",
                schema.timestamp
            )));
        }
        for series in &self.missing {
            out.push(Diagnostic::warning(format!(
                "{} not available (looked for {:?})",
                series.title(),
                schema.aliases(*series)
            )));
        }
        if self.timestamp.is_none() || !self.missing.is_empty() {
            let listing: Vec<String> = table
                .columns()
                .iter()
                .map(|c| format!("{} ({})", c.name, c.data.kind()))
                .collect();
            out.push(Diagnostic::debug(format!(
                "Available columns: {}",
                listing.join(", ")
            )));
        }
        out
    }
}
