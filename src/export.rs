//! Exported state: the latest map as a JSON document, and an append-only
//! JSON-lines history.

use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::Path,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::{
    category::FlightCategory,
    color::Color,
    condition::{Condition, Snapshot},
    config::{Config, ExportSettings},
    error::{Error, Result},
    resolve::{resolve, Phase},
};

/// The map as of one fetch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub timestamp: DateTime<Utc>,
    pub airports: Vec<AirportState>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirportState {
    /// Pixel index.
    pub index: usize,
    pub station: String,
    pub category: FlightCategory,
    pub wind_speed: f64,
    pub gust_speed: f64,
    pub gusty: bool,
    pub lightning: bool,
    pub color: Color,
    pub raw_text: Option<String>,
}

/// One line of history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "id")]
    pub station: String,
    #[serde(rename = "cat")]
    pub category: FlightCategory,
    #[serde(rename = "wind")]
    pub wind_speed: f64,
    #[serde(rename = "gust")]
    pub gust_speed: f64,
    #[serde(rename = "ltg")]
    pub lightning: bool,
}

impl StateDocument {
    /// Describe every configured airport, with colors as of `phase`.
    /// Airports that did not report show as unknown.
    pub fn build(
        config: &Config,
        snapshot: &Snapshot,
        phase: Phase,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let airports = config
            .airports
            .iter()
            .enumerate()
            .filter_map(|(index, a)| {
                let station = a.as_deref()?.trim().to_ascii_uppercase();
                let condition = snapshot.condition(&station);
                let c = condition
                    .copied()
                    .unwrap_or(Condition::calm(FlightCategory::Unknown));
                Some(AirportState {
                    index,
                    color: resolve(condition, phase, config),
                    raw_text: snapshot.raw_text(&station).map(str::to_owned),
                    station,
                    category: c.category,
                    wind_speed: c.wind_speed,
                    gust_speed: c.gust_speed,
                    gusty: c.gusty,
                    lightning: c.lightning,
                })
            })
            .collect();
        StateDocument {
            timestamp,
            airports,
        }
    }

    pub fn history(&self) -> impl Iterator<Item = HistoryRecord> + '_ {
        self.airports.iter().map(|a| HistoryRecord {
            timestamp: self.timestamp,
            station: a.station.clone(),
            category: a.category,
            wind_speed: a.wind_speed,
            gust_speed: a.gust_speed,
            lightning: a.lightning,
        })
    }
}

/// Replace the document at `path` atomically: write a temporary file in the
/// same directory, then rename it over the target.
pub fn write_state(path: &Path, doc: &StateDocument) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        serde_json::to_writer_pretty(&mut w, doc)?;
        w.flush()?;
    }
    tmp.persist(path).map_err(|e| {
        Error::Export(format!("could not replace {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

pub fn read_state(path: &Path) -> Result<StateDocument> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Append one compact line per airport to the history at `path`.
pub fn append_history(path: &Path, doc: &StateDocument) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut w = BufWriter::new(file);
    for record in doc.history() {
        serde_json::to_writer(&mut w, &record)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

/// Writes whichever exports are configured. Failures are logged, not returned.
#[derive(Clone, Debug, Default)]
pub struct Exporter {
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Self {
        Exporter { settings }
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.state.is_some() || self.settings.history.is_some()
    }

    pub fn export(&self, doc: &StateDocument) {
        if let Some(path) = &self.settings.state {
            match write_state(path, doc) {
                Ok(()) => tracing::debug!("wrote state to {}", path.display()),
                Err(e) => tracing::warn!("could not write state to {}: {e}", path.display()),
            }
        }
        if let Some(path) = &self.settings.history {
            if let Err(e) = append_history(path, doc) {
                tracing::warn!("could not append history to {}: {e}", path.display());
            }
        }
    }
}
