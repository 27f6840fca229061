//! Sources of METAR reports.

use std::time::Duration;

use reqwest::{blocking::Client, StatusCode};

use crate::{config::SourceSettings, error::FetchError, report::RawReport};

/// A type that can get the latest reports for a set of stations.
pub trait DataSource {
    /// Get reports for `stations`.
    ///
    /// Stations with no current report are simply missing from the result.
    /// A station may appear more than once; the most recent report comes first.
    fn fetch(&mut self, stations: &[String]) -> Result<Vec<RawReport>, FetchError>;
}

/// The aviationweather.gov data API.
///
/// See the [API documentation](https://aviationweather.gov/data/api/).
/// `GET /api/data/metar?ids=KSFO,KOAK&format=json&hours=5` returns a JSON
/// array of observations, newest first per station, or `204 No Content`
/// when nothing matched.
pub struct AviationWeather {
    client: Client,
    endpoint: String,
    hours: u32,
}

impl AviationWeather {
    pub fn new(settings: &SourceSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs_f64(settings.timeout_secs))
            .user_agent(concat!("metarmap/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(AviationWeather {
            client,
            endpoint: settings.endpoint.clone(),
            hours: settings.hours,
        })
    }
}

impl DataSource for AviationWeather {
    fn fetch(&mut self, stations: &[String]) -> Result<Vec<RawReport>, FetchError> {
        if stations.is_empty() {
            return Ok(Vec::new());
        }
        let ids = stations.join(",");
        tracing::debug!("requesting {} for {}", self.endpoint, ids);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("ids", ids.as_str()),
                ("format", "json"),
                ("hours", &self.hours.to_string()),
            ])
            .send()?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            tracing::info!("no reports available for {ids}");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.text()?;
        decode_reports(&body)
    }
}

/// Decode a response body. Anything but a JSON list is an error; list
/// elements that are not reports are logged and skipped.
pub fn decode_reports(body: &str) -> Result<Vec<RawReport>, FetchError> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("skipping report {i}: {e}");
                None
            }
        })
        .collect())
}

/// Fake data source: repeatedly provides the same reports.
#[derive(Clone, Debug, Default)]
pub struct FakeSource {
    pub reports: Vec<RawReport>,
}

impl DataSource for FakeSource {
    fn fetch(&mut self, stations: &[String]) -> Result<Vec<RawReport>, FetchError> {
        Ok(self
            .reports
            .iter()
            .filter(|r| stations.iter().any(|s| s.eq_ignore_ascii_case(&r.station)))
            .cloned()
            .collect())
    }
}
