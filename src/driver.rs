//! The display loop: fetch, paint, alternate phases, repeat.

use std::time::Duration;

use chrono::{Local, Utc};

use crate::{
    brightness::brightness_at,
    condition::Snapshot,
    config::Config,
    context::Context,
    error::{Error, FetchError, Result},
    export::{Exporter, StateDocument},
    fetch::DataSource,
    legend::legend,
    resolve::{resolve_airports, Phase},
    set_pixel, Strip,
};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Ran every scheduled cycle.
    Completed,
    /// Stopped early because the context was cancelled.
    Cancelled,
}

/// States of continuous mode.
#[derive(Debug)]
enum State {
    Fetching,
    Displaying,
    Backoff,
}

/// Drives a strip from a data source.
pub struct Driver<'a, S> {
    config: &'a Config,
    strip: &'a mut S,
    ctx: &'a Context,
    exporter: Exporter,
}

impl<'a, S: Strip> Driver<'a, S> {
    pub fn new(config: &'a Config, strip: &'a mut S, ctx: &'a Context) -> Self {
        Driver {
            config,
            strip,
            ctx,
            exporter: Exporter::new(config.export.clone()),
        }
    }

    /// Fetch once, then animate for the configured total duration.
    /// A failed fetch is returned as an error.
    pub fn run_bounded(&mut self, source: &mut impl DataSource) -> Result<Outcome> {
        let snapshot = self.fetch(source)?;
        if self.ctx.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }
        let total = self.config.timing.total();
        self.display(&snapshot, total, false)
    }

    /// Fetch and display until cancelled.
    ///
    /// Fetch and display failures are logged, then retried after the
    /// configured backoff. Returns only when the context is cancelled.
    pub fn run_continuous(&mut self, source: &mut impl DataSource) -> Result<Outcome> {
        let mut current = Snapshot::default();
        let mut state = State::Fetching;
        loop {
            if self.ctx.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            tracing::trace!("continuous mode: {state:?}");
            state = match state {
                State::Fetching => match self.fetch(source) {
                    Ok(s) => {
                        current = s;
                        State::Displaying
                    }
                    Err(e) => {
                        tracing::error!("fetch failed: {e}");
                        State::Backoff
                    }
                },
                State::Displaying => {
                    let refresh = self.config.timing.refresh();
                    match self.display(&current, refresh, true) {
                        Ok(Outcome::Completed) => State::Fetching,
                        Ok(Outcome::Cancelled) => return Ok(Outcome::Cancelled),
                        Err(e) => {
                            tracing::error!("display failed: {e}");
                            State::Backoff
                        }
                    }
                }
                State::Backoff => {
                    let retry = self.config.timing.retry();
                    tracing::info!("retrying in {:.0}s", retry.as_secs_f64());
                    if self.ctx.wait_timeout(retry) {
                        return Ok(Outcome::Cancelled);
                    }
                    State::Fetching
                }
            };
        }
    }

    /// Paint one frame: every airport, then the legend.
    pub fn paint(&mut self, snapshot: &Snapshot, phase: Phase, level: f32) -> Result<()> {
        let config = self.config;
        for (i, color) in resolve_airports(config, snapshot, phase).enumerate() {
            if let Some(color) = color {
                set_pixel(&mut *self.strip, i, color.scaled(level));
            }
        }
        if config.legend.enabled {
            let start = config.legend_start();
            for (i, color) in legend(phase, config).into_iter().enumerate() {
                set_pixel(&mut *self.strip, start + i, color.scaled(level));
            }
        }
        tracing::trace!("painted {phase:?}");
        self.strip.flush().map_err(Error::Display)
    }

    fn fetch(&mut self, source: &mut impl DataSource) -> std::result::Result<Snapshot, FetchError> {
        let stations = self.config.stations();
        let reports = source.fetch(&stations)?;
        let snapshot = Snapshot::from_reports(&reports, &self.config.extract_settings());
        tracing::info!(
            "fetched {} reports: {} of {} stations reporting",
            reports.len(),
            snapshot.len(),
            stations.len()
        );
        if self.exporter.is_enabled() {
            let doc = StateDocument::build(self.config, &snapshot, Phase::default(), Utc::now());
            self.exporter.export(&doc);
        }
        Ok(snapshot)
    }

    /// Animate `snapshot` over `span`.
    ///
    /// With `linger`, the final phase is held until the span is up;
    /// otherwise the last frame is left showing and this returns at once.
    fn display(&mut self, snapshot: &Snapshot, span: Duration, linger: bool) -> Result<Outcome> {
        let level = brightness_at(&self.config.brightness, Local::now());
        let (ticks, tick) = self.schedule(span);
        tracing::debug!("displaying {ticks} phases of {:.2}s", tick.as_secs_f64());

        let mut phase = Phase::default();
        for i in 0..ticks {
            if self.ctx.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            self.paint(snapshot, phase, level)?;
            let more = i + 1 < ticks;
            if (more || linger) && self.ctx.wait_timeout(tick) {
                return Ok(Outcome::Cancelled);
            }
            phase = phase.flipped();
        }
        Ok(Outcome::Completed)
    }

    /// Number of phases to show in `span`, and the length of each.
    fn schedule(&self, span: Duration) -> (u64, Duration) {
        if !self.config.animated() {
            return (1, span);
        }
        let cycle = self.config.timing.cycle();
        let ticks = (span.as_secs_f64() / cycle.as_secs_f64()).round().max(1.0) as u64;
        (ticks, cycle)
    }
}
