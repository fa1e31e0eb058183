//! Latest observation synthesis
mod fit;
mod record;
mod resolver;

pub use fit::{fit_position, smooth_height, PositionFit};
pub use record::SynthesizedObservation;
pub use resolver::{latest_valid, resolve_latest, Resolved};

use hifitime::{Duration, Epoch, Unit};
use log::debug;

use crate::channel::{self, Channel};
use crate::positions::{update_position, PositionDb};
use crate::table::TimeTable;

/// [Synthesizer] builds one [SynthesizedObservation] per invocation
/// from a station's time-indexed telemetry table. All algorithms are
/// pure functions of the input table; the only shared state touched
/// is the caller-supplied [PositionDb], and only when a complete
/// position fit is available.
#[derive(Debug, Clone)]
pub struct Synthesizer {
    /// Trailing window the position fit and height smoothing see
    lookback: Duration,
    /// Rolling-median window for the mount height
    height_window: Duration,
    /// Minimum valid samples the rolling median requires
    height_min_samples: usize,
    /// Minimum fully valid position rows the coordinate fit requires
    position_min_rows: usize,
}

impl Default for Synthesizer {
    /// One week of position lookback, 72 hour height smoothing with
    /// at least 2 samples, position fit over at least 2 rows.
    fn default() -> Self {
        Self {
            lookback: 7.0 * Unit::Day,
            height_window: 72.0 * Unit::Hour,
            height_min_samples: 2,
            position_min_rows: 2,
        }
    }
}

impl Synthesizer {
    /// Returns a [Synthesizer] with the desired position lookback window.
    pub fn with_lookback(&self, lookback: Duration) -> Self {
        let mut s = self.clone();
        s.lookback = lookback;
        s
    }

    /// Returns a [Synthesizer] with the desired mount height
    /// smoothing window.
    pub fn with_height_window(&self, window: Duration) -> Self {
        let mut s = self.clone();
        s.height_window = window;
        s
    }

    /// Returns a [Synthesizer] with the desired minimum sample count
    /// for mount height smoothing.
    pub fn with_height_min_samples(&self, min_samples: usize) -> Self {
        let mut s = self.clone();
        s.height_min_samples = min_samples;
        s
    }

    /// Returns a [Synthesizer] with the desired minimum number of
    /// fully valid position rows below which the coordinate fit is
    /// undefined. Never less than the 2 rows a line needs; stricter
    /// pipelines raise it to refuse fits over sparse windows.
    pub fn with_position_min_rows(&self, min_rows: usize) -> Self {
        let mut s = self.clone();
        s.position_min_rows = min_rows;
        s
    }

    /// Synthesizes the best available observation for `station`:
    /// newest valid value per tracked channel (each no older than
    /// `earliest`), fitted coordinates and smoothed mount height over
    /// the trailing lookback window, and auxiliary columns taken from
    /// the final row. The record is keyed by the final row's [Epoch].
    ///
    /// Returns None when the station has nothing worth transmitting:
    /// every weather channel stale, or the minimum weather/position
    /// reporting requirements unmet. This is a normal, frequent
    /// outcome, not an error. The weather requirement is judged on the
    /// latest valid temperature and pressure regardless of age: a
    /// merely stale reading resolves to a missing field but does not
    /// withhold the record.
    ///
    /// When `positions` is supplied and the position fit is complete,
    /// the station's entry is overwritten with the fitted coordinates.
    /// Opting out never changes the returned record.
    pub fn synthesize(
        &self,
        table: &TimeTable,
        station: &str,
        earliest: Epoch,
        positions: Option<&mut PositionDb>,
    ) -> Option<SynthesizedObservation> {
        let epoch = table.last_epoch()?;

        let weather: Vec<_> = Channel::WEATHER
            .iter()
            .map(|channel| resolve_latest(table, *channel, earliest))
            .collect();
        if weather.iter().all(|resolved| resolved.is_none()) {
            debug!("{}: no new weather data", station);
            return None;
        }

        let window = table.trailing(self.lookback);
        let position = fit_position(&window, self.position_min_rows);
        let height =
            smooth_height(&window, self.height_window, self.height_min_samples);

        let value = |resolved: &Option<Resolved>| resolved.map(|r| r.value);
        let raw = |channel| resolve_latest(table, channel, earliest).map(|r| r.value);

        let mut observation = SynthesizedObservation::new(epoch, station);
        observation.air_temperature = value(&weather[0]);
        observation.pressure = value(&weather[1]);
        observation.relative_humidity = value(&weather[2]);
        observation.wind_speed = value(&weather[3]);
        observation.wind_direction = value(&weather[4]);
        observation.latitude = raw(Channel::Latitude);
        observation.longitude = raw(Channel::Longitude);
        observation.altitude = raw(Channel::Altitude);
        observation.boom_height = raw(Channel::BoomHeight);
        observation.latitude_fit = position.latitude;
        observation.longitude_fit = position.longitude;
        observation.altitude_fit = position.altitude;
        observation.boom_height_smooth = height;

        // auxiliary columns: whatever was current at the end of the
        // window, never a historical backfill
        let final_row = table.len() - 1;
        for (name, column) in table.columns() {
            if !channel::is_recognized(name) {
                observation
                    .auxiliary
                    .insert(name.clone(), column[final_row]);
            }
        }

        // minimum weather reporting requirement: the station must
        // have a valid temperature and pressure somewhere in the
        // table, even if the latest one is stale
        let weather_ok = latest_valid(table, Channel::AirTemperature).is_some()
            && latest_valid(table, Channel::Pressure).is_some();
        if !weather_ok {
            debug!("{}: minimum weather reporting requirement unmet", station);
            return None;
        }
        if !observation.position_complete() {
            debug!("{}: minimum position reporting requirement unmet", station);
            return None;
        }

        if let Some(db) = positions {
            update_position(db, station, &observation);
        }

        Some(observation)
    }
}
