//! Synthesized observation record
use std::collections::BTreeMap;

use hifitime::Epoch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [SynthesizedObservation] is the best available observation for one
/// station, built from the most recent trustworthy value of each
/// tracked channel. It is keyed by the [Epoch] of the *final* row of
/// the input table, even when every field was sourced from an earlier
/// row. Presence is explicit: a missing field is [None], never NaN.
///
/// The `_fit` fields carry the regression-smoothed coordinates and the
/// `boom_height_smooth` field the rolling-median mount height, to be
/// preferred over their raw counterparts by downstream encoders.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SynthesizedObservation {
    /// [Epoch] of the final input row
    pub epoch: Epoch,
    /// Station identifier
    pub station: String,
    /// Instantaneous air temperature
    pub air_temperature: Option<f64>,
    /// Instantaneous barometric pressure
    pub pressure: Option<f64>,
    /// Instantaneous relative humidity
    pub relative_humidity: Option<f64>,
    /// Instantaneous wind speed
    pub wind_speed: Option<f64>,
    /// Instantaneous wind direction
    pub wind_direction: Option<f64>,
    /// Raw receiver latitude
    pub latitude: Option<f64>,
    /// Raw receiver longitude
    pub longitude: Option<f64>,
    /// Raw receiver altitude
    pub altitude: Option<f64>,
    /// Raw upper boom height
    pub boom_height: Option<f64>,
    /// Regression-smoothed latitude
    pub latitude_fit: Option<f64>,
    /// Regression-smoothed longitude
    pub longitude_fit: Option<f64>,
    /// Regression-smoothed altitude
    pub altitude_fit: Option<f64>,
    /// Rolling-median smoothed boom height
    pub boom_height_smooth: Option<f64>,
    /// Auxiliary columns, taken verbatim from the final input row
    pub auxiliary: BTreeMap<String, Option<f64>>,
}

impl SynthesizedObservation {
    /// Empty [SynthesizedObservation] for this station at this [Epoch].
    pub fn new(epoch: Epoch, station: &str) -> Self {
        Self {
            epoch,
            station: station.to_string(),
            air_temperature: None,
            pressure: None,
            relative_humidity: None,
            wind_speed: None,
            wind_direction: None,
            latitude: None,
            longitude: None,
            altitude: None,
            boom_height: None,
            latitude_fit: None,
            longitude_fit: None,
            altitude_fit: None,
            boom_height_smooth: None,
            auxiliary: BTreeMap::new(),
        }
    }

    /// Minimum position reporting requirement: all three fitted
    /// coordinates must be present. The raw coordinates and the
    /// smoothed boom height play no part here.
    pub fn position_complete(&self) -> bool {
        self.latitude_fit.is_some()
            && self.longitude_fit.is_some()
            && self.altitude_fit.is_some()
    }
}
