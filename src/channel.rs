//! Tracked channel vocabulary
use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Instantaneous coarse latitude, reported by the transmission modem.
/// Serves as a fallback when the primary receiver is down. Part of the
/// fixed vocabulary: never passed through as an auxiliary column.
pub const SECONDARY_LATITUDE: &str = "msg_lat";

/// Instantaneous coarse longitude, reported by the transmission modem.
pub const SECONDARY_LONGITUDE: &str = "msg_lon";

/// [Channel] is one of the nine tracked telemetry channels,
/// with dedicated resolution and fit logic. Any other (numeric) column
/// of the input table is considered auxiliary and opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Display, EnumIter, EnumString, IntoStaticStr)]
pub enum Channel {
    /// Instantaneous air temperature
    #[strum(serialize = "t_i")]
    AirTemperature,
    /// Instantaneous barometric pressure
    #[strum(serialize = "p_i")]
    Pressure,
    /// Instantaneous relative humidity
    #[strum(serialize = "rh_i")]
    RelativeHumidity,
    /// Instantaneous wind speed
    #[strum(serialize = "wspd_i")]
    WindSpeed,
    /// Instantaneous wind direction
    #[strum(serialize = "wdir_i")]
    WindDirection,
    /// Receiver latitude (decimal degrees)
    #[strum(serialize = "gps_lat")]
    Latitude,
    /// Receiver longitude (decimal degrees)
    #[strum(serialize = "gps_lon")]
    Longitude,
    /// Receiver altitude above mean sea level (m)
    #[strum(serialize = "gps_alt")]
    Altitude,
    /// Upper boom (sensor mount) height above surface (m)
    #[strum(serialize = "z_boom_u")]
    BoomHeight,
}

impl Channel {
    /// The weather channels. When all of them resolve to missing,
    /// the station has no new data and synthesis is abandoned.
    pub const WEATHER: [Channel; 5] = [
        Channel::AirTemperature,
        Channel::Pressure,
        Channel::RelativeHumidity,
        Channel::WindSpeed,
        Channel::WindDirection,
    ];

    /// The positioning channels, smoothed by linear regression.
    pub const POSITION: [Channel; 3] =
        [Channel::Latitude, Channel::Longitude, Channel::Altitude];

    /// Column name of this [Channel] in the input table.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// True for the five weather channels.
    pub fn is_weather(&self) -> bool {
        Self::WEATHER.contains(self)
    }
}

/// True if this column name belongs to the fixed vocabulary
/// (a tracked [Channel] or a secondary positioning column),
/// false for auxiliary columns.
pub(crate) fn is_recognized(name: &str) -> bool {
    Channel::from_str(name).is_ok()
        || name == SECONDARY_LATITUDE
        || name == SECONDARY_LONGITUDE
}
