//! Station position state
use std::collections::HashMap;

use hifitime::Epoch;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::synthesis::SynthesizedObservation;

/// Last known [StationPosition]. Not a history: only the single
/// latest fitted position is retained per station.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationPosition {
    /// Fitted latitude (decimal degrees)
    pub latitude: f64,
    /// Fitted longitude (decimal degrees)
    pub longitude: f64,
    /// Fitted altitude above mean sea level (m)
    pub altitude: f64,
    /// [Epoch] of the observation that produced this fit
    pub epoch: Epoch,
}

/// [PositionDb] maps station identifiers to their last known position.
/// It is owned by the caller: this library only reads and overwrites
/// entries, a surrounding persistence layer is responsible for its
/// durability across runs.
pub type PositionDb = HashMap<String, StationPosition>;

/// Overwrites the `station` entry with the fitted position carried
/// by `observation`, and returns true, if (and only if) all three of
/// fitted latitude, longitude and altitude are defined. Partial fits
/// never touch the store.
pub fn update_position(
    db: &mut PositionDb,
    station: &str,
    observation: &SynthesizedObservation,
) -> bool {
    match (
        observation.latitude_fit,
        observation.longitude_fit,
        observation.altitude_fit,
    ) {
        (Some(latitude), Some(longitude), Some(altitude)) => {
            db.insert(
                station.to_string(),
                StationPosition {
                    latitude,
                    longitude,
                    altitude,
                    epoch: observation.epoch,
                },
            );
            true
        },
        _ => false,
    }
}
