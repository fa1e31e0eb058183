//! awsobs is a library to quality-control automatic weather station (AWS)
//! telemetry and synthesize, from the most recent rows of a per-station
//! time-indexed table, a single best-available observation record, ready
//! to be handed to a downstream encoder.
//!
//! Two tightly related algorithms are provided:
//! - a stuck-value filter, which flags sensor channels returning
//!   a stale cached reading (see [qc]),
//! - latest-observation synthesis, which picks the newest valid value
//!   per channel independently and combines it with regression-smoothed
//!   station coordinates and a rolling-median mount height (see [synthesis]).
//!
//! Both share the same philosophy: prefer the most recent trustworthy
//! value, and know when you don't have one. "No fresh observation this
//! cycle" is a normal outcome, expressed as an absent result, never an error.
//!
//! ```
//! use awsobs::prelude::{Epoch, Synthesizer, TimeTable};
//!
//! let t0 = Epoch::from_gregorian_utc_at_midnight(2023, 12, 7);
//! let epochs: Vec<_> = (0..24).map(|h| t0 + (h as f64) * hifitime::Unit::Hour).collect();
//! let pressure = epochs.iter().map(|_| Some(830.2)).collect();
//! let table = TimeTable::from_columns(epochs, [("p_i", pressure)]).unwrap();
//!
//! // no temperature, no position: the completeness gate withholds the record
//! let synth = Synthesizer::default();
//! assert!(synth.synthesize(&table, "STN_01", t0, None).is_none());
//! ```

pub mod channel;
pub mod errors;
pub mod positions;
pub mod qc;
pub mod station;
pub mod synthesis;
pub mod table;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::channel::Channel;
    pub use crate::errors::TableError;
    pub use crate::positions::{update_position, PositionDb, StationPosition};
    pub use crate::qc::{stuck_mask, StuckFilter, StuckPolicy};
    pub use crate::station::StationAliases;
    pub use crate::synthesis::{
        latest_valid, resolve_latest, Resolved, SynthesizedObservation, Synthesizer,
    };
    pub use crate::table::TimeTable;
    // pub re-export
    pub use hifitime::{Duration, Epoch, Unit};
}
