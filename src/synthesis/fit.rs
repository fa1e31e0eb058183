//! Position and mount height smoothing
use hifitime::Duration;
use itertools::Itertools;
use log::debug;
use polyfit_rs::polyfit_rs::polyfit;

use crate::channel::{Channel, SECONDARY_LATITUDE, SECONDARY_LONGITUDE};
use crate::table::TimeTable;

/// Latitude and longitude are reported to sub-meter resolution.
const COORDINATE_DECIMALS: i32 = 6;

/// Altitude and mount height carry decimeter resolution,
/// as required for WMO reporting.
const HEIGHT_DECIMALS: i32 = 1;

/// [PositionFit] carries the regression-smoothed station coordinates.
/// Individual fields are missing when the window held too few valid
/// rows to support a fit, which by itself never aborts synthesis.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PositionFit {
    /// Fitted latitude (decimal degrees)
    pub latitude: Option<f64>,
    /// Fitted longitude (decimal degrees)
    pub longitude: Option<f64>,
    /// Fitted altitude (m)
    pub altitude: Option<f64>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10.0_f64.powi(decimals);
    (value * scale).round() / scale
}

/// Degree-1 fit of (elapsed seconds, value), evaluated at `at` seconds.
fn fit_line(x: &[f64], y: &[f64], at: f64, decimals: i32) -> Option<f64> {
    let fit = match polyfit(x, y, 1) {
        Ok(fit) => fit,
        Err(_) => {
            debug!("linear regression failure");
            return None;
        },
    };
    let (slope, intercept) = (fit[1], fit[0]);
    Some(round_to(slope * at + intercept, decimals))
}

/// Primary coordinate column with missing readings backfilled from the
/// secondary (modem) column, value by value, primary winning where
/// valid. A secondary column containing the 0.0 invalid sentinel is
/// ignored entirely: merging it in would fold bogus jumps into the fit.
fn merged_coordinate(
    table: &TimeTable,
    primary: Channel,
    secondary: &str,
) -> Vec<Option<f64>> {
    let column = match table.tracked(primary) {
        Some(column) => column.to_vec(),
        None => vec![None; table.len()],
    };

    match table.column(secondary) {
        Some(backup) if !backup.iter().flatten().any(|v| *v == 0.0) => column
            .iter()
            .zip(backup.iter())
            .map(|(value, fallback)| value.or(*fallback))
            .collect(),
        _ => column,
    }
}

/// Fits the station position over `table` (already restricted to the
/// lookback window): one ordinary least-squares line per coordinate,
/// over the rows where latitude, longitude and altitude are all valid,
/// evaluated at the most recent such row. Fewer than `min_rows` such
/// rows (never less than the 2 a line needs) leave the fit undefined.
///
/// Positions genuinely drift near-linearly over a window of days
/// (vehicle or ice motion), so a trend line both smooths receiver
/// noise and extrapolates over a receiver outage at the window tail.
pub fn fit_position(table: &TimeTable, min_rows: usize) -> PositionFit {
    let latitude = merged_coordinate(table, Channel::Latitude, SECONDARY_LATITUDE);
    let longitude = merged_coordinate(table, Channel::Longitude, SECONDARY_LONGITUDE);
    let altitude = match table.tracked(Channel::Altitude) {
        Some(column) => column.to_vec(),
        None => vec![None; table.len()],
    };

    let first = match table.epochs().first() {
        Some(first) => *first,
        None => return PositionFit::default(),
    };

    // rows where the full position is valid
    let mut x = Vec::with_capacity(table.len());
    let (mut lat, mut lon, mut alt) = (Vec::new(), Vec::new(), Vec::new());
    for (i, epoch) in table.epochs().iter().enumerate() {
        if let (Some(y_lat), Some(y_lon), Some(y_alt)) =
            (latitude[i], longitude[i], altitude[i])
        {
            x.push((*epoch - first).to_seconds());
            lat.push(y_lat);
            lon.push(y_lon);
            alt.push(y_alt);
        }
    }

    if x.len() < min_rows.max(2) {
        debug!("{} valid position rows: fit undefined", x.len());
        return PositionFit::default();
    }

    let at = x[x.len() - 1];
    PositionFit {
        latitude: fit_line(&x, &lat, at, COORDINATE_DECIMALS),
        longitude: fit_line(&x, &lon, at, COORDINATE_DECIMALS),
        altitude: fit_line(&x, &alt, at, HEIGHT_DECIMALS),
    }
}

/// Smoothed mount height at the final row of `table`: the median of
/// the valid readings within a window of `window` centered on the
/// final epoch, closed on both ends. Fewer than `min_samples` valid
/// readings in the window yield a missing estimate.
///
/// Mount height settles and ablates gradually and non-monotonically:
/// a robust median captures that better than a trend line would.
pub fn smooth_height(
    table: &TimeTable,
    window: Duration,
    min_samples: usize,
) -> Option<f64> {
    let column = table.tracked(Channel::BoomHeight)?;
    let center = table.last_epoch()?;

    let half = Duration::from_seconds(window.to_seconds() * 0.5);
    let (lo, hi) = (center - half, center + half);

    let values: Vec<f64> = table
        .epochs()
        .iter()
        .zip(column.iter())
        .filter(|(epoch, _)| **epoch >= lo && **epoch <= hi)
        .filter_map(|(_, cell)| *cell)
        .collect();

    if values.len() < min_samples.max(1) {
        debug!("{} valid height samples: smoothing undefined", values.len());
        return None;
    }

    let sorted: Vec<f64> = values.into_iter().sorted_by(f64::total_cmp).collect();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    };

    Some(round_to(median, HEIGHT_DECIMALS))
}

#[cfg(test)]
mod test {
    use super::*;
    use hifitime::{Epoch, Unit};

    fn hourly(n: usize) -> Vec<Epoch> {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2023, 12, 6);
        (0..n).map(|h| t0 + (h as f64) * Unit::Hour).collect()
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(66.48247355, 6), 66.482474);
        assert_eq!(round_to(-46.29426146, 6), -46.294261);
        assert_eq!(round_to(2119.64166, 1), 2119.6);
    }

    #[test]
    fn linear_drift_recovered() {
        // 1 cm/day altitude loss, noiseless: the fit reproduces the
        // final sample exactly
        let n = 24 * 7;
        let altitude: Vec<_> = (0..n)
            .map(|h| Some(2120.0 - 0.01 * h as f64 / 24.0))
            .collect();
        let latitude = vec![Some(66.4824); n];
        let longitude = vec![Some(-46.2942); n];

        let table = TimeTable::from_columns(
            hourly(n),
            [
                ("gps_lat", latitude),
                ("gps_lon", longitude),
                ("gps_alt", altitude),
            ],
        )
        .unwrap();

        let fit = fit_position(&table, 2);
        assert_eq!(fit.latitude, Some(66.4824));
        assert_eq!(fit.longitude, Some(-46.2942));
        assert_eq!(fit.altitude, Some(2119.9)); // 2120.0 - 167h of drift, rounded
    }

    #[test]
    fn fit_requires_two_full_rows() {
        let table = TimeTable::from_columns(
            hourly(4),
            [
                ("gps_lat", vec![Some(66.0), Some(66.0), None, None]),
                ("gps_lon", vec![Some(-46.0), None, Some(-46.0), None]),
                // lat+lon+alt all valid on a single row only
                ("gps_alt", vec![Some(2120.0); 4]),
            ],
        )
        .unwrap();
        assert_eq!(fit_position(&table, 2), PositionFit::default());
    }

    #[test]
    fn minimum_row_count_is_configurable() {
        let n = 10;
        let table = TimeTable::from_columns(
            hourly(n),
            [
                ("gps_lat", vec![Some(66.4824); n]),
                ("gps_lon", vec![Some(-46.2942); n]),
                ("gps_alt", vec![Some(2120.0); n]),
            ],
        )
        .unwrap();

        // 10 fully valid rows support an OLS line...
        assert!(fit_position(&table, 2).latitude.is_some());
        // ...but not a pipeline demanding 15 of them
        assert_eq!(fit_position(&table, 15), PositionFit::default());
        // a minimum below the OLS floor is clamped to it
        let single = table.trailing(0.5 * Unit::Hour);
        assert_eq!(fit_position(&single, 0), PositionFit::default());
    }

    #[test]
    fn secondary_coordinates_backfill() {
        // primary receiver down for the second half of the window
        let primary: Vec<_> = (0..10)
            .map(|i| if i < 5 { Some(66.0 + 0.001 * i as f64) } else { None })
            .collect();
        let secondary: Vec<_> = (0..10)
            .map(|i| Some(66.0 + 0.001 * i as f64))
            .collect();

        let table = TimeTable::from_columns(
            hourly(10),
            [
                ("gps_lat", primary.clone()),
                ("msg_lat", secondary.clone()),
                ("gps_lon", vec![Some(-46.0); 10]),
                ("gps_alt", vec![Some(2120.0); 10]),
            ],
        )
        .unwrap();

        let fit = fit_position(&table, 2);
        assert_eq!(fit.latitude, Some(66.009));

        // an all-zero modem burst invalidates the secondary column
        let mut zeroed = secondary;
        zeroed[7] = Some(0.0);
        let table = TimeTable::from_columns(
            hourly(10),
            [
                ("gps_lat", primary),
                ("msg_lat", zeroed),
                ("gps_lon", vec![Some(-46.0); 10]),
                ("gps_alt", vec![Some(2120.0); 10]),
            ],
        )
        .unwrap();

        // fit falls back to the 5 primary rows, predicted at their last
        let fit = fit_position(&table, 2);
        assert_eq!(fit.latitude, Some(66.004));
    }

    #[test]
    fn median_window_and_minimum_count() {
        let heights = vec![
            Some(4.1),
            Some(9.9), // outlier, absorbed by the median
            Some(4.2),
            Some(4.2),
            Some(4.3),
        ];
        let table =
            TimeTable::from_columns(hourly(5), [("z_boom_u", heights)]).unwrap();

        // 4h window centered on the final epoch reaches back to 02:00
        assert_eq!(
            smooth_height(&table, 4.0 * Unit::Hour, 2),
            Some(4.2) // median of 4.2, 4.2, 4.3
        );
        // whole table in view
        assert_eq!(
            smooth_height(&table, 2.0 * Unit::Day, 2),
            Some(4.2) // median of 4.1, 4.2, 4.2, 4.3, 9.9
        );
        // minimum sample count not met
        assert_eq!(smooth_height(&table, 4.0 * Unit::Hour, 4), None);
    }
}
