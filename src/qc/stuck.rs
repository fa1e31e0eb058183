//! Stuck value detection
use log::debug;

use crate::table::TimeTable;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mount point variants a channel base name expands to:
/// upper boom, lower boom and instantaneous.
const MOUNT_VARIANTS: [&str; 3] = ["u", "l", "i"];

/// [StuckPolicy] decides when a channel counts as stuck.
/// Loggers are known to return the last successfully read value when
/// the sensor read fails: a reading that stays bit-identical for
/// longer than physically plausible is presumed cached, not measured.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StuckPolicy {
    /// Maximum absolute difference between consecutive samples
    /// still counted as "unchanged".
    pub change_threshold: f64,
    /// Number of consecutive unchanged samples before the run
    /// is flagged.
    pub stale_samples: usize,
}

impl StuckPolicy {
    pub const fn new(change_threshold: f64, stale_samples: usize) -> Self {
        Self {
            change_threshold,
            stale_samples,
        }
    }
}

/// Computes the stuck-value mask of one channel: true where the value
/// must be discarded.
///
/// The absolute difference between each sample and its predecessor is
/// examined over every window of `stale_samples` consecutive
/// differences: a window entirely below the allowed threshold flags
/// all of its samples. Overlapping windows union their flags.
/// Differences undefined because of missing cells inherit the previous
/// difference, and the very first sample inherits its successor's, so
/// a stuck run starting at the series origin is flagged too.
///
/// A series shorter than `stale_samples` is never flagged.
/// An all-identical series is flagged entirely.
pub fn stuck_mask(series: &[Option<f64>], policy: &StuckPolicy) -> Vec<bool> {
    let size = series.len();
    let window = policy.stale_samples;

    let mut mask = vec![false; size];
    if window == 0 || size < window {
        return mask;
    }

    let mut diffs: Vec<Option<f64>> = vec![None; size];
    for i in 1..size {
        diffs[i] = match (series[i - 1], series[i]) {
            (Some(previous), Some(current)) => Some((current - previous).abs()),
            _ => diffs[i - 1],
        };
    }
    if size > 1 && diffs[0].is_none() {
        diffs[0] = diffs[1];
    }

    for start in 0..=(size - window) {
        let unchanged = diffs[start..start + window]
            .iter()
            .all(|diff| matches!(diff, Some(diff) if *diff < policy.change_threshold));
        if unchanged {
            for flag in mask[start..start + window].iter_mut() {
                *flag = true;
            }
        }
    }

    mask
}

/// [StuckFilter] applies per-quantity [StuckPolicy]s to a [TimeTable].
/// Each rule names a channel base ("t", "p", "rh") and expands to its
/// upper boom, lower boom and instantaneous variants ("t_u", "t_l",
/// "t_i"). Flagged cells are nulled out, so they never reach storage.
///
/// Policies differ per physical quantity: temperature genuinely sits
/// still over an hour, pressure and humidity do not repeat to the
/// fourth decimal for a full day. Wind is never filtered.
#[derive(Debug, Clone)]
pub struct StuckFilter {
    rules: Vec<(String, StuckPolicy)>,
}

impl Default for StuckFilter {
    fn default() -> Self {
        Self {
            rules: vec![
                ("t".to_string(), StuckPolicy::new(0.001, 1)),
                ("p".to_string(), StuckPolicy::new(0.0001, 24)),
                ("rh".to_string(), StuckPolicy::new(0.0001, 24)),
            ],
        }
    }
}

impl StuckFilter {
    /// [StuckFilter] without any rule.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Returns a [StuckFilter] with an additional rule for this
    /// channel base name.
    pub fn with_rule(&self, base: &str, policy: StuckPolicy) -> Self {
        let mut s = self.clone();
        s.rules.push((base.to_string(), policy));
        s
    }

    /// Runs every rule over `table` and returns a copy with all
    /// flagged cells discarded.
    pub fn apply(&self, table: &TimeTable) -> TimeTable {
        let mut filtered = table.clone();

        for (base, policy) in self.rules.iter() {
            for variant in MOUNT_VARIANTS {
                let name = format!("{}_{}", base, variant);
                let mask = match filtered.column(&name) {
                    Some(series) => stuck_mask(series, policy),
                    None => continue,
                };
                let flagged = mask.iter().filter(|f| **f).count();
                if flagged > 0 {
                    debug!("{}: {} stuck values discarded", name, flagged);
                }
                filtered.mask_column(&name, &mask);
            }
        }

        filtered
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hifitime::{Epoch, Unit};

    #[test]
    fn short_series_never_flagged() {
        let policy = StuckPolicy::new(0.1, 5);
        let series = vec![Some(1.0); 4];
        assert_eq!(stuck_mask(&series, &policy), vec![false; 4]);
    }

    #[test]
    fn all_identical_fully_flagged() {
        let policy = StuckPolicy::new(0.001, 3);
        let series = vec![Some(-227.1); 8];
        assert_eq!(stuck_mask(&series, &policy), vec![true; 8]);
    }

    #[test]
    fn stuck_run_at_origin_flagged() {
        // first difference inherits its successor's, so the run
        // starting at sample 0 is caught
        let policy = StuckPolicy::new(0.5, 2);
        let series = vec![Some(4.0), Some(4.0), Some(4.0), Some(9.0), Some(14.0)];
        assert_eq!(
            stuck_mask(&series, &policy),
            vec![true, true, true, false, false]
        );
    }

    #[test]
    fn live_series_untouched() {
        let policy = StuckPolicy::new(0.001, 2);
        let series: Vec<_> = (0..10).map(|i| Some(i as f64 * 0.3)).collect();
        assert_eq!(stuck_mask(&series, &policy), vec![false; 10]);
    }

    #[test]
    fn missing_cells_inherit_previous_difference() {
        // the gap inherits the zero difference before it, keeping the
        // stuck run alive across the hole
        let policy = StuckPolicy::new(0.5, 2);
        let series = vec![Some(5.0), Some(5.0), None, Some(5.0), Some(5.0)];
        assert_eq!(stuck_mask(&series, &policy), vec![true; 5]);

        // whereas a live difference before the gap shields it
        let series = vec![Some(1.0), Some(5.0), None, Some(5.0), Some(5.0)];
        assert_eq!(stuck_mask(&series, &policy), vec![false; 5]);
    }

    #[test]
    fn overlapping_windows_union() {
        let policy = StuckPolicy::new(0.5, 2);

        // differences are 9, 9, 0, 0, 0, 9 (the first inherited): the
        // two overlapping qualifying windows union into samples 2..=4,
        // while sample 1, whose own difference is 9, stays clean
        let series = vec![
            Some(0.0),
            Some(9.0),
            Some(9.0),
            Some(9.0),
            Some(9.0),
            Some(0.0),
        ];
        assert_eq!(
            stuck_mask(&series, &policy),
            vec![false, false, true, true, true, false]
        );
    }

    fn hourly_table(pressure: Vec<Option<f64>>) -> TimeTable {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2023, 12, 1);
        let epochs = (0..pressure.len())
            .map(|h| t0 + (h as f64) * Unit::Hour)
            .collect();
        TimeTable::from_columns(epochs, [("p_i", pressure)]).unwrap()
    }

    #[test]
    fn filter_discards_flagged_cells() {
        let mut pressure: Vec<_> = (0..48).map(|i| Some(830.0 + i as f64)).collect();
        for cell in pressure.iter_mut().take(30) {
            *cell = Some(831.5); // stuck for 30 hours
        }

        let filtered = StuckFilter::default().apply(&hourly_table(pressure));
        let column = filtered.column("p_i").unwrap();
        assert!(column[..30].iter().all(|cell| cell.is_none()));
        assert!(column[30..].iter().all(|cell| cell.is_some()));
    }

    #[test]
    fn refiltering_is_a_fixed_point() {
        let stuck = hourly_table(vec![Some(830.2); 48]);
        let filter = StuckFilter::default();

        let once = filter.apply(&stuck);
        assert!(once
            .column("p_i")
            .unwrap()
            .iter()
            .all(|cell| cell.is_none()));

        // already-discarded cells are missing: a second pass
        // changes nothing
        assert_eq!(filter.apply(&once), once);
    }

    #[test]
    fn unknown_columns_ignored() {
        let table = hourly_table(vec![Some(830.2); 48]);
        let filtered = StuckFilter::empty()
            .with_rule("t", StuckPolicy::new(0.001, 1))
            .apply(&table);
        assert_eq!(filtered, table);
    }
}
