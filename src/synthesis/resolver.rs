//! Latest valid value resolution
use hifitime::Epoch;
use log::debug;

use crate::channel::Channel;
use crate::table::TimeTable;

/// [Resolved] is the newest trustworthy value of one channel,
/// together with the [Epoch] of the row that supplied it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    /// The raw channel value, unmodified
    pub value: f64,
    /// [Epoch] of the source row
    pub epoch: Epoch,
}

/// Newest valid value of one tracked [Channel], regardless of age:
/// scans backward from the most recent row and keeps the first valid
/// cell. This is what reporting requirements are judged on - a station
/// that has measured pressure at all is reportable, even if its latest
/// reading has gone stale.
pub fn latest_valid(table: &TimeTable, channel: Channel) -> Option<Resolved> {
    let column = table.tracked(channel)?;

    table
        .epochs()
        .iter()
        .zip(column.iter())
        .rev()
        .find_map(|(epoch, cell)| {
            cell.map(|value| Resolved {
                value,
                epoch: *epoch,
            })
        })
}

/// Resolves the latest valid value of one tracked [Channel],
/// unless it is older than `earliest` (stale data is worse than
/// no data). Channels are resolved independently of each other:
/// temperature going silent three hours ago does not prevent pressure
/// from resolving at the final row.
pub fn resolve_latest(
    table: &TimeTable,
    channel: Channel,
    earliest: Epoch,
) -> Option<Resolved> {
    let resolved = latest_valid(table, channel)?;

    if resolved.epoch < earliest {
        debug!(
            "{}: latest valid value ({}) is older than {}",
            channel, resolved.epoch, earliest
        );
        return None;
    }

    Some(resolved)
}
