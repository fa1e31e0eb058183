//! Station identifier normalization
use std::collections::HashMap;

/// [StationAliases] normalizes station identifiers before they are
/// used to key external lookup tables (WMO identifiers, position
/// stores): logistics renames stations over the years ("NUK_Lv3"
/// transmitting for historical "NUK_L") while downstream registries
/// keep the original name.
///
/// Normalization is a pure function of its configuration and never
/// touches the numeric core.
#[derive(Debug, Default, Clone)]
pub struct StationAliases {
    /// Version suffixes stripped from identifiers, e.g. "v3"
    strip_suffixes: Vec<String>,
    /// Literal renames, applied after suffix stripping
    aliases: HashMap<String, String>,
}

impl StationAliases {
    /// Returns a [StationAliases] with an additional suffix to strip.
    pub fn with_stripped_suffix(&self, suffix: &str) -> Self {
        let mut s = self.clone();
        s.strip_suffixes.push(suffix.to_string());
        s
    }

    /// Returns a [StationAliases] with an additional literal rename.
    pub fn with_alias(&self, from: &str, to: &str) -> Self {
        let mut s = self.clone();
        s.aliases.insert(from.to_string(), to.to_string());
        s
    }

    /// Normalizes one station identifier: strips the first matching
    /// suffix, then applies a literal rename if one is configured.
    pub fn normalize(&self, station: &str) -> String {
        let mut station = station.to_string();

        for suffix in self.strip_suffixes.iter() {
            if let Some(stripped) = station.strip_suffix(suffix.as_str()) {
                station = stripped.to_string();
                break;
            }
        }

        match self.aliases.get(&station) {
            Some(renamed) => renamed.clone(),
            None => station,
        }
    }
}
