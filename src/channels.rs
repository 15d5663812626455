// Channel column map: which spreadsheet column holds each wifi channel.
// The table is read once from `channel_mappings.json` and checked before
// any network traffic happens, so a broken file fails the run early.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory and the user config dir.
pub const CHANNEL_MAP_FILE: &str = "channel_mappings.json";

/// Columns A..H hold the fixed country attributes.
pub const FIXED_COLUMNS: u16 = 8;

/// Excel worksheet maximum column count.
const MAX_COLUMNS: u32 = 16_384;

#[derive(Debug, Error)]
pub enum ChannelMapError {
    #[error("could not read channel map {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("channel map is not a JSON object of strings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("channel map key `{0}` is not a channel number")]
    BadChannel(String),
    #[error("channel {channel} maps to invalid column `{column}`")]
    BadColumn { channel: u16, column: String },
    #[error("channel {channel} maps to column {column}, which is reserved for country attributes")]
    ReservedColumn { channel: u16, column: String },
    #[error("column {column} is assigned to both channel {first} and channel {second}")]
    DuplicateColumn {
        column: String,
        first: u16,
        second: u16,
    },
    #[error("channel {0} appears more than once in the channel map")]
    DuplicateChannel(u16),
    #[error("no channel_mappings.json found in the working directory or user config dir")]
    NotFound,
    #[error("channel {0} has no column in the channel map")]
    UnknownChannel(u16),
}

/// Validated channel-number to column-index table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMap {
    columns: BTreeMap<u16, u16>,
}

impl ChannelMap {
    /// Pick the map file: explicit path first, then `./channel_mappings.json`,
    /// then `<config dir>/mist-country-channels/channel_mappings.json`.
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, ChannelMapError> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        let cwd = PathBuf::from(CHANNEL_MAP_FILE);
        if cwd.exists() {
            return Ok(cwd);
        }
        dirs::config_dir()
            .map(|dir| dir.join("mist-country-channels").join(CHANNEL_MAP_FILE))
            .filter(|path| path.exists())
            .ok_or(ChannelMapError::NotFound)
    }

    pub fn load(path: &Path) -> Result<Self, ChannelMapError> {
        let text = fs::read_to_string(path).map_err(|source| ChannelMapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_json_str(&text)?;
        if map.is_empty() {
            log::warn!("channel map {:?} has no channels; no channel columns will be charted", path);
        }
        log::info!("loaded {} channel columns from {:?}", map.len(), path);
        Ok(map)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ChannelMapError> {
        let raw: BTreeMap<String, String> = serde_json::from_str(text)?;
        let mut columns = BTreeMap::new();
        let mut owners: HashMap<u16, u16> = HashMap::new();

        for (key, value) in raw {
            let channel = key
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|c| *c > 0)
                .ok_or_else(|| ChannelMapError::BadChannel(key.clone()))?;
            if columns.contains_key(&channel) {
                return Err(ChannelMapError::DuplicateChannel(channel));
            }
            let column = column_index(&value).ok_or_else(|| ChannelMapError::BadColumn {
                channel,
                column: value.clone(),
            })?;
            if column < FIXED_COLUMNS {
                return Err(ChannelMapError::ReservedColumn {
                    channel,
                    column: column_name(column),
                });
            }
            if let Some(first) = owners.insert(column, channel) {
                return Err(ChannelMapError::DuplicateColumn {
                    column: column_name(column),
                    first: first.min(channel),
                    second: first.max(channel),
                });
            }
            columns.insert(channel, column);
        }

        Ok(ChannelMap { columns })
    }

    /// Zero-based column for `channel`. Unknown channels are an error, never
    /// a fallback column.
    pub fn column(&self, channel: u16) -> Result<u16, ChannelMapError> {
        self.columns
            .get(&channel)
            .copied()
            .ok_or(ChannelMapError::UnknownChannel(channel))
    }

    /// `(channel, column)` pairs in ascending channel order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        self.columns.iter().map(|(ch, col)| (*ch, *col))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Zero-based index of a column name such as `J` or `AA` (case-insensitive).
pub fn column_index(name: &str) -> Option<u16> {
    let name = name.trim();
    if name.is_empty() || name.len() > 3 {
        return None;
    }
    let mut n: u32 = 0;
    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        n = n * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    if n > MAX_COLUMNS {
        return None;
    }
    Some((n - 1) as u16)
}

/// Column name for a zero-based index: 0 -> `A`, 26 -> `AA`.
pub fn column_name(index: u16) -> String {
    let mut n = index as u32 + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}
