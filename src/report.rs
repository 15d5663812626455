// Report builder: one header row, then one row per country. Channel columns
// come from the channel map; a channel that is allowed for a country gets an
// "X" in its column.

use crate::channels::{ChannelMap, ChannelMapError};
use crate::model::CountryEntry;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_REPORT_FILE: &str = "country_channels.xlsx";

/// Fixed attribute columns A..H.
pub const HEADERS: [&str; 8] = [
    "Name",
    "Alpha2",
    "DFS_OK",
    "Band24_Enabled",
    "Band24_40mhz_Allowed",
    "Band5_Enabled",
    "Certified",
    "Uses",
];

const COL_NAME: u16 = 0;
const COL_ALPHA2: u16 = 1;
const COL_DFS_OK: u16 = 2;
const COL_BAND24: u16 = 3;
const COL_BAND24_40: u16 = 4;
const COL_BAND5: u16 = 5;
const COL_CERTIFIED: u16 = 6;
const COL_USES: u16 = 7;

/// Only the 20 MHz lists are charted.
const BANDWIDTH: &str = "20";
const MARKER: &str = "X";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Channel(#[from] ChannelMapError),
    #[error("{country}: {band} is enabled but has no 20 MHz channel list")]
    MissingBandwidth { country: String, band: &'static str },
    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Somewhere to put text cells. Rows and columns are zero-based, so the
/// spreadsheet's row 1 is `row == 0`.
pub trait CellSink {
    fn write_text(&mut self, row: u32, col: u16, text: &str) -> Result<(), ReportError>;

    fn write_header(&mut self, row: u32, col: u16, text: &str) -> Result<(), ReportError> {
        self.write_text(row, col, text)
    }
}

/// Worksheet plus the bold format used for the header row.
pub struct XlsxSheet<'a> {
    sheet: &'a mut Worksheet,
    header: Format,
}

impl<'a> XlsxSheet<'a> {
    pub fn new(sheet: &'a mut Worksheet) -> Self {
        XlsxSheet {
            sheet,
            header: Format::new().set_bold(),
        }
    }
}

impl CellSink for XlsxSheet<'_> {
    fn write_text(&mut self, row: u32, col: u16, text: &str) -> Result<(), ReportError> {
        self.sheet.write_string(row, col, text)?;
        Ok(())
    }

    fn write_header(&mut self, row: u32, col: u16, text: &str) -> Result<(), ReportError> {
        self.sheet
            .write_string_with_format(row, col, text, &self.header)?;
        Ok(())
    }
}

/// Write the header row and every entry into `sink`.
pub fn render<S: CellSink>(
    sink: &mut S,
    entries: &[CountryEntry],
    map: &ChannelMap,
) -> Result<(), ReportError> {
    for (col, title) in HEADERS.iter().enumerate() {
        sink.write_header(0, col as u16, title)?;
    }
    for (channel, col) in map.iter() {
        sink.write_header(0, col, &channel.to_string())?;
    }

    for (i, entry) in entries.iter().enumerate() {
        render_row(sink, i as u32 + 1, entry, map)?;
    }
    Ok(())
}

fn render_row<S: CellSink>(
    sink: &mut S,
    row: u32,
    entry: &CountryEntry,
    map: &ChannelMap,
) -> Result<(), ReportError> {
    sink.write_text(row, COL_NAME, &entry.name)?;
    sink.write_text(row, COL_ALPHA2, &entry.key)?;
    sink.write_text(row, COL_DFS_OK, bool_text(entry.dfs_ok.unwrap_or(false)))?;
    sink.write_text(row, COL_BAND24, bool_text(entry.band24_enabled))?;
    sink.write_text(row, COL_BAND24_40, bool_text(entry.band24_40mhz_allowed))?;
    sink.write_text(row, COL_BAND5, bool_text(entry.band5_enabled))?;
    sink.write_text(row, COL_CERTIFIED, bool_text(entry.certified.unwrap_or(false)))?;
    if let Some(uses) = &entry.uses {
        sink.write_text(row, COL_USES, &value_text(uses))?;
    }

    if entry.band24_enabled {
        mark_channels(sink, row, entry, "band24", &entry.band24_channels, map)?;
    }
    if entry.band5_enabled {
        mark_channels(sink, row, entry, "band5", &entry.band5_channels, map)?;
    }
    Ok(())
}

fn mark_channels<S: CellSink>(
    sink: &mut S,
    row: u32,
    entry: &CountryEntry,
    band: &'static str,
    lists: &std::collections::BTreeMap<String, Vec<u16>>,
    map: &ChannelMap,
) -> Result<(), ReportError> {
    let channels = lists
        .get(BANDWIDTH)
        .ok_or_else(|| ReportError::MissingBandwidth {
            country: entry.key.clone(),
            band,
        })?;
    for channel in channels {
        sink.write_text(row, map.column(*channel)?, MARKER)?;
    }
    Ok(())
}

/// Render into a new workbook and save it to `path`.
///
/// The workbook is built in memory; nothing touches disk until the final save.
pub fn write_workbook(
    path: &Path,
    entries: &[CountryEntry],
    map: &ChannelMap,
) -> Result<(), ReportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_freeze_panes(1, 0)?;
    render(&mut XlsxSheet::new(worksheet), entries, map)?;
    workbook.save(path)?;
    log::info!("wrote {} countries to {:?}", entries.len(), path);
    Ok(())
}

// Booleans are spelled the way the API's Python tooling prints them.
fn bool_text(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => bool_text(*b).to_string(),
        other => other.to_string(),
    }
}
