// Library root
// -----------
// This crate builds a per-country wifi channel report from the Mist API.
// The binary (`main.rs`) only parses arguments and calls `cli::run`.
//
// Module responsibilities:
// - `api`: blocking HTTP client with token auth and explicit errors.
// - `session`: verifies the token once and hands out `MistClient`.
// - `model`: serde shapes of the API payloads.
// - `fetch`: walks the country list and collects channel data per country.
// - `channels`: validated channel-number to spreadsheet-column table.
// - `report`: lays the collected data out as an xlsx workbook.
// - `cli`: argument parsing, logging setup and the top-level run.
pub mod api;
pub mod channels;
pub mod cli;
pub mod fetch;
pub mod model;
pub mod report;
pub mod session;
