// Library root
// -----------
// This crate backs two small command-line tools. The binaries under
// `src/bin/` are thin: they parse arguments, load configuration and hand
// off to these modules.
//
// Module responsibilities:
// - `api`: builds and sends a single request to the Grafana HTTP API
//   (query parsing, URL building, body selection, status handling).
// - `output`: turns a response body into what gets printed (raw bytes or
//   key-sorted pretty JSON).
// - `config`: environment-driven settings for both tools.
// - `progress`: the deliverable tracker (checklist loading, filesystem
//   checks, aggregation, report rendering and the JSON snapshot).
// - `logging`: tracing subscriber setup shared by both binaries.
pub mod api;
pub mod config;
pub mod logging;
pub mod output;
pub mod progress;
