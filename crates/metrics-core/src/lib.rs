//! Core domain layer for the campaign-metrics pipeline.
//!
//! Holds the channel/record models shared by every stage, the pipeline error
//! type, the ratio KPI calculations, calendar-date utilities and the CLI
//! settings. Contains no I/O; loading and exporting live in `metrics-data`.

pub mod error;
pub mod kpi;
pub mod models;
pub mod settings;
pub mod time_utils;
