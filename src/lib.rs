//! InsightCrew API Library
//!
//! An AI-powered business-intelligence dashboard: uploads are parsed and
//! profiled locally, then a fixed crew of four Gemini-backed agents turns
//! the numbers into insights, a report, and chart captions.

pub mod agents;
pub mod analysis;
pub mod api;
pub mod config;
pub mod domain;
