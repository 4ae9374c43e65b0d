//! Busline: filter bus-route records and export the matches as CSV.

pub mod api;
mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
