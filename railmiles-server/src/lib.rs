//! Rail mileage tracker server.
//!
//! Records train journeys, works out how far each one was from the
//! mileages RealTimeTrains publishes, and serves the history as JSON
//! and GeoJSON.

pub mod cache;
pub mod config;
pub mod domain;
pub mod geojson;
pub mod progress;
pub mod resolve;
pub mod rtt;
pub mod stations;
pub mod store;
pub mod web;
