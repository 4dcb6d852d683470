//! Faultline Core - Geospatial matching and distance-computation engine
//!
//! This crate enriches seismic-event bulletins with their nearest geological
//! fault feature and the geodesic distance to it. The pipeline is a strict
//! sequential chain: geometry extraction, bounding-box filtering, nearest
//! feature matching, geodesic distance calculation, attribute normalization,
//! and temporal filtering.

pub mod catalog;
pub mod config;
pub mod error;
pub mod geo;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod temporal;

pub use error::{FaultlineError, Result};
