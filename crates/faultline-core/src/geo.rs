//! Geo module for spatial operations
//!
//! Bounding-box pre-filtering, planar nearest-feature search, and geodesic
//! distance calculation.

pub mod bbox;
pub mod geodesic;
pub mod matcher;

pub use bbox::{filter_by_bounds, BoundingBox};
pub use geodesic::{haversine_m, representative_points, EARTH_RADIUS_M};
pub use matcher::{find_closest_fault, MatchResult};
