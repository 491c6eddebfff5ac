//! Repair of the partner's XML-derived JSON.
//!
//! - [`normalize`]: unwraps plural containers recursively
//! - [`extract_params_source`]: recovers parameter bindings that unwrapping would discard

pub mod normalize;
pub mod params;


pub use normalize::{CONTAINER_KEYS, is_container_key, normalize, normalize_in_place, normalize_map};
pub use params::{PARAMS_SOURCE_KEY, extract_params_source};
