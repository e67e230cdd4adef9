//! Vector primitives: validation, distance metrics, and the binary codec.
//!
//! # Module Structure
//!
//! - `vector`: validation helpers over raw `f64` slices
//! - `distance`: distance metrics and distance/similarity conversion
//! - `codec`: fixed-dimension binary encode/decode for persisted vectors

pub mod codec;
pub mod distance;
pub mod vector;

pub use self::distance::DistanceMetric;
