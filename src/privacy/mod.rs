//! Privacy policies applied to records before publication.
//!
//! Currently this covers geolocation coarsening: see [`geo`]. The policy
//! runs in this layer, not in the record-source query, so it can be tested
//! without a database.

pub mod geo;

pub use geo::{coarsen, PublishedLocation, RawLocation};
